use smallvec::SmallVec;
use tactile_layout_derive::ButtonLayout;

use crate::delta::InputDeltaState;
use crate::device::{write_button_name, DeviceCore, DeviceSeed, DeviceView, InputDevice};
use crate::layout::ButtonLayout;
use crate::types::{
    ButtonType, DeviceButtonId, DeviceButtonSpec, DeviceState, DeviceType,
    INVALID_DEVICE_BUTTON_ID,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ButtonLayout)]
pub enum ChordButton {
    /// Down while every source button is down.
    Active,
}

/// Gesture that is active while a set of buttons, possibly spread over
/// several devices, is held down together.
///
/// Updated late so it sees its sources' state for the current frame. The
/// gesture is unavailable until its first update and while any source device
/// is not registered.
pub struct ChordGesture {
    core: DeviceCore,
    sources: SmallVec<[DeviceButtonSpec; 4]>,
    sources_present: bool,
}

impl ChordGesture {
    pub fn new(seed: DeviceSeed, sources: &[DeviceButtonSpec]) -> Self {
        Self {
            core: DeviceCore::new(seed, ChordButton::COUNT),
            sources: sources.iter().copied().collect(),
            sources_present: false,
        }
    }

    pub fn sources(&self) -> &[DeviceButtonSpec] {
        &self.sources
    }
}

impl InputDevice for ChordGesture {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn device_type(&self) -> DeviceType {
        DeviceType::Gesture
    }

    fn type_name(&self) -> &'static str {
        "chord"
    }

    fn is_late_update(&self) -> bool {
        true
    }

    fn is_valid_button_id(&self, button: DeviceButtonId) -> bool {
        ChordButton::contains(button)
    }

    fn button_type(&self, button: DeviceButtonId) -> ButtonType {
        ChordButton::from_id(button).map_or(ButtonType::Bool, ButtonLayout::button_type)
    }

    fn internal_update(&mut self, view: &DeviceView<'_>, delta: Option<&mut dyn InputDeltaState>) {
        let mut present = true;
        let mut active = !self.sources.is_empty();
        for spec in &self.sources {
            match view.device(spec.device) {
                Some(device) => {
                    active &= device.is_valid_button_id(spec.button)
                        && device.button_type(spec.button) == ButtonType::Bool
                        && device.get_bool(spec.button);
                }
                None => {
                    present = false;
                    active = false;
                }
            }
        }
        self.sources_present = present;
        self.core.set_bool(ChordButton::Active.id(), active, delta);
    }

    fn internal_state(&self) -> DeviceState {
        if self.sources_present {
            DeviceState::Ok
        } else {
            DeviceState::Unavailable
        }
    }

    fn any_button_down(&self, out: &mut [DeviceButtonSpec]) -> usize {
        self.check_all_buttons_down(out, 0, ChordButton::Active.id())
    }

    fn button_name(&self, button: DeviceButtonId, buffer: &mut [u8]) -> usize {
        ChordButton::from_id(button).map_or(0, |b| write_button_name(b.name(), buffer))
    }

    fn button_by_name(&self, name: &str) -> DeviceButtonId {
        ChordButton::from_name(name).map_or(INVALID_DEVICE_BUTTON_ID, ButtonLayout::id)
    }
}
