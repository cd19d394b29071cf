use ahash::AHashMap;

use crate::delta::InputDeltaState;
use crate::device::{write_button_name, DeviceCore, DeviceSeed, DeviceView, InputDevice};
use crate::types::{
    ButtonType, ButtonValue, DeviceButtonId, DeviceButtonSpec, DeviceState, DeviceType,
    FloatRange, INVALID_DEVICE_BUTTON_ID,
};

/// Layout entry of a [`VirtualDevice`] button.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualButton {
    pub name: Box<str>,
    pub button_type: ButtonType,
    pub range: Option<FloatRange>,
}

impl VirtualButton {
    pub fn bool(name: &str) -> Self {
        Self {
            name: name.into(),
            button_type: ButtonType::Bool,
            range: None,
        }
    }

    pub fn float(name: &str, range: Option<FloatRange>) -> Self {
        Self {
            name: name.into(),
            button_type: ButtonType::Float,
            range,
        }
    }
}

/// A device whose input is injected by the application.
///
/// Injected values are staged and land in the device state on the next
/// update, so they show up in that pass's change log and in edge queries
/// exactly like sampled hardware input. The last value staged for a button
/// before an update wins.
pub struct VirtualDevice {
    core: DeviceCore,
    device_type: DeviceType,
    buttons: Vec<VirtualButton>,
    by_name: AHashMap<Box<str>, DeviceButtonId>,
    pending: Vec<Option<ButtonValue>>,
    health: DeviceState,
}

impl VirtualDevice {
    /// Creates a device of the seed's type with the given button layout.
    /// Button ids are positions in `buttons`.
    pub fn new(seed: DeviceSeed, buttons: Vec<VirtualButton>) -> Self {
        let device_type = seed.device_type();
        let by_name = buttons
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.clone(), i as DeviceButtonId))
            .collect();
        Self {
            core: DeviceCore::new(seed, buttons.len()),
            device_type,
            pending: vec![None; buttons.len()],
            buttons,
            by_name,
            health: DeviceState::Ok,
        }
    }

    pub fn buttons(&self) -> &[VirtualButton] {
        &self.buttons
    }

    pub fn press(&mut self, button: DeviceButtonId) {
        self.set_bool(button, true);
    }

    pub fn release(&mut self, button: DeviceButtonId) {
        self.set_bool(button, false);
    }

    pub fn set_bool(&mut self, button: DeviceButtonId, value: bool) {
        self.stage(button, ButtonValue::Bool(value));
    }

    pub fn set_float(&mut self, button: DeviceButtonId, value: f32) {
        self.stage(button, ButtonValue::Float(value));
    }

    /// Stages a value for the next update. Values for unknown buttons or of
    /// the wrong type are ignored.
    pub fn stage(&mut self, button: DeviceButtonId, value: ButtonValue) {
        debug_assert!(self.is_valid_button_id(button), "invalid button {button}");
        let Some(spec) = self.buttons.get(button as usize) else {
            return;
        };
        debug_assert_eq!(spec.button_type, value.button_type(), "type mismatch on {button}");
        if spec.button_type != value.button_type() {
            return;
        }
        if let Some(slot) = self.pending.get_mut(button as usize) {
            *slot = Some(value);
        }
    }

    /// Simulates a battery warning, disconnect or reconnect.
    pub fn set_state(&mut self, state: DeviceState) {
        self.health = state;
    }
}

impl InputDevice for VirtualDevice {
    fn core(&self) -> &DeviceCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut DeviceCore {
        &mut self.core
    }

    fn device_type(&self) -> DeviceType {
        self.device_type
    }

    fn type_name(&self) -> &'static str {
        self.device_type.name()
    }

    fn is_valid_button_id(&self, button: DeviceButtonId) -> bool {
        (button as usize) < self.buttons.len()
    }

    fn button_type(&self, button: DeviceButtonId) -> ButtonType {
        self.buttons
            .get(button as usize)
            .map_or(ButtonType::Bool, |b| b.button_type)
    }

    fn internal_update(
        &mut self,
        _view: &DeviceView<'_>,
        mut delta: Option<&mut dyn InputDeltaState>,
    ) {
        for (button, slot) in self.pending.iter_mut().enumerate() {
            if let Some(value) = slot.take() {
                let sink = delta.as_mut().map(|d| &mut **d as &mut dyn InputDeltaState);
                self.core.set_value(button as DeviceButtonId, value, sink);
            }
        }
    }

    fn internal_state(&self) -> DeviceState {
        self.health
    }

    fn any_button_down(&self, out: &mut [DeviceButtonSpec]) -> usize {
        match self.buttons.len().checked_sub(1) {
            Some(last) => self.check_all_buttons_down(out, 0, last as DeviceButtonId),
            None => 0,
        }
    }

    fn button_name(&self, button: DeviceButtonId, buffer: &mut [u8]) -> usize {
        self.buttons
            .get(button as usize)
            .map_or(0, |b| write_button_name(&b.name, buffer))
    }

    fn button_by_name(&self, name: &str) -> DeviceButtonId {
        self.by_name
            .get(name)
            .copied()
            .unwrap_or(INVALID_DEVICE_BUTTON_ID)
    }

    fn float_range(&self, button: DeviceButtonId) -> Option<FloatRange> {
        self.buttons.get(button as usize).and_then(|b| b.range)
    }
}
