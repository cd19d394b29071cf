use smallvec::SmallVec;
use tactile_device::devices::VirtualButton;
use tactile_device::{ButtonValue, DeviceButtonId, DeviceType};

/// Validated profile: virtual devices, chords over their buttons and a
/// scripted sequence of input frames.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub devices: Vec<DeviceProfile>,
    pub chords: Vec<ChordProfile>,
    pub frames: Vec<Frame>,
}

#[derive(Debug, Clone)]
pub struct DeviceProfile {
    pub name: Box<str>,
    pub device_type: DeviceType,
    pub buttons: Vec<VirtualButton>,
}

#[derive(Debug, Clone)]
pub struct ChordProfile {
    pub name: Box<str>,
    pub buttons: SmallVec<[ButtonRef; 4]>,
}

/// A button of a profile device: position in [`Profile::devices`] and the
/// button id within that device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ButtonRef {
    pub device: usize,
    pub button: DeviceButtonId,
}

/// Values staged before one update pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub values: Vec<(ButtonRef, ButtonValue)>,
}

impl Profile {
    /// `device.button` label of a referenced button.
    pub fn button_label(&self, button: ButtonRef) -> Option<String> {
        let device = self.devices.get(button.device)?;
        let spec = device.buttons.get(button.button as usize)?;
        Some(format!("{}.{}", device.name, spec.name))
    }
}
