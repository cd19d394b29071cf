use ahash::AHashMap;
use smallvec::SmallVec;
use tactile_device::devices::{ChordButton, ChordGesture, VirtualDevice};
use tactile_device::{
    ButtonLayout, DeviceButtonId, DeviceButtonSpec, DeviceId, DeviceType, InputManager,
};

use crate::profile::{Frame, Profile};
use crate::ProfileError;

/// Button labels of an installed device.
#[derive(Debug, Clone)]
struct InstalledDevice {
    name: Box<str>,
    buttons: Vec<Box<str>>,
}

/// Devices a profile created in a manager, with its frames ready to replay.
#[derive(Debug, Clone)]
pub struct Session {
    devices: Vec<DeviceId>,
    chords: Vec<DeviceId>,
    labels: AHashMap<DeviceId, InstalledDevice>,
    frames: Vec<Frame>,
}

impl Profile {
    /// Creates the profile's virtual devices, then its chords, in `manager`.
    pub fn install(&self, manager: &mut InputManager) -> Result<Session, ProfileError> {
        let mut labels = AHashMap::new();

        let mut devices = Vec::with_capacity(self.devices.len());
        for device in &self.devices {
            let buttons = device.buttons.clone();
            let id = manager.create_device(device.device_type, |seed| {
                VirtualDevice::new(seed, buttons)
            })?;
            labels.insert(
                id,
                InstalledDevice {
                    name: device.name.clone(),
                    buttons: device.buttons.iter().map(|b| b.name.clone()).collect(),
                },
            );
            devices.push(id);
        }

        let mut chords = Vec::with_capacity(self.chords.len());
        for chord in &self.chords {
            let sources = chord
                .buttons
                .iter()
                .filter_map(|b| {
                    devices.get(b.device).map(|device| DeviceButtonSpec {
                        device: *device,
                        button: b.button,
                    })
                })
                .collect::<SmallVec<[DeviceButtonSpec; 4]>>();
            let id = manager.create_device(DeviceType::Gesture, |seed| {
                ChordGesture::new(seed, &sources)
            })?;
            labels.insert(
                id,
                InstalledDevice {
                    name: chord.name.clone(),
                    buttons: vec![ChordButton::Active.name().into()],
                },
            );
            chords.push(id);
        }

        log::debug!(
            "installed profile: {} device(s), {} chord(s), {} frame(s)",
            devices.len(),
            chords.len(),
            self.frames.len()
        );
        Ok(Session {
            devices,
            chords,
            labels,
            frames: self.frames.clone(),
        })
    }
}

impl Session {
    /// Ids of the virtual devices, in profile order.
    pub fn device_ids(&self) -> &[DeviceId] {
        &self.devices
    }

    /// Ids of the chord gestures, in profile order.
    pub fn chord_ids(&self) -> &[DeviceId] {
        &self.chords
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Profile name of an installed device.
    pub fn device_name(&self, device: DeviceId) -> Option<&str> {
        self.labels.get(&device).map(|d| &*d.name)
    }

    /// `device.button` label for a button of an installed device.
    pub fn label(&self, device: DeviceId, button: DeviceButtonId) -> Option<String> {
        let installed = self.labels.get(&device)?;
        let button = installed.buttons.get(button as usize)?;
        Some(format!("{}.{button}", installed.name))
    }

    /// Stages the values of frame `index` into the session's devices. They
    /// take effect on the manager's next update.
    pub fn apply_frame(
        &self,
        manager: &mut InputManager,
        index: usize,
    ) -> Result<(), ProfileError> {
        let frame = self
            .frames
            .get(index)
            .ok_or(ProfileError::FrameOutOfRange(index))?;
        for (button, value) in &frame.values {
            let Some(id) = self.devices.get(button.device) else {
                continue;
            };
            manager
                .try_device_as_mut::<VirtualDevice>(*id)?
                .stage(button.button, *value);
        }
        Ok(())
    }
}
