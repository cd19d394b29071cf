use tactile_device::{
    ButtonType, DeviceButtonId, DeviceEvent, EventReceiver, FloatRange, InputDevice,
    InputManager,
};
use tactile_profile::{Profile, ProfileError, Session};

/// Something a replayed frame produced.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FrameEvent {
    Change(String),
    Health(String),
}

/// A profile installed into its own manager, replayed one frame per pass.
pub(crate) struct Replay {
    manager: InputManager,
    session: Session,
    events: EventReceiver,
}

impl Replay {
    pub fn new(profile: &Profile) -> Result<Self, ProfileError> {
        let mut manager = InputManager::new();
        let events = manager.subscribe();
        let session = profile.install(&mut manager)?;

        for event in events.try_iter() {
            if let DeviceEvent::Registered {
                id,
                device_type,
                index,
            } = event
            {
                let name = session.device_name(id).unwrap_or("?");
                log::debug!("{name}: {device_type} #{index} as device {id}");
            }
        }

        Ok(Self {
            manager,
            session,
            events,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.session.frame_count()
    }

    /// Stages frame `index`, runs one update pass and reports what changed.
    pub fn step(&mut self, index: usize) -> Result<Vec<FrameEvent>, ProfileError> {
        self.session.apply_frame(&mut self.manager, index)?;
        self.manager.update();

        let events = self
            .events
            .try_iter()
            .filter_map(|event| match event {
                DeviceEvent::ButtonChanged(change) => {
                    let label = self
                        .session
                        .label(change.device, change.button)
                        .unwrap_or_else(|| format!("{}.{}", change.device, change.button));
                    Some(FrameEvent::Change(format!(
                        "{label} {} -> {}",
                        change.old, change.new
                    )))
                }
                DeviceEvent::StateChanged { id, from, to } => {
                    let name = self.session.device_name(id).unwrap_or("?");
                    Some(FrameEvent::Health(format!("{name} {from} -> {to}")))
                }
                DeviceEvent::Registered { .. } | DeviceEvent::Removed(_) => None,
            })
            .collect();
        Ok(events)
    }

    /// One line per device followed by one indented line per button.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for device in self.manager.devices() {
            let id = device.device_id();
            lines.push(format!(
                "{} {id}: {} #{} ({})",
                self.session.device_name(id).unwrap_or("?"),
                device.device_type(),
                device.index(),
                device.type_name(),
            ));
            let buttons = (0..).take_while(|b: &DeviceButtonId| device.is_valid_button_id(*b));
            for button in buttons {
                lines.push(format!(
                    "  {button}: {} {}",
                    device.button_name_string(button).unwrap_or_default(),
                    describe_button(device, button)
                ));
            }
        }
        lines
    }
}

fn describe_button(device: &dyn InputDevice, button: DeviceButtonId) -> &'static str {
    match (device.button_type(button), device.float_range(button)) {
        (ButtonType::Bool, _) => "bool",
        (ButtonType::Float, None) => "float",
        (ButtonType::Float, Some(FloatRange::Signed)) => "float [-1, 1]",
        (ButtonType::Float, Some(FloatRange::Unsigned)) => "float [0, 1]",
    }
}
