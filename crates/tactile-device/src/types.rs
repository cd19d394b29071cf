use std::fmt;

/// Unique identifier of a registered input device.
///
/// Issued by [`InputManager`](crate::InputManager) when a device is created and
/// never handed out again while that device is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub(crate) u32);

impl DeviceId {
    /// Sentinel for "no device".
    pub const INVALID: DeviceId = DeviceId(u32::MAX);

    /// Returns the raw numeric value of the id.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a button or axis, unique within one device.
pub type DeviceButtonId = u32;

/// Sentinel button id meaning "no such button".
pub const INVALID_DEVICE_BUTTON_ID: DeviceButtonId = u32::MAX;

/// Value domain of a device button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonType {
    /// Either down (`true`) or up (`false`).
    Bool,
    /// Continuous value, see [`FloatRange`].
    Float,
}

/// Nominal range of a float button.
///
/// Purely descriptive: stored values are never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatRange {
    /// `[-1.0, 1.0]`, e.g. stick axes.
    Signed,
    /// `[0.0, 1.0]`, e.g. triggers and pressure.
    Unsigned,
}

/// A single button value of either domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ButtonValue {
    Bool(bool),
    Float(f32),
}

impl ButtonValue {
    /// Neutral value of the given domain.
    pub const fn neutral(button_type: ButtonType) -> Self {
        match button_type {
            ButtonType::Bool => ButtonValue::Bool(false),
            ButtonType::Float => ButtonValue::Float(0.0),
        }
    }

    pub const fn button_type(self) -> ButtonType {
        match self {
            ButtonValue::Bool(_) => ButtonType::Bool,
            ButtonValue::Float(_) => ButtonType::Float,
        }
    }
}

impl fmt::Display for ButtonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonValue::Bool(true) => f.write_str("down"),
            ButtonValue::Bool(false) => f.write_str("up"),
            ButtonValue::Float(v) => write!(f, "{v:.3}"),
        }
    }
}

/// Kind of an input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    /// A mouse/cursor device featuring one pointer.
    Mouse,
    Keyboard,
    /// A joypad or gamepad.
    Pad,
    /// A touch surface supporting multiple simultaneous pointers.
    Touch,
    /// A generic networked device.
    Remote,
    /// A device built on top of other devices' states.
    Gesture,
    /// A user-defined device.
    Custom,
}

impl DeviceType {
    pub const ALL: [DeviceType; 7] = [
        DeviceType::Mouse,
        DeviceType::Keyboard,
        DeviceType::Pad,
        DeviceType::Touch,
        DeviceType::Remote,
        DeviceType::Gesture,
        DeviceType::Custom,
    ];

    /// Canonical lowercase name of the device kind.
    pub const fn name(self) -> &'static str {
        match self {
            DeviceType::Mouse => "mouse",
            DeviceType::Keyboard => "keyboard",
            DeviceType::Pad => "pad",
            DeviceType::Touch => "touch",
            DeviceType::Remote => "remote",
            DeviceType::Gesture => "gesture",
            DeviceType::Custom => "custom",
        }
    }

    /// Looks a device kind up by its canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Health of an input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceState {
    Ok,
    LowBattery,
    /// Disconnected or otherwise unreadable. Reads return neutral values.
    Unavailable,
}

impl DeviceState {
    /// Whether reads from a device in this state see real values.
    pub const fn is_available(self) -> bool {
        matches!(self, DeviceState::Ok | DeviceState::LowBattery)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeviceState::Ok => "ok",
            DeviceState::LowBattery => "low battery",
            DeviceState::Unavailable => "unavailable",
        })
    }
}

/// A button on a specific device, as reported by bulk "what is down" queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceButtonSpec {
    pub device: DeviceId,
    pub button: DeviceButtonId,
}

impl Default for DeviceButtonSpec {
    fn default() -> Self {
        Self {
            device: DeviceId::INVALID,
            button: INVALID_DEVICE_BUTTON_ID,
        }
    }
}
