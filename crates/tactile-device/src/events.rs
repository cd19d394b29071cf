use crossbeam_channel::Receiver;

use crate::delta::ButtonChange;
use crate::types::{DeviceId, DeviceState, DeviceType};

/// Events emitted by the manager about device lifecycle and input.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// A device has been created and registered.
    Registered {
        id: DeviceId,
        device_type: DeviceType,
        index: u32,
    },
    /// A device has been removed from the manager.
    Removed(DeviceId),
    /// A device's health changed between two update passes.
    StateChanged {
        id: DeviceId,
        from: DeviceState,
        to: DeviceState,
    },
    /// A button changed value during an update pass.
    ButtonChanged(ButtonChange),
}

/// Receiving end for device events subscription.
pub type EventReceiver = Receiver<DeviceEvent>;
