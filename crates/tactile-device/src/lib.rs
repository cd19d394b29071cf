//! Device abstraction for input handling.
//!
//! Every input source, from physical hardware to gestures computed out of
//! other devices, implements [`InputDevice`] on top of a double-buffered
//! [`DeviceCore`]. The [`InputManager`] owns the devices, hands out their
//! identities and runs the per-frame update pass.

// Lets `#[derive(ButtonLayout)]` expand to `::tactile_device` paths inside
// this crate too.
extern crate self as tactile_device;

mod delta;
mod device;
mod error;
mod events;
mod layout;
mod manager;
mod state;
mod types;

pub mod devices;

pub use crate::delta::{ButtonChange, DeltaLog, InputDeltaState};
pub use crate::device::{
    write_button_name, AsAny, DeviceCore, DeviceSeed, DeviceView, InputDevice,
    MAX_BUTTON_NAME_LEN,
};
pub use crate::error::{Error, Result};
pub use crate::events::{DeviceEvent, EventReceiver};
pub use crate::layout::ButtonLayout;
pub use crate::manager::{InputManager, ManagerConfig};
pub use crate::state::InputState;
pub use crate::types::{
    ButtonType, ButtonValue, DeviceButtonId, DeviceButtonSpec, DeviceId, DeviceState,
    DeviceType, FloatRange, INVALID_DEVICE_BUTTON_ID,
};
pub use tactile_layout_derive::ButtonLayout;
