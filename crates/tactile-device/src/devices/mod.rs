//! Built-in devices that need no platform backend.

mod chord;
mod virtual_device;

pub use chord::{ChordButton, ChordGesture};
pub use virtual_device::{VirtualButton, VirtualDevice};
