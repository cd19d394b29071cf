use thiserror::Error;

use crate::types::DeviceId;

/// Error type for device management operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No device with this id is registered.
    #[error("Device not found: {0}")]
    DeviceNotFound(DeviceId),
    /// The device exists but is not of the requested concrete type.
    #[error("Device {0} is not a {1}")]
    WrongDeviceKind(DeviceId, &'static str),
    /// Every device id has been issued.
    #[error("Device ids exhausted")]
    IdsExhausted,
}

/// Convenient result alias for device operations.
pub type Result<T> = std::result::Result<T, Error>;
