mod parse;
mod profile;

use thiserror::Error;

pub use profile::ProfileV1;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid name: \"{0}\"")]
    InvalidName(String),
    #[error("duplicate device: {0}")]
    DuplicateDevice(String),
    #[error("duplicate button: {0}.{1}")]
    DuplicateButton(String, String),
    #[error("invalid device type: {0}")]
    InvalidDeviceType(String),
    #[error("invalid button type: {0}")]
    InvalidButtonType(String),
    #[error("invalid range for {0}: {1}")]
    InvalidRange(String, String),
    #[error("invalid button reference: {0}")]
    InvalidReference(String),
    #[error("unknown device: {0}")]
    UnknownDevice(String),
    #[error("unknown button: {0}")]
    UnknownButton(String),
    #[error("type mismatch for {0}")]
    TypeMismatch(String),
    #[error("non-finite value for {0}")]
    InvalidValue(String),
    #[error("chord {0} references non-bool button {1}")]
    ChordButtonNotBool(String, String),
    #[error("chord {0} has no buttons")]
    EmptyChord(String),
}
