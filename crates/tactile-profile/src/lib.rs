mod parse;
mod profile;
mod session;
mod v1;

use thiserror::Error;

pub use parse::{load_profile, parse_profile};
pub use profile::{ButtonRef, ChordProfile, DeviceProfile, Frame, Profile};
pub use session::Session;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("yaml deserialize error: {0}")]
    YamlDeserializeError(#[from] serde_yaml::Error),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),
    #[error("v1 profile error: {0}")]
    V1ProfileError(#[from] v1::Error),
    #[error("device error: {0}")]
    Device(#[from] tactile_device::Error),
    #[error("frame {0} is out of range")]
    FrameOutOfRange(usize),
    #[error("path error: {0}")]
    PathError(#[from] std::io::Error),
}
