use std::path::Path;

use serde::Deserialize;

use crate::{v1::ProfileV1, Profile, ProfileError};

/// Parse yaml profile.
pub fn parse_profile(input: &str) -> Result<Profile, ProfileError> {
    let version = parse_version(input)?;
    match version {
        1 => {
            let profile: ProfileV1 = serde_yaml::from_str(input)?;
            let profile = profile.parse()?;
            Ok(profile)
        }
        _ => Err(ProfileError::UnsupportedVersion(version)),
    }
}

/// Read and parse a yaml profile file.
pub fn load_profile(path: &Path) -> Result<Profile, ProfileError> {
    let input = std::fs::read_to_string(path)?;
    parse_profile(&input)
}

/// A profile with a version.
#[derive(Debug, Clone, Deserialize)]
struct VersionedProfile {
    version: u8,
}

/// Parse the version of yaml profile.
fn parse_version(input: &str) -> Result<u8, ProfileError> {
    let raw: VersionedProfile = serde_yaml::from_str(input)?;
    Ok(raw.version)
}
