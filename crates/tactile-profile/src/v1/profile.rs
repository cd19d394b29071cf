use ahash::AHashMap;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileV1 {
    pub version: u8,
    #[serde(default)]
    pub devices: Vec<ProfileV1Device>,
    #[serde(default)]
    pub chords: Vec<ProfileV1Chord>,
    #[serde(default)]
    pub frames: Vec<AHashMap<String, ProfileV1Value>>, // device.button -> value
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileV1Device {
    pub name: String,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub buttons: Vec<ProfileV1Button>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileV1Button {
    pub name: String,
    #[serde(default, rename = "type")]
    pub button_type: Option<String>, // bool | float
    #[serde(default)]
    pub range: Option<String>, // signed | unsigned
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileV1Chord {
    pub name: String,
    pub buttons: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum ProfileV1Value {
    Bool(bool),
    Float(f64),
}
