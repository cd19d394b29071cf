use ahash::AHashMap;
use tactile_device::devices::VirtualButton;
use tactile_device::{ButtonType, ButtonValue, DeviceButtonId, DeviceType, FloatRange};

use crate::profile::{ButtonRef, ChordProfile, DeviceProfile, Frame, Profile};

use super::profile::{ProfileV1, ProfileV1Button, ProfileV1Chord, ProfileV1Device, ProfileV1Value};
use super::Error;

/// Device name -> position in the parsed device list.
type DeviceIndex = AHashMap<String, usize>;

impl ProfileV1 {
    pub fn parse(&self) -> Result<Profile, Error> {
        debug_assert_eq!(self.version, 1, "v1 parser used for version {}", self.version);

        let mut index: DeviceIndex = AHashMap::new();
        let mut devices = Vec::with_capacity(self.devices.len());
        for raw in &self.devices {
            check_name(&raw.name)?;
            if index.contains_key(&raw.name) {
                return Err(Error::DuplicateDevice(raw.name.clone()));
            }
            index.insert(raw.name.clone(), devices.len());
            devices.push(parse_device(raw)?);
        }

        let mut chords: Vec<ChordProfile> = Vec::with_capacity(self.chords.len());
        for raw in &self.chords {
            check_name(&raw.name)?;
            if index.contains_key(&raw.name) || chords.iter().any(|c| *c.name == raw.name) {
                return Err(Error::DuplicateDevice(raw.name.clone()));
            }
            chords.push(parse_chord(raw, &devices, &index)?);
        }

        let frames = self
            .frames
            .iter()
            .map(|raw| parse_frame(raw, &devices, &index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Profile {
            devices,
            chords,
            frames,
        })
    }
}

/// Names are used in `device.button` references, so they cannot contain
/// dots or whitespace.
fn check_name(name: &str) -> Result<(), Error> {
    if name.is_empty() || name.contains('.') || name.contains(char::is_whitespace) {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

fn parse_device(raw: &ProfileV1Device) -> Result<DeviceProfile, Error> {
    let device_type = match raw.device_type.as_deref() {
        None => DeviceType::Custom,
        Some(name) => DeviceType::from_name(name)
            .ok_or_else(|| Error::InvalidDeviceType(name.to_string()))?,
    };

    let mut buttons: Vec<VirtualButton> = Vec::with_capacity(raw.buttons.len());
    for button in &raw.buttons {
        check_name(&button.name)?;
        if buttons.iter().any(|b| *b.name == button.name) {
            return Err(Error::DuplicateButton(raw.name.clone(), button.name.clone()));
        }
        buttons.push(parse_button(&raw.name, button)?);
    }

    Ok(DeviceProfile {
        name: raw.name.as_str().into(),
        device_type,
        buttons,
    })
}

fn parse_button(device: &str, raw: &ProfileV1Button) -> Result<VirtualButton, Error> {
    let label = || format!("{device}.{}", raw.name);
    match raw.button_type.as_deref() {
        None | Some("bool") => match &raw.range {
            None => Ok(VirtualButton::bool(&raw.name)),
            Some(range) => Err(Error::InvalidRange(label(), range.clone())),
        },
        Some("float") => {
            let range = match raw.range.as_deref() {
                None => None,
                Some("signed") => Some(FloatRange::Signed),
                Some("unsigned") => Some(FloatRange::Unsigned),
                Some(other) => return Err(Error::InvalidRange(label(), other.to_string())),
            };
            Ok(VirtualButton::float(&raw.name, range))
        }
        Some(other) => Err(Error::InvalidButtonType(other.to_string())),
    }
}

/// Resolves a `device.button` reference.
fn resolve(
    reference: &str,
    devices: &[DeviceProfile],
    index: &DeviceIndex,
) -> Result<(ButtonRef, ButtonType), Error> {
    let (device_name, button_name) = reference
        .split_once('.')
        .filter(|(d, b)| !d.is_empty() && !b.is_empty())
        .ok_or_else(|| Error::InvalidReference(reference.to_string()))?;
    let (device, profile) = index
        .get(device_name)
        .and_then(|i| devices.get(*i).map(|p| (*i, p)))
        .ok_or_else(|| Error::UnknownDevice(device_name.to_string()))?;
    let (button, spec) = profile
        .buttons
        .iter()
        .enumerate()
        .find(|(_, b)| &*b.name == button_name)
        .ok_or_else(|| Error::UnknownButton(reference.to_string()))?;

    Ok((
        ButtonRef {
            device,
            button: button as DeviceButtonId,
        },
        spec.button_type,
    ))
}

fn parse_chord(
    raw: &ProfileV1Chord,
    devices: &[DeviceProfile],
    index: &DeviceIndex,
) -> Result<ChordProfile, Error> {
    if raw.buttons.is_empty() {
        return Err(Error::EmptyChord(raw.name.clone()));
    }
    let mut buttons = smallvec::SmallVec::with_capacity(raw.buttons.len());
    for reference in &raw.buttons {
        let (button, button_type) = resolve(reference, devices, index)?;
        if button_type != ButtonType::Bool {
            return Err(Error::ChordButtonNotBool(raw.name.clone(), reference.clone()));
        }
        buttons.push(button);
    }
    Ok(ChordProfile {
        name: raw.name.as_str().into(),
        buttons,
    })
}

fn parse_frame(
    raw: &AHashMap<String, ProfileV1Value>,
    devices: &[DeviceProfile],
    index: &DeviceIndex,
) -> Result<Frame, Error> {
    let mut values = Vec::with_capacity(raw.len());
    for (reference, value) in raw {
        let (button, button_type) = resolve(reference, devices, index)?;
        let value = match (button_type, *value) {
            (ButtonType::Bool, ProfileV1Value::Bool(down)) => ButtonValue::Bool(down),
            (ButtonType::Float, ProfileV1Value::Float(v)) if v.is_finite() => {
                ButtonValue::Float(v as f32)
            }
            (ButtonType::Float, ProfileV1Value::Float(_)) => {
                return Err(Error::InvalidValue(reference.clone()))
            }
            _ => return Err(Error::TypeMismatch(reference.clone())),
        };
        values.push((button, value));
    }
    values.sort_by_key(|(button, _)| *button);
    Ok(Frame { values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<Profile, Error> {
        let raw: ProfileV1 = serde_yaml::from_str(yaml).expect("valid yaml");
        raw.parse()
    }

    const PEDALS: &str = r#"
version: 1
devices:
  - name: pedals
    buttons:
      - { name: throttle, type: float, range: unsigned }
      - { name: horn }
  - name: wheel
    type: pad
    buttons:
      - { name: steer, type: float, range: signed }
      - { name: shift_up, type: bool }
chords:
  - name: honk
    buttons: ["pedals.horn", "wheel.shift_up"]
frames:
  - pedals.horn: true
    pedals.throttle: 0.5
  - {}
  - pedals.horn: false
    wheel.steer: -1
"#;

    #[test]
    fn parses_devices_chords_and_frames() {
        let profile = parse(PEDALS).expect("profile parses");
        assert_eq!(profile.devices.len(), 2);

        let pedals = &profile.devices[0];
        assert_eq!(&*pedals.name, "pedals");
        assert_eq!(pedals.device_type, DeviceType::Custom);
        assert_eq!(
            pedals.buttons,
            vec![
                VirtualButton::float("throttle", Some(FloatRange::Unsigned)),
                VirtualButton::bool("horn"),
            ]
        );
        assert_eq!(profile.devices[1].device_type, DeviceType::Pad);

        assert_eq!(profile.chords.len(), 1);
        assert_eq!(
            profile.chords[0].buttons.as_slice(),
            &[
                ButtonRef { device: 0, button: 1 },
                ButtonRef { device: 1, button: 1 },
            ]
        );

        assert_eq!(profile.frames.len(), 3);
        assert_eq!(
            profile.frames[0].values,
            vec![
                (ButtonRef { device: 0, button: 0 }, ButtonValue::Float(0.5)),
                (ButtonRef { device: 0, button: 1 }, ButtonValue::Bool(true)),
            ]
        );
        assert!(profile.frames[1].values.is_empty());
        // Integers are accepted for float buttons.
        assert!(profile.frames[2]
            .values
            .contains(&(ButtonRef { device: 1, button: 0 }, ButtonValue::Float(-1.0))));
        assert_eq!(
            profile.button_label(ButtonRef { device: 1, button: 0 }).as_deref(),
            Some("wheel.steer")
        );
    }

    #[test]
    fn rejects_duplicate_names() {
        let devices = "version: 1\ndevices:\n  - name: a\n  - name: a\n";
        assert!(matches!(parse(devices), Err(Error::DuplicateDevice(n)) if n == "a"));

        let buttons = r#"
version: 1
devices:
  - name: a
    buttons: [{ name: x }, { name: x, type: float }]
"#;
        assert!(matches!(parse(buttons), Err(Error::DuplicateButton(d, b)) if d == "a" && b == "x"));

        let chord = r#"
version: 1
devices:
  - name: a
    buttons: [{ name: x }]
chords:
  - { name: a, buttons: [a.x] }
"#;
        assert!(matches!(parse(chord), Err(Error::DuplicateDevice(_))));
    }

    #[test]
    fn rejects_bad_references() {
        let base = "version: 1\ndevices:\n  - name: a\n    buttons: [{ name: x }]\nframes:\n";
        let cases = [
            ("  - { b.x: true }\n", "unknown device"),
            ("  - { a.y: true }\n", "unknown button"),
            ("  - { ax: true }\n", "invalid button reference"),
        ];
        for (frame, expected) in cases {
            let err = parse(&format!("{base}{frame}")).expect_err("reference must fail");
            assert!(err.to_string().starts_with(expected), "{err}");
        }
    }

    #[test]
    fn rejects_value_type_mismatch() {
        let yaml = r#"
version: 1
devices:
  - name: a
    buttons: [{ name: x }, { name: t, type: float }]
frames:
  - { a.x: 1.0 }
"#;
        assert!(matches!(parse(yaml), Err(Error::TypeMismatch(r)) if r == "a.x"));

        let yaml = yaml.replace("a.x: 1.0", "a.t: true");
        assert!(matches!(parse(&yaml), Err(Error::TypeMismatch(r)) if r == "a.t"));
    }

    #[test]
    fn rejects_non_finite_floats() {
        for value in [".nan", ".inf", "-.inf"] {
            let yaml = format!(
                "version: 1\ndevices:\n  - name: a\n    buttons: [{{ name: t, type: float }}]\nframes:\n  - {{ a.t: {value} }}\n"
            );
            assert!(
                matches!(parse(&yaml), Err(Error::InvalidValue(r)) if r == "a.t"),
                "{value}"
            );
        }
    }

    #[test]
    fn rejects_chords_over_float_buttons() {
        let yaml = r#"
version: 1
devices:
  - name: a
    buttons: [{ name: t, type: float }]
chords:
  - { name: c, buttons: [a.t] }
"#;
        assert!(matches!(parse(yaml), Err(Error::ChordButtonNotBool(c, r)) if c == "c" && r == "a.t"));

        let empty = "version: 1\nchords:\n  - { name: c, buttons: [] }\n";
        assert!(matches!(parse(empty), Err(Error::EmptyChord(_))));
    }

    #[test]
    fn rejects_bad_types_ranges_and_names() {
        let cases = [
            ("{ name: x, type: axis }", "invalid button type"),
            ("{ name: x, range: signed }", "invalid range"),
            ("{ name: x, type: float, range: wide }", "invalid range"),
            ("{ name: x.y }", "invalid name"),
        ];
        for (button, expected) in cases {
            let yaml = format!("version: 1\ndevices:\n  - name: a\n    buttons: [{button}]\n");
            let err = parse(&yaml).expect_err("button must fail");
            assert!(err.to_string().starts_with(expected), "{err}");
        }

        let yaml = "version: 1\ndevices:\n  - { name: a, type: joystick }\n";
        assert!(matches!(parse(yaml), Err(Error::InvalidDeviceType(t)) if t == "joystick"));
    }
}
