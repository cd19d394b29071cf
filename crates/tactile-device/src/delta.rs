use crate::types::{ButtonValue, DeviceButtonId, DeviceId};

/// Sink for button changes produced while devices update.
///
/// A device reports one change per button whose value differs after its
/// update. The manager passes a single sink to every device in a pass, one
/// device at a time.
pub trait InputDeltaState {
    fn add_change(
        &mut self,
        device: DeviceId,
        button: DeviceButtonId,
        old: ButtonValue,
        new: ButtonValue,
    );
}

/// One button transition observed during an update pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonChange {
    pub device: DeviceId,
    pub button: DeviceButtonId,
    pub old: ButtonValue,
    pub new: ButtonValue,
}

/// Change log for a single update pass, in the order changes were reported.
#[derive(Debug, Clone, Default)]
pub struct DeltaLog {
    changes: Vec<ButtonChange>,
}

impl DeltaLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ButtonChange> {
        self.changes.iter()
    }

    pub fn as_slice(&self) -> &[ButtonChange] {
        &self.changes
    }

    /// Changes reported by one device.
    pub fn changes_for(&self, device: DeviceId) -> impl Iterator<Item = &ButtonChange> {
        self.changes.iter().filter(move |c| c.device == device)
    }

    /// Removes and yields all recorded changes.
    pub fn drain(&mut self) -> std::vec::Drain<'_, ButtonChange> {
        self.changes.drain(..)
    }
}

impl InputDeltaState for DeltaLog {
    fn add_change(
        &mut self,
        device: DeviceId,
        button: DeviceButtonId,
        old: ButtonValue,
        new: ButtonValue,
    ) {
        self.changes.push(ButtonChange {
            device,
            button,
            old,
            new,
        });
    }
}

impl<'a> IntoIterator for &'a DeltaLog {
    type Item = &'a ButtonChange;
    type IntoIter = std::slice::Iter<'a, ButtonChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
