use smallvec::{smallvec, SmallVec};

use crate::types::DeviceButtonId;

const WORD_BITS: usize = u64::BITS as usize;

/// Flat per-device button storage.
///
/// Every button index owns one bit for its boolean value and one `f32` for its
/// float value. Which of the two is meaningful is decided by the device's
/// [`ButtonType`](crate::ButtonType) for that index; the buffer itself does not
/// track it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InputState {
    len: usize,
    bits: SmallVec<[u64; 2]>,
    floats: Vec<f32>,
}

impl InputState {
    /// Creates a buffer for `button_count` buttons, all up and all at `0.0`.
    pub fn new(button_count: usize) -> Self {
        Self {
            len: button_count,
            bits: smallvec![0; button_count.div_ceil(WORD_BITS)],
            floats: vec![0.0; button_count],
        }
    }

    /// Number of button slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get_bool(&self, button: DeviceButtonId) -> bool {
        let i = button as usize;
        debug_assert!(i < self.len, "button {button} out of range");
        if i >= self.len {
            return false;
        }
        match self.bits.get(i / WORD_BITS) {
            Some(word) => word & (1 << (i % WORD_BITS)) != 0,
            None => false,
        }
    }

    #[inline]
    pub fn set_bool(&mut self, button: DeviceButtonId, value: bool) {
        let i = button as usize;
        debug_assert!(i < self.len, "button {button} out of range");
        if i >= self.len {
            return;
        }
        if let Some(word) = self.bits.get_mut(i / WORD_BITS) {
            let mask = 1 << (i % WORD_BITS);
            if value {
                *word |= mask;
            } else {
                *word &= !mask;
            }
        }
    }

    #[inline]
    pub fn get_float(&self, button: DeviceButtonId) -> f32 {
        debug_assert!((button as usize) < self.len, "button {button} out of range");
        self.floats.get(button as usize).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn set_float(&mut self, button: DeviceButtonId, value: f32) {
        debug_assert!((button as usize) < self.len, "button {button} out of range");
        if let Some(slot) = self.floats.get_mut(button as usize) {
            *slot = value;
        }
    }

    /// Number of boolean slots currently set.
    pub fn count_down(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    /// Overwrites this buffer with `other`, reusing the allocation.
    pub fn copy_from(&mut self, other: &InputState) {
        debug_assert_eq!(self.len, other.len, "state buffers differ in shape");
        self.len = other.len;
        self.bits.clone_from(&other.bits);
        self.floats.clone_from(&other.floats);
    }

    /// Resets every slot to its neutral value.
    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|w| *w = 0);
        self.floats.iter_mut().for_each(|f| *f = 0.0);
    }
}
