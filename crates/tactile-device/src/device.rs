use std::any::Any;

use ahash::AHashMap;

use crate::delta::InputDeltaState;
use crate::state::InputState;
use crate::types::{
    ButtonType, ButtonValue, DeviceButtonId, DeviceButtonSpec, DeviceId, DeviceState,
    DeviceType, FloatRange, INVALID_DEVICE_BUTTON_ID,
};

/// Identity issued by the manager for a device about to be created.
///
/// Only [`InputManager::create_device`](crate::InputManager::create_device)
/// can produce a seed, and [`DeviceCore::new`] consumes it, so every device
/// carries a manager-assigned id and index.
#[derive(Debug)]
pub struct DeviceSeed {
    device_id: DeviceId,
    index: u32,
    device_type: DeviceType,
}

impl DeviceSeed {
    pub(crate) fn new(device_id: DeviceId, index: u32, device_type: DeviceType) -> Self {
        Self {
            device_id,
            index,
            device_type,
        }
    }

    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Device kind the manager was asked to create.
    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }
}

/// Identity and double-buffered state shared by every device implementation.
#[derive(Debug)]
pub struct DeviceCore {
    device_id: DeviceId,
    index: u32,
    state: InputState,
    previous_state: InputState,
    #[cfg(feature = "recorder")]
    synced: bool,
}

impl DeviceCore {
    /// Creates the core for a device with `button_count` button slots.
    pub fn new(seed: DeviceSeed, button_count: usize) -> Self {
        Self {
            device_id: seed.device_id,
            index: seed.index,
            state: InputState::new(button_count),
            previous_state: InputState::new(button_count),
            #[cfg(feature = "recorder")]
            synced: false,
        }
    }

    #[inline]
    pub fn device_id(&self) -> DeviceId {
        self.device_id
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Current frame's buffer.
    #[inline]
    pub fn state(&self) -> &InputState {
        &self.state
    }

    /// Previous frame's buffer.
    #[inline]
    pub fn previous_state(&self) -> &InputState {
        &self.previous_state
    }

    /// Direct access to the current buffer. Writes through here are not
    /// reported to any delta sink.
    #[inline]
    pub fn state_mut(&mut self) -> &mut InputState {
        &mut self.state
    }

    /// Demotes the current buffer to previous.
    pub(crate) fn begin_update(&mut self) {
        self.previous_state.copy_from(&self.state);
    }

    /// Writes a bool button and reports the change to `delta` if the value
    /// differs from the current one. Returns whether it changed.
    pub fn set_bool(
        &mut self,
        button: DeviceButtonId,
        value: bool,
        delta: Option<&mut dyn InputDeltaState>,
    ) -> bool {
        let old = self.state.get_bool(button);
        if old == value {
            return false;
        }
        self.state.set_bool(button, value);
        if let Some(delta) = delta {
            delta.add_change(
                self.device_id,
                button,
                ButtonValue::Bool(old),
                ButtonValue::Bool(value),
            );
        }
        true
    }

    /// Float counterpart of [`DeviceCore::set_bool`]. Values are compared
    /// exactly; NaN is equal to NaN.
    #[allow(clippy::float_cmp)]
    pub fn set_float(
        &mut self,
        button: DeviceButtonId,
        value: f32,
        delta: Option<&mut dyn InputDeltaState>,
    ) -> bool {
        let old = self.state.get_float(button);
        if old == value || (old.is_nan() && value.is_nan()) {
            return false;
        }
        self.state.set_float(button, value);
        if let Some(delta) = delta {
            delta.add_change(
                self.device_id,
                button,
                ButtonValue::Float(old),
                ButtonValue::Float(value),
            );
        }
        true
    }

    /// Writes either kind of value, see [`DeviceCore::set_bool`].
    pub fn set_value(
        &mut self,
        button: DeviceButtonId,
        value: ButtonValue,
        delta: Option<&mut dyn InputDeltaState>,
    ) -> bool {
        match value {
            ButtonValue::Bool(v) => self.set_bool(button, v, delta),
            ButtonValue::Float(v) => self.set_float(button, v, delta),
        }
    }

    #[cfg(feature = "recorder")]
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    #[cfg(feature = "recorder")]
    pub fn set_synced(&mut self, synced: bool) {
        self.synced = synced;
    }
}

/// Read-only view of the other registered devices during an update.
///
/// This is how a device reaches the manager that owns it: it is only handed
/// out for the duration of [`InputDevice::update`], and it never includes the
/// device being updated.
#[derive(Clone, Copy)]
pub struct DeviceView<'a> {
    devices: Option<&'a AHashMap<DeviceId, Box<dyn InputDevice>>>,
}

impl<'a> DeviceView<'a> {
    pub(crate) fn new(devices: &'a AHashMap<DeviceId, Box<dyn InputDevice>>) -> Self {
        Self {
            devices: Some(devices),
        }
    }

    /// A view with no devices, for updating a device outside a manager.
    pub fn empty() -> Self {
        Self { devices: None }
    }

    pub fn device(&self, id: DeviceId) -> Option<&'a (dyn InputDevice + 'static)> {
        self.devices?.get(&id).map(|d| &**d)
    }

    /// Returns a device downcast to its concrete type.
    pub fn device_as<T: InputDevice>(&self, id: DeviceId) -> Option<&'a T> {
        self.device(id)?.as_any().downcast_ref::<T>()
    }

    pub fn len(&self) -> usize {
        self.devices.map_or(0, |d| d.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Upcast helper so trait objects can be downcast to concrete devices.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Anything that provides device buttons: a physical device, a network
/// source, or a gesture computed from other devices.
///
/// Implementors supply identity and sampling (`device_type`, `type_name`,
/// `is_valid_button_id`, `button_type`, `internal_update`, `internal_state`)
/// and may override the optional capabilities, which default to
/// "unsupported". The remaining provided methods form the fixed read and
/// update protocol and are not meant to be overridden.
pub trait InputDevice: AsAny {
    fn core(&self) -> &DeviceCore;
    fn core_mut(&mut self) -> &mut DeviceCore;

    fn device_type(&self) -> DeviceType;
    fn type_name(&self) -> &'static str;

    fn is_valid_button_id(&self, button: DeviceButtonId) -> bool;

    /// Type of a valid button. Constant for the device's lifetime.
    fn button_type(&self, button: DeviceButtonId) -> ButtonType;

    /// Samples the device into the current buffer.
    ///
    /// Runs every frame regardless of availability. Each button whose value
    /// changes must be reported to `delta`, when given, exactly once.
    fn internal_update(&mut self, view: &DeviceView<'_>, delta: Option<&mut dyn InputDeltaState>);

    /// Live device health. Queried on every read, so keep it cheap.
    fn internal_state(&self) -> DeviceState;

    /// Whether this device must be updated after all regular devices.
    fn is_late_update(&self) -> bool {
        false
    }

    /// Writes buttons that are currently down into `out` and returns how many
    /// were written.
    fn any_button_down(&self, _out: &mut [DeviceButtonSpec]) -> usize {
        0
    }

    /// Writes the NUL-terminated name of `button` into `buffer` and returns
    /// the number of bytes written, terminator included. Zero if unsupported.
    fn button_name(&self, _button: DeviceButtonId, _buffer: &mut [u8]) -> usize {
        0
    }

    fn button_by_name(&self, _name: &str) -> DeviceButtonId {
        INVALID_DEVICE_BUTTON_ID
    }

    /// Nominal range of a float button, if the device declares one.
    fn float_range(&self, _button: DeviceButtonId) -> Option<FloatRange> {
        None
    }

    #[inline]
    fn device_id(&self) -> DeviceId {
        self.core().device_id()
    }

    /// Index among devices of the same type.
    #[inline]
    fn index(&self) -> u32 {
        self.core().index()
    }

    #[inline]
    fn state(&self) -> DeviceState {
        self.internal_state()
    }

    #[inline]
    fn is_available(&self) -> bool {
        self.state().is_available()
    }

    fn get_bool(&self, button: DeviceButtonId) -> bool {
        if !self.is_available() {
            return false;
        }
        debug_assert!(self.is_valid_button_id(button), "invalid button {button}");
        self.core().state().get_bool(button)
    }

    fn get_bool_previous(&self, button: DeviceButtonId) -> bool {
        if !self.is_available() {
            return false;
        }
        debug_assert!(self.is_valid_button_id(button), "invalid button {button}");
        self.core().previous_state().get_bool(button)
    }

    fn get_float(&self, button: DeviceButtonId) -> f32 {
        if !self.is_available() {
            return 0.0;
        }
        debug_assert!(self.is_valid_button_id(button), "invalid button {button}");
        self.core().state().get_float(button)
    }

    fn get_float_previous(&self, button: DeviceButtonId) -> f32 {
        if !self.is_available() {
            return 0.0;
        }
        debug_assert!(self.is_valid_button_id(button), "invalid button {button}");
        self.core().previous_state().get_float(button)
    }

    /// Reads a button in its own domain.
    fn get_value(&self, button: DeviceButtonId) -> ButtonValue {
        match self.button_type(button) {
            ButtonType::Bool => ButtonValue::Bool(self.get_bool(button)),
            ButtonType::Float => ButtonValue::Float(self.get_float(button)),
        }
    }

    /// Per-frame entry point: demotes the current buffer to previous, then
    /// samples a new current buffer.
    fn update(&mut self, view: &DeviceView<'_>, delta: Option<&mut dyn InputDeltaState>) {
        self.core_mut().begin_update();
        self.internal_update(view, delta);
    }

    /// Collects down bool buttons from the inclusive range `[start, end]` into
    /// `out`, stopping when `out` is full. Meant for `any_button_down`
    /// implementations.
    fn check_all_buttons_down(
        &self,
        out: &mut [DeviceButtonSpec],
        start: DeviceButtonId,
        end: DeviceButtonId,
    ) -> usize {
        let device = self.device_id();
        let mut written = 0;
        for button in start..=end {
            let Some(slot) = out.get_mut(written) else {
                break;
            };
            if self.is_valid_button_id(button)
                && self.button_type(button) == ButtonType::Bool
                && self.get_bool(button)
            {
                *slot = DeviceButtonSpec { device, button };
                written += 1;
            }
        }
        written
    }

    /// Owned copy of a button's name, if the device names its buttons.
    fn button_name_string(&self, button: DeviceButtonId) -> Option<String> {
        let mut buffer = [0u8; 128];
        let written = self.button_name(button, &mut buffer);
        if written < buffer.len() {
            let name = buffer.get(..written.checked_sub(1)?)?;
            return Some(String::from_utf8_lossy(name).into_owned());
        }

        // The name filled the buffer and may be cut; grow until it fits.
        let mut buffer = vec![0u8; buffer.len() * 2];
        loop {
            let written = self.button_name(button, &mut buffer);
            if written < buffer.len() || buffer.len() >= MAX_BUTTON_NAME_LEN {
                buffer.truncate(written.checked_sub(1)?);
                return Some(String::from_utf8_lossy(&buffer).into_owned());
            }
            buffer.resize(buffer.len() * 2, 0);
        }
    }

    fn input_state(&self) -> &InputState {
        self.core().state()
    }

    fn previous_input_state(&self) -> &InputState {
        self.core().previous_state()
    }
}

/// Upper bound on names returned by [`InputDevice::button_name_string`].
pub const MAX_BUTTON_NAME_LEN: usize = 64 * 1024;

/// Copies `name` into `buffer` as a NUL-terminated string, truncating on a
/// char boundary so the terminator always fits. Returns bytes written,
/// terminator included, or zero for an empty buffer.
pub fn write_button_name(name: &str, buffer: &mut [u8]) -> usize {
    let Some(capacity) = buffer.len().checked_sub(1) else {
        return 0;
    };
    let mut len = name.len().min(capacity);
    while !name.is_char_boundary(len) {
        len -= 1;
    }
    buffer[..len].copy_from_slice(&name.as_bytes()[..len]);
    buffer[len] = 0;
    len + 1
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::delta::DeltaLog;

    const NAMES: [&str; 3] = ["fire", "jump", "throttle"];

    /// Two bool buttons (0, 1) and one float (2); input is staged by tests.
    pub(crate) struct TestDevice {
        core: DeviceCore,
        pub(crate) health: DeviceState,
        pub(crate) late: bool,
        pending: Vec<(DeviceButtonId, ButtonValue)>,
    }

    impl TestDevice {
        pub(crate) fn new(seed: DeviceSeed) -> Self {
            Self {
                core: DeviceCore::new(seed, NAMES.len()),
                health: DeviceState::Ok,
                late: false,
                pending: Vec::new(),
            }
        }

        pub(crate) fn stage(&mut self, button: DeviceButtonId, value: ButtonValue) {
            self.pending.push((button, value));
        }
    }

    impl InputDevice for TestDevice {
        fn core(&self) -> &DeviceCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut DeviceCore {
            &mut self.core
        }

        fn device_type(&self) -> DeviceType {
            DeviceType::Custom
        }

        fn type_name(&self) -> &'static str {
            "test"
        }

        fn is_late_update(&self) -> bool {
            self.late
        }

        fn is_valid_button_id(&self, button: DeviceButtonId) -> bool {
            (button as usize) < NAMES.len()
        }

        fn button_type(&self, button: DeviceButtonId) -> ButtonType {
            if button == 2 {
                ButtonType::Float
            } else {
                ButtonType::Bool
            }
        }

        fn internal_update(
            &mut self,
            _view: &DeviceView<'_>,
            mut delta: Option<&mut dyn InputDeltaState>,
        ) {
            for (button, value) in self.pending.drain(..) {
                let sink = delta.as_mut().map(|d| &mut **d as &mut dyn InputDeltaState);
                self.core.set_value(button, value, sink);
            }
        }

        fn internal_state(&self) -> DeviceState {
            self.health
        }

        fn any_button_down(&self, out: &mut [DeviceButtonSpec]) -> usize {
            self.check_all_buttons_down(out, 0, 2)
        }

        fn button_name(&self, button: DeviceButtonId, buffer: &mut [u8]) -> usize {
            NAMES
                .get(button as usize)
                .map_or(0, |name| write_button_name(name, buffer))
        }

        fn button_by_name(&self, name: &str) -> DeviceButtonId {
            NAMES
                .iter()
                .position(|n| *n == name)
                .map_or(INVALID_DEVICE_BUTTON_ID, |i| i as DeviceButtonId)
        }
    }

    pub(crate) fn test_device(id: u32) -> TestDevice {
        TestDevice::new(DeviceSeed::new(DeviceId(id), 0, DeviceType::Custom))
    }

    #[test]
    fn press_is_reported_once_and_visible_as_edge() {
        let mut device = test_device(0);
        let mut log = DeltaLog::new();

        device.update(&DeviceView::empty(), Some(&mut log));
        assert!(log.is_empty());

        device.stage(0, ButtonValue::Bool(true));
        device.update(&DeviceView::empty(), Some(&mut log));
        assert_eq!(log.len(), 1);
        let change = log.as_slice()[0];
        assert_eq!(change.device, DeviceId(0));
        assert_eq!(change.button, 0);
        assert_eq!(change.old, ButtonValue::Bool(false));
        assert_eq!(change.new, ButtonValue::Bool(true));
        assert!(device.get_bool(0));
        assert!(!device.get_bool_previous(0));
    }

    #[test]
    fn previous_buffer_trails_current_by_one_update() {
        let mut device = test_device(0);
        let frames = [
            vec![(0, ButtonValue::Bool(true)), (2, ButtonValue::Float(0.5))],
            vec![(1, ButtonValue::Bool(true))],
            vec![],
            vec![(0, ButtonValue::Bool(false)), (2, ButtonValue::Float(-1.0))],
        ];
        for frame in frames {
            let before = device.input_state().clone();
            for (button, value) in frame {
                device.stage(button, value);
            }
            device.update(&DeviceView::empty(), None);
            assert_eq!(device.previous_input_state(), &before);
        }
    }

    #[test]
    fn update_without_sink_still_updates_buffers() {
        let mut device = test_device(0);
        device.stage(2, ButtonValue::Float(0.25));
        device.update(&DeviceView::empty(), None);
        assert_eq!(device.get_float(2), 0.25);
        assert_eq!(device.get_float_previous(2), 0.0);
    }

    #[test]
    fn unchanged_writes_are_not_reported() {
        let mut device = test_device(0);
        let mut log = DeltaLog::new();
        device.stage(1, ButtonValue::Bool(true));
        device.update(&DeviceView::empty(), Some(&mut log));
        log.clear();

        device.stage(1, ButtonValue::Bool(true));
        device.stage(2, ButtonValue::Float(0.0));
        device.update(&DeviceView::empty(), Some(&mut log));
        assert!(log.is_empty());
    }

    #[test]
    fn nan_resample_is_not_a_change() {
        let mut device = test_device(0);
        let mut log = DeltaLog::new();
        device.stage(2, ButtonValue::Float(f32::NAN));
        device.update(&DeviceView::empty(), Some(&mut log));
        assert_eq!(log.len(), 1);
        log.clear();

        device.stage(2, ButtonValue::Float(f32::NAN));
        device.update(&DeviceView::empty(), Some(&mut log));
        assert!(log.is_empty());
        assert!(device.get_float(2).is_nan());

        device.stage(2, ButtonValue::Float(0.5));
        device.update(&DeviceView::empty(), Some(&mut log));
        assert_eq!(log.len(), 1);
    }

    #[cfg(feature = "recorder")]
    #[test]
    fn synced_flag_round_trips() {
        let mut device = test_device(0);
        assert!(!device.core().is_synced());
        device.core_mut().set_synced(true);
        assert!(device.core().is_synced());
        device.update(&DeviceView::empty(), None);
        assert!(device.core().is_synced());
        device.core_mut().set_synced(false);
        assert!(!device.core().is_synced());
    }

    #[test]
    fn every_changed_button_has_exactly_one_record() {
        let mut device = test_device(0);
        let mut log = DeltaLog::new();
        device.stage(0, ButtonValue::Bool(true));
        device.stage(2, ButtonValue::Float(0.75));
        device.update(&DeviceView::empty(), Some(&mut log));

        for button in 0..3 {
            let changed =
                device.get_value(button) != ButtonValue::neutral(device.button_type(button));
            let records = log.iter().filter(|c| c.button == button).count();
            assert_eq!(records, usize::from(changed), "button {button}");
        }
    }

    #[test]
    fn unavailable_device_reads_neutral() {
        let mut device = test_device(0);
        device.stage(0, ButtonValue::Bool(true));
        device.stage(2, ButtonValue::Float(0.9));
        device.update(&DeviceView::empty(), None);
        device.update(&DeviceView::empty(), None);

        device.health = DeviceState::Unavailable;
        assert!(!device.is_available());
        assert!(!device.get_bool(0));
        assert!(!device.get_bool_previous(0));
        assert_eq!(device.get_float(2), 0.0);
        assert_eq!(device.get_float_previous(2), 0.0);
        // The stored values are untouched.
        assert!(device.input_state().get_bool(0));
        assert_eq!(device.input_state().get_float(2), 0.9);

        device.health = DeviceState::LowBattery;
        assert!(device.is_available());
        assert!(device.get_bool(0));
    }

    #[test]
    fn state_is_not_cached() {
        let mut device = test_device(0);
        assert_eq!(device.state(), DeviceState::Ok);
        device.health = DeviceState::Unavailable;
        assert_eq!(device.state(), DeviceState::Unavailable);
        device.health = DeviceState::Ok;
        assert_eq!(device.state(), DeviceState::Ok);
    }

    #[test]
    fn button_types_are_stable() {
        let mut device = test_device(0);
        let before: Vec<_> = (0..3).map(|b| device.button_type(b)).collect();
        device.stage(0, ButtonValue::Bool(true));
        device.stage(2, ButtonValue::Float(1.0));
        device.update(&DeviceView::empty(), None);
        let after: Vec<_> = (0..3).map(|b| device.button_type(b)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn bulk_query_never_exceeds_output() {
        let mut device = test_device(4);
        device.stage(0, ButtonValue::Bool(true));
        device.stage(1, ButtonValue::Bool(true));
        device.stage(2, ButtonValue::Float(1.0));
        device.update(&DeviceView::empty(), None);

        let mut out = [DeviceButtonSpec::default(); 1];
        assert_eq!(device.any_button_down(&mut out), 1);
        assert_eq!(out[0].button, 0);
        assert_eq!(out[0].device, DeviceId(4));

        let mut out = [DeviceButtonSpec::default(); 8];
        assert_eq!(device.any_button_down(&mut out), 2);
        assert_eq!(out[2], DeviceButtonSpec::default());

        assert_eq!(device.any_button_down(&mut []), 0);
        assert_eq!(device.check_all_buttons_down(&mut out, 2, 1), 0);
    }

    #[test]
    fn bulk_query_is_empty_when_unavailable() {
        let mut device = test_device(0);
        device.stage(0, ButtonValue::Bool(true));
        device.update(&DeviceView::empty(), None);
        device.health = DeviceState::Unavailable;
        let mut out = [DeviceButtonSpec::default(); 4];
        assert_eq!(device.any_button_down(&mut out), 0);
    }

    #[test]
    fn button_name_truncates_and_terminates() {
        let device = test_device(0);
        let mut buffer = [0xffu8; 4];
        let written = device.button_name(2, &mut buffer);
        assert!(written <= 4);
        assert_eq!(written, 4);
        assert_eq!(&buffer, b"thr\0");

        let mut buffer = [0u8; 16];
        assert_eq!(device.button_name(0, &mut buffer), 5);
        assert_eq!(&buffer[..5], b"fire\0");
        assert_eq!(device.button_name(0, &mut []), 0);
        assert_eq!(device.button_name_string(1).as_deref(), Some("jump"));
    }

    #[test]
    fn name_truncation_respects_char_boundaries() {
        let mut buffer = [0xffu8; 3];
        // "é" is two bytes; only one fits before the terminator.
        assert_eq!(write_button_name("aé", &mut buffer), 2);
        assert_eq!(&buffer[..2], b"a\0");
    }

    #[test]
    fn reverse_lookup_uses_sentinel() {
        let device = test_device(0);
        assert_eq!(device.button_by_name("jump"), 1);
        assert_eq!(device.button_by_name("crouch"), INVALID_DEVICE_BUTTON_ID);
    }

    #[test]
    fn defaults_report_unsupported() {
        struct Bare(DeviceCore);
        impl InputDevice for Bare {
            fn core(&self) -> &DeviceCore {
                &self.0
            }
            fn core_mut(&mut self) -> &mut DeviceCore {
                &mut self.0
            }
            fn device_type(&self) -> DeviceType {
                DeviceType::Remote
            }
            fn type_name(&self) -> &'static str {
                "bare"
            }
            fn is_valid_button_id(&self, button: DeviceButtonId) -> bool {
                button == 0
            }
            fn button_type(&self, _button: DeviceButtonId) -> ButtonType {
                ButtonType::Float
            }
            fn internal_update(
                &mut self,
                _view: &DeviceView<'_>,
                _delta: Option<&mut dyn InputDeltaState>,
            ) {
            }
            fn internal_state(&self) -> DeviceState {
                DeviceState::Ok
            }
        }

        let device = Bare(DeviceCore::new(
            DeviceSeed::new(DeviceId(9), 2, DeviceType::Remote),
            1,
        ));
        let mut out = [DeviceButtonSpec::default(); 2];
        let mut name = [0u8; 8];
        assert_eq!(device.device_id(), DeviceId(9));
        assert_eq!(device.index(), 2);
        assert!(!device.is_late_update());
        assert_eq!(device.any_button_down(&mut out), 0);
        assert_eq!(device.button_name(0, &mut name), 0);
        assert_eq!(device.button_name_string(0), None);
        assert_eq!(device.button_by_name("x"), INVALID_DEVICE_BUTTON_ID);
        assert_eq!(device.float_range(0), None);
    }
}
