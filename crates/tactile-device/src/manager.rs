use ahash::AHashMap;
use crossbeam_channel::{unbounded, Sender};
use smallvec::SmallVec;

use crate::delta::{DeltaLog, InputDeltaState};
use crate::device::{DeviceSeed, DeviceView, InputDevice};
use crate::error::{Error, Result};
use crate::events::{DeviceEvent, EventReceiver};
use crate::types::{DeviceId, DeviceState, DeviceType};

/// Options for an [`InputManager`].
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Collect per-pass change records. When off, devices are updated with
    /// no delta sink and [`InputManager::changes`] stays empty.
    pub track_changes: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            track_changes: true,
        }
    }
}

/// Owns input devices, assigns their identities and drives the per-frame
/// update pass.
///
/// A pass updates every regular device in registration order, then every
/// late-update device in registration order, with a single shared change log.
/// Subscribers receive the pass's events once it has completed.
pub struct InputManager {
    config: ManagerConfig,
    next_id: u32,
    devices: AHashMap<DeviceId, Box<dyn InputDevice>>,
    order: Vec<DeviceId>,
    last_states: AHashMap<DeviceId, DeviceState>,
    changes: DeltaLog,
    subscribers: Vec<Sender<DeviceEvent>>,
    frame: u64,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            config,
            next_id: 0,
            devices: AHashMap::new(),
            order: Vec::new(),
            last_states: AHashMap::new(),
            changes: DeltaLog::new(),
            subscribers: Vec::new(),
            frame: 0,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Creates and registers a device.
    ///
    /// `build` receives the seed carrying the new device's id and its index
    /// among registered devices of `device_type`; the device must be built
    /// from that seed and report `device_type`. Fails once every id below
    /// [`DeviceId::INVALID`] has been issued.
    pub fn create_device<D, F>(&mut self, device_type: DeviceType, build: F) -> Result<DeviceId>
    where
        D: InputDevice,
        F: FnOnce(DeviceSeed) -> D,
    {
        if self.next_id >= DeviceId::INVALID.0 {
            return Err(Error::IdsExhausted);
        }
        let id = DeviceId(self.next_id);
        self.next_id += 1;
        let index = self.next_free_index(device_type);

        let device = build(DeviceSeed::new(id, index, device_type));
        debug_assert_eq!(device.device_id(), id, "device was not built from its seed");
        debug_assert_eq!(device.device_type(), device_type, "device type differs from request");

        log::debug!(
            "registered {} device {id} ({device_type} #{index})",
            device.type_name()
        );
        self.devices.insert(id, Box::new(device));
        self.order.push(id);

        self.broadcast(&DeviceEvent::Registered {
            id,
            device_type,
            index,
        });
        Ok(id)
    }

    /// Removes a device, releasing its state buffers.
    pub fn remove_device(&mut self, id: DeviceId) -> Result<()> {
        let device = self.devices.remove(&id).ok_or(Error::DeviceNotFound(id))?;
        self.order.retain(|d| *d != id);
        self.last_states.remove(&id);
        log::debug!("removed {} device {id}", device.type_name());
        drop(device);

        self.broadcast(&DeviceEvent::Removed(id));
        Ok(())
    }

    pub fn device(&self, id: DeviceId) -> Option<&(dyn InputDevice + 'static)> {
        self.devices.get(&id).map(|d| &**d)
    }

    pub fn device_mut(&mut self, id: DeviceId) -> Option<&mut (dyn InputDevice + 'static)> {
        self.devices.get_mut(&id).map(|d| &mut **d)
    }

    /// Returns a device downcast to its concrete type.
    pub fn device_as<T: InputDevice>(&self, id: DeviceId) -> Option<&T> {
        self.device(id)?.as_any().downcast_ref::<T>()
    }

    pub fn device_as_mut<T: InputDevice>(&mut self, id: DeviceId) -> Option<&mut T> {
        self.device_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    /// Like [`InputManager::device_as_mut`], telling a missing device apart
    /// from one of another kind.
    pub fn try_device_as_mut<T: InputDevice>(&mut self, id: DeviceId) -> Result<&mut T> {
        let device = self.device_mut(id).ok_or(Error::DeviceNotFound(id))?;
        device
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(Error::WrongDeviceKind(id, std::any::type_name::<T>()))
    }

    /// Looks a device up by kind and per-kind index.
    pub fn find_device(&self, device_type: DeviceType, index: u32) -> Option<DeviceId> {
        self.devices()
            .find(|d| d.device_type() == device_type && d.index() == index)
            .map(|d| d.device_id())
    }

    /// Registered devices in registration order.
    pub fn devices(&self) -> impl Iterator<Item = &(dyn InputDevice + 'static)> {
        self.order
            .iter()
            .filter_map(|id| self.devices.get(id))
            .map(|d| &**d)
    }

    pub fn device_ids(&self) -> &[DeviceId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Changes recorded during the last pass.
    pub fn changes(&self) -> &DeltaLog {
        &self.changes
    }

    /// Number of completed update passes.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Subscribes to device events. Dropped subscribers are cleaned
    /// automatically.
    pub fn subscribe(&mut self) -> EventReceiver {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Runs one update pass over all devices and returns the number of
    /// change records it produced.
    pub fn update(&mut self) -> usize {
        self.changes.clear();

        for id in self.update_sequence() {
            // Detach the device so it can look at all the others.
            let Some(mut device) = self.devices.remove(&id) else {
                continue;
            };
            let view = DeviceView::new(&self.devices);
            let delta = if self.config.track_changes {
                Some(&mut self.changes as &mut dyn InputDeltaState)
            } else {
                None
            };
            device.update(&view, delta);
            self.devices.insert(id, device);
        }

        self.frame += 1;
        log::trace!("frame {}: {} change(s)", self.frame, self.changes.len());
        self.publish();
        self.changes.len()
    }

    fn update_sequence(&self) -> SmallVec<[DeviceId; 16]> {
        let is_late = |id: &DeviceId| {
            self.devices
                .get(id)
                .is_some_and(|d| d.is_late_update())
        };
        let mut sequence = SmallVec::with_capacity(self.order.len());
        sequence.extend(self.order.iter().copied().filter(|id| !is_late(id)));
        sequence.extend(self.order.iter().copied().filter(|id| is_late(id)));
        sequence
    }

    fn next_free_index(&self, device_type: DeviceType) -> u32 {
        let used: SmallVec<[u32; 8]> = self
            .devices
            .values()
            .filter(|d| d.device_type() == device_type)
            .map(|d| d.index())
            .collect();
        (0..).find(|i| !used.contains(i)).unwrap_or_default()
    }

    fn publish(&mut self) {
        let mut events = Vec::new();
        for id in &self.order {
            let Some(device) = self.devices.get(id) else {
                continue;
            };
            // The first pass only records a baseline.
            let state = device.state();
            match self.last_states.insert(*id, state) {
                Some(last) if last != state => {
                    log::info!("{} device {id} is now {state}", device.type_name());
                    events.push(DeviceEvent::StateChanged {
                        id: *id,
                        from: last,
                        to: state,
                    });
                }
                _ => {}
            }
        }

        if self.subscribers.is_empty() {
            return;
        }
        events.extend(self.changes.iter().copied().map(DeviceEvent::ButtonChanged));
        for event in &events {
            self.broadcast(event);
        }
    }

    fn broadcast(&mut self, event: &DeviceEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
