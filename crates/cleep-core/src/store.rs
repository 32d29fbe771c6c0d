// ── Device store ──
//
// Concurrent device container with push-based change notification. Owned by
// whoever builds it and handed to the components that need it; there is no
// process-wide device list.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::command::{CommandSender, ParametersCommand};
use crate::error::CoreError;
use crate::model::{Device, ModuleEvent, ParametersEvent, TimeNow};

/// Devices keyed by uuid.
///
/// Every mutation bumps a version counter and rebuilds the snapshot that
/// subscribers receive. Devices are replaced, never modified in place.
pub struct DeviceStore {
    by_uuid: DashMap<String, Arc<Device>>,
    version: watch::Sender<u64>,
    snapshot: watch::Sender<Arc<Vec<Arc<Device>>>>,
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_uuid: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert or replace a device. Returns `true` if the uuid was new.
    pub fn upsert(&self, device: Device) -> bool {
        let is_new = self
            .by_uuid
            .insert(device.uuid.clone(), Arc::new(device))
            .is_none();
        self.changed();
        is_new
    }

    pub fn remove(&self, uuid: &str) -> Option<Arc<Device>> {
        let removed = self.by_uuid.remove(uuid).map(|(_, d)| d);
        if removed.is_some() {
            self.changed();
        }
        removed
    }

    pub fn get(&self, uuid: &str) -> Option<Arc<Device>> {
        self.by_uuid.get(uuid).map(|r| Arc::clone(r.value()))
    }

    /// All devices, ordered by uuid.
    pub fn snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<Device>>>> {
        self.snapshot.subscribe()
    }

    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn len(&self) -> usize {
        self.by_uuid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_uuid.is_empty()
    }

    // ── Time-now merge ───────────────────────────────────────────────

    /// Copy the displayed time fields onto the device `device_id`.
    ///
    /// `now` is fully decoded, so the device gets all five fields or none.
    /// Returns `false` when no device has that uuid.
    pub fn apply_time_now(&self, device_id: &str, now: &TimeNow) -> bool {
        {
            let Some(mut entry) = self.by_uuid.get_mut(device_id) else {
                trace!(device_id, "time event for unknown device");
                return false;
            };
            let mut updated = Device::clone(entry.value());
            updated.apply_time(now);
            *entry.value_mut() = Arc::new(updated);
        }
        self.changed();
        true
    }

    /// Apply an inbound event. Returns whether a device changed; malformed
    /// params of a known event are an error and change nothing.
    pub fn apply_event(&self, event: &ModuleEvent) -> Result<bool, CoreError> {
        match ParametersEvent::decode(event)? {
            Some(ParametersEvent::TimeNow {
                device_id: Some(device_id),
                now,
            }) => Ok(self.apply_time_now(&device_id, &now)),
            _ => Ok(false),
        }
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Load the `{uuid: device}` map returned by `get_module_devices`.
    pub fn load_module_devices(
        &self,
        module: &str,
        data: serde_json::Value,
    ) -> Result<usize, CoreError> {
        let devices: HashMap<String, Device> =
            serde_json::from_value(data).map_err(|e| CoreError::Api {
                message: format!("invalid device list from module '{module}': {e}"),
                status: None,
            })?;

        let count = devices.len();
        for (uuid, mut device) in devices {
            device.uuid = uuid;
            device.module.get_or_insert_with(|| module.to_owned());
            self.by_uuid.insert(device.uuid.clone(), Arc::new(device));
        }
        self.changed();
        debug!(module, count, "module devices loaded");
        Ok(count)
    }

    /// Fetch a module's devices and load them.
    pub async fn fetch_module_devices<S: CommandSender>(
        &self,
        sender: &S,
        module: &str,
    ) -> Result<usize, CoreError> {
        let data = sender
            .send(ParametersCommand::GetModuleDevices.as_ref(), module, None, None)
            .await?;
        self.load_module_devices(module, data)
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn changed(&self) {
        let mut values: Vec<Arc<Device>> =
            self.by_uuid.iter().map(|r| Arc::clone(r.value())).collect();
        values.sort_by(|a, b| a.uuid.cmp(&b.uuid));
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
        self.version.send_modify(|v| *v += 1);
    }
}
