//! In-memory doubles for dispatch and reconciliation tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use push_core::{Device, NewDevice, Platform};
use push_storage::DeviceStore;

use crate::{DeliveryResult, DispatchError, GcmRequest, GcmResponse, Transport};

/// Device store backed by a shared map keyed on platform and registration
/// id. Clones observe the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    devices: Arc<Mutex<HashMap<(Platform, String), Device>>>,
}

impl MemoryStore {
    pub fn with_gcm_devices(registration_ids: &[&str]) -> Self {
        let store = Self::default();
        for id in registration_ids {
            store.register(&NewDevice::gcm(*id)).unwrap();
        }
        store
    }

    pub fn gcm_device(&self, registration_id: &str) -> Option<Device> {
        self.devices
            .lock()
            .unwrap()
            .get(&(Platform::Gcm, registration_id.to_string()))
            .cloned()
    }
}

impl DeviceStore for MemoryStore {
    fn register(&self, device: &NewDevice) -> color_eyre::eyre::Result<Device> {
        let now = chrono::Utc::now();
        let device = Device {
            name: device.name.clone(),
            active: true,
            owner: device.owner.clone(),
            registration_id: device.registration_id.clone(),
            variant: device.variant.clone(),
            created_at: now,
            updated_at: now,
        };

        self.devices.lock().unwrap().insert(
            (device.platform(), device.registration_id.clone()),
            device.clone(),
        );

        Ok(device)
    }

    fn find_by_registration_id(
        &self,
        platform: Platform,
        registration_id: &str,
    ) -> color_eyre::eyre::Result<Option<Device>> {
        Ok(self
            .devices
            .lock()
            .unwrap()
            .get(&(platform, registration_id.to_string()))
            .cloned())
    }

    fn save(&self, device: &Device) -> color_eyre::eyre::Result<()> {
        self.devices.lock().unwrap().insert(
            (device.platform(), device.registration_id.clone()),
            device.clone(),
        );
        Ok(())
    }

    fn deactivate(
        &self,
        platform: Platform,
        registration_id: &str,
    ) -> color_eyre::eyre::Result<bool> {
        let mut devices = self.devices.lock().unwrap();
        match devices.get_mut(&(platform, registration_id.to_string())) {
            Some(device) => {
                device.active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn rewrite_registration_id(
        &self,
        platform: Platform,
        old: &str,
        new: &str,
    ) -> color_eyre::eyre::Result<bool> {
        let mut devices = self.devices.lock().unwrap();
        match devices.remove(&(platform, old.to_string())) {
            Some(mut device) => {
                device.registration_id = new.to_string();
                devices.insert((platform, new.to_string()), device);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn active_registration_ids(
        &self,
        platform: Platform,
        owner: &str,
    ) -> color_eyre::eyre::Result<Vec<String>> {
        let devices = self.devices.lock().unwrap();
        let mut ids: Vec<String> = devices
            .values()
            .filter(|d| {
                d.platform() == platform && d.active && d.owner.as_deref() == Some(owner)
            })
            .map(|d| d.registration_id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn list_by_owner(
        &self,
        platform: Platform,
        owner: &str,
    ) -> color_eyre::eyre::Result<Vec<Device>> {
        let devices = self.devices.lock().unwrap();
        Ok(devices
            .values()
            .filter(|d| d.platform() == platform && d.owner.as_deref() == Some(owner))
            .cloned()
            .collect())
    }

    fn delete_by_registration_id(
        &self,
        platform: Platform,
        registration_id: &str,
    ) -> color_eyre::eyre::Result<bool> {
        Ok(self
            .devices
            .lock()
            .unwrap()
            .remove(&(platform, registration_id.to_string()))
            .is_some())
    }
}

/// One transport call as seen by the double.
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub url: String,
    pub api_key: String,
    pub request: GcmRequest,
}

/// Transport double that records every envelope and replays scripted
/// outcomes. Once the script runs dry it answers each chunk with one
/// success per recipient.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<SentRequest>>,
    script: Mutex<VecDeque<Result<GcmResponse, DispatchError>>>,
}

impl RecordingTransport {
    pub fn with_script(outcomes: Vec<Result<GcmResponse, DispatchError>>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            script: Mutex::new(outcomes.into()),
        }
    }

    pub fn sent_requests(&self) -> Vec<SentRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    async fn send(
        &self,
        url: &str,
        api_key: &str,
        request: &GcmRequest,
    ) -> Result<GcmResponse, DispatchError> {
        self.sent.lock().unwrap().push(SentRequest {
            url: url.to_string(),
            api_key: api_key.to_string(),
            request: request.clone(),
        });

        match self.script.lock().unwrap().pop_front() {
            Some(outcome) => outcome,
            None => Ok(GcmResponse {
                results: (0..request.registration_ids.len())
                    .map(|i| DeliveryResult::success(format!("msg-{i}")))
                    .collect(),
            }),
        }
    }
}
