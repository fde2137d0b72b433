//! Registry-level send operations.

use push_core::Platform;
use push_storage::DeviceStore;

use crate::{ChunkResult, DispatchError, GcmDispatcher, SendOptions, Transport};

/// Sends to every active device an owner has registered.
///
/// Inactive devices are filtered here, at the registry boundary; the
/// dispatcher trusts the target list it is given.
#[derive(Clone)]
pub struct PushService<S, T> {
    store: S,
    dispatcher: GcmDispatcher<T, S>,
}

impl<S, T> PushService<S, T>
where
    S: DeviceStore,
    T: Transport,
{
    pub fn new(store: S, dispatcher: GcmDispatcher<T, S>) -> Self {
        Self { store, dispatcher }
    }

    pub fn dispatcher(&self) -> &GcmDispatcher<T, S> {
        &self.dispatcher
    }

    /// Send to an owner's active GCM devices.
    pub async fn send_to_owner(
        &self,
        owner: &str,
        data: &serde_json::Value,
        options: &SendOptions,
    ) -> Result<Vec<ChunkResult>, DispatchError> {
        let targets = self
            .store
            .active_registration_ids(Platform::Gcm, owner)
            .map_err(DispatchError::Store)?;

        tracing::info!(owner = %owner, targets = targets.len(), "dispatching to owner devices");

        self.dispatcher.send_to_many(&targets, data, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GcmConfig;
    use crate::test_support::{MemoryStore, RecordingTransport};
    use push_core::NewDevice;

    fn service(store: MemoryStore) -> PushService<MemoryStore, RecordingTransport> {
        let dispatcher = GcmDispatcher::new(
            GcmConfig::new("key"),
            RecordingTransport::default(),
            store.clone(),
        );
        PushService::new(store, dispatcher)
    }

    #[tokio::test]
    async fn test_send_to_owner_skips_inactive_devices() {
        let store = MemoryStore::default();
        store
            .register(&NewDevice::gcm("reg-1").with_owner("alice"))
            .unwrap();
        store
            .register(&NewDevice::gcm("reg-2").with_owner("alice"))
            .unwrap();
        store
            .register(&NewDevice::gcm("reg-3").with_owner("bob"))
            .unwrap();
        store
            .deactivate(push_core::Platform::Gcm, "reg-2")
            .unwrap();

        let service = service(store);
        let results = service
            .send_to_owner("alice", &serde_json::json!({}), &SendOptions::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        let sent = service.dispatcher().transport.sent_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].request.registration_ids, vec!["reg-1".to_string()]);
    }

    #[tokio::test]
    async fn test_send_to_owner_without_devices_is_a_noop() {
        let service = service(MemoryStore::default());

        let results = service
            .send_to_owner("nobody", &serde_json::json!({}), &SendOptions::default())
            .await
            .unwrap();

        assert!(results.is_empty());
        assert!(service.dispatcher().transport.sent_requests().is_empty());
    }
}
