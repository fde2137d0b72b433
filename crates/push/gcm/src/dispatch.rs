//! Chunked dispatch through the gateway.

use push_storage::DeviceStore;

use crate::{
    DispatchError, GcmConfig, GcmRequest, GcmResponse, SendOptions, Transport, chunk_targets,
    reconcile,
};

/// Outcome of one chunk's send.
pub type ChunkResult = Result<GcmResponse, DispatchError>;

/// Builds request envelopes, drives the transport one chunk at a time and
/// reconciles each gateway response into the device store.
#[derive(Clone)]
pub struct GcmDispatcher<T, S> {
    config: GcmConfig,
    pub(crate) transport: T,
    pub(crate) store: S,
}

impl<T, S> GcmDispatcher<T, S>
where
    T: Transport,
    S: DeviceStore,
{
    /// Create a dispatcher from an explicit configuration.
    pub fn new(config: GcmConfig, transport: T, store: S) -> Self {
        Self {
            config,
            transport,
            store,
        }
    }

    pub fn config(&self) -> &GcmConfig {
        &self.config
    }

    /// Send to a single registration id.
    pub async fn send_to_one(
        &self,
        registration_id: &str,
        data: &serde_json::Value,
        options: &SendOptions,
    ) -> Result<GcmResponse, DispatchError> {
        let targets = [registration_id.to_string()];
        let mut results = self.send_to_many(&targets, data, options).await?;

        // One non-empty target list always produces exactly one chunk.
        match results.pop() {
            Some(result) => result,
            None => Err(DispatchError::Protocol(
                "gateway produced no result for a single-target send".into(),
            )),
        }
    }

    /// Send to many registration ids, one gateway call per chunk.
    ///
    /// The returned list holds one entry per chunk in input order; a failed
    /// chunk carries its own error and later chunks are still attempted.
    /// An empty target list is a no-op. A missing API key fails before any
    /// network activity.
    pub async fn send_to_many(
        &self,
        registration_ids: &[String],
        data: &serde_json::Value,
        options: &SendOptions,
    ) -> Result<Vec<ChunkResult>, DispatchError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| DispatchError::Configuration("GCM API key is not configured".into()))?;

        if registration_ids.is_empty() {
            return Ok(Vec::new());
        }

        let chunks = chunk_targets(registration_ids, self.config.max_recipients)?;

        let mut results = Vec::new();
        for chunk in chunks {
            results.push(self.send_chunk(chunk, data, options, api_key).await);
        }

        Ok(results)
    }

    async fn send_chunk(
        &self,
        registration_ids: &[String],
        data: &serde_json::Value,
        options: &SendOptions,
        api_key: &str,
    ) -> ChunkResult {
        let request = GcmRequest::new(registration_ids.to_vec(), data.clone(), options);

        tracing::debug!(targets = registration_ids.len(), "posting chunk to gateway");

        let response = self
            .transport
            .send(&self.config.post_url, api_key, &request)
            .await?;

        reconcile(&self.store, registration_ids, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DeliveryResult;
    use crate::test_support::{MemoryStore, RecordingTransport};

    fn dispatcher(
        config: GcmConfig,
        transport: RecordingTransport,
        store: MemoryStore,
    ) -> GcmDispatcher<RecordingTransport, MemoryStore> {
        GcmDispatcher::new(config, transport, store)
    }

    fn registration_ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("reg-{i}")).collect()
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_any_call() {
        let dispatcher = dispatcher(
            GcmConfig::default(),
            RecordingTransport::default(),
            MemoryStore::default(),
        );

        let err = dispatcher
            .send_to_many(&registration_ids(3), &serde_json::json!({}), &SendOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Configuration(_)));
        assert!(dispatcher.transport.sent_requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_target_list_is_a_noop() {
        let dispatcher = dispatcher(
            GcmConfig::new("key"),
            RecordingTransport::default(),
            MemoryStore::default(),
        );

        let results = dispatcher
            .send_to_many(&[], &serde_json::json!({}), &SendOptions::default())
            .await
            .unwrap();

        assert!(results.is_empty());
        assert!(dispatcher.transport.sent_requests().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_send_preserves_chunk_boundaries() {
        let targets = registration_ids(2500);
        let dispatcher = dispatcher(
            GcmConfig::new("key"),
            RecordingTransport::default(),
            MemoryStore::default(),
        );

        let results = dispatcher
            .send_to_many(&targets, &serde_json::json!({"message": "hi"}), &SendOptions::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 3);

        let sent = dispatcher.transport.sent_requests();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].request.registration_ids, targets[..1000]);
        assert_eq!(sent[1].request.registration_ids, targets[1000..2000]);
        assert_eq!(sent[2].request.registration_ids, targets[2000..]);

        for (result, expected_len) in results.iter().zip([1000, 1000, 500]) {
            assert_eq!(result.as_ref().unwrap().results.len(), expected_len);
        }
    }

    #[tokio::test]
    async fn test_chunk_error_never_merges_with_success() {
        let targets = registration_ids(3);
        let transport = RecordingTransport::with_script(vec![
            Ok(GcmResponse {
                results: vec![
                    DeliveryResult::success("1:1"),
                    DeliveryResult::success("1:2"),
                ],
            }),
            Err(DispatchError::Transport(Box::new(std::io::Error::other(
                "connection reset",
            )))),
        ]);

        let mut config = GcmConfig::new("key");
        config.max_recipients = 2;
        let dispatcher = dispatcher(config, transport, MemoryStore::default());

        let results = dispatcher
            .send_to_many(&targets, &serde_json::json!({}), &SendOptions::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(DispatchError::Transport(_))));

        // The failed chunk was still attempted after the first succeeded.
        assert_eq!(dispatcher.transport.sent_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_send_uses_configured_endpoint_and_key() {
        let mut config = GcmConfig::new("secret-key");
        config.post_url = "https://gateway.test/send".into();
        let dispatcher = dispatcher(config, RecordingTransport::default(), MemoryStore::default());

        dispatcher
            .send_to_one("reg-1", &serde_json::json!({}), &SendOptions::default())
            .await
            .unwrap();

        let sent = dispatcher.transport.sent_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url, "https://gateway.test/send");
        assert_eq!(sent[0].api_key, "secret-key");
    }

    #[tokio::test]
    async fn test_send_to_one_reconciles_canonical_id() {
        let store = MemoryStore::with_gcm_devices(&["reg-0"]);
        let transport = RecordingTransport::with_script(vec![Ok(GcmResponse {
            results: vec![DeliveryResult::canonical("1:1", "reg-0-canonical")],
        })]);
        let dispatcher = dispatcher(GcmConfig::new("key"), transport, store);

        let response = dispatcher
            .send_to_one("reg-0", &serde_json::json!({}), &SendOptions::default())
            .await
            .unwrap();

        assert_eq!(response.results.len(), 1);
        assert!(dispatcher.store.gcm_device("reg-0").is_none());
        assert!(dispatcher.store.gcm_device("reg-0-canonical").is_some());
    }
}
