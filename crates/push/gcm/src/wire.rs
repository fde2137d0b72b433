//! GCM wire format.

use serde::{Deserialize, Serialize};

/// Delivery options recognized by the gateway.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    /// Coalesces superseded notifications under one provider-side slot.
    pub collapse_key: Option<String>,
    /// The gateway drops the notification after this window if the device
    /// stays unreachable.
    pub time_to_live: Option<std::time::Duration>,
    /// Defer delivery while the device is dormant.
    pub delay_while_idle: Option<bool>,
}

/// Request envelope posted to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GcmRequest {
    pub registration_ids: Vec<String>,
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_live: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_while_idle: Option<bool>,
}

impl GcmRequest {
    /// Build the envelope for one chunk. Unset options are omitted from
    /// the JSON entirely.
    pub fn new(
        registration_ids: Vec<String>,
        data: serde_json::Value,
        options: &SendOptions,
    ) -> Self {
        Self {
            registration_ids,
            data,
            collapse_key: options.collapse_key.clone(),
            time_to_live: options.time_to_live.map(|ttl| ttl.as_secs()),
            delay_while_idle: options.delay_while_idle,
        }
    }
}

/// Per-recipient outcome. `results[i]` pairs with `registration_ids[i]` of
/// the originating request; the gateway guarantees the ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Canonical replacement registration id, present when the gateway
    /// rotated the token for this device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryResult {
    /// A delivered notification.
    pub fn success(message_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            registration_id: None,
            error: None,
        }
    }

    /// A delivered notification carrying a canonical replacement id.
    pub fn canonical(message_id: impl Into<String>, registration_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            registration_id: Some(registration_id.into()),
            error: None,
        }
    }

    /// A failed delivery.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            message_id: None,
            registration_id: None,
            error: Some(error.into()),
        }
    }
}

/// Gateway response for one chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcmResponse {
    pub results: Vec<DeliveryResult>,
}
