//! REST API handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use push_core::{Device, DeviceVariant, NewDevice, Platform, is_valid_apns_token};
use push_gcm::{ChunkResult, DispatchError, GcmResponse, PushService, SendOptions, Transport};
use push_storage::DeviceStore;

/// Device registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterDeviceRequest {
    pub name: Option<String>,
    pub device_id: Option<String>,
    pub registration_id: String,
    pub owner: Option<String>,
}

/// Device update payload. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateDeviceRequest {
    pub name: Option<String>,
    pub owner: Option<String>,
    pub active: Option<bool>,
}

/// Device record as served by the API.
#[derive(Debug, Serialize)]
pub struct DeviceResponse {
    pub platform: Platform,
    pub name: Option<String>,
    pub active: bool,
    pub owner: Option<String>,
    pub device_id: Option<String>,
    pub registration_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Device> for DeviceResponse {
    fn from(device: Device) -> Self {
        Self {
            platform: device.platform(),
            device_id: device.variant.device_id_text(),
            name: device.name,
            active: device.active,
            owner: device.owner,
            registration_id: device.registration_id,
            created_at: device.created_at,
            updated_at: device.updated_at,
        }
    }
}

/// Send payload for the push endpoints.
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub data: serde_json::Value,
    pub collapse_key: Option<String>,
    /// Seconds the gateway keeps the notification for an unreachable
    /// device.
    pub time_to_live: Option<u64>,
    pub delay_while_idle: Option<bool>,
}

impl SendRequest {
    fn options(&self) -> SendOptions {
        SendOptions {
            collapse_key: self.collapse_key.clone(),
            time_to_live: self.time_to_live.map(std::time::Duration::from_secs),
            delay_while_idle: self.delay_while_idle,
        }
    }
}

/// One chunk's outcome in a bulk send reply.
#[derive(Debug, Serialize)]
pub struct ChunkReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<GcmResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ChunkResult> for ChunkReply {
    fn from(result: ChunkResult) -> Self {
        match result {
            Ok(response) => Self {
                response: Some(response),
                error: None,
            },
            Err(err) => Self {
                response: None,
                error: Some(err.to_string()),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListDevicesParams {
    pub owner: String,
}

fn dispatch_error_status(err: &DispatchError) -> StatusCode {
    match err {
        DispatchError::Transport(_) | DispatchError::Protocol(_) => StatusCode::BAD_GATEWAY,
        DispatchError::Configuration(_) | DispatchError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn build_variant(
    platform: Platform,
    body: &RegisterDeviceRequest,
) -> Result<DeviceVariant, &'static str> {
    match platform {
        Platform::Gcm => Ok(DeviceVariant::Gcm {
            device_id: body.device_id.clone(),
        }),
        Platform::Apns => {
            if !is_valid_apns_token(&body.registration_id) {
                return Err("registration_id must be a 64 character hex token");
            }

            let device_id = match body.device_id.as_deref().map(uuid::Uuid::parse_str) {
                Some(Ok(id)) => Some(id),
                Some(Err(_)) => return Err("device_id must be a UUID"),
                None => None,
            };

            Ok(DeviceVariant::Apns { device_id })
        }
    }
}

/// Register a device, replacing any record with the same vendor id.
pub async fn register_device<S>(
    State(store): State<S>,
    Path(platform): Path<String>,
    Json(body): Json<RegisterDeviceRequest>,
) -> Response
where
    S: DeviceStore,
{
    let Some(platform) = Platform::parse(&platform) else {
        return (StatusCode::NOT_FOUND, "unknown platform").into_response();
    };

    let variant = match build_variant(platform, &body) {
        Ok(variant) => variant,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let new_device = NewDevice {
        name: body.name,
        owner: body.owner,
        registration_id: body.registration_id,
        variant,
    };

    match store.register(&new_device) {
        Ok(device) => (StatusCode::CREATED, Json(DeviceResponse::from(device))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to register device");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// List an owner's devices.
pub async fn list_devices<S>(
    State(store): State<S>,
    Path(platform): Path<String>,
    Query(params): Query<ListDevicesParams>,
) -> Response
where
    S: DeviceStore,
{
    let Some(platform) = Platform::parse(&platform) else {
        return (StatusCode::NOT_FOUND, "unknown platform").into_response();
    };

    match store.list_by_owner(platform, &params.owner) {
        Ok(devices) => {
            let devices: Vec<DeviceResponse> =
                devices.into_iter().map(DeviceResponse::from).collect();
            (StatusCode::OK, Json(devices)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to list devices");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Update a device's name, owner or active flag.
pub async fn update_device<S>(
    State(store): State<S>,
    Path((platform, registration_id)): Path<(String, String)>,
    Json(body): Json<UpdateDeviceRequest>,
) -> Response
where
    S: DeviceStore,
{
    let Some(platform) = Platform::parse(&platform) else {
        return (StatusCode::NOT_FOUND, "unknown platform").into_response();
    };

    let mut device = match store.find_by_registration_id(platform, &registration_id) {
        Ok(Some(device)) => device,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to look up device");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if let Some(name) = body.name {
        device.name = Some(name);
    }
    if let Some(owner) = body.owner {
        device.owner = Some(owner);
    }
    if let Some(active) = body.active {
        device.active = active;
    }

    match store.save(&device) {
        Ok(()) => (StatusCode::OK, Json(DeviceResponse::from(device))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to save device");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Delete a device record.
pub async fn delete_device<S>(
    State(store): State<S>,
    Path((platform, registration_id)): Path<(String, String)>,
) -> Response
where
    S: DeviceStore,
{
    let Some(platform) = Platform::parse(&platform) else {
        return (StatusCode::NOT_FOUND, "unknown platform").into_response();
    };

    match store.delete_by_registration_id(platform, &registration_id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to delete device");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Send a notification to one registration id.
pub async fn send_to_device<S, T>(
    State(service): State<PushService<S, T>>,
    Path(registration_id): Path<String>,
    Json(body): Json<SendRequest>,
) -> Response
where
    S: DeviceStore,
    T: Transport,
{
    match service
        .dispatcher()
        .send_to_one(&registration_id, &body.data, &body.options())
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, registration_id = %registration_id, "send failed");
            dispatch_error_status(&e).into_response()
        }
    }
}

/// Send a notification to every active device an owner has registered.
pub async fn send_to_owner<S, T>(
    State(service): State<PushService<S, T>>,
    Path(owner): Path<String>,
    Json(body): Json<SendRequest>,
) -> Response
where
    S: DeviceStore,
    T: Transport,
{
    match service
        .send_to_owner(&owner, &body.data, &body.options())
        .await
    {
        Ok(results) => {
            let replies: Vec<ChunkReply> = results.into_iter().map(ChunkReply::from).collect();
            (StatusCode::OK, Json(replies)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, owner = %owner, "bulk send failed");
            dispatch_error_status(&e).into_response()
        }
    }
}
