//! Push Gateway HTTP Layer
//!
//! Axum handlers for device registration and send endpoints.

mod api;

pub use api::*;

use axum::Router;

use push_gcm::{PushService, Transport};
use push_storage::DeviceStore;

/// Create the device CRUD router.
pub fn device_router<S>(store: S) -> Router
where
    S: DeviceStore + Clone + 'static,
{
    use axum::routing::{get, patch};

    Router::new()
        .route(
            "/v1/devices/{platform}",
            get(api::list_devices::<S>).post(api::register_device::<S>),
        )
        .route(
            "/v1/devices/{platform}/{registration_id}",
            patch(api::update_device::<S>).delete(api::delete_device::<S>),
        )
        .with_state(store)
}

/// Create the send router.
pub fn push_router<S, T>(service: PushService<S, T>) -> Router
where
    S: DeviceStore + Clone + 'static,
    T: Transport + Clone + 'static,
{
    use axum::routing::post;

    Router::new()
        .route(
            "/v1/push/gcm/device/{registration_id}",
            post(api::send_to_device::<S, T>),
        )
        .route(
            "/v1/push/gcm/owner/{owner}",
            post(api::send_to_owner::<S, T>),
        )
        .with_state(service)
}
