//! Gateway response reconciliation.

use push_core::Platform;
use push_storage::DeviceStore;

use crate::{DispatchError, GcmResponse};

/// Per-recipient errors after which the target is permanently unreachable.
fn is_permanent_failure(error: &str) -> bool {
    matches!(error, "NotRegistered" | "InvalidRegistration")
}

/// Pair each result with the registration id at the same index of the
/// originating request and apply the outcome to the device store.
///
/// A permanent failure deactivates the device; a delivery that carries a
/// canonical replacement id rewrites the device's registration id. Both
/// mutations are keyed on the old id and skipped when no record matches,
/// so reconciliation tolerates concurrent deletes and is idempotent. The
/// raw response is returned to the caller unchanged.
pub fn reconcile<S: DeviceStore>(
    store: &S,
    registration_ids: &[String],
    response: GcmResponse,
) -> Result<GcmResponse, DispatchError> {
    if response.results.len() != registration_ids.len() {
        return Err(DispatchError::Protocol(format!(
            "expected {} results, gateway returned {}",
            registration_ids.len(),
            response.results.len()
        )));
    }

    for (result, registration_id) in response.results.iter().zip(registration_ids) {
        if let Some(error) = result.error.as_deref() {
            if is_permanent_failure(error) {
                let matched = store
                    .deactivate(Platform::Gcm, registration_id)
                    .map_err(DispatchError::Store)?;

                if matched {
                    tracing::info!(
                        registration_id = %registration_id,
                        error = %error,
                        "device deactivated"
                    );
                } else {
                    tracing::debug!(
                        registration_id = %registration_id,
                        "deactivation skipped, no matching device"
                    );
                }
            }
            continue;
        }

        if result.message_id.is_some() {
            if let Some(canonical) = result.registration_id.as_deref() {
                let matched = store
                    .rewrite_registration_id(Platform::Gcm, registration_id, canonical)
                    .map_err(DispatchError::Store)?;

                if matched {
                    tracing::info!(
                        registration_id = %registration_id,
                        canonical = %canonical,
                        "registration id rewritten"
                    );
                } else {
                    tracing::debug!(
                        registration_id = %registration_id,
                        "rewrite skipped, no matching device"
                    );
                }
            }
        }
    }

    Ok(response)
}
