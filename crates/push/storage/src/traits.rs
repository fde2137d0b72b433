//! Storage traits.

use push_core::{Device, NewDevice, Platform};

/// Device registry operations.
///
/// The registration id addresses a device during dispatch; reconciliation
/// mutations are keyed on it and must be idempotent.
pub trait DeviceStore: Send + Sync {
    /// Register a device, replacing any record that shares its vendor
    /// device id (and, for APNS, its registration id).
    fn register(&self, device: &NewDevice) -> color_eyre::eyre::Result<Device>;

    /// Look up a device by registration id.
    fn find_by_registration_id(
        &self,
        platform: Platform,
        registration_id: &str,
    ) -> color_eyre::eyre::Result<Option<Device>>;

    /// Persist name/owner/active changes for an existing device.
    fn save(&self, device: &Device) -> color_eyre::eyre::Result<()>;

    /// Mark a device inactive. Returns false when no record matched.
    fn deactivate(
        &self,
        platform: Platform,
        registration_id: &str,
    ) -> color_eyre::eyre::Result<bool>;

    /// Replace a registration id with its canonical successor, leaving all
    /// other fields untouched. Returns false when no record matched the
    /// old id.
    fn rewrite_registration_id(
        &self,
        platform: Platform,
        old: &str,
        new: &str,
    ) -> color_eyre::eyre::Result<bool>;

    /// Registration ids of an owner's active devices.
    fn active_registration_ids(
        &self,
        platform: Platform,
        owner: &str,
    ) -> color_eyre::eyre::Result<Vec<String>>;

    /// All devices registered to an owner.
    fn list_by_owner(
        &self,
        platform: Platform,
        owner: &str,
    ) -> color_eyre::eyre::Result<Vec<Device>>;

    /// Delete a device. Returns false when no record matched.
    fn delete_by_registration_id(
        &self,
        platform: Platform,
        registration_id: &str,
    ) -> color_eyre::eyre::Result<bool>;
}
