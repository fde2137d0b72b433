//! Device records and platform variants.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Push provider platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Gcm,
    Apns,
}

impl Platform {
    /// Stable identifier used in storage and URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Gcm => "gcm",
            Platform::Apns => "apns",
        }
    }

    /// Parse a platform identifier.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gcm" => Some(Platform::Gcm),
            "apns" => Some(Platform::Apns),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant-specific device identity.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DeviceVariant {
    /// Android device. The vendor hardware id is neither unique nor
    /// reliable and only serves last-write-wins replacement on
    /// re-registration.
    Gcm { device_id: Option<String> },
    /// Apple device, identified by the installation UUID.
    Apns { device_id: Option<Uuid> },
}

impl DeviceVariant {
    pub fn platform(&self) -> Platform {
        match self {
            DeviceVariant::Gcm { .. } => Platform::Gcm,
            DeviceVariant::Apns { .. } => Platform::Apns,
        }
    }

    /// Vendor device id in its stored text form.
    pub fn device_id_text(&self) -> Option<String> {
        match self {
            DeviceVariant::Gcm { device_id } => device_id.clone(),
            DeviceVariant::Apns { device_id } => device_id.map(|id| id.to_string()),
        }
    }
}

/// A registered device record.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Device {
    pub name: Option<String>,
    /// Inactive devices are never targeted by registry-level sends.
    pub active: bool,
    /// Opaque reference to an external user entity.
    pub owner: Option<String>,
    /// Provider-issued send target. Rewritten only when the provider
    /// reports a canonical replacement.
    pub registration_id: String,
    pub variant: DeviceVariant,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Device {
    pub fn platform(&self) -> Platform {
        self.variant.platform()
    }
}

/// A device registration prior to insertion.
#[derive(Debug, Clone)]
pub struct NewDevice {
    pub name: Option<String>,
    pub owner: Option<String>,
    pub registration_id: String,
    pub variant: DeviceVariant,
}

impl NewDevice {
    /// Register an Android device.
    pub fn gcm(registration_id: impl Into<String>) -> Self {
        Self {
            name: None,
            owner: None,
            registration_id: registration_id.into(),
            variant: DeviceVariant::Gcm { device_id: None },
        }
    }

    /// Register an Apple device.
    pub fn apns(registration_id: impl Into<String>) -> Self {
        Self {
            name: None,
            owner: None,
            registration_id: registration_id.into(),
            variant: DeviceVariant::Apns { device_id: None },
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the owning user.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// APNS registration ids are 64 hex characters.
pub fn is_valid_apns_token(token: &str) -> bool {
    token.len() == 64 && token.bytes().all(|b| b.is_ascii_hexdigit())
}
