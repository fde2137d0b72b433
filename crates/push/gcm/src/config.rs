//! Gateway configuration.

use color_eyre::eyre::WrapErr as _;

/// Default GCM endpoint.
pub const DEFAULT_POST_URL: &str = "https://android.googleapis.com/gcm/send";

/// Default per-request recipient ceiling imposed by the gateway.
pub const DEFAULT_MAX_RECIPIENTS: usize = 1000;

/// GCM gateway configuration.
///
/// Constructed explicitly and handed to the dispatcher, so engines with
/// different credentials (production, test doubles) can coexist in one
/// process.
#[derive(Debug, Clone)]
pub struct GcmConfig {
    /// API key for the `Authorization` header. Sends fail with a
    /// configuration error while this is unset.
    pub api_key: Option<String>,
    /// Gateway endpoint.
    pub post_url: String,
    /// Per-request recipient ceiling.
    pub max_recipients: usize,
}

impl GcmConfig {
    /// Create a configuration with the given API key and defaults for the
    /// rest.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Read configuration from `GCM_API_KEY`, `GCM_POST_URL` and
    /// `GCM_MAX_RECIPIENTS`.
    pub fn from_env() -> color_eyre::eyre::Result<Self> {
        let api_key = std::env::var("GCM_API_KEY").ok();

        let post_url =
            std::env::var("GCM_POST_URL").unwrap_or_else(|_| DEFAULT_POST_URL.to_string());

        let max_recipients = match std::env::var("GCM_MAX_RECIPIENTS") {
            Ok(value) => value
                .parse::<usize>()
                .wrap_err("GCM_MAX_RECIPIENTS must be an integer")?,
            Err(_) => DEFAULT_MAX_RECIPIENTS,
        };

        if max_recipients == 0 {
            color_eyre::eyre::bail!("GCM_MAX_RECIPIENTS must be positive");
        }

        Ok(Self {
            api_key,
            post_url,
            max_recipients,
        })
    }
}

impl Default for GcmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            post_url: DEFAULT_POST_URL.to_string(),
            max_recipients: DEFAULT_MAX_RECIPIENTS,
        }
    }
}
