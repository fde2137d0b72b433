//! Gateway transport.

use crate::{DispatchError, GcmRequest, GcmResponse};

/// Performs the HTTP call to the gateway.
#[trait_variant::make(Send)]
pub trait Transport: Send + Sync {
    /// Post one request envelope and return the parsed response.
    async fn send(
        &self,
        url: &str,
        api_key: &str,
        request: &GcmRequest,
    ) -> Result<GcmResponse, DispatchError>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a bounded request timeout. Timeouts surface
    /// as transport errors like any other network failure.
    pub fn new() -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        url: &str,
        api_key: &str,
        request: &GcmRequest,
    ) -> Result<GcmResponse, DispatchError> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, format!("key={api_key}"))
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;

        serde_json::from_str(&body)
            .map_err(|e| DispatchError::Protocol(format!("malformed gateway response: {e}")))
    }
}
