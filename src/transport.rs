//! HTTP plumbing shared by the cloud engines.
//!
//! Each synthesis performs exactly one blocking JSON POST. The [`Transport`]
//! trait is the seam between an engine's request/response shapes and the
//! network, so engines can be driven by canned responses in tests.

use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::{Credential, SynthesisConfig};
use crate::error::TransportError;

/// Header carrying the API key on Google APIs.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Sends one JSON request and returns the decoded JSON response.
pub trait Transport: Send + Sync {
    fn post_json(
        &self,
        url: &str,
        credential: &Credential,
        body: &Value,
    ) -> Result<Value, TransportError>;
}

/// [`Transport`] backed by a blocking `reqwest` client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &SynthesisConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TransportError::Client)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(
        &self,
        url: &str,
        credential: &Credential,
        body: &Value,
    ) -> Result<Value, TransportError> {
        log::debug!("POST {url}");

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, credential.expose())
            .json(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text() {
                Ok(body) => body,
                Err(e) => {
                    log::debug!("Failed to read error body for HTTP {status}: {e}");
                    String::new()
                }
            };
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}
