use std::fmt;
use std::path::Path;
use std::time::Duration;

use derive_builder::Builder;
use serde::Deserialize;

/// Environment variable holding the Google API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_CLOUD_TTS_ENDPOINT: &str = "https://texttospeech.googleapis.com/v1";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("GOOGLE_API_KEY is not set or empty")]
    MissingApiKey,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<SynthesisConfigBuilderError> for ConfigError {
    fn from(e: SynthesisConfigBuilderError) -> Self {
        Self::Invalid(e.to_string())
    }
}

/// An opaque API key. Never printed in full.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl From<&str> for Credential {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Credential {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

/// Process-wide settings, built once at startup and handed to each engine.
///
/// ```rust,no_run
/// use narration_rs::config::SynthesisConfigBuilder;
///
/// let config = SynthesisConfigBuilder::default()
///     .credential("my-api-key")
///     .gemini_model("gemini-1.5-flash")
///     .build()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SynthesisConfig {
    /// API key shared read-only by both engines.
    pub credential: Credential,
    /// Gemini model asked to emit audio.
    #[builder(default = "DEFAULT_GEMINI_MODEL.to_string()")]
    pub gemini_model: String,
    /// Base URL of the Generative Language API.
    #[builder(default = "DEFAULT_GEMINI_ENDPOINT.to_string()")]
    pub gemini_endpoint: String,
    /// Base URL of the Cloud Text-to-Speech API.
    #[builder(default = "DEFAULT_CLOUD_TTS_ENDPOINT.to_string()")]
    pub cloud_tts_endpoint: String,
    /// Request timeout. `None` keeps the HTTP client's default.
    #[builder(default, setter(strip_option))]
    pub timeout: Option<Duration>,
}

impl SynthesisConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.credential {
            Some(c) if c.is_empty() => Err("credential must not be empty".to_string()),
            _ => Ok(()),
        }
    }
}

/// On-disk form of [`SynthesisConfig`].
#[derive(Debug, Deserialize)]
struct ConfigFile {
    api_key: Option<Credential>,
    gemini_model: Option<String>,
    gemini_endpoint: Option<String>,
    cloud_tts_endpoint: Option<String>,
    timeout_secs: Option<u64>,
}

impl SynthesisConfig {
    /// Build a config with default endpoints from `GOOGLE_API_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let key = std::env::var(API_KEY_ENV).map_err(|_| ConfigError::MissingApiKey)?;
        Self::with_credential(key)
    }

    /// Build a config with default endpoints around an explicit key.
    pub fn with_credential(key: impl Into<Credential>) -> Result<Self, ConfigError> {
        let credential = key.into();
        if credential.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(SynthesisConfigBuilder::default()
            .credential(credential)
            .build()?)
    }

    /// Load a config from a JSON file.
    ///
    /// Every field is optional except the key, which falls back to
    /// `GOOGLE_API_KEY` when the file omits it.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(content)?;

        let credential = match file.api_key {
            Some(key) => key,
            None => {
                log::info!("No api_key in config file, falling back to {API_KEY_ENV}");
                let key = std::env::var(API_KEY_ENV).map_err(|_| ConfigError::MissingApiKey)?;
                Credential::new(key)
            }
        };
        if credential.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let mut builder = SynthesisConfigBuilder::default();
        builder.credential(credential);
        if let Some(model) = file.gemini_model {
            builder.gemini_model(model);
        }
        if let Some(endpoint) = file.gemini_endpoint {
            builder.gemini_endpoint(endpoint);
        }
        if let Some(endpoint) = file.cloud_tts_endpoint {
            builder.cloud_tts_endpoint(endpoint);
        }
        if let Some(secs) = file.timeout_secs {
            builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder.build()?)
    }
}
