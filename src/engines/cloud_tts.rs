//! Google Cloud Text-to-Speech engine.
//!
//! Calls `text:synthesize` with an explicit voice, speaking rate and pitch
//! and always asks for MP3. Unlike the Gemini engine, failures are not
//! classified: every fault is reported as
//! [`ErrorKind::TransportOrUnknown`] with the raw fault text.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{Credential, SynthesisConfig};
use crate::error::{ErrorKind, SynthesisError, TransportError};
use crate::transport::{HttpTransport, Transport};
use crate::{SynthesisEngine, SynthesisResult};

use super::decode_audio;

pub const MIN_SPEAKING_RATE: f32 = 0.25;
pub const MAX_SPEAKING_RATE: f32 = 4.0;
pub const MIN_PITCH: f32 = -20.0;
pub const MAX_PITCH: f32 = 20.0;

/// Derive the language code from a voice name.
///
/// Cloud voice names start with their BCP-47 code, so the first two
/// hyphen-separated segments are the language: `"en-US-Wavenet-D"` gives
/// `"en-US"`.
pub fn language_code(voice: &str) -> String {
    voice.split('-').take(2).collect::<Vec<_>>().join("-")
}

/// Parameters for a Cloud TTS synthesis request.
#[derive(Debug, Clone)]
pub struct CloudTtsInferenceParams {
    /// Voice name (e.g. `"en-US-Wavenet-D"`, `"hi-IN-Wavenet-A"`).
    pub voice: String,
    /// Speaking rate. Range: 0.25–4.0, default 1.0.
    pub speaking_rate: f32,
    /// Pitch in semitones. Range: -20.0–20.0, default 0.0.
    pub pitch: f32,
}

impl Default for CloudTtsInferenceParams {
    fn default() -> Self {
        Self {
            voice: "en-US-Wavenet-D".to_string(),
            speaking_rate: 1.0,
            pitch: 0.0,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeSpeechRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelectionParams<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelectionParams<'a> {
    language_code: String,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
    speaking_rate: f32,
    pitch: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeSpeechResponse {
    #[serde(default)]
    audio_content: String,
}

/// Google Cloud text-to-speech engine.
///
/// ```rust,no_run
/// use narration_rs::{SynthesisConfig, SynthesisEngine};
/// use narration_rs::engines::cloud_tts::{CloudTtsEngine, CloudTtsInferenceParams};
///
/// let config = SynthesisConfig::from_env()?;
/// let engine = CloudTtsEngine::new(&config)?;
///
/// let params = CloudTtsInferenceParams {
///     voice: "hi-IN-Wavenet-A".to_string(),
///     speaking_rate: 0.9,
///     ..Default::default()
/// };
/// engine.synthesize_to_file("नमस्ते", std::path::Path::new("out.mp3"), Some(params))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct CloudTtsEngine {
    transport: Arc<dyn Transport>,
    credential: Credential,
    endpoint: String,
}

impl CloudTtsEngine {
    /// Create an engine with its own HTTP client.
    pub fn new(config: &SynthesisConfig) -> Result<Self, SynthesisError> {
        let transport = HttpTransport::new(config).map_err(raw_fault)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create an engine that sends requests through `transport`.
    pub fn with_transport(config: &SynthesisConfig, transport: Arc<dyn Transport>) -> Self {
        log::info!("Cloud TTS engine ready ({})", config.cloud_tts_endpoint);
        Self {
            transport,
            credential: config.credential.clone(),
            endpoint: config.cloud_tts_endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn request(
        &self,
        text: &str,
        params: &CloudTtsInferenceParams,
    ) -> Result<Vec<u8>, TransportError> {
        let url = format!("{}/text:synthesize", self.endpoint);
        let body = serde_json::to_value(SynthesizeSpeechRequest {
            input: SynthesisInput { text },
            voice: VoiceSelectionParams {
                language_code: language_code(&params.voice),
                name: &params.voice,
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
                speaking_rate: params.speaking_rate,
                pitch: params.pitch,
            },
        })?;

        let response = self.transport.post_json(&url, &self.credential, &body)?;
        let response: SynthesizeSpeechResponse = serde_json::from_value(response)?;
        decode_audio(&response.audio_content)
    }
}

impl SynthesisEngine for CloudTtsEngine {
    type SynthesisParams = CloudTtsInferenceParams;

    fn name(&self) -> &'static str {
        "Google Cloud TTS"
    }

    fn synthesize(
        &self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, SynthesisError> {
        let p = params.unwrap_or_default();
        log::debug!(
            "Cloud TTS synthesis: voice='{}', rate={}, pitch={}",
            p.voice,
            p.speaking_rate,
            p.pitch
        );

        let audio = self.request(text, &p).map_err(raw_fault)?;
        if audio.is_empty() {
            log::warn!("Cloud TTS returned an empty audio payload");
            return Err(SynthesisError::new(
                ErrorKind::TransportOrUnknown,
                "empty audio content",
            ));
        }
        Ok(SynthesisResult { audio })
    }
}

fn raw_fault(fault: TransportError) -> SynthesisError {
    log::warn!("Cloud TTS synthesis failed: {fault}");
    SynthesisError::new(ErrorKind::TransportOrUnknown, fault.to_string())
}
