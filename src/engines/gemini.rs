//! Gemini speech engine.
//!
//! Sends the text as the prompt of a `generateContent` call whose
//! generation config requests an audio MIME type, then takes the first
//! returned part's inline blob as the MP3 clip.
//!
//! Gemini has no voice or style selection in this request format. The
//! engine therefore takes no voice parameter; callers that carry one (such
//! as the dispatcher) drop it before reaching this module.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{Credential, SynthesisConfig};
use crate::error::{ErrorKind, SynthesisError, TransportError};
use crate::transport::{HttpTransport, Transport};
use crate::{SynthesisEngine, SynthesisResult, AUDIO_MIME};

use super::decode_audio;

const ERROR_PREFIX: &str = "Gemini TTS Error:";
const NO_AUDIO: &str = "The model did not return audio. Check the prompt feedback.";

/// Parameters for a Gemini synthesis request.
#[derive(Debug, Clone, Default)]
pub struct GeminiInferenceParams {
    /// Model override. `None` uses the configured model.
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<Blob>,
}

#[derive(Debug, Deserialize)]
struct Blob {
    #[serde(default)]
    data: String,
}

impl GenerateContentResponse {
    /// Parts of the first candidate, the equivalent of `response.parts`.
    fn parts(&self) -> &[ResponsePart] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }
}

/// Gemini text-to-speech engine.
///
/// ```rust,no_run
/// use narration_rs::{SynthesisConfig, SynthesisEngine, engines::gemini::GeminiEngine};
///
/// let config = SynthesisConfig::from_env()?;
/// let engine = GeminiEngine::new(&config)?;
/// let clip = engine.synthesize("Hello, world!", None)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct GeminiEngine {
    transport: Arc<dyn Transport>,
    credential: Credential,
    endpoint: String,
    model: String,
}

impl GeminiEngine {
    /// Create an engine with its own HTTP client.
    pub fn new(config: &SynthesisConfig) -> Result<Self, SynthesisError> {
        let transport = HttpTransport::new(config).map_err(classify_fault)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create an engine that sends requests through `transport`.
    pub fn with_transport(config: &SynthesisConfig, transport: Arc<dyn Transport>) -> Self {
        log::info!("Gemini engine ready (model '{}')", config.gemini_model);
        Self {
            transport,
            credential: config.credential.clone(),
            endpoint: config.gemini_endpoint.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(
        &self,
        text: &str,
        model: &str,
    ) -> Result<GenerateContentResponse, TransportError> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, model);
        let body = serde_json::to_value(GenerateContentRequest {
            contents: vec![Content {
                parts: vec![TextPart { text }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: AUDIO_MIME,
            },
        })?;

        let response = self.transport.post_json(&url, &self.credential, &body)?;
        Ok(serde_json::from_value(response)?)
    }
}

impl SynthesisEngine for GeminiEngine {
    type SynthesisParams = GeminiInferenceParams;

    fn name(&self) -> &'static str {
        "Gemini TTS"
    }

    fn synthesize(
        &self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, SynthesisError> {
        let p = params.unwrap_or_default();
        let model = p.model.as_deref().unwrap_or(&self.model);
        log::debug!(
            "Gemini synthesis: model='{model}', {} chars",
            text.chars().count()
        );

        let response = self.request(text, model).map_err(classify_fault)?;
        extract_audio(&response)
    }
}

/// Take the audio blob from the first part, or explain why there is none.
fn extract_audio(response: &GenerateContentResponse) -> Result<SynthesisResult, SynthesisError> {
    if let Some(blob) = response.parts().first().and_then(|p| p.inline_data.as_ref()) {
        if !blob.data.is_empty() {
            let audio = decode_audio(&blob.data).map_err(classify_fault)?;
            if !audio.is_empty() {
                return Ok(SynthesisResult { audio });
            }
        }
    }

    let mut message = format!("{ERROR_PREFIX} {NO_AUDIO}");
    if let Some(feedback) = &response.prompt_feedback {
        message.push_str(&format!(" Safety Ratings: {feedback}"));
    }
    log::warn!("{message}");
    Err(SynthesisError::new(ErrorKind::NoAudioReturned, message))
}

/// Map a transport fault onto an error kind with guidance for the user.
fn classify_fault(fault: TransportError) -> SynthesisError {
    let detail = fault.to_string();
    let (kind, hint) = if detail.contains("API_KEY_INVALID") {
        (
            ErrorKind::InvalidCredential,
            Some("Please check if your GOOGLE_API_KEY is configured correctly."),
        )
    } else if detail.contains("PERMISSION_DENIED") || detail.to_lowercase().contains("access") {
        (
            ErrorKind::PermissionDenied,
            Some(
                "Your API key may not have permission for the selected model. \
                 Check your Google Cloud project.",
            ),
        )
    } else if detail.contains("response_mime_type") || detail.contains("responseMimeType") {
        (
            ErrorKind::UnsupportedOutputFormat,
            Some("The selected model may not support audio output. Try 'gemini-1.5-pro'."),
        )
    } else {
        (ErrorKind::TransportOrUnknown, None)
    };

    let message = match hint {
        Some(hint) => format!("{ERROR_PREFIX} {detail} {hint}"),
        None => format!("{ERROR_PREFIX} {detail}"),
    };
    log::warn!("Gemini synthesis failed ({kind})");
    SynthesisError::new(kind, message)
}
