//! Routes a synthesis request to the chosen engine.
//!
//! [`Dispatcher::dispatch`] never fails: every error, including a request
//! that is rejected before any network call, comes back as
//! [`SynthesisOutcome::Failure`].

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use derive_builder::Builder;

use crate::catalog::Language;
use crate::config::SynthesisConfig;
use crate::engines::cloud_tts::{
    CloudTtsEngine, CloudTtsInferenceParams, MAX_PITCH, MAX_SPEAKING_RATE, MIN_PITCH,
    MIN_SPEAKING_RATE,
};
use crate::engines::gemini::GeminiEngine;
use crate::error::{ErrorKind, SynthesisError};
use crate::transport::{HttpTransport, Transport};
use crate::{SynthesisEngine, SynthesisOutcome};

/// Voice value meaning "no explicit voice".
pub const DEFAULT_VOICE: &str = "default";

/// Which backend handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineId {
    /// Gemini model asked for audio output.
    Gemini,
    /// Dedicated Cloud Text-to-Speech.
    CloudTts,
}

impl EngineId {
    pub const ALL: [EngineId; 2] = [EngineId::Gemini, EngineId::CloudTts];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini TTS",
            Self::CloudTts => "Google Cloud TTS",
        }
    }

    fn short_name(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::CloudTts => "cloud-tts",
        }
    }

    /// File name offered for download, e.g. `tts_output_gemini_tts.mp3`.
    pub fn output_file_name(&self) -> String {
        format!(
            "tts_output_{}.mp3",
            self.display_name().to_lowercase().replace(' ', "_")
        )
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for EngineId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| {
                e.display_name().eq_ignore_ascii_case(s) || e.short_name().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| format!("unknown engine '{s}' (expected 'gemini' or 'cloud-tts')"))
    }
}

/// One user submission.
///
/// ```rust
/// use narration_rs::{EngineId, SynthesisRequestBuilder};
///
/// let request = SynthesisRequestBuilder::default()
///     .text("Hello")
///     .engine(EngineId::CloudTts)
///     .voice("hi-IN-Wavenet-A")
///     .speed(1.25)
///     .build()
///     .unwrap();
/// assert_eq!(request.pitch, 0.0);
///
/// assert!(SynthesisRequestBuilder::default()
///     .text("")
///     .engine(EngineId::Gemini)
///     .build()
///     .is_err());
///
/// // Speed and pitch only bind the Cloud TTS engine.
/// assert!(SynthesisRequestBuilder::default()
///     .text("Hello")
///     .engine(EngineId::Gemini)
///     .speed(0.0)
///     .build()
///     .is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SynthesisRequest {
    #[builder(setter(into))]
    pub text: String,
    pub engine: EngineId,
    /// Language code. Picks the default voice when none is given.
    #[builder(setter(into), default = "Language::English.code().to_string()")]
    pub language: String,
    /// Voice name. Ignored by the Gemini engine.
    #[builder(setter(into), default = "DEFAULT_VOICE.to_string()")]
    pub voice: String,
    /// Speaking rate, 0.25–4.0 for Cloud TTS. Ignored by the Gemini engine.
    #[builder(default = "1.0")]
    pub speed: f32,
    /// Pitch in semitones, -20.0–20.0 for Cloud TTS. Ignored by the Gemini engine.
    #[builder(default = "0.0")]
    pub pitch: f32,
}

impl SynthesisRequestBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(text) = &self.text {
            check_text(text)?;
        }
        if self.engine == Some(EngineId::CloudTts) {
            if let Some(speed) = self.speed {
                check_speed(speed)?;
            }
            if let Some(pitch) = self.pitch {
                check_pitch(pitch)?;
            }
        }
        Ok(())
    }
}

fn check_text(text: &str) -> Result<(), String> {
    if text.is_empty() {
        return Err("Please enter some text to convert.".to_string());
    }
    Ok(())
}

fn check_speed(speed: f32) -> Result<(), String> {
    if !(MIN_SPEAKING_RATE..=MAX_SPEAKING_RATE).contains(&speed) {
        return Err(format!(
            "speed {speed} is outside {MIN_SPEAKING_RATE}..={MAX_SPEAKING_RATE}"
        ));
    }
    Ok(())
}

fn check_pitch(pitch: f32) -> Result<(), String> {
    if !(MIN_PITCH..=MAX_PITCH).contains(&pitch) {
        return Err(format!("pitch {pitch} is outside {MIN_PITCH}..={MAX_PITCH}"));
    }
    Ok(())
}

impl SynthesisRequest {
    /// Reject requests that must not reach the network. Same rules as the builder:
    /// the text must be non-empty, and speed and pitch are range-checked for
    /// Cloud TTS only.
    pub fn check(&self) -> Result<(), SynthesisError> {
        check_text(&self.text)
            .and_then(|()| match self.engine {
                EngineId::Gemini => Ok(()),
                EngineId::CloudTts => {
                    check_speed(self.speed).and_then(|()| check_pitch(self.pitch))
                }
            })
            .map_err(|message| SynthesisError::new(ErrorKind::InvalidRequest, message))
    }

    /// The voice sent to Cloud TTS: the explicit one, or the language's default.
    fn cloud_voice(&self) -> String {
        if !self.voice.is_empty() && self.voice != DEFAULT_VOICE {
            return self.voice.clone();
        }
        Language::from_code(&self.language)
            .unwrap_or(Language::English)
            .default_voice()
            .to_string()
    }
}

/// Selects an engine per request and folds its result into a [`SynthesisOutcome`].
pub struct Dispatcher {
    gemini: GeminiEngine,
    cloud_tts: CloudTtsEngine,
}

impl Dispatcher {
    /// Create both engines over one shared HTTP client.
    pub fn new(config: &SynthesisConfig) -> Result<Self, SynthesisError> {
        let transport = HttpTransport::new(config).map_err(|e| {
            SynthesisError::new(ErrorKind::TransportOrUnknown, e.to_string())
        })?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: &SynthesisConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            gemini: GeminiEngine::with_transport(config, transport.clone()),
            cloud_tts: CloudTtsEngine::with_transport(config, transport),
        }
    }

    /// Run one request on the engine it names.
    pub fn dispatch(&self, request: &SynthesisRequest) -> SynthesisOutcome {
        log::info!(
            "Dispatching to {} (language '{}')",
            request.engine,
            request.language
        );

        let result = request.check().and_then(|()| match request.engine {
            EngineId::Gemini => {
                if request.voice != DEFAULT_VOICE {
                    log::debug!(
                        "Voice '{}' is ignored by {}",
                        request.voice,
                        self.gemini.name()
                    );
                }
                self.gemini.synthesize(&request.text, None)
            }
            EngineId::CloudTts => {
                let params = CloudTtsInferenceParams {
                    voice: request.cloud_voice(),
                    speaking_rate: request.speed,
                    pitch: request.pitch,
                };
                self.cloud_tts.synthesize(&request.text, Some(params))
            }
        });

        if let Err(e) = &result {
            log::warn!("{} request failed ({})", request.engine, e.kind());
        }
        SynthesisOutcome::from(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::{MockReply, MockTransport};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde_json::json;

    fn dispatcher(mock: &Arc<MockTransport>) -> Dispatcher {
        let config = SynthesisConfig::with_credential("test-key").unwrap();
        Dispatcher::with_transport(&config, mock.clone())
    }

    fn request(engine: EngineId) -> SynthesisRequestBuilder {
        let mut builder = SynthesisRequestBuilder::default();
        builder.text("Namaste").engine(engine);
        builder
    }

    fn gemini_audio(bytes: &[u8]) -> MockReply {
        MockReply::Json(json!({
            "candidates": [{
                "content": { "parts": [{ "inlineData": { "data": STANDARD.encode(bytes) } }] }
            }]
        }))
    }

    fn cloud_audio(bytes: &[u8]) -> MockReply {
        MockReply::Json(json!({ "audioContent": STANDARD.encode(bytes) }))
    }

    #[test]
    fn routes_gemini_requests() {
        let mock = Arc::new(MockTransport::replying(gemini_audio(b"gemini-mp3")));
        let outcome = dispatcher(&mock).dispatch(&request(EngineId::Gemini).build().unwrap());

        assert_eq!(outcome.audio(), Some(&b"gemini-mp3"[..]));
        assert!(mock.requests()[0].url.ends_with(":generateContent"));
    }

    #[test]
    fn routes_cloud_requests_with_voice_rate_and_pitch() {
        let mock = Arc::new(MockTransport::replying(cloud_audio(b"cloud-mp3")));
        let req = request(EngineId::CloudTts)
            .voice("te-IN-Wavenet-A")
            .speed(4.0)
            .pitch(-20.0)
            .build()
            .unwrap();
        let outcome = dispatcher(&mock).dispatch(&req);

        assert_eq!(outcome.audio(), Some(&b"cloud-mp3"[..]));
        let body = mock.last_body();
        assert_eq!(body["voice"]["name"], "te-IN-Wavenet-A");
        assert_eq!(body["voice"]["languageCode"], "te-IN");
        assert_eq!(body["audioConfig"]["speakingRate"].as_f64(), Some(4.0));
        assert_eq!(body["audioConfig"]["pitch"].as_f64(), Some(-20.0));
    }

    #[test]
    fn gemini_ignores_voice_speed_and_pitch() {
        let mock = Arc::new(MockTransport::replying(gemini_audio(b"x")));
        let req = request(EngineId::Gemini)
            .voice("en-US-Wavenet-F")
            .speed(2.0)
            .pitch(5.0)
            .build()
            .unwrap();
        dispatcher(&mock).dispatch(&req);

        assert_eq!(
            mock.last_body(),
            json!({
                "contents": [{ "parts": [{ "text": "Namaste" }] }],
                "generationConfig": { "responseMimeType": "audio/mpeg" }
            })
        );
    }

    #[test]
    fn default_voice_follows_language() {
        let mock = Arc::new(MockTransport::replying(cloud_audio(b"x")));
        let req = request(EngineId::CloudTts).language("hi-IN").build().unwrap();
        dispatcher(&mock).dispatch(&req);

        assert_eq!(mock.last_body()["voice"]["name"], "hi-IN-Wavenet-A");
    }

    #[test]
    fn faults_become_failures_for_both_engines() {
        for engine in EngineId::ALL {
            let mock = Arc::new(MockTransport::replying(MockReply::Status(
                500,
                "boom".to_string(),
            )));
            let outcome = dispatcher(&mock).dispatch(&request(engine).build().unwrap());

            assert!(outcome.audio().is_none());
            assert_eq!(outcome.kind(), Some(ErrorKind::TransportOrUnknown));
            assert!(outcome.error().unwrap().contains("boom"));
        }
    }

    #[test]
    fn exactly_one_of_audio_or_error() {
        let cases = [
            (EngineId::Gemini, gemini_audio(b"a"), true),
            (EngineId::Gemini, MockReply::Json(json!({})), false),
            (
                EngineId::Gemini,
                MockReply::Status(400, "API_KEY_INVALID".to_string()),
                false,
            ),
            (EngineId::CloudTts, cloud_audio(b"b"), true),
            (EngineId::CloudTts, MockReply::Json(json!({ "audioContent": "" })), false),
            (EngineId::CloudTts, MockReply::Json(json!({})), false),
            (
                EngineId::CloudTts,
                MockReply::Status(403, "PERMISSION_DENIED".to_string()),
                false,
            ),
        ];
        for (engine, reply, expect_audio) in cases {
            let mock = Arc::new(MockTransport::replying(reply));
            let req = request(engine).build().unwrap();
            let outcome = dispatcher(&mock).dispatch(&req);

            assert!(outcome.audio().is_some() != outcome.error().is_some());
            assert_eq!(outcome.is_audio(), expect_audio, "{engine}");
        }
    }

    #[test]
    fn empty_text_fails_without_network_call() {
        let mock = Arc::new(MockTransport::default());
        let req = SynthesisRequest {
            text: String::new(),
            engine: EngineId::CloudTts,
            language: "en-US".to_string(),
            voice: DEFAULT_VOICE.to_string(),
            speed: 1.0,
            pitch: 0.0,
        };
        let outcome = dispatcher(&mock).dispatch(&req);

        assert_eq!(outcome.kind(), Some(ErrorKind::InvalidRequest));
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn whitespace_text_is_passed_through() {
        for engine in EngineId::ALL {
            let reply = match engine {
                EngineId::Gemini => gemini_audio(b"spoken"),
                EngineId::CloudTts => cloud_audio(b"spoken"),
            };
            let mock = Arc::new(MockTransport::replying(reply));
            let req = SynthesisRequestBuilder::default()
                .text(" ")
                .engine(engine)
                .build()
                .unwrap();
            let outcome = dispatcher(&mock).dispatch(&req);

            assert_eq!(mock.requests().len(), 1);
            let body = mock.last_body();
            let sent = match engine {
                EngineId::Gemini => &body["contents"][0]["parts"][0]["text"],
                EngineId::CloudTts => &body["input"]["text"],
            };
            assert_eq!(sent.as_str(), Some(" "));
            assert_eq!(outcome.audio(), Some(&b"spoken"[..]));
        }
    }

    #[test]
    fn gemini_accepts_any_speed_and_pitch() {
        let mock = Arc::new(MockTransport::replying(gemini_audio(b"gemini-mp3")));
        let req = request(EngineId::Gemini)
            .speed(0.0)
            .pitch(99.0)
            .build()
            .unwrap();
        let outcome = dispatcher(&mock).dispatch(&req);

        assert_eq!(outcome.audio(), Some(&b"gemini-mp3"[..]));
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn gemini_dispatch_skips_range_checks_on_raw_request() {
        let mock = Arc::new(MockTransport::replying(gemini_audio(b"raw")));
        let req = SynthesisRequest {
            text: "Namaste".to_string(),
            engine: EngineId::Gemini,
            language: "en-US".to_string(),
            voice: DEFAULT_VOICE.to_string(),
            speed: 0.0,
            pitch: -50.0,
        };
        let outcome = dispatcher(&mock).dispatch(&req);

        assert_eq!(outcome.audio(), Some(&b"raw"[..]));
    }

    #[test]
    fn cloud_dispatch_rejects_out_of_range_raw_request() {
        let mock = Arc::new(MockTransport::default());
        let req = SynthesisRequest {
            text: "Namaste".to_string(),
            engine: EngineId::CloudTts,
            language: "en-US".to_string(),
            voice: DEFAULT_VOICE.to_string(),
            speed: 0.0,
            pitch: 0.0,
        };
        let outcome = dispatcher(&mock).dispatch(&req);

        assert_eq!(outcome.kind(), Some(ErrorKind::InvalidRequest));
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn builder_rejects_out_of_range_values() {
        assert!(request(EngineId::CloudTts).speed(0.2).build().is_err());
        assert!(request(EngineId::CloudTts).speed(4.01).build().is_err());
        assert!(request(EngineId::CloudTts).pitch(20.5).build().is_err());
        assert!(request(EngineId::CloudTts).pitch(-20.0).speed(0.25).build().is_ok());
        assert!(SynthesisRequestBuilder::default()
            .text("")
            .engine(EngineId::Gemini)
            .build()
            .is_err());
    }

    #[test]
    fn engine_names_and_file_names() {
        assert_eq!(EngineId::Gemini.output_file_name(), "tts_output_gemini_tts.mp3");
        assert_eq!(
            EngineId::CloudTts.output_file_name(),
            "tts_output_google_cloud_tts.mp3"
        );
        assert_eq!("gemini".parse::<EngineId>().unwrap(), EngineId::Gemini);
        assert_eq!("Google Cloud TTS".parse::<EngineId>().unwrap(), EngineId::CloudTts);
        assert!("polly".parse::<EngineId>().is_err());
    }
}
