//! # narration-rs
//!
//! A Rust library for turning text into MP3 narration through Google's
//! cloud speech backends.
//!
//! ## Features
//!
//! - **Gemini TTS**: asks a Gemini model to answer with `audio/mpeg` instead of text
//! - **Google Cloud TTS**: dedicated synthesis with explicit voice, speed and pitch
//! - **Uniform outcome**: one [`Dispatcher`] routes a request to either engine and
//!   returns audio bytes or a tagged failure, never both
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use narration_rs::{Dispatcher, EngineId, SynthesisConfig, SynthesisRequestBuilder};
//!
//! let config = SynthesisConfig::from_env()?;
//! let dispatcher = Dispatcher::new(&config)?;
//!
//! let request = SynthesisRequestBuilder::default()
//!     .text("Hello, world!")
//!     .engine(EngineId::CloudTts)
//!     .voice("en-US-Wavenet-D")
//!     .build()?;
//!
//! match dispatcher.dispatch(&request) {
//!     narration_rs::SynthesisOutcome::Audio(mp3) => {
//!         std::fs::write(request.engine.output_file_name(), mp3)?
//!     }
//!     narration_rs::SynthesisOutcome::Failure { message, .. } => eprintln!("{message}"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod engines;
pub mod error;
pub mod transport;

use std::path::Path;

pub use config::{Credential, SynthesisConfig, SynthesisConfigBuilder};
pub use dispatch::{Dispatcher, EngineId, SynthesisRequest, SynthesisRequestBuilder};
pub use error::{ErrorKind, SynthesisError, TransportError};

/// MIME type of every clip this crate produces.
pub const AUDIO_MIME: &str = "audio/mpeg";

/// The result of a successful synthesis.
///
/// Holds a complete MP3 stream exactly as the backend returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisResult {
    /// Encoded MP3 bytes
    pub audio: Vec<u8>,
}

impl SynthesisResult {
    /// Write the MP3 bytes to a file.
    pub fn write_mp3(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, &self.audio)
    }

    /// Size of the encoded clip in bytes.
    pub fn len(&self) -> usize {
        self.audio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.audio.is_empty()
    }
}

/// Outcome of a dispatched request: either audio or a tagged failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisOutcome {
    Audio(Vec<u8>),
    Failure { kind: ErrorKind, message: String },
}

impl SynthesisOutcome {
    pub fn audio(&self) -> Option<&[u8]> {
        match self {
            Self::Audio(bytes) => Some(bytes),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Audio(_) => None,
            Self::Failure { message, .. } => Some(message),
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Audio(_) => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio(_))
    }
}

impl From<Result<SynthesisResult, SynthesisError>> for SynthesisOutcome {
    fn from(result: Result<SynthesisResult, SynthesisError>) -> Self {
        match result {
            Ok(result) => Self::Audio(result.audio),
            Err(e) => Self::Failure {
                kind: e.kind(),
                message: e.message().to_string(),
            },
        }
    }
}

/// Common interface for the speech-synthesis backends.
///
/// Each engine defines its own parameter type; `None` means the engine's
/// defaults.
pub trait SynthesisEngine {
    /// Parameters for configuring a synthesis request (voice, speed, etc.)
    type SynthesisParams: Default;

    /// Human-readable engine name.
    fn name(&self) -> &'static str;

    /// Synthesize speech from the given text.
    fn synthesize(
        &self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, SynthesisError>;

    /// Synthesize speech from the given text and write it to an MP3 file.
    ///
    /// Default implementation calls `synthesize()` then `SynthesisResult::write_mp3()`.
    fn synthesize_to_file(
        &self,
        text: &str,
        mp3_path: &Path,
        params: Option<Self::SynthesisParams>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.synthesize(text, params)?.write_mp3(mp3_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_from_ok_carries_bytes_only() {
        let outcome = SynthesisOutcome::from(Ok::<_, SynthesisError>(SynthesisResult {
            audio: vec![0xff, 0xfb, 0x90],
        }));
        assert!(outcome.is_audio());
        assert_eq!(outcome.audio(), Some(&[0xff, 0xfb, 0x90][..]));
        assert!(outcome.error().is_none());
        assert!(outcome.kind().is_none());
    }

    #[test]
    fn outcome_from_err_carries_message_only() {
        let outcome = SynthesisOutcome::from(Err::<SynthesisResult, _>(SynthesisError::new(
            ErrorKind::PermissionDenied,
            "nope",
        )));
        assert!(!outcome.is_audio());
        assert!(outcome.audio().is_none());
        assert_eq!(outcome.error(), Some("nope"));
        assert_eq!(outcome.kind(), Some(ErrorKind::PermissionDenied));
    }

    #[test]
    fn writes_mp3_bytes_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp3");
        let result = SynthesisResult {
            audio: b"ID3\x03\x00fake".to_vec(),
        };
        result.write_mp3(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), result.audio);
    }
}
