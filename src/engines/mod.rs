//! Speech synthesis engines.
//!
//! This module contains the cloud backends a request can be routed to.
//!
//! # Available Engines
//!
//! - [`gemini`] - Gemini generative model asked for `audio/mpeg` output
//! - [`cloud_tts`] - Google Cloud Text-to-Speech (voice, speed and pitch)

pub mod cloud_tts;
pub mod gemini;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::TransportError;

/// Decode a base64 audio payload as returned by Google's JSON APIs.
pub(crate) fn decode_audio(encoded: &str) -> Result<Vec<u8>, TransportError> {
    Ok(STANDARD.decode(encoded)?)
}
