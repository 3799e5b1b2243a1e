use std::fmt;

/// Category of a synthesis failure.
///
/// Both engines report through this tag so callers can branch on the kind
/// instead of matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The configured API key was rejected.
    InvalidCredential,
    /// The API key is valid but may not use the requested model.
    PermissionDenied,
    /// The model cannot produce the requested audio format.
    UnsupportedOutputFormat,
    /// The response carried no usable audio part (e.g. a safety refusal).
    NoAudioReturned,
    /// Network, HTTP, decoding or any other unclassified fault.
    TransportOrUnknown,
    /// The request was rejected before any network call was made.
    InvalidRequest,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidCredential => "invalid credential",
            Self::PermissionDenied => "permission denied",
            Self::UnsupportedOutputFormat => "unsupported output format",
            Self::NoAudioReturned => "no audio returned",
            Self::TransportOrUnknown => "transport or unknown",
            Self::InvalidRequest => "invalid request",
        };
        f.write_str(name)
    }
}

/// A failed synthesis: the kind tag plus a human-readable message.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct SynthesisError {
    kind: ErrorKind,
    message: String,
}

impl SynthesisError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Faults raised while talking to a remote synthesis API.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid audio payload: {0}")]
    Decode(#[from] base64::DecodeError),
}
