//! Languages offered for narration and the Cloud TTS voices for each.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Hindi,
    Telugu,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Hindi, Language::Telugu];

    /// BCP-47 language code used by the speech APIs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en-US",
            Self::Hindi => "hi-IN",
            Self::Telugu => "te-IN",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Telugu => "Telugu",
        }
    }

    /// Cloud TTS voices for this language. The first one is the default.
    pub fn voices(&self) -> &'static [&'static str] {
        match self {
            Self::English => &["en-US-Wavenet-D", "en-US-Wavenet-F", "en-US-Standard-C"],
            Self::Hindi => &["hi-IN-Wavenet-A", "hi-IN-Standard-A"],
            Self::Telugu => &["te-IN-Wavenet-A"],
        }
    }

    pub fn default_voice(&self) -> &'static str {
        self.voices()[0]
    }

    /// Look up a language by its code (`"hi-IN"`).
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|l| l.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Language {
    type Err = String;

    /// Accepts a display name (`"Hindi"`) or a language code (`"hi-IN"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.display_name().eq_ignore_ascii_case(s))
            .or_else(|| Self::from_code(s))
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|l| l.display_name()).collect();
                format!("unknown language '{s}' (expected one of: {})", known.join(", "))
            })
    }
}
