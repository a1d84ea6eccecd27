//! Host-side text and per-call translation context.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable UTF-16 text as it arrives from the host.
///
/// The code units are stored as given, so a `Text` may carry unpaired
/// surrogates. Validation happens at the codec boundary, where such input is
/// rejected instead of being repaired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Text {
    units: Vec<u16>,
}

impl Text {
    /// Wrap raw UTF-16 code units without validating them.
    pub fn from_utf16(units: impl Into<Vec<u16>>) -> Self {
        Self {
            units: units.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_utf16(&self) -> &[u16] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Convert to a Rust string, failing on unpaired surrogates.
    pub fn to_string_checked(&self) -> Result<String, crate::error::CodecError> {
        crate::codec::TextCodec::encode_string(self)
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self {
            units: s.encode_utf16().collect(),
        }
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Text::from(s.as_str())
    }
}

/// Read-only translation parameters that accompany a single call.
///
/// Serialized to JSON when it crosses into the embedded runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Source language code (e.g. "en")
    pub source: String,

    /// Target language code (e.g. "fr")
    pub target: String,

    /// Free-form formatting hints, passed through untouched
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hints: BTreeMap<String, String>,
}

impl Context {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            hints: BTreeMap::new(),
        }
    }

    pub fn with_hint(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.hints.insert(key.into(), value.into());
        self
    }

    /// Glossary-style key for the language pair, e.g. "en:fr".
    pub fn pair(&self) -> String {
        format!("{}:{}", self.source, self.target)
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
