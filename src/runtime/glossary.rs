//! Glossary-backed embedded runtime.
//!
//! Loads a JSON glossary keyed by language pair and translates by phrase or
//! word lookup. Used by the binary and as a deterministic runtime in tests.
//!
//! Glossary format:
//!
//! ```json
//! { "en:fr": { "hello": "bonjour", "good morning": "bonjour" } }
//! ```

use super::EmbeddedRuntime;
use crate::error::RuntimeFault;
use crate::text::Context;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Fault code: the serialized context could not be parsed
pub const FAULT_BAD_CONTEXT: i32 = 1;
/// Fault code: no glossary exists for the requested language pair
pub const FAULT_UNKNOWN_PAIR: i32 = 2;
/// Fault code: the request was not valid UTF-8
pub const FAULT_BAD_REQUEST: i32 = 3;
/// Fault code: the runtime was called before it was started
pub const FAULT_NOT_STARTED: i32 = 4;
/// Fault code: the glossary file could not be loaded
pub const FAULT_LOAD: i32 = 5;

type Glossary = HashMap<String, HashMap<String, String>>;

enum Source {
    File(PathBuf),
    Inline(Glossary),
}

pub struct GlossaryRuntime {
    source: Source,
    glossary: Option<Glossary>,
}

impl GlossaryRuntime {
    /// A runtime that reads its glossary from `path` when started.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File(path.into()),
            glossary: None,
        }
    }

    /// A runtime with an in-memory glossary for a single language pair.
    pub fn from_entries<'a>(
        pair: &str,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let table = entries
            .into_iter()
            .map(|(from, to)| (from.to_lowercase(), to.to_string()))
            .collect();
        let mut glossary = Glossary::new();
        glossary.insert(pair.to_string(), table);
        Self {
            source: Source::Inline(glossary),
            glossary: None,
        }
    }

    fn load(&self) -> Result<Glossary, RuntimeFault> {
        match &self.source {
            Source::Inline(glossary) => Ok(glossary.clone()),
            Source::File(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    RuntimeFault::new(
                        FAULT_LOAD,
                        format!("failed to read glossary {}: {}", path.display(), e),
                    )
                })?;
                let parsed: Glossary = serde_json::from_str(&raw).map_err(|e| {
                    RuntimeFault::new(
                        FAULT_LOAD,
                        format!("failed to parse glossary {}: {}", path.display(), e),
                    )
                })?;
                // Lookups are case-insensitive
                Ok(parsed
                    .into_iter()
                    .map(|(pair, table)| {
                        let table = table
                            .into_iter()
                            .map(|(from, to)| (from.to_lowercase(), to))
                            .collect();
                        (pair, table)
                    })
                    .collect())
            }
        }
    }
}

/// Translate `text` against one pair's table.
///
/// A whole-text match wins; otherwise each word is looked up on its own and
/// unknown words pass through. Whitespace runs are preserved as-is.
fn translate_with(table: &HashMap<String, String>, text: &str) -> String {
    if let Some(phrase) = table.get(&text.trim().to_lowercase()) {
        let leading = &text[..text.len() - text.trim_start().len()];
        let trailing = &text[text.trim_end().len()..];
        return format!("{}{}{}", leading, phrase, trailing);
    }

    let mut out = String::with_capacity(text.len());
    let mut word = String::new();
    for c in text.chars() {
        if c.is_whitespace() {
            flush_word(table, &mut word, &mut out);
            out.push(c);
        } else {
            word.push(c);
        }
    }
    flush_word(table, &mut word, &mut out);
    out
}

fn flush_word(table: &HashMap<String, String>, word: &mut String, out: &mut String) {
    if word.is_empty() {
        return;
    }
    match table.get(&word.to_lowercase()) {
        Some(translated) => out.push_str(translated),
        None => out.push_str(word),
    }
    word.clear();
}

impl EmbeddedRuntime for GlossaryRuntime {
    fn start(&mut self) -> Result<(), RuntimeFault> {
        let glossary = self.load()?;
        debug!("Glossary runtime loaded {} language pair(s)", glossary.len());
        self.glossary = Some(glossary);
        Ok(())
    }

    fn call(&mut self, request: &[u8], context: &[u8]) -> Result<Vec<u8>, RuntimeFault> {
        let glossary = self
            .glossary
            .as_ref()
            .ok_or_else(|| RuntimeFault::new(FAULT_NOT_STARTED, "glossary runtime not started"))?;

        let context: Context = serde_json::from_slice(context)
            .map_err(|e| RuntimeFault::new(FAULT_BAD_CONTEXT, format!("malformed context: {}", e)))?;

        let text = std::str::from_utf8(request)
            .map_err(|e| RuntimeFault::new(FAULT_BAD_REQUEST, format!("malformed request: {}", e)))?;

        let pair = context.pair();
        let table = glossary.get(&pair).ok_or_else(|| {
            RuntimeFault::new(FAULT_UNKNOWN_PAIR, format!("no glossary for {}", pair))
        })?;

        Ok(translate_with(table, text).into_bytes())
    }

    fn stop(&mut self) {
        self.glossary = None;
    }
}
