use super::Translator;
use crate::codec::TextCodec;
use crate::error::TranslationError;
use crate::text::{Context, Text};

/// Stateless backend that returns its input unchanged.
///
/// Useful when source and target language coincide, or as a fallback that
/// never needs the embedded runtime. Malformed text is still rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl IdentityTranslator {
    pub const NAME: &'static str = "identity";
}

impl Translator for IdentityTranslator {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn translate(&self, text: &Text, _context: &Context) -> Result<Text, TranslationError> {
        TextCodec::encode(text)?;
        Ok(text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_returns_input() {
        let text = Text::from("unchanged ✓");
        let out = IdentityTranslator
            .translate(&text, &Context::new("en", "en"))
            .unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn test_rejects_unpaired_surrogate() {
        let err = IdentityTranslator
            .translate(&Text::from_utf16(vec![0x41, 0xDFFF]), &Context::new("en", "fr"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidText);
    }
}
