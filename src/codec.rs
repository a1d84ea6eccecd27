//! Conversion between host UTF-16 text and the UTF-8 bytes the embedded
//! runtime consumes.
//!
//! Both directions are strict: an unpaired surrogate on the way in, or
//! malformed UTF-8 on the way back, is an error rather than a replacement
//! character.

use crate::error::CodecError;
use crate::text::Text;

pub struct TextCodec;

impl TextCodec {
    /// Encode host text as UTF-8 bytes for the runtime boundary.
    pub fn encode(text: &Text) -> Result<Vec<u8>, CodecError> {
        Self::encode_string(text).map(String::into_bytes)
    }

    /// Encode host text as an owned Rust string.
    pub fn encode_string(text: &Text) -> Result<String, CodecError> {
        let units = text.as_utf16();
        let mut out = String::with_capacity(units.len());
        let mut index = 0;

        for decoded in char::decode_utf16(units.iter().copied()) {
            match decoded {
                Ok(c) => {
                    out.push(c);
                    index += c.len_utf16();
                }
                Err(e) => {
                    return Err(CodecError::UnpairedSurrogate {
                        index,
                        unit: e.unpaired_surrogate(),
                    });
                }
            }
        }

        Ok(out)
    }

    /// Decode UTF-8 bytes returned by the runtime into host text.
    pub fn decode(bytes: &[u8]) -> Result<Text, CodecError> {
        let s = std::str::from_utf8(bytes).map_err(|e| CodecError::InvalidUtf8 {
            valid_up_to: e.valid_up_to(),
        })?;
        Ok(Text::from(s))
    }
}
