// ABOUTME: Text encoding handling for the slidedeck compiler
// ABOUTME: Decodes sources from legacy codepages and produces canonical UTF-8 output

use crate::errors::{DeckError, Result};
use encoding_rs::Encoding;
use std::borrow::Cow;

/// Canonical encoding of every rendered artifact
pub const OUTPUT_ENCODING: &Encoding = encoding_rs::UTF_8;

/// Look up a source encoding by its label (`koi8_r`, `latin1`, `utf-8`, ...).
///
/// WHATWG labels are tried first, then codec spellings with underscores
/// (`utf_8`, `latin_1`, `iso8859_5`).
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    let label = label.trim();
    let candidates = [
        label.to_string(),
        label.replace('_', "-"),
        label.replace('_', ""),
    ];
    candidates
        .iter()
        .find_map(|candidate| Encoding::for_label(candidate.as_bytes()))
        .ok_or_else(|| DeckError::UnknownEncoding(label.to_string()))
}

/// Decoded source text plus whether any byte sequence had to be replaced
#[derive(Debug)]
pub struct Decoded<'a> {
    pub text: Cow<'a, str>,
    pub encoding: &'static Encoding,
    pub malformed: bool,
}

/// Decode source bytes.
///
/// With an explicit encoding the bytes are decoded with it (a BOM still wins).
/// Otherwise UTF-8 is tried first and Windows-1252 is the fallback for
/// anything that is not valid UTF-8.
pub fn decode_source<'a>(bytes: &'a [u8], encoding: Option<&'static Encoding>) -> Decoded<'a> {
    if let Some(encoding) = encoding {
        let (text, used, malformed) = encoding.decode(bytes);
        return Decoded {
            text,
            encoding: used,
            malformed,
        };
    }

    let (text, used, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return Decoded {
            text,
            encoding: used,
            malformed,
        };
    }

    let (text, used, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    Decoded {
        text,
        encoding: used,
        malformed: true,
    }
}

/// Serialize rendered output in the canonical encoding
pub fn encode_output(text: &str) -> Vec<u8> {
    let (bytes, _, _) = OUTPUT_ENCODING.encode(text);
    bytes.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_labels() {
        assert_eq!(resolve_encoding("koi8_r").unwrap(), encoding_rs::KOI8_R);
        assert_eq!(resolve_encoding("utf-8").unwrap(), encoding_rs::UTF_8);
        assert!(matches!(
            resolve_encoding("klingon"),
            Err(DeckError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_resolve_codec_spellings() {
        assert_eq!(resolve_encoding("utf_8").unwrap(), encoding_rs::UTF_8);
        assert_eq!(resolve_encoding("latin_1").unwrap(), encoding_rs::WINDOWS_1252);
        assert_eq!(resolve_encoding("iso8859_5").unwrap(), encoding_rs::ISO_8859_5);
        assert!(matches!(
            resolve_encoding("no_such_codec"),
            Err(DeckError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_decode_koi8r() {
        let (bytes, _, _) = encoding_rs::KOI8_R.encode("русский текст");
        let decoded = decode_source(&bytes, Some(encoding_rs::KOI8_R));
        assert_eq!(decoded.text, "русский текст");
        assert!(!decoded.malformed);

        let output = encode_output(&decoded.text);
        assert_eq!(String::from_utf8(output).unwrap(), "русский текст");
    }

    #[test]
    fn test_fallback_for_invalid_utf8() {
        let decoded = decode_source(b"caf\xe9", None);
        assert_eq!(decoded.text, "café");
        assert!(decoded.malformed);
        assert_eq!(decoded.encoding, encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn test_utf8_is_borrowed() {
        let decoded = decode_source("plain".as_bytes(), None);
        assert!(matches!(decoded.text, Cow::Borrowed("plain")));
    }
}
