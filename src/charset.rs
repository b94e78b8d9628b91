//! Character encoding resolution for byte input
//!
//! Byte input is decoded to UTF-8 before it reaches html5ever. The encoding
//! is resolved in this order:
//!
//! 1. **Byte order mark**: a UTF-8 or UTF-16 BOM wins over any label
//! 2. **Content-Type**: the `charset` parameter of the transport header
//! 3. **Meta sniff**: `<meta charset>` or `<meta http-equiv content="...charset=">`
//!    within the first 1024 bytes; a UTF-16 label found this way means UTF-8
//! 4. **Default**: UTF-8
//!
//! UTF-8 input is validated strictly; an invalid sequence is an
//! [`SanitizeError::EncodingError`], never silently replaced.
//!
//! # Examples
//!
//! ```rust
//! use html_sanitizer::charset::{decode_html, resolve_encoding};
//!
//! let encoding = resolve_encoding(Some("text/html; charset=ISO-8859-1"), b"<p>x</p>").unwrap();
//! assert_eq!(encoding.name(), "windows-1252");
//!
//! let text = decode_html(b"<p>Caf\xE9</p>", Some("text/html; charset=latin1")).unwrap();
//! assert_eq!(text, "<p>Café</p>");
//! ```

use std::borrow::Cow;
use std::sync::OnceLock;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use regex::bytes::Regex;

use crate::error::SanitizeError;

/// Maximum bytes scanned for a `<meta>` charset declaration
const META_SCAN_LIMIT: usize = 1024;

fn meta_charset_regex() -> Option<&'static Regex> {
    static META_CHARSET: OnceLock<Option<Regex>> = OnceLock::new();
    META_CHARSET
        .get_or_init(|| {
            // Matches both `<meta charset="x">` and the http-equiv form whose
            // content attribute embeds `charset=x`.
            Regex::new(r#"(?i)<meta\b[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#).ok()
        })
        .as_ref()
}

/// Extract the `charset` parameter from a Content-Type header value
///
/// ```rust
/// use html_sanitizer::charset::charset_from_content_type;
///
/// assert_eq!(charset_from_content_type("text/html; charset=\"UTF-8\""), Some("UTF-8"));
/// assert_eq!(charset_from_content_type("text/html"), None);
/// ```
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        (!value.is_empty()).then_some(value)
    })
}

/// Sniff a charset label from `<meta>` tags near the start of the document
pub fn charset_from_meta(html: &[u8]) -> Option<String> {
    let head = &html[..html.len().min(META_SCAN_LIMIT)];
    let captures = meta_charset_regex()?.captures(head)?;
    let label = captures.get(1)?;
    std::str::from_utf8(label.as_bytes()).ok().map(str::to_string)
}

/// Resolve the encoding for `html` using BOM, header and meta cascade
///
/// Returns [`SanitizeError::EncodingError`] when a declared label is not a
/// known encoding.
pub fn resolve_encoding(
    content_type: Option<&str>,
    html: &[u8],
) -> Result<&'static Encoding, SanitizeError> {
    if let Some((encoding, _)) = Encoding::for_bom(html) {
        return Ok(encoding);
    }

    if let Some(label) = content_type.and_then(charset_from_content_type) {
        return encoding_for_label(label);
    }

    match charset_from_meta(html) {
        // A UTF-16 label in a sniffed <meta> is read as UTF-8.
        Some(label) => match encoding_for_label(&label)? {
            encoding if encoding == UTF_16LE || encoding == UTF_16BE => Ok(UTF_8),
            encoding => Ok(encoding),
        },
        None => Ok(UTF_8),
    }
}

fn encoding_for_label(label: &str) -> Result<&'static Encoding, SanitizeError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| SanitizeError::EncodingError(format!("Unsupported charset '{}'", label)))
}

/// Decode `html` to UTF-8 text using the resolved encoding
///
/// A BOM, if present, is removed from the decoded text.
pub fn decode_html<'a>(
    html: &'a [u8],
    content_type: Option<&str>,
) -> Result<Cow<'a, str>, SanitizeError> {
    let encoding = resolve_encoding(content_type, html)?;
    let bom_len = match Encoding::for_bom(html) {
        Some((bom_encoding, len)) if bom_encoding == encoding => len,
        _ => 0,
    };
    let body = &html[bom_len..];

    if encoding == UTF_8 {
        return std::str::from_utf8(body).map(Cow::Borrowed).map_err(|e| {
            SanitizeError::EncodingError(format!(
                "Invalid UTF-8 at byte position {}: {}",
                e.valid_up_to() + bom_len,
                e
            ))
        });
    }

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            SanitizeError::EncodingError(format!(
                "Invalid byte sequence for charset '{}'",
                encoding.name()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_content_type_charset() {
        assert_eq!(
            charset_from_content_type("text/html; charset=UTF-8"),
            Some("UTF-8")
        );
        assert_eq!(
            charset_from_content_type("text/html;charset='iso-8859-1'"),
            Some("iso-8859-1")
        );
        assert_eq!(
            charset_from_content_type("text/html; boundary=x; CHARSET = windows-1252"),
            Some("windows-1252")
        );
        assert_eq!(charset_from_content_type("text/html"), None);
        assert_eq!(charset_from_content_type("text/html; charset="), None);
        assert_eq!(charset_from_content_type(""), None);
    }

    #[test]
    fn test_meta_charset_html5() {
        let html = br#"<html><head><meta charset="Shift_JIS"></head></html>"#;
        assert_eq!(charset_from_meta(html).as_deref(), Some("Shift_JIS"));
    }

    #[test]
    fn test_meta_charset_http_equiv() {
        let html =
            br#"<meta http-equiv="Content-Type" content="text/html; charset=iso-8859-1">"#;
        assert_eq!(charset_from_meta(html).as_deref(), Some("iso-8859-1"));
    }

    #[test]
    fn test_meta_charset_beyond_scan_limit() {
        let mut html = vec![b' '; META_SCAN_LIMIT];
        html.extend_from_slice(br#"<meta charset="iso-8859-1">"#);
        assert_eq!(charset_from_meta(&html), None);
    }

    #[test]
    fn test_resolve_defaults_to_utf8() {
        assert_eq!(resolve_encoding(None, b"<p>x</p>").unwrap(), UTF_8);
    }

    #[test]
    fn test_meta_utf16_label_means_utf8() {
        let html = br#"<meta charset="utf-16"><p>x</p>"#;
        assert_eq!(resolve_encoding(None, html).unwrap(), UTF_8);
        let html = br#"<meta charset="UTF-16BE"><p>x</p>"#;
        assert_eq!(resolve_encoding(None, html).unwrap(), UTF_8);
        assert_eq!(
            decode_html(br#"<meta charset="utf-16"><p>x</p>"#, None).unwrap(),
            r#"<meta charset="utf-16"><p>x</p>"#
        );
    }

    #[test]
    fn test_header_utf16_label_is_kept() {
        let encoding =
            resolve_encoding(Some("text/html; charset=utf-16le"), b"<\0p\0>\0").unwrap();
        assert_eq!(encoding, UTF_16LE);
    }

    #[test]
    fn test_resolve_header_beats_meta() {
        let html = br#"<meta charset="iso-8859-1"><p>x</p>"#;
        let encoding = resolve_encoding(Some("text/html; charset=utf-8"), html).unwrap();
        assert_eq!(encoding, UTF_8);
    }

    #[test]
    fn test_resolve_bom_beats_header() {
        let html = b"\xEF\xBB\xBF<p>x</p>";
        let encoding = resolve_encoding(Some("text/html; charset=iso-8859-1"), html).unwrap();
        assert_eq!(encoding, UTF_8);
    }

    #[test]
    fn test_resolve_unknown_label() {
        match resolve_encoding(Some("text/html; charset=x-unknown-test"), b"<p>x</p>") {
            Err(SanitizeError::EncodingError(msg)) => assert!(msg.contains("Unsupported charset")),
            other => panic!("Expected EncodingError, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_utf8_borrows() {
        let decoded = decode_html(b"<p>ok</p>", None).unwrap();
        assert!(matches!(decoded, Cow::Borrowed("<p>ok</p>")));
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let decoded = decode_html(b"\xEF\xBB\xBF<p>ok</p>", None).unwrap();
        assert_eq!(decoded, "<p>ok</p>");
    }

    #[test]
    fn test_decode_invalid_utf8() {
        match decode_html(b"<p>\xFF\xFF</p>", None) {
            Err(SanitizeError::EncodingError(msg)) => assert!(msg.contains("byte position 3")),
            other => panic!("Expected EncodingError, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_windows_1252_from_meta() {
        let html = b"<meta charset=\"windows-1252\"><p>Price \x80 10</p>";
        let decoded = decode_html(html, None).unwrap();
        assert!(decoded.contains("Price \u{20AC} 10"));
    }

    #[test]
    fn test_decode_utf16le_bom() {
        let html = b"\xFF\xFE<\x00p\x00>\x00";
        assert_eq!(decode_html(html, None).unwrap(), "<p>");
    }

    proptest! {
        #[test]
        fn prop_header_charset_has_priority(
            header in prop::sample::select(vec!["utf-8", "iso-8859-1", "windows-1252", "koi8-r"]),
            meta in prop::sample::select(vec!["utf-8", "iso-8859-2", "shift_jis"]),
        ) {
            let html = format!(r#"<meta charset="{meta}"><p>x</p>"#);
            let content_type = format!("text/html; charset={header}");
            let resolved = resolve_encoding(Some(&content_type), html.as_bytes()).unwrap();
            prop_assert_eq!(resolved, Encoding::for_label(header.as_bytes()).unwrap());
        }
    }
}
