//! Text sanitizing for post content.
//!
//! Post text arrives from scraped exports and can carry data that does not
//! survive a strict UTF-8 round trip: invalid byte sequences and unpaired
//! UTF-16 surrogate escapes inside the JSON. The helpers here drop such data
//! rather than substituting anything for it. Once decoded into a `str` every
//! code point is encodable, so valid text (U+FFFD and noncharacters included)
//! is never altered.

use std::borrow::Cow;

/// Decodes raw bytes as UTF-8, dropping invalid sequences instead of
/// replacing them with U+FFFD.
///
/// # Examples
///
/// ```
/// use posttag::sanitize::decode_lossless_utf8;
///
/// assert_eq!(decode_lossless_utf8(b"caf\xC3\xA9"), "café");
/// assert_eq!(decode_lossless_utf8(b"ab\xFFcd"), "abcd");
/// ```
pub fn decode_lossless_utf8(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    Cow::Owned(out)
}

/// Removes `\uXXXX` escapes for UTF-16 surrogates that are not part of a
/// valid high/low pair.
///
/// `serde_json` refuses to decode an unpaired surrogate into a `String`, so
/// this runs over the raw document before parsing. Properly paired escapes
/// and escaped backslashes (`\\uD800`) are left alone.
///
/// # Examples
///
/// ```
/// use posttag::sanitize::strip_lone_surrogates;
///
/// assert_eq!(strip_lone_surrogates(r#"{"text": "a\ud83db"}"#), r#"{"text": "ab"}"#);
/// assert_eq!(strip_lone_surrogates(r#""\ud83d\ude00""#), r#""\ud83d\ude00""#);
/// ```
pub fn strip_lone_surrogates(json: &str) -> Cow<'_, str> {
    if !json.contains("\\u") {
        return Cow::Borrowed(json);
    }

    let bytes = json.as_bytes();
    let mut out = String::new();
    let mut flushed = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }

        match unicode_escape(bytes, i) {
            Some(unit) if is_high_surrogate(unit) => {
                let paired = unicode_escape(bytes, i + 6).is_some_and(is_low_surrogate);
                if paired {
                    i += 12;
                } else {
                    out.push_str(&json[flushed..i]);
                    i += 6;
                    flushed = i;
                }
            }
            Some(unit) if is_low_surrogate(unit) => {
                out.push_str(&json[flushed..i]);
                i += 6;
                flushed = i;
            }
            Some(_) => i += 6,
            // Any other escape: skip the backslash and the escaped byte
            None => i += 2,
        }
    }

    if flushed == 0 {
        return Cow::Borrowed(json);
    }
    out.push_str(&json[flushed..]);
    Cow::Owned(out)
}

fn unicode_escape(bytes: &[u8], at: usize) -> Option<u16> {
    let escape = bytes.get(at..at + 6)?;
    if escape[0] != b'\\' || escape[1] != b'u' || !escape[2..].iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let hex = std::str::from_utf8(&escape[2..]).ok()?;
    u16::from_str_radix(hex, 16).ok()
}

fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_utf8_is_borrowed_untouched() {
        let text = "Looking for a new job! #JobSearch";
        assert!(matches!(decode_lossless_utf8(text.as_bytes()), Cow::Borrowed(_)));
    }

    #[test]
    fn invalid_utf8_sequences_are_dropped() {
        // Truncated 3-byte sequence in the middle, stray continuation at the end
        let bytes = b"Job \xE2\x82 search\x80";
        assert_eq!(decode_lossless_utf8(bytes), "Job  search");
    }

    #[test]
    fn unpaired_high_surrogate_is_removed() {
        let json = r#"[{"text": "Great news \ud83d today"}]"#;
        assert_eq!(
            strip_lone_surrogates(json),
            r#"[{"text": "Great news  today"}]"#
        );
    }

    #[test]
    fn unpaired_low_surrogate_is_removed() {
        let json = r#""x\ude00y""#;
        assert_eq!(strip_lone_surrogates(json), r#""xy""#);
    }

    #[test]
    fn reversed_pair_is_two_lone_surrogates() {
        let json = r#""\ude00\ud83d""#;
        assert_eq!(strip_lone_surrogates(json), r#""""#);
    }

    #[test]
    fn valid_pairs_and_bmp_escapes_survive() {
        let json = r#"{"text": "\ud83d\ude00 caf\u00e9 \n"}"#;
        assert!(matches!(strip_lone_surrogates(json), Cow::Borrowed(_)));
    }

    #[test]
    fn escaped_backslash_is_not_an_escape() {
        let json = r#""C:\\ud800\\path""#;
        assert!(matches!(strip_lone_surrogates(json), Cow::Borrowed(_)));
    }

    #[test]
    fn stripped_document_parses_with_serde() {
        let json = r#"[{"text": "a\ud800b", "id": 1}]"#;
        assert!(serde_json::from_str::<serde_json::Value>(json).is_err());

        let cleaned = strip_lone_surrogates(json);
        let value: serde_json::Value = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(value[0]["text"], "ab");
        assert_eq!(value[0]["id"], 1);
    }

    #[test]
    fn high_surrogate_at_end_of_input() {
        assert_eq!(strip_lone_surrogates(r#"ab\ud83d"#), "ab");
    }

    #[test]
    fn encodable_specials_are_kept() {
        let text = "Rating: 5\u{FFFD} stars \u{FDD0}x\u{FFFF}";
        assert!(matches!(decode_lossless_utf8(text.as_bytes()), Cow::Borrowed(t) if t == text));

        let json = serde_json::to_string(text).unwrap();
        assert!(matches!(strip_lone_surrogates(&json), Cow::Borrowed(_)));
    }

    #[test]
    fn hinglish_and_emoji_are_kept() {
        let text = "Aaj ka din bahut accha tha 🙌\nनया काम मिला!";
        assert!(matches!(decode_lossless_utf8(text.as_bytes()), Cow::Borrowed(_)));
    }
}
