use std::borrow::Cow;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::trace;

/// Decodes stored file content.
///
/// Content is tried as standard (padded) base64 first. When that fails, or the
/// decoded bytes are not UTF-8, the stored text is returned as-is. This never
/// fails.
pub fn decode_content(content: &str) -> Cow<'_, str> {
    match STANDARD.decode(content) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => Cow::Owned(text),
            Err(_) => {
                trace!("Decoded content is not UTF-8, using raw text");
                Cow::Borrowed(content)
            }
        },
        Err(_) => Cow::Borrowed(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("aGVsbG8=", "hello")]
    #[case("aGVsbG8gd29ybGQK", "hello world\n")]
    #[case("", "")]
    #[case("plain text, not base64!", "plain text, not base64!")]
    #[case("aGVsbG8", "aGVsbG8")]
    #[case("multi\nline", "multi\nline")]
    fn test_decode_content(#[case] stored: &str, #[case] expected: &str) {
        assert_eq!(decode_content(stored), expected);
    }

    #[test]
    fn test_non_utf8_payload_falls_back_to_raw() {
        // "test" is valid base64 for the bytes b5 eb 2d.
        assert_eq!(decode_content("test"), "test");
    }

    #[test]
    fn test_plain_text_is_borrowed() {
        assert!(matches!(decode_content("~~~"), Cow::Borrowed("~~~")));
    }
}
