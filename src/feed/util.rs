//! Utility functions for turning response bodies into parseable XML.

use tracing::debug;

use crate::TARGET_WEB_REQUEST;

/// Decodes a response body. UTF-8 is expected; otherwise the charset from the
/// Content-Type header is honored, and failing that invalid bytes are replaced.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    if let Some(encoding) = content_type
        .and_then(charset)
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
    {
        debug!(target: TARGET_WEB_REQUEST, "Decoding body as {}", encoding.name());
        let (decoded, _, _) = encoding.decode(bytes);
        return decoded.into_owned();
    }

    debug!(target: TARGET_WEB_REQUEST, "Body is not valid UTF-8 and declares no usable charset");
    String::from_utf8_lossy(bytes).into_owned()
}

fn charset(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .map(str::trim)
        .find(|part| part.to_lowercase().starts_with("charset="))
        .and_then(|part| part.split('=').nth(1))
        .map(|label| label.trim().trim_matches('"'))
}

/// Clean up malformed XML: stray leading bytes, HTML entities and characters XML forbids.
pub fn cleanup_xml(xml: &str) -> String {
    let mut cleaned = xml.trim().trim_start_matches('\u{FEFF}').to_string();

    // Remove any leading garbage before <?xml, <rss or <alert
    for marker in ["<?xml", "<rss", "<alert", "<cap:alert"] {
        if let Some(start) = cleaned.find(marker) {
            cleaned = cleaned[start..].to_string();
            break;
        }
    }

    cleaned = cleaned
        .replace("&nbsp;", "&#160;")
        .replace("&ndash;", "&#8211;")
        .replace("&mdash;", "&#8212;")
        .replace("&rsquo;", "&#8217;")
        .replace("&lsquo;", "&#8216;")
        .replace("&rdquo;", "&#8221;")
        .replace("&ldquo;", "&#8220;")
        .replace("&amp;amp;", "&amp;");

    cleaned
        .chars()
        .filter(|&c| {
            matches!(c,
                '\u{0009}' | // tab
                '\u{000A}' | // newline
                '\u{000D}' | // carriage return
                '\u{0020}'..='\u{D7FF}' |
                '\u{E000}'..='\u{FFFD}' |
                '\u{10000}'..='\u{10FFFF}'
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_and_bom() {
        assert_eq!(decode_body("<a>é</a>".as_bytes(), None), "<a>é</a>");
        assert_eq!(decode_body(b"\xEF\xBB\xBF<a/>", None), "<a/>");
    }

    #[test]
    fn test_decode_declared_charset() {
        let latin1 = b"<a>caf\xE9</a>";
        assert_eq!(
            decode_body(latin1, Some("application/xml; charset=\"ISO-8859-1\"")),
            "<a>café</a>"
        );
        assert_eq!(decode_body(latin1, None), "<a>caf\u{FFFD}</a>");
    }

    #[test]
    fn test_cleanup_xml() {
        let cleaned = cleanup_xml("\n junk <rss><title>A&nbsp;B\u{0001}</title></rss>");
        assert_eq!(cleaned, "<rss><title>A&#160;B</title></rss>");
    }
}
