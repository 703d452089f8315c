use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// How many head bytes to scan for a `<meta charset>` declaration.
const META_SCAN_BYTES: usize = 2048;

/// Decode raw page bytes into UTF-8.
///
/// Order: BOM, `Content-Type` header charset, `<meta charset>` in the head
/// bytes, then chardetng detection. Decoding is lossy at the byte level
/// (replacement characters) rather than failing the capture: a page with a
/// few bad bytes is still worth extracting.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>) -> (String, &'static str) {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(header_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    if let Some(enc) = meta_charset(bytes) {
        return decode_with(bytes, enc);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> (String, &'static str) {
    let (text, actual, _had_errors) = enc.decode(bytes);
    (text.into_owned(), actual.name())
}

fn header_charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|part| {
        let part = part.trim();
        let (key, value) = part.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim_matches([' ', '"', '\'']).to_string())
        } else {
            None
        }
    })
}

/// Scan the head bytes for `charset=` inside a meta tag. The scan is
/// ASCII-oriented, which is what every charset declaration that matters is.
fn meta_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(META_SCAN_BYTES)];
    let text = String::from_utf8_lossy(head).to_ascii_lowercase();
    let idx = text.find("charset=")?;
    let rest = &text[idx + "charset=".len()..];
    let label: String = rest
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if label.is_empty() {
        return None;
    }
    Encoding::for_label(label.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::{decode_page, header_charset};

    #[test]
    fn header_charset_wins_over_detection() {
        let bytes = b"caf\xe9";
        let (text, label) = decode_page(bytes, Some("text/html; charset=ISO-8859-1"));
        assert_eq!(text, "caf\u{e9}");
        assert!(
            label.eq_ignore_ascii_case("ISO-8859-1") || label.eq_ignore_ascii_case("windows-1252")
        );
    }

    #[test]
    fn bom_wins_over_header() {
        let bytes = b"\xEF\xBB\xBFhello";
        let (text, label) = decode_page(bytes, Some("text/html; charset=ISO-8859-1"));
        assert_eq!(text, "hello");
        assert_eq!(label, "UTF-8");
    }

    #[test]
    fn meta_charset_is_honoured() {
        let mut bytes = b"<html><head><meta charset=\"windows-1252\"></head><body>".to_vec();
        bytes.extend_from_slice(b"caf\xe9</body></html>");
        let (text, _) = decode_page(&bytes, Some("text/html"));
        assert!(text.contains("caf\u{e9}"));
    }

    #[test]
    fn header_charset_parses_quoted_values() {
        assert_eq!(
            header_charset("text/html; charset=\"utf-8\"").as_deref(),
            Some("utf-8")
        );
        assert_eq!(header_charset("text/html"), None);
    }
}
