use sha2::{Digest, Sha256};

const MAX_STEM_CHARS: usize = 80;

/// Windows-safe, deterministic filename for an exported conversation:
/// `{sanitized_title}--{short_hash(url)}.html`. The hash keeps exports
/// from different pages with the same title apart.
pub fn transcript_filename(title: &str, url: &str) -> String {
    let stem = sanitize_stem(title);
    let hash = short_hash(url);
    format!("{stem}--{hash}.html")
}

fn sanitize_stem(input: &str) -> String {
    let mut stem = String::with_capacity(input.len());
    let mut prev_underscore = false;
    for ch in input.chars() {
        let mapped = if is_forbidden(ch) { '_' } else { ch };
        if mapped == '_' {
            if !prev_underscore {
                stem.push('_');
            }
            prev_underscore = true;
        } else {
            stem.push(mapped);
            prev_underscore = false;
        }
    }

    let mut stem = stem.trim_matches(['_', ' ', '.']).to_string();
    if stem.is_empty() {
        stem = "conversation".to_string();
    }
    if stem.chars().count() > MAX_STEM_CHARS {
        stem = stem.chars().take(MAX_STEM_CHARS).collect();
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

fn is_forbidden(ch: char) -> bool {
    matches!(ch,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::transcript_filename;

    #[test]
    fn filenames_are_deterministic_per_url() {
        let a = transcript_filename("Rust Book", "https://example.com/ch1");
        let b = transcript_filename("Rust Book", "https://example.com/ch1");
        let c = transcript_filename("Rust Book", "https://example.com/ch2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("Rust Book--"));
        assert!(a.ends_with(".html"));
    }

    #[test]
    fn forbidden_characters_collapse_to_single_underscores() {
        let name = transcript_filename("a/b\\c::d", "u");
        assert!(name.starts_with("a_b_c_d--"));
    }

    #[test]
    fn empty_and_reserved_titles_stay_usable() {
        assert!(transcript_filename("", "u").starts_with("conversation--"));
        assert!(transcript_filename("CON", "u").starts_with("CON_--"));
    }
}
