/// Extract a short excerpt of `text` centered on the first matching query
/// term.
///
/// `terms` are the normalized query tokens, tried in query order; the first
/// one with a case-insensitive whole-word occurrence anchors the excerpt,
/// which spans `window / 2` characters to each side. `...` marks clipped
/// edges. When no term matches, the excerpt is the start of the text.
///
/// Indexing is character-based so multi-byte text never splits mid-code
/// point; case folding is ASCII-only.
pub fn extract(text: &str, terms: &[String], window: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let lower: Vec<char> = chars.iter().map(|c| c.to_ascii_lowercase()).collect();

    for term in terms {
        let needle: Vec<char> = term.chars().map(|c| c.to_ascii_lowercase()).collect();
        if let Some(anchor) = find_whole_word(&lower, &needle) {
            let half = window / 2;
            let start = anchor.saturating_sub(half);
            let end = (anchor + half).min(chars.len());

            let mut snippet = String::new();
            if start > 0 {
                snippet.push_str("...");
            }
            snippet.extend(&chars[start..end]);
            if end < chars.len() {
                snippet.push_str("...");
            }
            return snippet;
        }
    }

    // No term occurs verbatim; fall back to the start of the document
    if chars.len() > window {
        let mut snippet: String = chars[..window].iter().collect();
        snippet.push_str("...");
        snippet
    } else {
        text.to_string()
    }
}

/// Find the first occurrence of `needle` in `haystack` that is not embedded
/// in a longer alphanumeric run
fn find_whole_word(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }

    for start in 0..=haystack.len() - needle.len() {
        if haystack[start..start + needle.len()] != needle[..] {
            continue;
        }
        let before_ok = start == 0 || !haystack[start - 1].is_alphanumeric();
        let after = start + needle.len();
        let after_ok = after == haystack.len() || !haystack[after].is_alphanumeric();
        if before_ok && after_ok {
            return Some(start);
        }
    }
    None
}
