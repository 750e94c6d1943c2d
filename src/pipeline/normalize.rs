//! Deterministic cleanup of raw model output before it reaches the parser.
//!
//! Only presentation artefacts are touched: an outer code fence the model
//! was not asked for, Windows line endings, trailing spaces, and invisible
//! format characters that would otherwise defeat exact header matching.
//! Line content and order are preserved.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply every cleanup rule, in order:
///
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip an outer ```` ``` ```` fence wrapping the whole answer
/// 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, bidi marks)
/// 4. Trim trailing whitespace per line
pub fn normalize_response(raw: &str) -> String {
    let s = normalise_line_endings(raw);
    let s = strip_outer_fences(&s);
    let s = remove_invisible_chars(&s);
    trim_trailing_whitespace(&s)
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*\n(.*)\n```$").unwrap());

fn strip_outer_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

/// Zero-width and directional format characters models sometimes emit.
const INVISIBLE: &[char] = &[
    '\u{200B}', // zero width space
    '\u{200C}', // zero width non-joiner
    '\u{200D}', // zero width joiner
    '\u{200E}', // left-to-right mark
    '\u{200F}', // right-to-left mark
    '\u{2060}', // word joiner
    '\u{FEFF}', // BOM
    '\u{00AD}', // soft hyphen
];

fn remove_invisible_chars(input: &str) -> String {
    input.chars().filter(|c| !INVISIBLE.contains(c)).collect()
}

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_is_normalised() {
        assert_eq!(normalize_response("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn outer_fence_is_stripped() {
        let raw = "```\nRecommendation:\n- Add clause\n```";
        assert_eq!(normalize_response(raw), "Recommendation:\n- Add clause");

        let tagged = "```text\nProblem Description:\n```\n";
        assert_eq!(normalize_response(tagged), "Problem Description:");
    }

    #[test]
    fn inner_fences_are_untouched() {
        let raw = "Recommendation:\n```\ncode\n```\n- tail";
        assert_eq!(normalize_response(raw), raw);
    }

    #[test]
    fn invisible_chars_are_removed() {
        assert_eq!(
            normalize_response("\u{FEFF}Recommendation:\u{200B}"),
            "Recommendation:"
        );
        assert_eq!(normalize_response("\u{200F}التوصية:"), "التوصية:");
    }

    #[test]
    fn content_is_otherwise_preserved() {
        let raw = "  Missing Articles/Clauses:  \n\n• Indemnity";
        assert_eq!(
            normalize_response(raw),
            "  Missing Articles/Clauses:\n\n• Indemnity"
        );
    }
}
