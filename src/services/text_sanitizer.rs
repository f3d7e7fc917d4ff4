//! Cleans model-written place names so they can be used as search queries.

use std::sync::LazyLock;

use regex::Regex;

/// Parenthetical example annotations such as "(VD: Phở Thìn)" or "(e.g. a rooftop bar)".
static EXAMPLE_ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\([^()]*?\b(?:(?:vd|ví dụ|vi du|example)\s*:|e\.g\.)[^()]*\)")
        .expect("valid example annotation regex")
});

/// Example tags left outside parentheses.
static EXAMPLE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(?:vd|ví dụ|vi du|example)\s*:|e\.g\.)")
        .expect("valid example tag regex")
});

static WRAPPER_PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[()\[\]"“”‘’«»…\n\r]"#).expect("valid punctuation regex")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Strip model artifacts from a free-text place name.
///
/// Always returns a string (possibly empty) and is idempotent.
pub fn sanitize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let s = EXAMPLE_ANNOTATION_RE.replace_all(raw, " ");
    let s = EXAMPLE_TAG_RE.replace_all(&s, " ");
    let s = WRAPPER_PUNCT_RE.replace_all(&s, " ");

    let kept: String = s
        .chars()
        .map(|c| if is_allowed(c) { c } else { ' ' })
        .collect();

    WHITESPACE_RE.replace_all(&kept, " ").trim().to_string()
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || matches!(c, '-' | ',' | '.')
        || (c.is_alphabetic() && is_extended_latin(c))
        || is_combining_mark(c)
}

// Latin-1 Supplement, Latin Extended-A/B and Latin Extended Additional
// (the last one holds most Vietnamese precomposed letters).
fn is_extended_latin(c: char) -> bool {
    matches!(c, '\u{00C0}'..='\u{024F}' | '\u{1E00}'..='\u{1EFF}')
}

fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036F}')
}
