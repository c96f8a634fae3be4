use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const FALLBACK_SLUG: &str = "entry";

static REPEATED_HYPHENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-{2,}").expect("valid hyphen pattern"));

/// Converts a headword into a filesystem-safe slug.
///
/// NFKC-normalizes, turns whitespace and `/` into `-`, keeps only ASCII word
/// characters, `-` and Devanagari, then collapses and trims hyphens.
pub fn slugify(word: &str) -> String {
    let normalized: String = word.trim().nfkc().collect();
    let kept: String = normalized
        .chars()
        .map(|ch| if ch.is_whitespace() || ch == '/' { '-' } else { ch })
        .filter(|&ch| is_slug_char(ch))
        .collect();
    let collapsed = REPEATED_HYPHENS.replace_all(&kept, "-");
    let trimmed = collapsed.trim_matches('-');
    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn page_filename(word: &str) -> String {
    format!("{}.html", slugify(word))
}

fn is_slug_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || crate::scan::is_devanagari(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn devanagari_passes_through() {
        assert_eq!(slugify("काम"), "काम");
        assert_eq!(page_filename("काम"), "काम.html");
    }

    #[test]
    fn separators_become_single_hyphens() {
        assert_eq!(slugify("  hello  world/foo "), "hello-world-foo");
        assert_eq!(slugify("a -- b"), "a-b");
        assert_eq!(slugify("-x-"), "x");
    }

    #[test]
    fn punctuation_is_dropped() {
        assert_eq!(slugify("काम!"), "काम");
        assert_eq!(slugify("café"), "caf");
    }

    #[test]
    fn empty_result_falls_back() {
        assert_eq!(slugify("!!!"), "entry");
        assert_eq!(page_filename("   "), "entry.html");
    }
}
