use once_cell::sync::Lazy;
use regex::Regex;

use crate::index::MIN_WORD_CHARS;

/// Maximal runs of three or more Devanagari code points.
static DEVANAGARI_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{0900}-\u{097F}]{3,}").expect("valid devanagari pattern"));

/// Sentence markers, Latin punctuation, quotes and dashes trimmed off a run.
pub(crate) const PUNCTUATION: &[char] = &[
    '।', '॥', '.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\'', '—', '–',
];

pub fn is_devanagari(ch: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&ch)
}

pub(crate) fn is_punctuation(ch: char) -> bool {
    PUNCTUATION.contains(&ch)
}

/// A located word occurrence inside an escaped fragment.
///
/// `start..end` are byte offsets into the fragment; `end` is derived from the
/// cleaned text, so it only lines up with the fragment when nothing was
/// removed from the middle of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'t> {
    pub raw: &'t str,
    pub cleaned: String,
    pub start: usize,
    pub end: usize,
}

/// Finds every word candidate in `escaped`, skipping the word being defined.
pub fn scan<'t>(escaped: &'t str, current_word: Option<&str>) -> Vec<Candidate<'t>> {
    DEVANAGARI_RUN
        .find_iter(escaped)
        .filter_map(|found| {
            let raw = found.as_str();
            let leading = raw.len() - raw.trim_start_matches(is_punctuation).len();
            let cleaned: String = raw
                .trim_matches(is_punctuation)
                .chars()
                .filter(|&ch| !is_punctuation(ch))
                .collect();
            if cleaned.chars().count() < MIN_WORD_CHARS || Some(cleaned.as_str()) == current_word {
                return None;
            }
            let start = found.start() + leading;
            let end = start + cleaned.len();
            Some(Candidate {
                raw,
                cleaned,
                start,
                end,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(candidates: &[Candidate<'_>]) -> Vec<String> {
        candidates.iter().map(|c| c.cleaned.clone()).collect()
    }

    #[test]
    fn finds_maximal_runs() {
        let text = "कामको काम गर्नु";
        let found = scan(text, None);
        assert_eq!(words(&found), vec!["कामको", "काम", "गर्नु"]);
        assert_eq!(found[1].start, "कामको ".len());
        assert_eq!(&text[found[1].start..found[1].end], "काम");
    }

    #[test]
    fn trims_danda_and_keeps_offsets() {
        let text = "॥काम।";
        let found = scan(text, None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].raw, "॥काम।");
        assert_eq!(found[0].cleaned, "काम");
        assert_eq!(&text[found[0].start..found[0].end], "काम");
    }

    #[test]
    fn drops_interior_danda() {
        let found = scan("काम।गर", None);
        assert_eq!(words(&found), vec!["कामगर"]);
    }

    #[test]
    fn skips_short_and_current_word() {
        assert!(scan("मा घर", None).is_empty());
        assert!(scan("काम।", Some("काम")).is_empty());
        assert_eq!(words(&scan("काम घरबार", Some("काम"))), vec!["घरबार"]);
    }

    #[test]
    fn ignores_latin_text() {
        assert!(scan("plain &amp; simple", None).is_empty());
    }
}
