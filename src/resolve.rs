use std::cmp::Reverse;
use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::index::{DictionaryIndex, MIN_WORD_CHARS};
use crate::scan::Candidate;
use crate::suffix::SuffixTable;

/// Candidates must be longer than this (in characters) to try the prefix fallback.
const PREFIX_FALLBACK_MIN_CHARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Exact,
    Root,
    Prefix,
}

impl LinkKind {
    /// Root and prefix links may be followed directly by a suffix.
    pub fn tolerates_suffix(self) -> bool {
        matches!(self, LinkKind::Root | LinkKind::Prefix)
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKind::Exact => write!(f, "exact"),
            LinkKind::Root => write!(f, "root"),
            LinkKind::Prefix => write!(f, "prefix"),
        }
    }
}

/// A candidate mapped onto an index entry.
///
/// `target` is the text expected at `start..end` in the fragment (the cleaned
/// word, or its root/prefix portion).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<'i> {
    pub target: String,
    pub filename: &'i str,
    pub kind: LinkKind,
    pub start: usize,
    pub end: usize,
}

impl Resolved<'_> {
    pub fn char_len(&self) -> usize {
        self.target.chars().count()
    }
}

/// Index view for one linking call: the word being defined is never a target.
#[derive(Clone, Copy)]
pub struct Lookup<'i, 'w> {
    index: &'i DictionaryIndex,
    current_word: Option<&'w str>,
}

impl<'i, 'w> Lookup<'i, 'w> {
    pub fn new(index: &'i DictionaryIndex, current_word: Option<&'w str>) -> Self {
        Self {
            index,
            current_word,
        }
    }

    fn get(&self, word: &str) -> Option<&'i str> {
        if self.current_word == Some(word) {
            return None;
        }
        self.index.get(word)
    }
}

/// Tries exact, root and prefix strategies in that order.
pub fn resolve<'i>(
    candidate: &Candidate<'_>,
    lookup: &Lookup<'i, '_>,
    suffixes: &SuffixTable,
) -> Option<Resolved<'i>> {
    let cleaned = candidate.cleaned.as_str();
    if let Some(filename) = lookup.get(cleaned) {
        return Some(Resolved {
            target: cleaned.to_string(),
            filename,
            kind: LinkKind::Exact,
            start: candidate.start,
            end: candidate.end,
        });
    }
    resolve_root(candidate, lookup, suffixes).or_else(|| resolve_prefix(candidate, lookup, suffixes))
}

fn resolve_root<'i>(
    candidate: &Candidate<'_>,
    lookup: &Lookup<'i, '_>,
    suffixes: &SuffixTable,
) -> Option<Resolved<'i>> {
    let root = first_root(&candidate.cleaned, suffixes)?;
    lookup
        .get(root)
        .map(|filename| shrunk(candidate, root, filename, LinkKind::Root))
}

/// Root left by the longest matching suffix, provided it keeps at least
/// [`MIN_WORD_CHARS`] characters and the word is more than two characters
/// longer than the suffix. Only this one split is checked against the index;
/// the prefix fallback covers the others.
fn first_root<'c>(cleaned: &'c str, suffixes: &SuffixTable) -> Option<&'c str> {
    let cleaned_chars = cleaned.chars().count();
    suffixes.longest_first().iter().find_map(|suffix| {
        let root = cleaned.strip_suffix(suffix)?;
        let long_enough = cleaned_chars > suffix.chars().count() + 2
            && root.chars().count() >= MIN_WORD_CHARS;
        long_enough.then_some(root)
    })
}

fn resolve_prefix<'i>(
    candidate: &Candidate<'_>,
    lookup: &Lookup<'i, '_>,
    suffixes: &SuffixTable,
) -> Option<Resolved<'i>> {
    let cleaned = candidate.cleaned.as_str();
    if cleaned.chars().count() < PREFIX_FALLBACK_MIN_CHARS {
        return None;
    }
    suffixes.ordered().iter().find_map(|suffix| {
        let prefix = cleaned.strip_suffix(suffix)?;
        if prefix.chars().count() < MIN_WORD_CHARS {
            return None;
        }
        lookup
            .get(prefix)
            .map(|filename| shrunk(candidate, prefix, filename, LinkKind::Prefix))
    })
}

fn shrunk<'i>(candidate: &Candidate<'_>, head: &str, filename: &'i str, kind: LinkKind) -> Resolved<'i> {
    Resolved {
        target: head.to_string(),
        filename,
        kind,
        start: candidate.start,
        end: candidate.start + head.len(),
    }
}

/// Resolves every candidate, drops duplicates of `(target, start, end)` and
/// orders the survivors by start, longer matches first.
pub fn resolve_all<'i>(
    candidates: &[Candidate<'_>],
    lookup: &Lookup<'i, '_>,
    suffixes: &SuffixTable,
) -> Vec<Resolved<'i>> {
    let mut resolved: Vec<Resolved<'i>> = candidates
        .iter()
        .filter_map(|candidate| {
            let resolved = resolve(candidate, lookup, suffixes);
            if resolved.is_none() {
                trace!(raw = candidate.raw, "no dictionary match");
            }
            resolved
        })
        .collect();
    resolved.sort_by(|a, b| {
        (a.start, Reverse(a.char_len()), a.end, &a.target)
            .cmp(&(b.start, Reverse(b.char_len()), b.end, &b.target))
    });
    resolved.dedup_by(|a, b| a.target == b.target && a.start == b.start && a.end == b.end);
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DefinitionBlock, Entry};
    use crate::scan::scan;

    fn build_index(words: &[&str]) -> DictionaryIndex {
        let entries: Vec<Entry> = words
            .iter()
            .map(|word| Entry {
                word: word.to_string(),
                definitions: vec![DefinitionBlock::default()],
            })
            .collect();
        DictionaryIndex::build(&entries).expect("index")
    }

    fn resolve_text<'i>(index: &'i DictionaryIndex, text: &str, current: Option<&str>) -> Vec<Resolved<'i>> {
        let lookup = Lookup::new(index, current);
        resolve_all(&scan(text, current), &lookup, SuffixTable::nepali())
    }

    #[test]
    fn exact_match_wins() {
        let index = build_index(&["कामको", "काम"]);
        let resolved = resolve_text(&index, "कामको", None);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].kind, LinkKind::Exact);
        assert_eq!(resolved[0].target, "कामको");
    }

    #[test]
    fn root_strips_suffix() {
        let index = build_index(&["काम"]);
        let resolved = resolve_text(&index, "कामको", None);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].kind, LinkKind::Root);
        assert_eq!(resolved[0].target, "काम");
        assert_eq!((resolved[0].start, resolved[0].end), (0, "काम".len()));
        assert_eq!(resolved[0].filename, "काम.html");
    }

    #[test]
    fn missing_root_is_not_linked() {
        let index = build_index(&["घरबा"]);
        assert!(resolve_text(&index, "घरबारसम्म", None).is_empty());

        let index = build_index(&["किताब"]);
        let resolved = resolve_text(&index, "किताबहरू", None);
        assert_eq!(resolved[0].target, "किताब");
        assert_eq!(resolved[0].kind, LinkKind::Root);
    }

    #[test]
    fn prefix_fallback_catches_other_splits() {
        let index = build_index(&["घरबा"]);
        let suffixes = SuffixTable::new(["को", "ाको"]);
        let lookup = Lookup::new(&index, None);
        // "ाको" is stripped first and leaves "घरब", which is not indexed.
        let resolved = resolve_all(&scan("घरबाको", None), &lookup, &suffixes);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].kind, LinkKind::Prefix);
        assert_eq!(resolved[0].target, "घरबा");
        assert_eq!((resolved[0].start, resolved[0].end), (0, "घरबा".len()));
    }

    #[test]
    fn two_character_roots_never_link() {
        let index = build_index(&["घर", "माया"]);
        assert!(resolve_text(&index, "घरको मालाई", None).is_empty());
    }

    #[test]
    fn current_word_is_never_a_target() {
        let index = build_index(&["काम"]);
        assert!(resolve_text(&index, "कामको कामहरू", Some("काम")).is_empty());
    }

    #[test]
    fn unknown_words_are_dropped() {
        let index = build_index(&["काम"]);
        assert!(resolve_text(&index, "गर्नु माया", None).is_empty());
    }

    #[test]
    fn results_are_ordered_by_position() {
        let index = build_index(&["काम", "घरबार"]);
        let resolved = resolve_text(&index, "घरबार र कामको", None);
        let targets: Vec<_> = resolved.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["घरबार", "काम"]);
    }
}
