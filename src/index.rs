use std::collections::BTreeMap;
use std::str;

use fst::automaton::Str;
use fst::{Automaton, IntoStreamer, Map, Streamer};
use tracing::debug;

use crate::data::Entry;
use crate::slug::page_filename;

/// Minimum length (in characters) of a word that can be registered or linked.
pub const MIN_WORD_CHARS: usize = 3;

/// Read-only map from every registered surface word to its page filename.
///
/// Built once per generation run and shared by all page renders. Keys live in
/// an FST whose values index into `filenames`.
pub struct DictionaryIndex {
    map: Map<Vec<u8>>,
    filenames: Vec<String>,
}

impl DictionaryIndex {
    /// Registers every surface form of at least [`MIN_WORD_CHARS`] characters.
    ///
    /// When two entries share a surface form the first registration wins.
    pub fn build(entries: &[Entry]) -> Result<Self, fst::Error> {
        let mut registered: BTreeMap<&str, String> = BTreeMap::new();
        let mut collisions = 0usize;
        for entry in entries {
            for word in entry.surface_forms() {
                if word.chars().count() < MIN_WORD_CHARS {
                    continue;
                }
                if registered.contains_key(word) {
                    collisions += 1;
                    continue;
                }
                registered.insert(word, page_filename(word));
            }
        }
        debug!(words = registered.len(), collisions, "built dictionary index");
        Self::from_sorted(registered)
    }

    fn from_sorted(registered: BTreeMap<&str, String>) -> Result<Self, fst::Error> {
        let mut filenames = Vec::with_capacity(registered.len());
        let mut keys = Vec::with_capacity(registered.len());
        for (word, filename) in registered {
            keys.push((word, filenames.len() as u64));
            filenames.push(filename);
        }
        let map = Map::from_iter(keys)?;
        Ok(Self { map, filenames })
    }

    /// Returns the page filename for an exact word match.
    pub fn get(&self, word: &str) -> Option<&str> {
        self.map
            .get(word)
            .and_then(|slot| self.filenames.get(slot as usize))
            .map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.map.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns up to `limit` words that start with the provided prefix, in byte order.
    pub fn prefix(&self, prefix: &str, limit: usize) -> Vec<(String, String)> {
        let automaton = Str::new(prefix).starts_with();
        let mut stream = self.map.search(automaton).into_stream();
        let mut results = Vec::new();
        while results.len() < limit {
            let Some((key, slot)) = stream.next() else {
                break;
            };
            if let (Ok(word), Some(filename)) =
                (str::from_utf8(key), self.filenames.get(slot as usize))
            {
                results.push((word.to_string(), filename.clone()));
            }
        }
        results
    }

    /// All `(word, filename)` pairs in byte order.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.prefix("", usize::MAX)
    }
}
