use serde::{Deserialize, Serialize};

/// Grammar value the source dataset uses for "no category".
const GRAMMAR_PLACEHOLDER: &str = "N/A";

/// One headword group from the dictionary dump.
///
/// `word` may hold several synonyms separated by `/`; every one of them gets
/// its own page and its own slot in the [`crate::DictionaryIndex`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub word: String,
    pub definitions: Vec<DefinitionBlock>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefinitionBlock {
    #[serde(default)]
    pub grammar: Option<String>,
    #[serde(default)]
    pub etymology: Option<String>,
    #[serde(default)]
    pub senses: Vec<String>,
}

impl Entry {
    /// Surface forms of the headword: split on `/`, trimmed, empties dropped.
    pub fn surface_forms(&self) -> impl Iterator<Item = &str> + '_ {
        surface_forms(&self.word)
    }

    pub fn primary_block(&self) -> Option<&DefinitionBlock> {
        self.definitions.first()
    }
}

impl DefinitionBlock {
    /// Grammar tag, ignoring empty values and the dataset's `N/A` filler.
    pub fn grammar(&self) -> Option<&str> {
        self.grammar
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty() && *g != GRAMMAR_PLACEHOLDER)
    }

    pub fn first_sense(&self) -> Option<&str> {
        self.senses.first().map(String::as_str)
    }
}

pub fn surface_forms(word: &str) -> impl Iterator<Item = &str> + '_ {
    word.split('/').map(str::trim).filter(|w| !w.is_empty())
}

/// Parses the dictionary dump (a JSON array of entries).
pub fn parse_entries(json: &str) -> Result<Vec<Entry>, serde_json::Error> {
    serde_json::from_str(json)
}
