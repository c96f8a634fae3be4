use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::data::{DefinitionBlock, Entry};
use crate::linker::{Linker, escape_html};
use crate::slug::page_filename;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("valid placeholder pattern"));

const PAGE_TITLE_PREFIX: &str = "परिभाषा: ";

/// Placeholders kept for older templates; they always render empty.
const RETIRED_PLACEHOLDERS: &[&str] = &["grammar_tag", "source_p", "blockquote_content"];

/// One row of the client-side search payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub word: String,
    pub slug: String,
    pub grammar: String,
    pub preview: String,
}

/// Word page template loaded at runtime.
///
/// Supports `{{ word }}`, `{{ page_title }}` and `{{ main_def_p }}`; the
/// retired placeholders render empty and anything else is left as written.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    source: String,
}

impl PageTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Fills every placeholder in one pass, so substituted values are never
    /// scanned again.
    pub fn render(&self, word: &str, main_def_p: &str) -> String {
        PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures<'_>| match &caps[1] {
                "word" => escape_html(word),
                "page_title" => escape_html(&format!("{PAGE_TITLE_PREFIX}{word}")),
                "main_def_p" => main_def_p.to_string(),
                name if RETIRED_PLACEHOLDERS.contains(&name) => String::new(),
                _ => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// Renders every definition block of an entry, linking each sense.
///
/// `current_word` is the surface form the page is written for; it is never
/// linked to itself.
pub fn render_definitions(
    blocks: &[DefinitionBlock],
    linker: &Linker<'_>,
    current_word: &str,
) -> String {
    let mut lines = Vec::new();
    for (position, block) in blocks.iter().enumerate() {
        if let Some(grammar) = block.grammar() {
            let margin = if position == 0 { "0" } else { "1.5rem" };
            lines.push(format!(
                r#"<div style="margin-top: {margin}; margin-bottom: 0.5rem;"><span class="gram-tag">[{}]</span></div>"#,
                escape_html(grammar)
            ));
        }
        for sense in &block.senses {
            let linked = linker.link_text(sense, Some(current_word));
            lines.push(format!(r#"<p class="main-definition">{linked}</p>"#));
        }
    }
    lines.join("\n")
}

/// Search metadata for the page of `word`, one of the entry's surface forms.
pub fn entry_metadata(entry: &Entry, word: &str) -> SearchRecord {
    let primary = entry.primary_block();
    SearchRecord {
        word: word.to_string(),
        slug: page_filename(word),
        grammar: primary
            .and_then(DefinitionBlock::grammar)
            .unwrap_or_default()
            .to_string(),
        preview: primary
            .and_then(DefinitionBlock::first_sense)
            .unwrap_or_default()
            .to_string(),
    }
}
