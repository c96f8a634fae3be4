//! Static site generator for a Nepali dictionary.
//!
//! Every definition sense is scanned for other dictionary words, including
//! inflected forms such as `कामको`, and those words are rewritten into links
//! to their own pages:
//!
//! ```
//! use shabdakosh::{DictionaryIndex, Entry, Linker, parse_entries};
//!
//! let entries: Vec<Entry> =
//!     parse_entries(r#"[{"word": "काम", "definitions": [{"senses": ["श्रम"]}]}]"#).unwrap();
//! let index = DictionaryIndex::build(&entries).unwrap();
//! let html = Linker::new(&index).link_text("कामको काम गर्नु", Some("गर्नु"));
//! assert_eq!(html.matches("href=\"./काम.html\"").count(), 2);
//! assert!(html.contains("</a>को "));
//! ```

mod assets;
mod data;
mod index;
mod linker;
mod render;
mod resolve;
mod scan;
mod site;
mod slug;
mod suffix;

pub use assets::{IndexPageTemplate, SearchWorkerTemplate};
pub use data::{DefinitionBlock, Entry, parse_entries, surface_forms};
pub use index::{DictionaryIndex, MIN_WORD_CHARS};
pub use linker::{AppliedLink, LinkedFragment, Linker, escape_html};
pub use render::{PageTemplate, SearchRecord, entry_metadata, render_definitions};
pub use resolve::LinkKind;
pub use scan::{Candidate, scan};
pub use site::{
    DEFAULT_MAX_CONCURRENT_WRITES, SiteConfig, SiteError, SiteReport, generate, load_entries,
    load_inputs, search_payload, write_search_data,
};
pub use slug::{page_filename, slugify};
pub use suffix::SuffixTable;
