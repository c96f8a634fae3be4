use std::ops::Range;

use askama::Html as HtmlEscaper;
use askama::MarkupDisplay;
use serde::Serialize;
use tracing::trace;

use crate::index::DictionaryIndex;
use crate::resolve::{LinkKind, Lookup, Resolved, resolve_all};
use crate::scan::scan;
use crate::suffix::SuffixTable;

const LINK_STYLE: &str = "color: #0f62fe; text-decoration: underline;";

/// How far (in characters) a stale span may have drifted from its match.
const RELOCATE_WINDOW_CHARS: usize = 10;

/// Characters allowed directly before or after a linked word.
const BOUNDARY: &[char] = &[
    ' ', '\n', '\t', '.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\'', '—',
    '–', '।', '॥',
];

/// A link that made it into the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedLink {
    pub target: String,
    pub filename: String,
    pub kind: LinkKind,
    /// Span of the linked text in the escaped input.
    pub input_span: Range<usize>,
    /// Span of the whole anchor element in the output.
    pub output_span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedFragment {
    pub html: String,
    pub links: Vec<AppliedLink>,
}

impl LinkedFragment {
    fn unchanged(escaped: &str) -> Self {
        Self {
            html: escaped.to_string(),
            links: Vec::new(),
        }
    }
}

/// Rewrites dictionary words inside definition text into links to their pages.
///
/// Linking is a pure function of the text, the index and the current word, so
/// one `Linker` can be shared across threads once the index is built.
#[derive(Clone, Copy)]
pub struct Linker<'a> {
    index: &'a DictionaryIndex,
    suffixes: &'a SuffixTable,
}

impl<'a> Linker<'a> {
    pub fn new(index: &'a DictionaryIndex) -> Self {
        Self::with_suffixes(index, SuffixTable::nepali())
    }

    pub fn with_suffixes(index: &'a DictionaryIndex, suffixes: &'a SuffixTable) -> Self {
        Self { index, suffixes }
    }

    pub fn index(&self) -> &'a DictionaryIndex {
        self.index
    }

    /// HTML-escapes plain `text` and links it.
    pub fn link_text(&self, text: &str, current_word: Option<&str>) -> String {
        if text.is_empty() {
            return String::new();
        }
        self.link_fragment(&escape_html(text), current_word).html
    }

    /// Links an already-escaped fragment. Markup in the fragment is respected:
    /// nothing inside an open tag or glued to a `>` is linked.
    pub fn link_fragment(&self, escaped: &str, current_word: Option<&str>) -> LinkedFragment {
        if escaped.is_empty() || self.index.is_empty() {
            return LinkedFragment::unchanged(escaped);
        }
        let lookup = Lookup::new(self.index, current_word);
        let candidates = scan(escaped, current_word);
        let resolved = resolve_all(&candidates, &lookup, self.suffixes);
        let resolved_count = resolved.len();
        let accepted = arbitrate(escaped, resolved, self.suffixes);
        trace!(
            candidates = candidates.len(),
            resolved = resolved_count,
            accepted = accepted.len(),
            "linked fragment"
        );
        rewrite(escaped, accepted)
    }
}

pub fn escape_html(text: &str) -> String {
    MarkupDisplay::new_unsafe(text, HtmlEscaper).to_string()
}

struct Accepted<'i> {
    link: Resolved<'i>,
    span: Range<usize>,
}

/// Decides which resolved links survive.
///
/// Walks right to left over the immutable input so that spans committed so
/// far never move; everything is spliced in afterwards by [`rewrite`].
fn arbitrate<'i>(
    text: &str,
    resolved: Vec<Resolved<'i>>,
    suffixes: &SuffixTable,
) -> Vec<Accepted<'i>> {
    let mut committed: Vec<Range<usize>> = Vec::new();
    let mut accepted = Vec::new();
    for link in resolved.into_iter().rev() {
        let Some(span) = locate(text, &link) else {
            continue;
        };
        if inside_open_tag(text, span.start) {
            continue;
        }
        if !at_word_boundary(text, &span, link.kind, suffixes) {
            continue;
        }
        if committed.iter().any(|other| overlaps(other, &span)) {
            continue;
        }
        committed.push(span.clone());
        accepted.push(Accepted { link, span });
    }
    accepted
}

/// Confirms the expected text sits at the recorded span, or finds it nearby.
fn locate(text: &str, link: &Resolved<'_>) -> Option<Range<usize>> {
    let target = link.target.as_str();
    if text.get(link.start..link.end) == Some(target) {
        return Some(link.start..link.end);
    }
    let window_start = chars_back(text, link.start, RELOCATE_WINDOW_CHARS);
    let window_end = chars_forward(text, ceil_char_boundary(text, link.end), RELOCATE_WINDOW_CHARS);
    text[window_start..window_end].find(target).map(|offset| {
        let start = window_start + offset;
        start..start + target.len()
    })
}

fn inside_open_tag(text: &str, start: usize) -> bool {
    let before = &text[..start];
    match before.rfind('<') {
        Some(open) => before.rfind('>').is_none_or(|close| open > close),
        None => false,
    }
}

fn at_word_boundary(
    text: &str,
    span: &Range<usize>,
    kind: LinkKind,
    suffixes: &SuffixTable,
) -> bool {
    if let Some(before) = text[..span.start].chars().next_back() {
        if !is_boundary(before) {
            return false;
        }
    }
    let rest = &text[span.end..];
    match rest.chars().next() {
        None => true,
        Some(after) if is_boundary(after) => true,
        Some(_) => kind.tolerates_suffix() && suffixes.starts_any(rest),
    }
}

fn is_boundary(ch: char) -> bool {
    BOUNDARY.contains(&ch)
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Splices anchors for the accepted links into `text` in one left-to-right pass.
fn rewrite(text: &str, mut accepted: Vec<Accepted<'_>>) -> LinkedFragment {
    if accepted.is_empty() {
        return LinkedFragment::unchanged(text);
    }
    accepted.sort_by_key(|item| item.span.start);
    let mut html = String::with_capacity(text.len() + accepted.len() * 96);
    let mut links = Vec::with_capacity(accepted.len());
    let mut cursor = 0;
    for Accepted { link, span } in accepted {
        html.push_str(&text[cursor..span.start]);
        let anchor_start = html.len();
        push_anchor(&mut html, link.filename, &text[span.clone()]);
        links.push(AppliedLink {
            target: link.target,
            filename: link.filename.to_string(),
            kind: link.kind,
            input_span: span.clone(),
            output_span: anchor_start..html.len(),
        });
        cursor = span.end;
    }
    html.push_str(&text[cursor..]);
    LinkedFragment { html, links }
}

fn push_anchor(html: &mut String, filename: &str, label: &str) {
    html.push_str("<a href=\"./");
    html.push_str(filename);
    html.push_str("\" style=\"");
    html.push_str(LINK_STYLE);
    html.push_str("\">");
    html.push_str(label);
    html.push_str("</a>");
}

fn chars_back(text: &str, from: usize, count: usize) -> usize {
    text[..from]
        .char_indices()
        .rev()
        .take(count)
        .last()
        .map_or(from, |(idx, _)| idx)
}

fn chars_forward(text: &str, from: usize, count: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(count)
        .map_or(text.len(), |(idx, _)| from + idx)
}

fn ceil_char_boundary(text: &str, idx: usize) -> usize {
    (idx.min(text.len())..text.len())
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(text.len())
}
