use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use askama::Template;
use flate2::Compression;
use flate2::write::GzEncoder;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rayon::{ThreadPoolBuildError, ThreadPoolBuilder};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assets::{
    INDEX_FILE, IndexPageTemplate, SEARCH_DATA_FILE, SEARCH_DATA_GZ_FILE, SEARCH_WORKER_FILE,
    SearchWorkerTemplate,
};
use crate::data::{Entry, parse_entries};
use crate::index::DictionaryIndex;
use crate::linker::Linker;
use crate::render::{PageTemplate, SearchRecord, entry_metadata, render_definitions};
use crate::slug::page_filename;

pub const DEFAULT_MAX_CONCURRENT_WRITES: usize = 64;

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub data_path: PathBuf,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
    /// Size of the page-writer pool, which caps simultaneously open files.
    pub max_concurrent_writes: usize,
    pub show_progress: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("shabdakosh.json"),
            template_path: PathBuf::from("template.html"),
            output_dir: PathBuf::from("output"),
            max_concurrent_writes: DEFAULT_MAX_CONCURRENT_WRITES,
            show_progress: true,
        }
    }
}

#[derive(Debug)]
pub enum SiteError {
    TemplateNotFound(PathBuf),
    DataNotFound(PathBuf),
    InvalidData {
        path: PathBuf,
        source: serde_json::Error,
    },
    EmptyDictionary,
    Index(fst::Error),
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Payload(serde_json::Error),
    Render(askama::Error),
    ThreadPool(ThreadPoolBuildError),
}

impl fmt::Display for SiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteError::TemplateNotFound(path) => {
                write!(f, "template not found: {}", path.display())
            }
            SiteError::DataNotFound(path) => write!(f, "data file not found: {}", path.display()),
            SiteError::InvalidData { path, source } => {
                write!(f, "invalid dictionary data in {}: {source}", path.display())
            }
            SiteError::EmptyDictionary => write!(f, "dictionary has no entries"),
            SiteError::Index(err) => write!(f, "failed to build dictionary index: {err}"),
            SiteError::Io { path, source } => write!(f, "io error at {}: {source}", path.display()),
            SiteError::Payload(err) => write!(f, "failed to encode search data: {err}"),
            SiteError::Render(err) => write!(f, "failed to render asset: {err}"),
            SiteError::ThreadPool(err) => write!(f, "failed to start page writers: {err}"),
        }
    }
}

impl std::error::Error for SiteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SiteError::InvalidData { source, .. } => Some(source),
            SiteError::Io { source, .. } => Some(source),
            SiteError::Index(err) => Some(err),
            SiteError::Payload(err) => Some(err),
            SiteError::Render(err) => Some(err),
            SiteError::ThreadPool(err) => Some(err),
            SiteError::TemplateNotFound(_)
            | SiteError::DataNotFound(_)
            | SiteError::EmptyDictionary => None,
        }
    }
}

impl From<fst::Error> for SiteError {
    fn from(value: fst::Error) -> Self {
        SiteError::Index(value)
    }
}

impl From<askama::Error> for SiteError {
    fn from(value: askama::Error) -> Self {
        SiteError::Render(value)
    }
}

impl From<ThreadPoolBuildError> for SiteError {
    fn from(value: ThreadPoolBuildError) -> Self {
        SiteError::ThreadPool(value)
    }
}

/// Summary of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteReport {
    pub entries: usize,
    pub indexed_words: usize,
    pub pages: usize,
    pub skipped_duplicates: usize,
    pub output_dir: PathBuf,
    pub elapsed_ms: u64,
}

/// Builds the whole static site described by `config`.
pub fn generate(config: &SiteConfig) -> Result<SiteReport, SiteError> {
    let started = Instant::now();
    let (template, entries) = load_inputs(config)?;
    let index = DictionaryIndex::build(&entries)?;
    info!(
        entries = entries.len(),
        words = index.len(),
        "dictionary index ready"
    );

    create_dir(&config.output_dir)?;
    let (pages, skipped_duplicates) = plan_pages(&entries);
    if skipped_duplicates > 0 {
        warn!(
            skipped = skipped_duplicates,
            "surface forms sharing a page filename were written once"
        );
    }

    let records = write_pages(config, &template, &index, &pages)?;
    write_search_data(&config.output_dir, &records)?;
    write_assets(&config.output_dir, records.len())?;

    let report = SiteReport {
        entries: entries.len(),
        indexed_words: index.len(),
        pages: records.len(),
        skipped_duplicates,
        output_dir: config.output_dir.clone(),
        elapsed_ms: started.elapsed().as_millis() as u64,
    };
    info!(
        pages = report.pages,
        elapsed_ms = report.elapsed_ms,
        output = %config.output_dir.display(),
        "site generated"
    );
    Ok(report)
}

/// Reads the page template and the dictionary concurrently.
pub fn load_inputs(config: &SiteConfig) -> Result<(PageTemplate, Vec<Entry>), SiteError> {
    let (template, entries) = rayon::join(
        || read_template(&config.template_path),
        || load_entries(&config.data_path),
    );
    let template = template?;
    let entries = entries?;
    if entries.is_empty() {
        return Err(SiteError::EmptyDictionary);
    }
    debug!(
        template_bytes = template.source().len(),
        entries = entries.len(),
        "inputs loaded"
    );
    Ok((template, entries))
}

fn read_template(path: &Path) -> Result<PageTemplate, SiteError> {
    match fs::read_to_string(path) {
        Ok(source) => Ok(PageTemplate::new(source)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(SiteError::TemplateNotFound(path.to_path_buf()))
        }
        Err(source) => Err(SiteError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Reads and parses the dictionary dump.
pub fn load_entries(path: &Path) -> Result<Vec<Entry>, SiteError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(SiteError::DataNotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(SiteError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    parse_entries(&json).map_err(|source| SiteError::InvalidData {
        path: path.to_path_buf(),
        source,
    })
}

/// One page per surface form, in entry order. A filename claimed by an
/// earlier form is not written again.
fn plan_pages(entries: &[Entry]) -> (Vec<(&Entry, &str)>, usize) {
    let mut seen = HashSet::new();
    let mut pages = Vec::new();
    let mut skipped = 0;
    for entry in entries {
        for word in entry.surface_forms() {
            if seen.insert(page_filename(word)) {
                pages.push((entry, word));
            } else {
                skipped += 1;
            }
        }
    }
    (pages, skipped)
}

fn write_pages(
    config: &SiteConfig,
    template: &PageTemplate,
    index: &DictionaryIndex,
    pages: &[(&Entry, &str)],
) -> Result<Vec<SearchRecord>, SiteError> {
    let writers = config.max_concurrent_writes.max(1);
    let pool = ThreadPoolBuilder::new()
        .num_threads(writers)
        .thread_name(|idx| format!("page-writer-{idx}"))
        .build()?;
    let progress = progress_bar(pages.len() as u64, config.show_progress);
    let linker = Linker::new(index);
    debug!(pages = pages.len(), writers, "writing word pages");

    let records = pool.install(|| {
        pages
            .par_iter()
            .map(|&(entry, word)| {
                let main_def_p = render_definitions(&entry.definitions, &linker, word);
                let html = template.render(word, &main_def_p);
                let record = entry_metadata(entry, word);
                write_file(&config.output_dir.join(&record.slug), html.as_bytes())?;
                progress.inc(1);
                Ok(record)
            })
            .collect::<Result<Vec<_>, SiteError>>()
    });
    match &records {
        Ok(_) => progress.finish_with_message("Pages written"),
        Err(_) => progress.abandon_with_message("Page generation failed"),
    }
    records
}

fn progress_bar(len: u64, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | ETA: {eta}")
    {
        bar.set_style(style.progress_chars("=>-"));
    }
    bar.set_message("Generating pages");
    bar
}

/// The search payload module: `export const WORDS = [...];`.
pub fn search_payload(records: &[SearchRecord]) -> Result<String, SiteError> {
    let json = serde_json::to_string(records).map_err(SiteError::Payload)?;
    Ok(format!("export const WORDS = {json};\n"))
}

/// Writes the search payload and its gzip twin.
pub fn write_search_data(output_dir: &Path, records: &[SearchRecord]) -> Result<(), SiteError> {
    let payload = search_payload(records)?;
    write_file(&output_dir.join(SEARCH_DATA_FILE), payload.as_bytes())?;

    let gz_path = output_dir.join(SEARCH_DATA_GZ_FILE);
    let io_err = |source| SiteError::Io {
        path: gz_path.clone(),
        source,
    };
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(payload.as_bytes()).map_err(io_err)?;
    let compressed = encoder.finish().map_err(io_err)?;
    write_file(&gz_path, &compressed)?;
    debug!(
        records = records.len(),
        plain_bytes = payload.len(),
        gzip_bytes = compressed.len(),
        "search data written"
    );
    Ok(())
}

fn write_assets(output_dir: &Path, entry_count: usize) -> Result<(), SiteError> {
    let worker = SearchWorkerTemplate::default().render()?;
    write_file(&output_dir.join(SEARCH_WORKER_FILE), worker.as_bytes())?;
    let index_page = IndexPageTemplate::new(entry_count).render()?;
    write_file(&output_dir.join(INDEX_FILE), index_page.as_bytes())
}

fn create_dir(path: &Path) -> Result<(), SiteError> {
    fs::create_dir_all(path).map_err(|source| SiteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), SiteError> {
    fs::write(path, contents).map_err(|source| SiteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    const TEMPLATE: &str =
        "<html><head><title>{{ page_title }}</title></head><body><h1>{{ word }}</h1>{{ grammar_tag }}{{ main_def_p }}</body></html>";

    const DATA: &str = r#"[
        {"word": "काम/कार्य", "definitions": [{"grammar": "ना.", "etymology": "सं.", "senses": ["शारीरिक श्रम", "पेसा"]}]},
        {"word": "श्रम", "definitions": [{"grammar": "ना.", "senses": ["कामको मेहनत"]}]},
        {"word": "काम", "definitions": [{"senses": ["दोहोरिएको"]}]}
    ]"#;

    fn config_in(dir: &TempDir, data: &str) -> SiteConfig {
        let data_path = dir.path().join("shabdakosh.json");
        let template_path = dir.path().join("template.html");
        fs::write(&data_path, data).expect("write data");
        fs::write(&template_path, TEMPLATE).expect("write template");
        SiteConfig {
            data_path,
            template_path,
            output_dir: dir.path().join("output"),
            max_concurrent_writes: 2,
            show_progress: false,
        }
    }

    #[test]
    fn generates_pages_search_data_and_assets() {
        let dir = TempDir::new().expect("tempdir");
        let config = config_in(&dir, DATA);
        let report = generate(&config).expect("site generated");
        assert_eq!(report.entries, 3);
        assert_eq!(report.pages, 3);
        assert_eq!(report.skipped_duplicates, 1);

        let out = &config.output_dir;
        let page = fs::read_to_string(out.join("श्रम.html")).expect("page");
        assert!(page.contains("<title>परिभाषा: श्रम</title>"));
        assert!(page.contains(r#"<span class="gram-tag">[ना.]</span>"#));
        assert!(page.contains(r#"<a href="./काम.html" style="color: #0f62fe; text-decoration: underline;">काम</a>को मेहनत"#));

        let first = fs::read_to_string(out.join("काम.html")).expect("page");
        assert!(first.contains("शारीरिक <a href=\"./श्रम.html\""));
        assert!(!first.contains("दोहोरिएको"));
        assert!(!first.contains("{{"));

        let plain = fs::read_to_string(out.join(SEARCH_DATA_FILE)).expect("search data");
        assert!(plain.starts_with("export const WORDS = [{\"word\":\"काम\""));
        assert!(plain.ends_with(";\n"));

        let mut inflated = String::new();
        GzDecoder::new(fs::File::open(out.join(SEARCH_DATA_GZ_FILE)).expect("gz"))
            .read_to_string(&mut inflated)
            .expect("inflate");
        assert_eq!(inflated, plain);

        assert!(out.join(SEARCH_WORKER_FILE).is_file());
        let index_page = fs::read_to_string(out.join(INDEX_FILE)).expect("index");
        assert!(index_page.contains("3 शब्दहरूमध्ये"));
    }

    #[test]
    fn missing_inputs_are_reported() {
        let dir = TempDir::new().expect("tempdir");
        let mut config = config_in(&dir, DATA);
        config.template_path = dir.path().join("missing.html");
        assert!(matches!(generate(&config), Err(SiteError::TemplateNotFound(_))));

        let mut config = config_in(&dir, DATA);
        config.data_path = dir.path().join("missing.json");
        assert!(matches!(generate(&config), Err(SiteError::DataNotFound(_))));
    }

    #[test]
    fn malformed_and_empty_data_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let config = config_in(&dir, r#"[{"word": "काम"}]"#);
        let err = generate(&config).expect_err("missing definitions");
        assert!(matches!(err, SiteError::InvalidData { .. }));
        assert!(err.to_string().contains("invalid dictionary data"));

        let config = config_in(&dir, "[]");
        assert!(matches!(generate(&config), Err(SiteError::EmptyDictionary)));
    }

    #[test]
    fn search_payload_keeps_devanagari_readable() {
        let records = vec![SearchRecord {
            word: "काम".to_string(),
            slug: "काम.html".to_string(),
            grammar: String::new(),
            preview: "श्रम".to_string(),
        }];
        let payload = search_payload(&records).expect("payload");
        assert_eq!(
            payload,
            "export const WORDS = [{\"word\":\"काम\",\"slug\":\"काम.html\",\"grammar\":\"\",\"preview\":\"श्रम\"}];\n"
        );
    }
}
