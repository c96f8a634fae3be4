use std::cmp;
use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::json;
use shabdakosh::{DictionaryIndex, Linker, SiteConfig, generate, load_entries};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "shabdakosh",
    about = "Build the cross-linked Nepali dictionary site",
    version
)]
pub struct Cli {
    /// Emit JSON instead of human-readable tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate every word page, the search payload and the landing page.
    Build {
        /// Dictionary dump (JSON array of entries).
        #[arg(long, default_value = "shabdakosh.json")]
        data: PathBuf,
        /// Word page template.
        #[arg(long, default_value = "template.html")]
        template: PathBuf,
        /// Directory the site is written to.
        #[arg(long, default_value = "output")]
        output: PathBuf,
        /// Upper bound on pages written at the same time.
        #[arg(long, default_value_t = shabdakosh::DEFAULT_MAX_CONCURRENT_WRITES)]
        max_concurrent_writes: usize,
        /// Hide the progress bar.
        #[arg(long)]
        no_progress: bool,
    },
    /// Link dictionary words inside one definition sense.
    Link {
        /// Dictionary dump used to build the index.
        #[arg(long, default_value = "shabdakosh.json")]
        data: PathBuf,
        /// Headword the sense belongs to; it is never linked.
        #[arg(long)]
        current_word: Option<String>,
        /// Plain sense text.
        text: String,
    },
    /// Look up page filenames for exact word matches.
    Lookup {
        #[arg(long, default_value = "shabdakosh.json")]
        data: PathBuf,
        /// One or more words to look up.
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// List indexed words that start with the provided prefix.
    Prefix {
        #[arg(long, default_value = "shabdakosh.json")]
        data: PathBuf,
        /// Prefix to search for.
        prefix: String,
        /// Maximum number of matches to return.
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing();
    match cli.command {
        Command::Build {
            data,
            template,
            output,
            max_concurrent_writes,
            no_progress,
        } => {
            let config = SiteConfig {
                data_path: data,
                template_path: template,
                output_dir: output,
                max_concurrent_writes,
                show_progress: !no_progress && !cli.json,
            };
            handle_build(&config, cli.json)
        }
        Command::Link {
            data,
            current_word,
            text,
        } => handle_link(&data, current_word.as_deref(), &text, cli.json),
        Command::Lookup { data, words } => handle_lookup(&data, words, cli.json),
        Command::Prefix {
            data,
            prefix,
            limit,
        } => handle_prefix(&data, prefix, limit, cli.json),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_index(data: &Path) -> Result<DictionaryIndex, Box<dyn Error>> {
    let entries = load_entries(data)?;
    Ok(DictionaryIndex::build(&entries)?)
}

fn handle_build(config: &SiteConfig, as_json: bool) -> Result<(), Box<dyn Error>> {
    let report = generate(config)?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Wrote {} pages for {} entries ({} indexed words) to {} in {} ms.",
            report.pages,
            report.entries,
            report.indexed_words,
            report.output_dir.display(),
            report.elapsed_ms
        );
        if report.skipped_duplicates > 0 {
            println!(
                "Skipped {} surface forms whose page was already written.",
                report.skipped_duplicates
            );
        }
    }
    Ok(())
}

fn handle_link(
    data: &Path,
    current_word: Option<&str>,
    text: &str,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let index = load_index(data)?;
    let linker = Linker::new(&index);
    let escaped = shabdakosh::escape_html(text);
    let linked = linker.link_fragment(&escaped, current_word);

    if as_json {
        let payload = json!({
            "text": text,
            "current_word": current_word,
            "html": linked.html,
            "links": linked.links,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{}", linked.html);
    }
    Ok(())
}

fn handle_lookup(data: &Path, words: Vec<String>, as_json: bool) -> Result<(), Box<dyn Error>> {
    let index = load_index(data)?;
    let results: Vec<(String, Option<String>)> = words
        .into_iter()
        .map(|word| {
            let filename = index.get(&word).map(str::to_string);
            (word, filename)
        })
        .collect();

    if as_json {
        let payload: Vec<_> = results
            .iter()
            .map(|(word, filename)| json!({ "word": word, "filename": filename }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_lookup_table(&results);
    }
    Ok(())
}

fn handle_prefix(
    data: &Path,
    prefix: String,
    limit: usize,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let limit = cmp::max(1, limit);
    let index = load_index(data)?;
    let matches = index.prefix(&prefix, limit);

    if as_json {
        let payload = json!({
            "prefix": prefix,
            "limit": limit,
            "results": matches.iter().map(|(word, filename)| {
                json!({"word": word, "filename": filename})
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_prefix_table(&prefix, &matches);
    }
    Ok(())
}

fn column_width<'a>(words: impl Iterator<Item = &'a str>) -> usize {
    words
        .map(|word| word.chars().count())
        .max()
        .unwrap_or(0)
        .max("WORD".len())
}

fn print_lookup_table(rows: &[(String, Option<String>)]) {
    if rows.is_empty() {
        println!("No words provided.");
        return;
    }
    let width = column_width(rows.iter().map(|(word, _)| word.as_str()));
    println!("{:<width$}  {}", "WORD", "FILENAME", width = width);
    println!("{:-<width$}  {}", "", "--------", width = width);
    for (word, filename) in rows {
        let value = filename.as_deref().unwrap_or("<missing>");
        println!("{:<width$}  {}", word, value, width = width);
    }
}

fn print_prefix_table(prefix: &str, rows: &[(String, String)]) {
    if rows.is_empty() {
        println!("No words matched prefix \"{prefix}\".");
        return;
    }
    let width = column_width(rows.iter().map(|(word, _)| word.as_str()));
    println!("Matches for prefix \"{prefix}\":");
    println!("{:<width$}  {}", "WORD", "FILENAME", width = width);
    println!("{:-<width$}  {}", "", "--------", width = width);
    for (word, filename) in rows {
        println!("{:<width$}  {}", word, filename, width = width);
    }
}
