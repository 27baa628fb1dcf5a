use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sitesearch_core::persist::{load_index, save_index, IndexPaths};
use sitesearch_core::tokenizer::TokenizerConfig;
use sitesearch_core::{builder::build_index_with, search, Document, DEFAULT_LIMIT};
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a title/body inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from crawled JSON/JSONL documents
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory; any previous index there is replaced
        #[arg(long)]
        output: String,
        /// Disable English stemming
        #[arg(long, default_value_t = false)]
        no_stem: bool,
        /// Drop common English stopwords
        #[arg(long, default_value_t = false)]
        stopwords: bool,
    },
    /// Run a query against a built index
    Search {
        /// Index directory
        #[arg(long)]
        index: String,
        /// Query string
        #[arg(long)]
        q: String,
        /// Maximum number of results
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        k: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, no_stem, stopwords } => {
            let tokenizer = TokenizerConfig { stem: !no_stem, remove_stopwords: stopwords };
            build(&input, &output, tokenizer)
        }
        Commands::Search { index, q, k } => run_search(&index, &q, k),
    }
}

fn build(input: &str, output: &str, tokenizer: TokenizerConfig) -> Result<()> {
    let docs = read_documents(Path::new(input))?;
    if docs.is_empty() {
        bail!("no documents found under {input}");
    }
    tracing::info!(num_docs = docs.len(), "ingested documents");

    let index = build_index_with(docs, tokenizer)?;
    let meta = save_index(&IndexPaths::new(output), &index)?;
    tracing::info!(output, num_docs = meta.num_docs, num_terms = meta.num_terms, "index build complete");
    Ok(())
}

fn run_search(index_dir: &str, q: &str, k: usize) -> Result<()> {
    let index = load_index(&IndexPaths::new(index_dir)).with_context(|| format!("loading index from {index_dir}"))?;
    for r in search(&index, q, k) {
        if r.is_sentinel() {
            println!("{}\n  {}", r.title, r.snippet);
        } else {
            println!("{:>8.3}  {}\n          {}\n          {}", r.score, r.title, r.url, r.snippet);
        }
    }
    Ok(())
}

fn read_documents(input: &Path) -> Result<Vec<Document>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(extension(p), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        bail!("input {} does not exist", input.display());
    }

    let mut docs = Vec::new();
    for file in files {
        let before = docs.len();
        if extension(&file) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
        tracing::debug!(file = %file.display(), docs = docs.len() - before, "read input file");
    }
    Ok(docs)
}

fn extension(p: &Path) -> Option<&str> {
    p.extension().and_then(|s| s.to_str())
}

fn read_jsonl(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: Document = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), n + 1))?;
        docs.push(doc);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<Document>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => tracing::warn!(file = %file.display(), "ignoring JSON that is neither an object nor an array"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const JSONL: &str = concat!(
        r#"{"url":"/a","title":"Platypus Facts","body":"The platypus lays eggs.","links":["/b"]}"#,
        "\n\n",
        r#"{"url":"/b","title":"Unicorn","body":"Unicorns are mythical."}"#,
        "\n",
    );

    #[test]
    fn reads_jsonl_and_json_from_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("crawl.jsonl"), JSONL).unwrap();
        fs::write(dir.path().join("extra.json"), r#"[{"url":"/c","title":"","body":"c"}]"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let docs = read_documents(dir.path()).unwrap();
        let urls: Vec<&str> = docs.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, vec!["/a", "/b", "/c"]);
        assert_eq!(docs[0].links, vec!["/b"]);
        assert!(docs[1].links.is_empty());
    }

    #[test]
    fn bad_line_reports_location() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bad.jsonl");
        fs::write(&file, "{\"url\":\"/a\",\"title\":\"\",\"body\":\"\"}\nnot json\n").unwrap();
        let err = read_documents(&file).unwrap_err();
        assert!(format!("{err:#}").contains("bad.jsonl:2"));
    }

    #[test]
    fn build_then_load_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("crawl.jsonl");
        let output = dir.path().join("index");
        fs::write(&input, JSONL).unwrap();

        build(input.to_str().unwrap(), output.to_str().unwrap(), TokenizerConfig::default()).unwrap();
        let index = load_index(&IndexPaths::new(&output)).unwrap();
        assert_eq!(search(&index, "egg", 10)[0].url, "/a");
        assert!(search(&index, "dragon", 10)[0].is_sentinel());
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(read_documents(&dir.path().join("absent.jsonl")).is_err());
    }
}
