use anyhow::Result;
use clap::Parser;
use sitesearch_core::Document;
use sitesearch_crawler::{CrawlConfig, Crawler};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "crawler")]
#[command(about = "Crawl one website into JSONL documents")]
struct Cli {
    /// URL to start from; only pages on its host are fetched
    #[arg(long)]
    start_url: String,
    /// Output JSONL file path
    #[arg(long, default_value = "./sample_data/crawl.jsonl")]
    output: String,
    /// Stop after this many pages
    #[arg(long)]
    max_pages: Option<usize>,
    /// Concurrency (number of workers); 1 keeps strict depth-first order
    #[arg(long, default_value_t = 1)]
    concurrency: usize,
    /// Request timeout seconds
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,
    /// User-Agent string to send
    #[arg(long)]
    user_agent: Option<String>,
    /// Extra path extensions to skip, in addition to pdf, jpg, png and gif
    #[arg(long = "deny-ext", value_delimiter = ',')]
    deny_ext: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let mut config = CrawlConfig {
        timeout: Duration::from_secs(args.timeout_secs),
        concurrency: args.concurrency,
        max_pages: args.max_pages,
        ..CrawlConfig::default()
    };
    if let Some(ua) = args.user_agent {
        config.user_agent = ua;
    }
    config.denied_extensions.extend(args.deny_ext);

    let crawler = Crawler::new(config)?;
    let output = crawler.crawl(&args.start_url).await;
    if output.documents.is_empty() {
        tracing::warn!(start = %args.start_url, "crawl produced no documents");
    }

    write_jsonl(Path::new(&args.output), output.documents.values())?;
    tracing::info!(documents = output.documents.len(), output = %args.output, "crawl written");
    Ok(())
}

/// One JSON document per line. An empty crawl still produces the file.
fn write_jsonl<'a>(path: &Path, docs: impl IntoIterator<Item = &'a Document>) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    for doc in docs {
        serde_json::to_writer(&mut out, doc)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_crawl_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("crawl.jsonl");
        write_jsonl(&path, std::iter::empty()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn writes_one_document_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crawl.jsonl");
        let docs = vec![
            Document { url: "http://a.test/".into(), title: "A".into(), body: "alpha".into(), links: vec![] },
            Document { url: "http://a.test/b".into(), title: "B".into(), body: "beta".into(), links: vec![] },
        ];
        write_jsonl(&path, &docs).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let back: Vec<Document> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(back.len(), 2);
        assert_eq!(back[1].title, "B");
    }
}
