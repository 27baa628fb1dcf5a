use anyhow::{Context, Result};
use clap::Parser;
use sitesearch_core::IndexHandle;
use sitesearch_crawler::{CrawlConfig, Crawler};
use sitesearch_server::pipeline::Pipeline;
use sitesearch_server::{build_app, AppState};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Site to crawl and index at startup
    #[arg(long)]
    start_url: String,
    /// Also persist each index generation to this directory
    #[arg(long)]
    index_dir: Option<String>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Crawl workers; 1 keeps strict depth-first order
    #[arg(long, default_value_t = 1)]
    concurrency: usize,
    /// Request timeout seconds
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,
    /// Stop crawling after this many pages
    #[arg(long)]
    max_pages: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let crawler = Crawler::new(CrawlConfig {
        timeout: Duration::from_secs(args.timeout_secs),
        concurrency: args.concurrency,
        max_pages: args.max_pages,
        ..CrawlConfig::default()
    })?;
    let mut pipeline = Pipeline::new(crawler, args.start_url.clone());
    if let Some(dir) = &args.index_dir {
        pipeline = pipeline.with_index_dir(dir);
    }

    tracing::info!(start_url = %args.start_url, "building search index");
    let (index, report) = pipeline.build().await.context("index build failed")?;
    tracing::info!(num_docs = report.num_docs, num_terms = report.num_terms, "search engine ready");

    let state = AppState::new(IndexHandle::new(index))
        .with_pipeline(pipeline)
        .with_admin_token(std::env::var("ADMIN_TOKEN").ok());
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
