use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use docqa_text_chunker::{Chunker, ChunkerConfig};
use docqa_vector_store::{
    EmbeddingProvider, Ingestor, PersistenceManager, RetrievalService, StoreConfig, StubEmbedder,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::embedder::{HttpEmbedder, DEFAULT_EMBEDDING_URL, ENV_EMBEDDING_URL};

mod embedder;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Document store and similarity search for question answering", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML config file for the store
    #[arg(long, global = true, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Snapshot directory (overrides config and DOCQA_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Embedding dimension (overrides config and DOCQA_DIMENSION)
    #[arg(long, global = true)]
    dimension: Option<usize>,

    /// Embedding backend
    #[arg(long, global = true, value_enum, env = "DOCQA_EMBEDDING_MODE", default_value = "http")]
    embed_mode: EmbedMode,

    /// Embedding endpoint used in http mode
    #[arg(long, global = true, env = ENV_EMBEDDING_URL, default_value = DEFAULT_EMBEDDING_URL)]
    embed_url: String,

    /// Timeout for one embedding request (seconds)
    #[arg(long, global = true, default_value_t = 30)]
    embed_timeout_secs: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum EmbedMode {
    Http,
    Stub,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one document to the store
    Add(AddArgs),

    /// Chunk a text file and add every chunk
    Ingest(IngestArgs),

    /// Search for documents similar to a query
    Search(SearchArgs),

    /// Print the stored documents
    Inspect(InspectArgs),

    /// Show document and vector counts
    Stats(StatsArgs),
}

#[derive(Args)]
struct AddArgs {
    /// Document text
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    text: Option<String>,

    /// Read the document text from a file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct IngestArgs {
    /// UTF-8 text file extracted from a source document
    file: PathBuf,

    /// Source name used in chunk labels (defaults to the file name)
    #[arg(long)]
    name: Option<String>,

    /// Chunk size in characters
    #[arg(long, default_value_t = ChunkerConfig::default().chunk_size)]
    chunk_size: usize,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Maximum number of results (defaults to the configured top_k)
    #[arg(long, short = 'n')]
    top_k: Option<usize>,

    /// Minimum similarity score (defaults to the configured threshold)
    #[arg(long)]
    threshold: Option<f32>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct InspectArgs {
    /// Characters of each document to print
    #[arg(long, default_value_t = 500)]
    preview_chars: usize,
}

#[derive(Args)]
struct StatsArgs {
    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Add(args) => run_add(&cli, config, args).await?,
        Commands::Ingest(args) => run_ingest(&cli, config, args).await?,
        Commands::Search(args) => run_search(&cli, config, args).await?,
        Commands::Inspect(args) => run_inspect(&config, args).await?,
        Commands::Stats(args) => run_stats(&cli, config, args).await?,
    }

    Ok(())
}

/// Config file, then `DOCQA_*` environment, then command-line flags.
fn load_config(cli: &Cli) -> Result<StoreConfig> {
    let base = match &cli.config {
        Some(path) => StoreConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => StoreConfig::default(),
    };
    let mut config = base.with_env_overrides()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir.clone_from(dir);
    }
    if let Some(dimension) = cli.dimension {
        config.dimension = dimension;
    }
    config.validate()?;
    Ok(config)
}

fn build_embedder(cli: &Cli, dimension: usize) -> Result<Arc<dyn EmbeddingProvider>> {
    Ok(match cli.embed_mode {
        EmbedMode::Stub => Arc::new(StubEmbedder::new(dimension)),
        EmbedMode::Http => Arc::new(HttpEmbedder::new(
            cli.embed_url.clone(),
            Duration::from_secs(cli.embed_timeout_secs),
        )?),
    })
}

async fn open_service(cli: &Cli, config: StoreConfig) -> Result<RetrievalService> {
    let embedder = build_embedder(cli, config.dimension)?;
    RetrievalService::open(config, embedder)
        .await
        .context("Failed to open document store")
}

async fn run_add(cli: &Cli, config: StoreConfig, args: &AddArgs) -> Result<()> {
    let text = match (&args.text, &args.file) {
        (_, Some(path)) => read_text(path)?,
        (Some(text), None) => text.clone(),
        (None, None) => anyhow::bail!("Either TEXT or --file is required"),
    };

    let service = open_service(cli, config).await?;
    let added = service.add_document(&text, None).await;
    let stats = service.stats().await;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "added": added, "documents": stats.documents }))?
        );
    } else if added {
        println!("Document added ({} documents stored)", stats.documents);
    }

    if !added {
        anyhow::bail!("Failed to add document");
    }
    Ok(())
}

async fn run_ingest(cli: &Cli, config: StoreConfig, args: &IngestArgs) -> Result<()> {
    let text = read_text(&args.file)?;
    let source = match &args.name {
        Some(name) => name.clone(),
        None => args
            .file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string(),
    };
    let chunker = Chunker::new(ChunkerConfig {
        chunk_size: args.chunk_size,
    })?;

    let service = Arc::new(open_service(cli, config).await?);
    let ingestor = Ingestor::new(service, chunker);
    let report = ingestor.ingest_text(&source, &text).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Added {}/{} chunks from {}",
            report.added_chunks, report.total_chunks, report.source
        );
        if report.unsaved_chunks > 0 {
            log::warn!(
                "{} chunks are in memory only and were not saved",
                report.unsaved_chunks
            );
        }
    }
    Ok(())
}

async fn run_search(cli: &Cli, config: StoreConfig, args: &SearchArgs) -> Result<()> {
    let top_k = args.top_k.unwrap_or(config.default_top_k);
    let threshold = args
        .threshold
        .unwrap_or(config.default_similarity_threshold);

    let service = open_service(cli, config).await?;
    let hits = service.search_similar(&args.query, top_k, threshold).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else if hits.is_empty() {
        println!("No documents matched");
    } else {
        for hit in &hits {
            println!("{}. (score: {:.3})", hit.rank, hit.score);
            println!("   {}", preview(&hit.text, 200));
            println!();
        }
    }
    Ok(())
}

async fn run_inspect(config: &StoreConfig, args: &InspectArgs) -> Result<()> {
    let persistence = PersistenceManager::new(config);
    println!("Checking snapshot at: {}", config.data_dir.display());

    match persistence.try_load().await {
        Ok(Some(corpus)) => {
            let documents = corpus.documents();
            println!("Total documents stored: {}", documents.len());
            for (i, doc) in documents.iter().enumerate() {
                println!();
                println!("--- Document {} ---", i + 1);
                println!("{}", preview(doc, args.preview_chars));
            }
        }
        Ok(None) => {
            println!(
                "Snapshot not found (expected {} and {})",
                persistence.index_path().display(),
                persistence.documents_path().display()
            );
        }
        Err(err) => {
            println!("Error reading snapshot: {err}");
            if let Ok(entries) = std::fs::read_dir(&config.data_dir) {
                let names: Vec<String> = entries
                    .flatten()
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect();
                println!("Files in data directory: {names:?}");
            }
            anyhow::bail!("Snapshot is unreadable");
        }
    }
    Ok(())
}

async fn run_stats(cli: &Cli, config: StoreConfig, args: &StatsArgs) -> Result<()> {
    let service = open_service(cli, config).await?;
    let stats = service.stats().await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Documents: {}", stats.documents);
        println!("Vectors:   {}", stats.vectors);
        println!("Dimension: {}", stats.dimension);
    }
    Ok(())
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
