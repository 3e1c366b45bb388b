use clap::{Parser, Subcommand};
use lexiflow::api::ApiServer;
use lexiflow::config::AnalysisConfig;
use lexiflow::fetch::HttpFetcher;
use lexiflow::pipeline::DocumentSet;
use lexiflow::workflow::{
    word_frequency_registry, HistoryStore, InMemoryHistoryStore, JsonHistoryStore, RetryPolicy,
    RunRegistry, WorkflowEngine, WorkflowHost,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Distributed word-frequency analysis with a durable workflow
#[derive(Parser)]
#[command(name = "lexiflow")]
#[command(about = "Word-frequency analysis over remote documents", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP entry point
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Directory for workflow history files (in-memory when omitted)
        #[arg(long)]
        state_dir: Option<PathBuf>,

        /// Words per map bucket
        #[arg(long, default_value = "5000")]
        bucket_size: usize,
    },
    /// Run one workflow to completion and print the frequency table
    Run {
        /// JSON file mapping document names to source URIs
        #[arg(long)]
        books: PathBuf,

        /// Words per map bucket
        #[arg(long, default_value = "5000")]
        bucket_size: usize,

        /// Directory for workflow history files (in-memory when omitted)
        #[arg(long)]
        state_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(cli.verbose >= 2)
        .init();

    debug!("lexiflow started with verbosity level: {}", cli.verbose);

    let result = match cli.command {
        Commands::Serve {
            port,
            state_dir,
            bucket_size,
        } => run_serve(port, state_dir, bucket_size).await,
        Commands::Run {
            books,
            bucket_size,
            state_dir,
        } => run_once(books, bucket_size, state_dir).await,
    };

    if let Err(e) = result {
        error!("Fatal error: {}", e);
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn build_host(
    bucket_size: usize,
    state_dir: Option<PathBuf>,
) -> lexiflow::Result<Arc<WorkflowHost>> {
    let config = AnalysisConfig {
        bucket_size,
        ..AnalysisConfig::default()
    };
    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(60))?);
    let registry = word_frequency_registry(fetcher, config);

    let store: Arc<dyn HistoryStore> = match state_dir {
        Some(dir) => Arc::new(JsonHistoryStore::new(dir)),
        None => Arc::new(InMemoryHistoryStore::new()),
    };

    let engine = WorkflowEngine::new(registry, store, RunRegistry::new(), RetryPolicy::default());
    Ok(Arc::new(WorkflowHost::new(Arc::new(engine))))
}

async fn run_serve(
    port: u16,
    state_dir: Option<PathBuf>,
    bucket_size: usize,
) -> lexiflow::Result<()> {
    let host = build_host(bucket_size, state_dir)?;
    Ok(ApiServer::new(host, port).start().await?)
}

async fn run_once(
    books: PathBuf,
    bucket_size: usize,
    state_dir: Option<PathBuf>,
) -> lexiflow::Result<()> {
    let contents = tokio::fs::read_to_string(&books).await?;
    let documents: DocumentSet = serde_json::from_str(&contents)?;

    let host = build_host(bucket_size, state_dir)?;
    let table = host.run_to_completion(documents).await?;

    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}
