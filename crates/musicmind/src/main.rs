use anyhow::Result;
use clap::{Parser, Subcommand};
use musicmind_common::{logger, AppConfig};
use musicmind_embed::build_embedder;
use musicmind_search::SearchService;
use std::path::PathBuf;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    if let Some(root) = find_project_root() {
        let env_path = root.join(".env");
        if env_path.exists() {
            dotenv::from_path(&env_path).ok();
        }
    } else {
        // Fallback to default dotenv behavior
        dotenv::dotenv().ok();
    }
}

#[derive(Parser)]
#[command(name = "musicmind")]
#[command(about = "MusicMind - semantic song search over a fixed catalog", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// Song catalog JSON file
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Embed the catalog before accepting requests
        #[arg(long)]
        preload: bool,
    },

    /// Run a single query against the catalog and print the results
    Search {
        /// Query text
        query: String,

        /// Number of results
        #[arg(long, short = 'k')]
        top_k: Option<usize>,

        /// Song catalog JSON file
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv_from_project_root();

    match cli.command {
        Some(Commands::Serve { host, port, catalog, preload }) => {
            let mut config = AppConfig::from_env()?;

            // Override with CLI arguments
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            if let Some(catalog) = catalog {
                config.catalog_path = catalog;
            }
            config.preload_catalog |= preload;
            config.validate()?;

            serve(config).await?;
        }
        Some(Commands::Search { query, top_k, catalog }) => {
            let mut config = AppConfig::from_env()?;
            if let Some(catalog) = catalog {
                config.catalog_path = catalog;
            }

            logger::setup_console_logging(&config.log_level)?;

            let top_k = top_k.unwrap_or(config.default_top_k);
            let embedder = build_embedder(&config)?;
            let service = SearchService::new(&config.catalog_path, embedder);

            let results = service.search(&query, top_k).await?;

            if results.is_empty() {
                println!("No results for {:?}", query);
            }
            for (rank, result) in results.iter().enumerate() {
                println!(
                    "{:>2}. {:.4}  {} - {} (id {})",
                    rank + 1,
                    result.score,
                    result.title,
                    result.artist,
                    result.id
                );
            }
        }
        None => {
            // Default: start server with configuration from the environment
            let config = AppConfig::from_env()?;
            serve(config).await?;
        }
    }

    Ok(())
}

async fn serve(config: AppConfig) -> Result<()> {
    logger::setup_logging(&config.log_dir, &config.log_level)?;

    tracing::info!("MusicMind starting...");
    tracing::info!("Configuration loaded:");
    tracing::info!("  Bind: {}", config.server_bind_address());
    tracing::info!("  Catalog: {}", config.catalog_path.display());
    tracing::info!("  Embedding: {:?} ({})", config.embedding_backend, config.embedding_model);

    println!("Server listening on http://{}", config.server_bind_address());

    musicmind_server::start_server(config).await?;
    Ok(())
}
