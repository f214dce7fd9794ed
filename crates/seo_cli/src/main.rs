use clap::Parser;
use seo_core::{Error, Result};
use seo_inference::{create_model, InferenceConfig, ModelKind};
use seo_session::{ImportMode, Session, SessionConfig};
use seo_storage::StorageKind;
use seo_web::AppState;
use std::fs;
use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

mod duration;
mod logging;

use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Analyze articles for SEO and keep the results locally", long_about = None)]
pub struct Cli {
    /// Storage backend: memory or file
    #[arg(long)]
    storage: Option<StorageKind>,
    /// Directory for the file backend
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Model to use for analysis. Available models: gemini (default), dummy
    #[arg(long)]
    model: Option<ModelKind>,
    /// How often the draft is autosaved (e.g. 2m, 90s)
    #[arg(long)]
    autosave_interval: Option<HumanDuration>,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Analyze an article file ("-" reads stdin)
    Analyze {
        file: PathBuf,
        /// Run a second, deepening pass on the result
        #[arg(long)]
        deepen: bool,
        /// Keep the result in the saved-article collection
        #[arg(long)]
        save: bool,
    },
    /// List saved articles
    List,
    /// Print a saved article and restore its text as the draft
    Show { id: String },
    /// Delete a saved article
    Delete { id: String },
    /// Write all saved articles as JSON
    Export { output: Option<PathBuf> },
    /// Load saved articles from a JSON backup
    Import {
        file: PathBuf,
        /// Keep existing articles and add only new ids
        #[arg(long)]
        merge: bool,
    },
    /// Show the autosaved draft, or replace it with a file's contents
    Draft {
        #[arg(long)]
        set: Option<PathBuf>,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

fn session_config(cli: &Cli) -> Result<SessionConfig> {
    let mut config = SessionConfig::from_env()?;
    if let Some(kind) = cli.storage {
        config.storage.kind = kind;
    }
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    if let Some(interval) = cli.autosave_interval {
        config.autosave_interval = interval.0;
    }
    Ok(config)
}

fn inference_config(cli: &Cli) -> Result<InferenceConfig> {
    let mut config = InferenceConfig::from_env()?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    Ok(config)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(fs::read_to_string(path)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli, session: Arc<Session>) -> Result<()> {
    match cli.command {
        Commands::Analyze { ref file, deepen, save } => {
            let gateway = create_model(&inference_config(&cli)?)?;
            session.set_text(read_input(file)?);
            let text = session.text();

            info!("🤖 Analyzing {} chars with {}", text.len(), gateway.name());
            let mut result = gateway.analyze(&text).await?;
            if deepen {
                info!("🔎 Deepening analysis");
                result = gateway.deepen(&result, &text).await?;
            }
            print_json(&result)?;

            if save {
                let saved = session.save(result, None)?;
                println!("Saved as {}", saved.id);
            }
        }
        Commands::List => {
            let articles = session.articles();
            if articles.is_empty() {
                println!("No saved articles");
            }
            for article in articles {
                println!(
                    "{}  {}  /{}  [{}]",
                    article.id,
                    article.result.title,
                    article.result.slug,
                    article.result.category_list().join(", ")
                );
            }
        }
        Commands::Show { id } => {
            let loaded = session.load(&id)?;
            info!(
                "🏷️ {} tags, {} categories, {} sources",
                loaded.result.tag_list().len(),
                loaded.result.category_list().len(),
                loaded.result.sources().len()
            );
            print_json(&loaded)?;
        }
        Commands::Delete { id } => {
            session.delete(&id)?;
            println!("Deleted {}", id);
        }
        Commands::Export { output } => {
            let document = session.export_pretty()?;
            match output {
                Some(path) => {
                    fs::write(&path, document)?;
                    println!("Exported {} articles to {}", session.article_count(), path.display());
                }
                None => println!("{}", document),
            }
        }
        Commands::Import { file, merge } => {
            let mode = if merge { ImportMode::Merge } else { ImportMode::Replace };
            let raw = read_input(&file)?;
            let count = session.import_str(&raw, mode)?;
            println!("Imported ({}), {} saved articles", mode, count);
        }
        Commands::Draft { set } => {
            if let Some(path) = set {
                session.set_text(read_input(&path)?);
                if session.flush_draft()?.is_none() {
                    return Err(Error::Validation("draft text is empty".to_string()));
                }
            }
            match session.last_autosave() {
                Some(at) => println!("Last autosave: {}", at.to_rfc3339()),
                None => println!("No autosaved draft"),
            }
            println!("{}", session.text());
        }
        Commands::Serve { addr } => {
            let gateway = create_model(&inference_config(&cli)?)?;
            let state = AppState::new(session.clone(), gateway);
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for shutdown signal: {}", e);
                }
            };
            seo_web::serve(addr, state, shutdown).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let config = session_config(&cli)?;
    info!("💾 Opening session ({} storage)", config.storage.kind);
    let session = Arc::new(Session::from_config(&config)?);

    let outcome = run(cli, session.clone()).await;
    session.shutdown();
    outcome
}
