//! mediakey: keyword-addressed media collections from the terminal.
//!
//! `fetch` treats its argument as an inbound chat message, `save` files local
//! media under a keyword, `keywords` lists every collection and its aliases.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mediakey_core::{EngineConfig, Identity, SaveOutcome, SaveRequest};
use mediakey_engine::{load_item, ConsoleNotifier, Engine, StdinPrompter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mediakey")]
#[command(author, version, about = "Keyword-addressed media collections")]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (default: ~/.config/mediakey/config.toml, then MEDIAKEY_* variables)
    #[arg(short, long, global = true, env = "MEDIAKEY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a message against the collection aliases and print the picks
    Fetch {
        /// Message text, e.g. "mt3"; several words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Save local media files under a keyword
    Save {
        /// Target keyword (prompted for when omitted)
        #[arg(short, long)]
        keyword: Option<String>,

        /// Requesting user id
        #[arg(short, long, default_value = "local")]
        user: String,

        /// Requesting group id
        #[arg(short, long)]
        group: Option<String>,

        /// Requesting channel id
        #[arg(long)]
        channel: Option<String>,

        /// Display name used by the {username} placeholder
        #[arg(long)]
        name: Option<String>,

        /// Media files (prompted for when omitted)
        files: Vec<PathBuf>,
    },

    /// List collections with their aliases and item counts
    Keywords {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    // LOG_FORMAT - "json" or "text" (default: "text")
    // RUST_LOG   - standard env filter (default: "mediakey=info")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mediakey=info,mediakey_engine=info,mediakey_store=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::from_file(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::load().context("loading config")?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli.config)?;
    let engine = Engine::new();
    let notifier = ConsoleNotifier;

    match cli.command {
        Commands::Fetch { message } => {
            engine.respond(&config, &message.join(" "), &notifier).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Save {
            keyword,
            user,
            group,
            channel,
            name,
            files,
        } => {
            let mut identity = Identity::user(user);
            if let Some(group) = group {
                identity = identity.in_group(group);
            }
            if let Some(channel) = channel {
                identity = identity.in_channel(channel);
            }
            if let Some(name) = name {
                identity = identity.named(name);
            }

            let mut request = SaveRequest::new(identity);
            request.keyword = keyword;
            for file in &files {
                request = request.with_item(load_item(file).await?);
            }

            let prompter = StdinPrompter::stdin();
            let outcome = engine.save(&config, request, &notifier, &prompter).await?;
            Ok(match outcome {
                SaveOutcome::Completed(report) if report.saved_count() > 0 => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            })
        }
        Commands::Keywords { json } => {
            let keywords = engine.list_keywords(&config).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&keywords)?);
            } else {
                for k in &keywords {
                    println!("{:<20} {:<30} {}", k.name, k.aliases.join(", "), k.item_count);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
