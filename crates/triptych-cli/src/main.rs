use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::TriptychConfig;
use triptych_core::compare::{CallOverrides, CompareOverrides, ProviderSet};
use triptych_gateway::Server;

#[derive(Parser)]
#[command(name = "triptych")]
#[command(version)]
#[command(about = "Compare one prompt across OpenAI, DeepSeek, and Gemini")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,

    /// Run one comparison from the terminal.
    ///
    /// Keys are read from OPENAI_API_KEY, DEEPSEEK_API_KEY, and
    /// GEMINI_API_KEY; providers without a key report a failed outcome.
    Compare {
        /// The prompt to fan out
        prompt: String,

        /// Override the OpenAI model
        #[arg(long)]
        openai_model: Option<String>,

        /// Override the DeepSeek model
        #[arg(long)]
        deepseek_model: Option<String>,

        /// Override the Gemini model
        #[arg(long)]
        gemini_model: Option<String>,
    },

    /// Initialize config directory and default config
    Init,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Serve => cmd_serve(&cli.config).await,
        Commands::Compare {
            prompt,
            openai_model,
            deepseek_model,
            gemini_model,
        } => cmd_compare(&cli.config, &prompt, openai_model, deepseek_model, gemini_model).await,
        Commands::Init => cmd_init().await,
        Commands::Config => cmd_config(&cli.config).await,
    }
}

fn build_provider_set(cfg: &TriptychConfig) -> ProviderSet {
    ProviderSet::from_specs(cfg.provider_specs())
        .with_deadline(Duration::from_millis(cfg.compare.timeout_ms))
}

async fn cmd_serve(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = TriptychConfig::load(config_path)?;
    let bind = cfg
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", cfg.server.bind))?;

    let providers = Arc::new(build_provider_set(&cfg));
    Server::new(bind, providers).run().await
}

async fn cmd_compare(
    config_path: &Option<PathBuf>,
    prompt: &str,
    openai_model: Option<String>,
    deepseek_model: Option<String>,
    gemini_model: Option<String>,
) -> Result<()> {
    let cfg = TriptychConfig::load(config_path)?;
    let providers = build_provider_set(&cfg);

    let overrides = CompareOverrides {
        openai: CallOverrides {
            api_key: env_key("OPENAI_API_KEY"),
            model: openai_model,
        },
        deepseek: CallOverrides {
            api_key: env_key("DEEPSEEK_API_KEY"),
            model: deepseek_model,
        },
        gemini: CallOverrides {
            api_key: env_key("GEMINI_API_KEY"),
            model: gemini_model,
        },
    };

    let comparison = providers.compare(prompt, &overrides).await?;
    println!("{}", serde_json::to_string_pretty(&comparison)?);
    Ok(())
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|key| !key.trim().is_empty())
}

async fn cmd_init() -> Result<()> {
    let config_dir = config::config_dir();
    tokio::fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        warn!("Config already exists at {}", config_path.display());
    } else {
        let default_config = include_str!("../../../config/default.toml");
        tokio::fs::write(&config_path, default_config).await?;
        info!("Created default config at {}", config_path.display());
    }

    println!("triptych initialized at {}", config_dir.display());
    println!(
        "Edit {} to adjust the bind address or provider endpoints.",
        config_path.display()
    );
    Ok(())
}

async fn cmd_config(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = TriptychConfig::load(config_path)?;
    println!("{}", toml::to_string_pretty(&cfg)?);
    Ok(())
}
