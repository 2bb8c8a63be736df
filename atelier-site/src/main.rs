//! atelier-site - Artist site data inspection tool
//!
//! Runs the site's read operations and page loaders against the configured
//! backend and prints the results as JSON. Logs go to stderr (or the
//! configured log file) so stdout stays machine-readable.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use atelier_common::color::{accessible_palette, optimal_text_color, validate_accessibility};
use atelier_common::config::{self, TomlConfig};
use atelier_site::{build_source, DataAccessContext, PageLoader};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Command-line arguments for atelier-site
#[derive(Parser, Debug)]
#[command(name = "atelier-site")]
#[command(about = "Artist site data access and contrast tools")]
#[command(version)]
struct Args {
    /// TOML config file (defaults to the platform config dir)
    #[arg(short, long, global = true, env = "ATELIER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List artists sorted by name
    Artists {
        /// Only featured artists, in shuffled order
        #[arg(long)]
        featured: bool,
    },
    /// Show one artist
    Artist { id: String },
    /// List artists by record id
    ArtistsByIds {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// List every artist tag
    Tags,
    /// List reviews of an artist
    Reviews { artist: String },
    /// List services offered by an artist
    Services { artist: String },
    /// List quick facts of an artist
    Facts { artist: String },
    /// Load the home page data
    Home,
    /// Load the artists index page data
    Index,
    /// Load an artist profile page
    Profile { artist: String },
    /// Pick text colors for a background, or check a text/background pair
    Contrast {
        background: String,
        #[arg(long)]
        text: Option<String>,
    },
    /// Derive an accessible palette from a base color
    Palette { base: String },
    /// Write a default config file
    InitConfig {
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(config::default_config_path);
    let toml_config = match &config_path {
        Some(path) => config::load_toml_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TomlConfig::default(),
    };

    init_tracing(&toml_config)?;

    info!(
        "Starting atelier-site v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    // Loading ran before the subscriber existed; report it now
    match &config_path {
        Some(path) if path.exists() => info!("Loaded configuration from {}", path.display()),
        Some(path) => warn!("Config file {} not found, using defaults", path.display()),
        None => warn!("No platform config dir, using default configuration"),
    }

    match args.command {
        Command::Contrast { background, text } => match text {
            Some(text) => print_json(&validate_accessibility(&background, &text)?),
            None => print_json(&optimal_text_color(&background)),
        },
        Command::Palette { base } => print_json(&accessible_palette(&base)?),
        Command::InitConfig { path } => {
            let Some(path) = path.or(config_path) else {
                bail!("No config path given and no platform config dir available");
            };
            if path.exists() {
                bail!("Config file {} already exists", path.display());
            }
            config::write_toml_config(&TomlConfig::default(), &path)?;
            info!("Wrote default config to {}", path.display());
            Ok(())
        }
        command => run_data_command(command, &toml_config).await,
    }
}

async fn run_data_command(command: Command, toml_config: &TomlConfig) -> Result<()> {
    let context = Arc::new(DataAccessContext::from_config(toml_config));
    let pages = PageLoader::new(
        build_source(Arc::clone(&context), &toml_config.data),
        toml_config.data.fallback_data,
    );

    match command {
        Command::Artists { featured } => print_json(&context.list_artists(featured).await),
        Command::Artist { id } => print_json(&context.get_artist_by_id(&id).await),
        Command::ArtistsByIds { ids } => print_json(&context.list_artists_by_ids(&ids).await),
        Command::Tags => print_json(&context.list_all_tags().await),
        Command::Reviews { artist } => print_json(&context.list_artist_reviews(&artist).await),
        Command::Services { artist } => print_json(&context.list_artist_services(&artist).await),
        Command::Facts { artist } => print_json(&context.list_artist_quick_facts(&artist).await),
        Command::Home => print_json(&pages.load_home().await),
        Command::Index => print_json(&pages.load_artists_index().await),
        Command::Profile { artist } => print_json(&pages.load_artist_profile(&artist).await),
        Command::Contrast { .. } | Command::Palette { .. } | Command::InitConfig { .. } => {
            bail!("not a data command")
        }
    }
}

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(toml_config: &TomlConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&toml_config.logging.level));

    let writer = match &toml_config.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(toml_config.logging.file.is_none())
        .init();

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
