//! Operator CLI for the Marquee image cache.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use marquee_core::{
    ByteSize, ImageCacheConfig, ImageServices,
    infra::cache::{ImageCacheRoot, ImageDiskStore, image_cache_key_for},
};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "marqueectl",
    version,
    about = "Inspect and warm the Marquee image cache"
)]
struct Cli {
    /// TOML config file; defaults and MARQUEE_* variables apply without one
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Override the image cache directory
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the cache key derived from an image URL
    Key { url: String },
    /// Load an image through the cache, downloading it on a miss
    Fetch {
        url: String,
        /// Serve from the cache only; never touch the network
        #[arg(long)]
        offline: bool,
    },
    /// Show the cache location and how much is stored on disk
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee_core=info,marqueectl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Key { url } => {
            let key = image_cache_key_for(&url).with_context(|| {
                format!("cannot derive a cache key from {url}")
            })?;
            println!("{key}");
        }
        Command::Fetch { url, offline } => {
            let mut config =
                load_config(cli.config.as_deref(), cli.cache_dir)?;
            if offline {
                config.network.enabled = false;
            }
            fetch(&config, &url).await?;
        }
        Command::Stats => {
            let config = load_config(cli.config.as_deref(), cli.cache_dir)?;
            stats(&config).await?;
        }
    }

    Ok(())
}

fn load_config(
    path: Option<&Path>,
    cache_dir: Option<PathBuf>,
) -> Result<ImageCacheConfig> {
    let mut config =
        ImageCacheConfig::load(path).context("failed to load configuration")?;
    if let Some(dir) = cache_dir {
        config.cache_dir = Some(dir);
    }
    Ok(config)
}

async fn fetch(config: &ImageCacheConfig, url: &str) -> Result<()> {
    let services = ImageServices::start(config)?;
    let cancel = CancellationToken::new();

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupted; cancelling fetch");
            interrupt.cancel();
        }
    });

    let loaded = services.coordinator().load(url, &cancel).await;
    services.shutdown();
    let image = loaded.with_context(|| format!("failed to load {url}"))?;

    let key = image_cache_key_for(url)?;
    println!(
        "{}x{} ({} decoded)",
        image.width(),
        image.height(),
        ByteSize::from_usize(image.byte_size())
    );
    println!("{}", services.cache().disk().path_for(&key).display());
    Ok(())
}

async fn stats(config: &ImageCacheConfig) -> Result<()> {
    let root = config.resolved_cache_dir()?;
    let store = ImageDiskStore::new(ImageCacheRoot::new(&root));
    let usage = store.usage().await;

    println!("root: {}", root.display());
    println!("entries: {}", usage.entries);
    println!("size: {}", usage.total);
    Ok(())
}
