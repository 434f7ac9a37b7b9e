//! parodist command-line client.
//!
//! Runs the extract-then-synthesize pipeline in-process, writes the parody to
//! a file, and keeps a local cache of generated results.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use parodist_client::{ParodyPipeline, canonicalize};
use parodist_core::{AppConfig, Error};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod cache;

use cache::{CachedParody, ResultCache, write_file};

/// Turn a web page into a parody that keeps its look.
#[derive(Debug, Parser)]
#[command(name = "parodist", version, about)]
struct Cli {
    /// Page to parody (absolute http/https URL).
    url: String,

    /// Where to write the generated HTML.
    #[arg(short, long, default_value = "parody.html")]
    output: PathBuf,

    /// Model override.
    #[arg(short, long)]
    model: Option<String>,

    /// Skip capturing the rendered markup.
    #[arg(long)]
    no_markup: bool,

    /// Ignore any cached result for this URL.
    #[arg(long)]
    refresh: bool,

    /// Print the page fingerprint as JSON and stop.
    #[arg(long)]
    fingerprint_only: bool,

    /// Result cache directory.
    #[arg(long, env = "PARODIST_CACHE_DIR", default_value = ".parodist-cache")]
    cache_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let pipeline = ParodyPipeline::from_config(&config)?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let limit = config.request_timeout();

    if cli.fingerprint_only {
        let fingerprint = bounded(limit, &cancel, pipeline.fingerprint(&cli.url, !cli.no_markup, &cancel)).await?;
        println!("{}", serde_json::to_string_pretty(&fingerprint)?);
        return Ok(());
    }

    let canonical = canonicalize(&cli.url).map_err(|e| Error::InvalidInput(e.to_string()))?;
    let cache = ResultCache::new(&cli.cache_dir);
    let model = cli.model.clone().unwrap_or_else(|| config.model.clone());

    let cached = if cli.refresh { None } else { cache.get(canonical.as_str()).await };

    let html = match cached {
        Some(entry) => {
            tracing::info!(url = %entry.url, generated_at = %entry.generated_at, "using cached parody");
            entry.html
        }
        None => {
            let html = bounded(limit, &cancel, async {
                let fingerprint = pipeline.fingerprint(canonical.as_str(), !cli.no_markup, &cancel).await?;
                pipeline.synthesizer.synthesize(&fingerprint, Some(&model), &cancel).await
            })
            .await?;

            let entry = CachedParody { url: canonical.to_string(), model, generated_at: Utc::now(), html };
            if let Err(e) = cache.put(&entry).await {
                tracing::warn!(error = %e, "failed to cache parody");
            }
            entry.html
        }
    };

    if html.is_empty() {
        eprintln!("The model returned an empty parody for {canonical}.");
    }

    write_file(&cli.output, html.as_bytes())
        .await
        .with_context(|| format!("writing {}", cli.output.display()))?;
    println!("Wrote parody of {canonical} to {}", cli.output.display());

    Ok(())
}

/// Run `work` under `limit`. On expiry the token is cancelled and the work is
/// awaited once more so it can release its browser session.
async fn bounded<T>(
    limit: Duration, cancel: &CancellationToken, work: impl Future<Output = Result<T, Error>>,
) -> Result<T, Error> {
    tokio::pin!(work);

    tokio::select! {
        result = &mut work => return result,
        _ = tokio::time::sleep(limit) => {}
    }

    cancel.cancel();
    let _ = work.await;
    Err(Error::Timeout(limit.as_millis() as u64))
}
