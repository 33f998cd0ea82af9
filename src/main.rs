//! alt-finder: alternative-product recommendations and cross-marketplace
//! seller links for a pasted product link or name.

mod config;
mod journal;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use common::{AppConfig, RecommendRequest};
use journal::{resolve_events_dir, EventJournal, JournalEvent};
use provider_client::{GeminiProvider, ScrapeProvider};
use recommendation_engine::{Orchestrator, Recommendation, ResultCache};
use seller_resolver::{SellerLookup, SellerResolver};

#[derive(Parser)]
#[command(name = "alt-finder", about = "Find alternatives to a product and where to buy them")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recommend alternatives for a product link, share text, or name.
    Recommend {
        reference: String,
        /// Device platform forwarded to the backend (defaults to config).
        #[arg(long)]
        device: Option<String>,
        /// Bypass the cache.
        #[arg(long)]
        refresh: bool,
        /// Share text that came with the link.
        #[arg(long)]
        share_text: Option<String>,
    },
    /// List marketplaces selling a product.
    Sellers {
        #[arg(long)]
        product: String,
        #[arg(long)]
        brand: String,
        /// Marketplace the user is already on; excluded from fallback links.
        #[arg(long, default_value = "amazon")]
        current_platform: String,
    },
    /// Read references from stdin, one per line, sharing one cache.
    /// A leading `!` forces a refresh; `recent` lists cached references.
    Shell,
}

struct App {
    config: AppConfig,
    orchestrator: Orchestrator,
    journal: Option<EventJournal>,
}

impl App {
    fn new(config: AppConfig) -> Result<Self> {
        if config.secondary.api_keys.is_empty() {
            warn!("No GEMINI_API_KEY configured; AI fallback will report quota errors");
        }
        let primary = ScrapeProvider::new(&config.primary).context("building primary provider")?;
        let secondary = GeminiProvider::new(&config.secondary, &config.policy)
            .context("building secondary provider")?;
        let cache = Arc::new(ResultCache::from_config(&config.cache));
        let orchestrator =
            Orchestrator::new(Arc::new(primary), Arc::new(secondary), cache, &config);

        let journal = match EventJournal::open(resolve_events_dir(std::env::var("EVENTS_DIR").ok())) {
            Ok(j) => {
                info!("Event journal: {}", j.current_file().display());
                Some(j)
            }
            Err(e) => {
                warn!("Event journal disabled: {}", e);
                None
            }
        };

        Ok(Self {
            config,
            orchestrator,
            journal,
        })
    }

    fn journal(&self, event: JournalEvent) {
        if let Some(journal) = &self.journal {
            journal.record(&event);
        }
    }

    async fn recommend(&self, request: RecommendRequest, cancel: CancellationToken) -> bool {
        match self.orchestrator.recommend(&request, cancel).await {
            Ok(rec) => {
                self.journal(JournalEvent::recommend_ok(&rec));
                print_json(&recommendation_view(&rec));
                true
            }
            Err(err) => {
                self.journal(JournalEvent::recommend_failed(&request.reference, &err));
                error!("{}", err);
                if err.is_retryable() {
                    eprintln!("No recommendations right now. Try again with --refresh.");
                }
                false
            }
        }
    }

    async fn sellers(&self, product: &str, brand: &str, current_platform: &str) -> Result<()> {
        let resolver =
            SellerResolver::from_config(&self.config.sellers).context("building seller client")?;
        let lookup = resolver.resolve(product, brand, current_platform).await;
        self.journal(JournalEvent::seller_lookup(
            product,
            brand,
            current_platform,
            &lookup,
        ));
        print_sellers(&lookup);
        Ok(())
    }

    async fn shell(&self, cancel: CancellationToken) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if cancel.is_cancelled() {
                break;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "recent" {
                print_json(&json!(self.orchestrator.cache().recent()));
                continue;
            }
            let (reference, force_refresh) = match line.strip_prefix('!') {
                Some(rest) => (rest.trim().to_string(), true),
                None => (line.to_string(), false),
            };
            let request = RecommendRequest {
                reference,
                device_platform: self.config.device.clone(),
                force_refresh,
                disambiguating_text: None,
            };
            self.recommend(request, cancel.child_token()).await;
        }
        Ok(())
    }
}

fn recommendation_view(rec: &Recommendation) -> Value {
    json!({
        "request_id": rec.request_id.to_string(),
        "origin": rec.origin.as_str(),
        "primary_failure": rec.primary_failure.as_ref().map(|e| e.to_string()),
        "elapsed_ms": rec.elapsed.as_millis() as u64,
        "result": rec.result,
    })
}

fn print_sellers(lookup: &SellerLookup) {
    if lookup.is_exclusive() {
        println!("Exclusive to the current platform; no other sellers found.");
        return;
    }
    print_json(&json!(lookup));
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => error!("failed to render output: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "alt_finder=info,recommendation_engine=info,provider_client=info,seller_resolver=info"
                    .into()
            }),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;
    info!(
        "Primary: {} ({}s), Secondary: {} ({}s, {} key(s)), accept {}..={}, cache ttl {}s",
        config.primary.base_url,
        config.primary.timeout_secs,
        config.secondary.model,
        config.secondary.timeout_secs,
        config.secondary.api_keys.len(),
        config.policy.min_accepted,
        config.policy.max_accepted,
        config.cache.ttl_secs,
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; cancelling in-flight requests");
                cancel.cancel();
            }
        });
    }

    let app = App::new(config)?;
    match cli.command {
        Command::Recommend {
            reference,
            device,
            refresh,
            share_text,
        } => {
            let request = RecommendRequest {
                reference,
                device_platform: device.unwrap_or_else(|| app.config.device.clone()),
                force_refresh: refresh,
                disambiguating_text: share_text,
            };
            if !app.recommend(request, cancel).await {
                std::process::exit(1);
            }
        }
        Command::Sellers {
            product,
            brand,
            current_platform,
        } => app.sellers(&product, &brand, &current_platform).await?,
        Command::Shell => app.shell(cancel).await?,
    }

    Ok(())
}
