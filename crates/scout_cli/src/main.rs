use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use scout_core::ArticleStorage;
use scout_inference::{create_model, create_uploader, ArticleComposer, CloudinaryConfig, Config, SummaryBatch, Summarizer};
use scout_scrapers::logging::init_logging;
use scout_scrapers::{handle_search, ChromeLauncher, ScraperArgs, SearchManager};
use scout_web::{AppState, ServerConfig};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Scrape search results and summarize them with an LLM", long_about = None)]
pub struct Cli {
    /// Storage backend: memory or sqlite
    #[arg(long, default_value = "memory")]
    storage: String,

    /// Storage location, e.g. sqlite://scout.db
    #[arg(long)]
    backend_url: Option<String>,

    /// Model backend: openai or dummy
    #[arg(long, default_value = "openai")]
    model: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat model used for summaries and titles
    #[arg(long)]
    model_name: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL")]
    model_url: Option<String>,

    #[arg(long, env = "CLOUDINARY_CLOUD_NAME")]
    cloudinary_cloud_name: Option<String>,

    #[arg(long, env = "CLOUDINARY_API_KEY", hide_env_values = true)]
    cloudinary_api_key: Option<String>,

    #[arg(long, env = "CLOUDINARY_API_SECRET", hide_env_values = true)]
    cloudinary_api_secret: Option<String>,

    #[command(flatten)]
    scraper: ScraperArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "PORT", default_value_t = 5000)]
        port: u16,
        /// Allowed CORS origin; any origin when unset
        #[arg(long)]
        cors_origin: Option<String>,
    },
    /// Scrape web results and social posts for a query and store them
    Search { query: String },
    /// Merge stored batches into one summary
    Summarize {
        #[arg(required = true)]
        batch_ids: Vec<String>,
    },
}

impl Cli {
    fn inference_config(&self) -> Config {
        let mut config = Config {
            backend: self.model.clone(),
            api_key: self.api_key.clone(),
            ..Default::default()
        };
        if let Some(ref name) = self.model_name {
            config.chat_model = name.clone();
        }
        if let Some(ref url) = self.model_url {
            config.base_url = url.clone();
        }
        config
    }

    fn cloudinary_config(&self) -> Option<CloudinaryConfig> {
        match (
            &self.cloudinary_cloud_name,
            &self.cloudinary_api_key,
            &self.cloudinary_api_secret,
        ) {
            (Some(cloud), Some(key), Some(secret)) => Some(CloudinaryConfig::new(cloud, key, secret)),
            _ => None,
        }
    }

    fn search_manager(&self, storage: Arc<dyn ArticleStorage>) -> SearchManager {
        let config = self.scraper.config();
        SearchManager::new(Arc::new(ChromeLauncher::new(config.clone())), storage, config)
    }
}

async fn summarize(storage: Arc<dyn ArticleStorage>, summarizer: &Summarizer, batch_ids: &[String]) -> anyhow::Result<()> {
    let mut batches = Vec::with_capacity(batch_ids.len());
    for id in batch_ids {
        match storage.get_batch(id).await? {
            Some(batch) => batches.push(SummaryBatch::from(&batch)),
            None => bail!("Batch not found: {}", id),
        }
    }

    let summary = summarizer.summarize_batches(&batches).await?;
    let id = storage.store_summary(&summary).await?;
    info!("💾 Summary stored as {}", id);
    println!("{}", summary.content);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging("info");
    let cli = Cli::parse();

    let storage = scout_storage::create_storage(&cli.storage, cli.backend_url.as_deref())
        .await
        .with_context(|| format!("Failed to open {} storage", cli.storage))?;
    info!("✨ Storage initialized successfully (using {})", cli.storage);

    match &cli.command {
        Commands::Serve {
            host,
            port,
            cors_origin,
        } => {
            let model = create_model(&cli.inference_config())?;
            info!("🧠 Inference model initialized successfully (using {})", model.name());

            let cloudinary = cli.cloudinary_config();
            if cloudinary.is_none() {
                warn!("⚠️ Cloudinary is not configured, thumbnails keep their generated URL");
            }

            let state = AppState::new(
                storage.clone(),
                cli.search_manager(storage),
                Summarizer::new(model.clone()),
                ArticleComposer::new(model, create_uploader(cloudinary)),
            );
            let config = ServerConfig {
                host: host.clone(),
                port: *port,
                cors_origin: cors_origin.clone(),
            };
            scout_web::serve(state, &config).await?;
        }
        Commands::Search { query } => {
            let manager = cli.search_manager(storage);
            handle_search(&manager, query).await?;
        }
        Commands::Summarize { batch_ids } => {
            let model = create_model(&cli.inference_config())?;
            summarize(storage, &Summarizer::new(model), batch_ids).await?;
        }
    }

    Ok(())
}
