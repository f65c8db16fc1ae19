use clap::Parser;
use refit_core::config::{
    Config, ContentApiConfig, ExtractorConfig, InferenceConfig, PublishConfig, SearchConfig, UpdateRoute,
    DEFAULT_CONTENT_API_URL, DEFAULT_MODELS, DEFAULT_OPENAI_BASE_URL,
};
use refit_core::Result;
use refit_scrappers::{handle_command, init_logging, PipelineManager, RunSummary, ScraperCommands};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Refresh the latest article against top-ranking references", long_about = None)]
pub struct Cli {
    /// Content API base URL (`memory://` for an empty in-memory store)
    #[arg(long, env = "LARAVEL_API_URL", default_value = DEFAULT_CONTENT_API_URL)]
    api_url: String,
    /// Update endpoint: update-article or articles
    #[arg(long, env = "UPDATE_ROUTE", default_value_t = UpdateRoute::UpdateArticle)]
    update_route: UpdateRoute,
    /// Process this article instead of the latest one
    #[arg(long, env = "ARTICLE_ID")]
    article_id: Option<u64>,
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    openai_base_url: String,
    /// Candidate models, tried in order
    #[arg(long, env = "REWRITE_MODELS", value_delimiter = ',')]
    models: Vec<String>,
    #[arg(long, env = "MAX_TOKENS", default_value_t = 4000)]
    max_tokens: u32,
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,
    #[arg(long, env = "GOOGLE_SEARCH_ENGINE_ID")]
    google_search_engine_id: Option<String>,
    /// Chromium binary used by the fallback search
    #[arg(long, env = "CHROME_BIN")]
    chrome_bin: Option<PathBuf>,
    #[arg(long, env = "EXCERPT_LENGTH", default_value_t = 200)]
    excerpt_length: usize,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Refresh one article end to end
    Run {
        /// Build the update but do not send it; prints the payload instead
        #[arg(long)]
        dry_run: bool,
    },
    #[command(flatten)]
    Scrape(ScraperCommands),
}

impl Cli {
    fn config(&self) -> Config {
        let models = self
            .models
            .iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect::<Vec<_>>();

        Config {
            content_api: ContentApiConfig {
                base_url: self.api_url.clone(),
                update_route: self.update_route,
                article_id: self.article_id,
            },
            search: SearchConfig {
                api_key: self.google_api_key.clone(),
                engine_id: self.google_search_engine_id.clone(),
                browser_executable: self.chrome_bin.clone(),
                ..Default::default()
            },
            inference: InferenceConfig {
                api_key: self.openai_api_key.clone(),
                base_url: self.openai_base_url.clone(),
                models: if models.is_empty() {
                    DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
                } else {
                    models
                },
                max_tokens: self.max_tokens,
                ..Default::default()
            },
            extractor: ExtractorConfig::default(),
            publish: PublishConfig {
                excerpt_length: self.excerpt_length,
                dry_run: matches!(self.command, Commands::Run { dry_run: true }),
            },
        }
    }
}

fn report(summary: &RunSummary) -> Result<()> {
    info!("📊 Summary:");
    info!("   Original: {}", summary.original_title);
    info!("   Updated:  {}", summary.updated_title);
    info!("   References used: {}", summary.references.len());
    for reference in &summary.references {
        info!("     - {}", reference.url);
    }
    info!("   Content length: {} characters", summary.content_length);
    if summary.extraction_failures > 0 {
        info!("   Pages skipped: {}", summary.extraction_failures);
    }
    if !summary.published {
        println!("{}", serde_json::to_string_pretty(&summary.payload)?);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config();
    match cli.command {
        Commands::Run { .. } => {
            let manager = PipelineManager::from_config(&config)?;
            let summary = manager.run().await?;
            report(&summary)
        }
        Commands::Scrape(command) => handle_command(command, &config).await,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("💥 Process failed: {}", e);
        std::process::exit(1);
    }
}
