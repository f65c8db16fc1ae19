use std::sync::Arc;
use clap::Subcommand;
use refit_core::config::Config;
use refit_core::Result;
use crate::extract::ContentExtractor;
use crate::search::{BrowserSearchProvider, GoogleSearchProvider, ReferenceLocator};

#[derive(Subcommand, Debug, Clone)]
pub enum ScraperCommands {
    /// Print the structured text extracted from a single page
    Extract {
        url: String,
    },
    /// Print the reference pages located for a query
    Search {
        query: String,
    },
}

pub async fn handle_command(command: ScraperCommands, config: &Config) -> Result<()> {
    match command {
        ScraperCommands::Extract { url } => {
            let extractor = ContentExtractor::new(config.extractor.clone())?;
            let text = extractor.extract(&url).await?;
            println!("{}", text);
        }
        ScraperCommands::Search { query } => {
            let locator = ReferenceLocator::new(
                Arc::new(GoogleSearchProvider::new(&config.search)),
                Some(Arc::new(BrowserSearchProvider::new(&config.search, &config.extractor.user_agent))),
            )
            .with_limit(config.search.max_references);
            for (i, result) in locator.locate(&query).await?.iter().enumerate() {
                println!("{}. {} - {}", i + 1, result.title, result.url);
            }
        }
    }
    Ok(())
}
