pub mod cli;
pub mod extract;
pub mod logging;
pub mod manager;
pub mod search;

pub use cli::{handle_command, ScraperCommands};
pub use extract::ContentExtractor;
pub use logging::{init_logging, Logger};
pub use manager::{PipelineManager, RunSummary};
pub use search::{DenyList, ReferenceLocator};

pub mod prelude {
    pub use super::extract::{ContentExtractor, Document, PageSource};
    pub use super::manager::{PipelineManager, RunSummary};
    pub use super::search::{BrowserSearchProvider, DenyList, GoogleSearchProvider, ReferenceLocator};
    pub use refit_core::{Article, Error, ReferenceArticle, Result, SearchResult};
}
