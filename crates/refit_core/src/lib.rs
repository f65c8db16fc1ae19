pub mod config;
pub mod models;
pub mod error;
pub mod search;
pub mod storage;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{GenerationRequest, TextGenerator};
pub use search::ResultProvider;
pub use storage::ContentApi;
pub use types::{Article, PublishedPayload, ReferenceArticle, SearchResult, REQUIRED_REFERENCES};
