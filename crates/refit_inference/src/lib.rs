pub mod models;
pub mod rewrite;

pub mod prelude {
    pub use super::models::{create_chain, ModelChain, OpenAiModel};
    pub use super::rewrite::{build_prompt, RewriteGenerator};
    pub use refit_core::{Article, Error, ReferenceArticle, Result, TextGenerator};
}

pub use models::{create_chain, ModelChain};
pub use rewrite::RewriteGenerator;
