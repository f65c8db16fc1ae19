use lazy_static::lazy_static;
use regex::Regex;
use refit_core::config::ExtractorConfig;
use super::document::{Block, BlockKind, Document};

/// Containers tried for the main content, most specific first.
pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".content",
    "main",
    "[role=\"main\"]",
];

pub const ELLIPSIS: &str = "...";

lazy_static! {
    static ref EXCESS_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// One markdown line for a block, or `None` when the block is dropped.
pub fn render_block(block: &Block, min_chars: usize) -> Option<String> {
    if block.text.is_empty() || block.text.chars().count() < min_chars {
        return None;
    }
    let text = &block.text;
    match block.kind {
        BlockKind::Heading(level) => Some(format!("{} {}", "#".repeat(level.clamp(1, 5) as usize), text)),
        BlockKind::Paragraph { in_list_item: true } => None,
        BlockKind::Paragraph { in_list_item: false } => Some(text.clone()),
        BlockKind::ListItem { ordered: true } => Some(format!("1. {}", text)),
        BlockKind::ListItem { ordered: false } => Some(format!("• {}", text)),
        BlockKind::Blockquote => Some(format!("> {}", text)),
    }
}

/// Renders blocks with a blank line between them.
pub fn blocks_to_markdown(blocks: &[Block], min_chars: usize) -> String {
    blocks
        .iter()
        .filter_map(|block| render_block(block, min_chars))
        .map(|line| format!("{}\n", line))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn normalize_whitespace(text: &str) -> String {
    EXCESS_NEWLINES.replace_all(text, "\n\n").trim().to_string()
}

/// Cuts `text` to `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}{}", &text[..end], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Structured text of the page's main content.
pub fn extract_structured_text(document: &impl Document, config: &ExtractorConfig) -> String {
    let mut content = None;
    for selector in CONTENT_SELECTORS {
        if let Some(blocks) = document.container_blocks(selector) {
            let candidate = blocks_to_markdown(&blocks, config.min_block_chars);
            if candidate.chars().count() >= config.min_container_chars {
                content = Some(candidate);
                break;
            }
        }
    }

    let content = content.unwrap_or_else(|| blocks_to_markdown(&document.body_blocks(), config.min_block_chars));
    truncate(&normalize_whitespace(&content), config.max_chars)
}
