use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

/// Text-bearing element kinds the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading(u8),
    Paragraph { in_list_item: bool },
    ListItem { ordered: bool },
    Blockquote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Trimmed text of the element and all its descendants
    pub text: String,
}

impl Block {
    pub fn new(kind: BlockKind, text: &str) -> Self {
        Self {
            kind,
            text: text.trim().to_string(),
        }
    }
}

/// What the extractor needs from a parsed page, independent of the HTML
/// backend.
pub trait Document {
    /// Blocks inside the first element matching `selector`, in document
    /// order; `None` when nothing matches.
    fn container_blocks(&self, selector: &str) -> Option<Vec<Block>>;

    /// Blocks of the whole body, in document order.
    fn body_blocks(&self) -> Vec<Block>;
}

pub const NOISE_SELECTOR: &str =
    "script, style, nav, header, footer, aside, .advertisement, .ad, .social-share, .comments, .related-posts";

lazy_static! {
    static ref NOISE: Selector = Selector::parse(NOISE_SELECTOR).unwrap();
    static ref BLOCKS: Selector = Selector::parse("h1, h2, h3, h4, h5, h6, p, li, blockquote").unwrap();
    static ref BODY: Selector = Selector::parse("body").unwrap();
}

/// `scraper`-backed document with noise nodes already detached.
pub struct ScraperDocument {
    html: Html,
}

impl ScraperDocument {
    pub fn parse(html: &str) -> Self {
        let mut html = Html::parse_document(html);
        let noise: Vec<_> = html.select(&NOISE).map(|el| el.id()).collect();
        for id in noise {
            if let Some(mut node) = html.tree.get_mut(id) {
                node.detach();
            }
        }
        Self { html }
    }

    fn blocks_of(element: ElementRef<'_>) -> Vec<Block> {
        element
            .select(&BLOCKS)
            .filter_map(|el| {
                let parent = el
                    .parent()
                    .and_then(ElementRef::wrap)
                    .map(|p| p.value().name());
                let kind = match el.value().name() {
                    "h1" => BlockKind::Heading(1),
                    "h2" => BlockKind::Heading(2),
                    "h3" => BlockKind::Heading(3),
                    "h4" => BlockKind::Heading(4),
                    "h5" => BlockKind::Heading(5),
                    "h6" => BlockKind::Heading(6),
                    "p" => BlockKind::Paragraph {
                        in_list_item: parent == Some("li"),
                    },
                    "li" => BlockKind::ListItem {
                        ordered: parent == Some("ol"),
                    },
                    "blockquote" => BlockKind::Blockquote,
                    _ => return None,
                };
                Some(Block::new(kind, &el.text().collect::<String>()))
            })
            .collect()
    }
}

impl Document for ScraperDocument {
    fn container_blocks(&self, selector: &str) -> Option<Vec<Block>> {
        let selector = Selector::parse(selector).ok()?;
        self.html.select(&selector).next().map(Self::blocks_of)
    }

    fn body_blocks(&self) -> Vec<Block> {
        match self.html.select(&BODY).next() {
            Some(body) => Self::blocks_of(body),
            None => Self::blocks_of(self.html.root_element()),
        }
    }
}
