use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// A reply shape the generation service is asked to produce.
///
/// `schema()` is sent along with the prompt as the response schema; the
/// reply text is then deserialized into `Self`.
pub trait StructuredReply: DeserializeOwned {
    const NAME: &'static str;

    fn schema() -> Value;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterSpec {
    pub title: String,
    pub content: String,
    pub pages: u32,
}

/// The finalized book idea. Written to `data.json` once negotiated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookConcept {
    pub title: String,
    pub contents: Vec<ChapterSpec>,
    #[serde(rename = "totalPages", alias = "Totalpages")]
    pub total_pages: u32,
}

impl StructuredReply for BookConcept {
    const NAME: &'static str = "BookConcept";

    fn schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "contents": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "title": { "type": "STRING" },
                            "content": { "type": "STRING" },
                            "pages": { "type": "INTEGER" }
                        },
                        "required": ["title", "content", "pages"]
                    }
                },
                "totalPages": { "type": "INTEGER" }
            },
            "required": ["title", "contents", "totalPages"]
        })
    }
}

/// Head reply during idea negotiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadReply {
    pub response: String,
    #[serde(rename = "isBookIdeaConformed", default)]
    pub is_book_idea_confirmed: bool,
}

impl StructuredReply for HeadReply {
    const NAME: &'static str = "HeadReply";

    fn schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "response": { "type": "STRING" },
                "isBookIdeaConformed": { "type": "BOOLEAN" }
            },
            "required": ["response"]
        })
    }
}

/// Generic free-text reply used by thinkers and the editorial team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextReply {
    pub response: String,
}

impl StructuredReply for TextReply {
    const NAME: &'static str = "TextReply";

    fn schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": { "response": { "type": "STRING" } },
            "required": ["response"]
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMarkdown {
    pub text: String,
}

/// The Head's assembled chapter: one markdown block per page plus a summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterMarkdown {
    pub pages: Vec<PageMarkdown>,
    #[serde(rename = "response")]
    pub summary_response: String,
}

impl ChapterMarkdown {
    pub fn to_markdown(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl StructuredReply for ChapterMarkdown {
    const NAME: &'static str = "ChapterMarkdown";

    fn schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "pages": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": { "text": { "type": "STRING" } },
                        "required": ["text"]
                    }
                },
                "response": { "type": "STRING" }
            },
            "required": ["pages", "response"]
        })
    }
}

/// First cover request: which template to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverChoice {
    pub response: String,
    pub selected_template: String,
}

impl StructuredReply for CoverChoice {
    const NAME: &'static str = "CoverChoice";

    fn schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "response": { "type": "STRING" },
                "selected_template": { "type": "STRING" }
            },
            "required": ["response", "selected_template"]
        })
    }
}

/// Second cover request: title and author shortened to fit the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortCredits {
    pub title: String,
    pub author: String,
}

impl StructuredReply for ShortCredits {
    const NAME: &'static str = "ShortCredits";

    fn schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "author": { "type": "STRING" }
            },
            "required": ["title", "author"]
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverSelection {
    pub template_id: String,
    pub short_title: String,
    pub short_author: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentsPage {
    pub markdown: String,
}

impl StructuredReply for ContentsPage {
    const NAME: &'static str = "ContentsPage";

    fn schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": { "markdown": { "type": "STRING" } },
            "required": ["markdown"]
        })
    }
}

/// Conversational roles. Thinkers are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Role {
    Head,
    Thinker(u8),
    Writer,
    FactChecker,
    Suggester,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Head => write!(f, "HEAD"),
            Role::Thinker(n) => write!(f, "THINKER {}", n),
            Role::Writer => write!(f, "WRITER"),
            Role::FactChecker => write!(f, "FACT_CHECKER"),
            Role::Suggester => write!(f, "SUGGESTER"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub speaker: Role,
    pub text: String,
}

/// Append-only log of role-tagged turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, speaker: Role, text: impl Into<String>) {
        self.turns.push(Turn {
            speaker,
            text: text.into(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Why idea negotiation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Termination {
    Confirmed { round: u32 },
    ForcedClose { rounds: u32 },
}
