use crate::error::{BookError, Result};
use crate::models::{CoverChoice, CoverSelection, Role, ShortCredits};
use crate::services::llm::SessionFactory;
use crate::services::prompts;
use std::collections::BTreeMap;
use std::path::Path;

pub const TEMPLATE_COUNT: u32 = 10;
pub const MAX_TITLE_CHARS: usize = 20;
pub const MAX_AUTHOR_CHARS: usize = 15;

const TITLE_PLACEHOLDER: &str = "Your Title Here";
const AUTHOR_PLACEHOLDER: &str = "Author Name";

/// SVG cover templates keyed `"1"` to `"10"`.
#[derive(Debug, Clone, Default)]
pub struct CoverTemplates {
    templates: BTreeMap<u32, String>,
}

impl CoverTemplates {
    /// Loads `1.svg`..`10.svg` from `dir`. Every file must exist.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut templates = BTreeMap::new();
        for id in 1..=TEMPLATE_COUNT {
            let path = dir.join(format!("{}.svg", id));
            let svg = std::fs::read_to_string(&path).map_err(|e| {
                BookError::Config(format!("cannot read cover template {}: {}", path.display(), e))
            })?;
            templates.insert(id, svg);
        }
        Ok(CoverTemplates { templates })
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        CoverTemplates {
            templates: pairs.into_iter().map(|(id, svg)| (id, svg.into())).collect(),
        }
    }

    /// Ids in numeric order.
    pub fn ids(&self) -> Vec<String> {
        self.templates.keys().map(|id| id.to_string()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        let key: u32 = id.trim().parse().ok()?;
        self.templates.get(&key).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct CoverDesign {
    pub selection: CoverSelection,
    pub svg: String,
}

/// Asks a Head to pick a template and shorten the credits, then fills the
/// template in.
pub async fn design_cover(
    agents: &SessionFactory,
    templates: &CoverTemplates,
    title: &str,
    author: &str,
    guidance: &str,
) -> Result<CoverDesign> {
    let mut head = agents.open(Role::Head, prompts::COVER_HEAD).await?;

    let choice: CoverChoice = head
        .send(&prompts::cover_choice(&templates.ids(), guidance))
        .await?;
    let template = templates
        .get(&choice.selected_template)
        .ok_or_else(|| BookError::UnknownTemplate(choice.selected_template.clone()))?;

    let credits: ShortCredits = head
        .send(&prompts::cover_credits(
            title,
            author,
            MAX_TITLE_CHARS,
            MAX_AUTHOR_CHARS,
        ))
        .await?;

    let selection = CoverSelection {
        template_id: choice.selected_template.trim().to_string(),
        short_title: clip("title", &credits.title, MAX_TITLE_CHARS),
        short_author: clip("author", &credits.author, MAX_AUTHOR_CHARS),
    };
    tracing::info!(
        template = %selection.template_id,
        title = %selection.short_title,
        author = %selection.short_author,
        "cover selected"
    );

    let svg = apply_template(template, &selection.short_title, &selection.short_author);
    Ok(CoverDesign { selection, svg })
}

fn clip(field: &str, value: &str, max_chars: usize) -> String {
    let value = value.trim();
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    tracing::warn!(field, max_chars, value, "shortened cover text still too long, clipping");
    value.chars().take(max_chars).collect::<String>().trim_end().to_string()
}

/// Replaces the title and author placeholders. Inserted text is escaped for
/// SVG.
pub fn apply_template(template: &str, title: &str, author: &str) -> String {
    template
        .replace(TITLE_PLACEHOLDER, &html_escape::encode_text(title))
        .replace(AUTHOR_PLACEHOLDER, &html_escape::encode_text(author))
}
