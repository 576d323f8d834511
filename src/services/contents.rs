use crate::error::Result;
use crate::models::{ChapterMarkdown, ContentsPage, Role};
use crate::services::llm::SessionFactory;
use crate::services::prompts;

/// Asks a Head for the contents page of the finished chapters. The returned
/// markdown is used as-is.
pub async fn generate_contents_page(
    agents: &SessionFactory,
    chapters: &[ChapterMarkdown],
    font_size: u32,
    page_size: &str,
) -> Result<ContentsPage> {
    let mut head = agents.open(Role::Head, prompts::CONTENTS_HEAD).await?;
    let page: ContentsPage = head
        .send(&prompts::contents_page(
            &prompts::book_text(chapters),
            font_size,
            page_size,
        ))
        .await?;
    tracing::info!(lines = page.markdown.lines().count(), "contents page generated");
    Ok(page)
}
