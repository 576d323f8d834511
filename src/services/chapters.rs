use crate::config::Layout;
use crate::error::Result;
use crate::models::{BookConcept, ChapterMarkdown, ChapterSpec, Role, TextReply, Transcript};
use crate::services::llm::SessionFactory;
use crate::services::prompts::{self, PageFrame, PageTask};

#[derive(Debug, Clone)]
pub struct ChapterRun {
    /// One result per chapter, in `BookConcept.contents` order.
    pub chapters: Vec<ChapterMarkdown>,
    /// Head turns accumulated across the whole run.
    pub head_history: Transcript,
}

/// Writes every chapter of `concept`. Each chapter gets its own Head,
/// Writer, Fact-Checker and Suggester; only `head_history` carries over.
pub async fn write_chapters(
    agents: &SessionFactory,
    concept: &BookConcept,
    author: &str,
    layout: &Layout,
) -> Result<ChapterRun> {
    let mut head_history = Transcript::new();

    let mut kickoff_head = agents.open(Role::Head, prompts::EDITORIAL_HEAD).await?;
    let kickoff: TextReply = kickoff_head
        .send(&prompts::chapter_kickoff(concept, author))
        .await?;
    head_history.push(Role::Head, kickoff.response);

    let mut chapters = Vec::with_capacity(concept.contents.len());
    for (index, chapter) in concept.contents.iter().enumerate() {
        tracing::info!(
            chapter = index + 1,
            of = concept.contents.len(),
            title = %chapter.title,
            pages = chapter.pages,
            "writing chapter"
        );
        let markdown = write_chapter(agents, chapter, author, layout, &mut head_history).await?;
        chapters.push(markdown);
    }

    Ok(ChapterRun {
        chapters,
        head_history,
    })
}

async fn write_chapter(
    agents: &SessionFactory,
    chapter: &ChapterSpec,
    author: &str,
    layout: &Layout,
    head_history: &mut Transcript,
) -> Result<ChapterMarkdown> {
    let frame = PageFrame {
        page_size: &layout.page_size,
        font_size: layout.chapter_font_size,
        chapter,
    };
    let mut history = Transcript::new();

    let mut head = agents.open(Role::Head, prompts::EDITORIAL_HEAD).await?;
    let mut writer = agents
        .open(Role::Writer, &prompts::writer_instructions(author))
        .await?;
    let mut fact_checker = agents
        .open(Role::FactChecker, &prompts::fact_checker_instructions(author))
        .await?;
    let mut suggester = agents
        .open(Role::Suggester, &prompts::suggester_instructions(author))
        .await?;

    let framing: TextReply = head
        .send(&prompts::chapter_framing(frame, head_history, &history))
        .await?;
    let brief = framing.response;
    head_history.push(Role::Head, brief.clone());

    // pages + 1 rounds: page numbers run 0..=pages.
    for page in 0..=chapter.pages {
        tracing::debug!(page, pages = chapter.pages, "page discussion");

        let prompt = prompts::page_turn(PageTask::Suggest, frame, page, &brief, &history);
        let suggestion: TextReply = suggester.send(&prompt).await?;
        history.push(Role::Suggester, suggestion.response);

        let prompt = prompts::page_turn(PageTask::Check, frame, page, &brief, &history);
        let check: TextReply = fact_checker.send(&prompt).await?;
        history.push(Role::FactChecker, check.response);

        let prompt = prompts::page_turn(PageTask::Write, frame, page, &brief, &history);
        let draft: TextReply = writer.send(&prompt).await?;
        history.push(Role::Writer, draft.response);
    }

    let markdown: ChapterMarkdown = head
        .send(&prompts::chapter_assembly(frame, &history))
        .await?;
    tracing::info!(
        title = %chapter.title,
        pages = markdown.pages.len(),
        "chapter assembled"
    );
    Ok(markdown)
}
