//! Every prompt the pipelines send is built here from typed inputs.

use crate::models::{BookConcept, ChapterMarkdown, ChapterSpec, Transcript};

pub const IDEA_HEAD: &str = "You are the head of a thinkers group, working on creating an eBook. \
Your team will decide the title, content, and page distribution. Once finalized, confirm the details.";

pub fn thinker_instructions(number: u8) -> String {
    format!("You are thinker {}, follow the orders of your HEAD.", number)
}

pub const EDITORIAL_HEAD: &str = "Your Name is Head or Mr. Jake Thompson. You are the head of an editorial team, creating a PDF eBook. \
You will be given a title, author, and a list of chapters with their titles and content. \
You have a writer that will write the content of the eBook page. \
You have a fact checker that will check the content of the eBook page. \
You have a suggester that will suggest the content of the eBook page. \
You have a 3 employee team that will help you to generate the eBook. You have to only give them tasks and they will do it. \
Generate the entire eBook in Markdown format, ensuring it is well-structured and visually appealing.";

pub fn writer_instructions(author: &str) -> String {
    format!(
        "Your Name is {} Writer or Mrs. Emily Carter. You are the writer of the eBook. \
You will be given a title, author, and a list of chapters with their titles and content. \
You have to write the content of the eBook page in Markdown format, ensuring it is well-structured and visually appealing.",
        author
    )
}

pub fn fact_checker_instructions(author: &str) -> String {
    format!(
        "Your Name is {} Fact Checker or Mr. Brandon Mitchell. You are the fact checker of the eBook. \
You will be given a title, author, and a list of chapters with their titles and content. \
You have to check the content of the eBook page in Markdown format, ensuring it is well-structured and visually appealing.",
        author
    )
}

pub fn suggester_instructions(author: &str) -> String {
    format!(
        "Your Name is {} Suggester or Mrs. Sophia Reynolds. You are the suggester of the eBook. \
You will be given a title, author, and a list of chapters with their titles and content. \
You have to suggest the content of the eBook page in Markdown format, ensuring it is well-structured and visually appealing.",
        author
    )
}

pub const COVER_HEAD: &str = "You are the head of an editorial team, selecting a cover design for a PDF. \
Choose one from the available templates and update it with the given title under 30 characters and author name under 20 characters.";

pub const CONTENTS_HEAD: &str = "Your Name is Head or Mr. Jake Thompson. You are responsible for generating the content page \
of a PDF eBook. Your task is to create a well-structured contents in Markdown format, \
listing chapter names and corresponding page numbers. \
You are provided with the number of pages used per chapter and you have to properly arrange the chapters in the content page by there page numbers.";

/// Renders a transcript as one `SPEAKER: text` line per turn.
pub fn transcript(history: &Transcript) -> String {
    if history.is_empty() {
        return "(none)".to_string();
    }
    history
        .turns()
        .iter()
        .map(|turn| format!("{}: {}", turn.speaker, turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn chapter_list(chapters: &[ChapterSpec]) -> String {
    chapters
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {} ({} pages): {}", i + 1, c.title, c.pages, c.content))
        .collect::<Vec<_>>()
        .join("\n")
}

// Idea negotiation

pub fn idea_opening(custom: &str) -> String {
    format!(
        "Now command your thinkers to decide on an eBook topic. {}",
        custom
    )
    .trim_end()
    .to_string()
}

#[derive(Debug, Clone, Copy)]
pub struct RoundContext<'a> {
    pub round: u32,
    pub max_rounds: u32,
    pub history: &'a Transcript,
}

impl RoundContext<'_> {
    fn header(&self) -> String {
        format!(
            "Thinks Remaining: {}/{}\nHistory:\n{}",
            self.round,
            self.max_rounds,
            transcript(self.history)
        )
    }
}

pub fn idea_thinker(ctx: RoundContext<'_>) -> String {
    ctx.header()
}

pub fn idea_review(ctx: RoundContext<'_>) -> String {
    format!(
        "{}\n\nConfirm the eBook details if ready, otherwise guide the thinkers further.",
        ctx.header()
    )
}

pub fn idea_final(ctx: RoundContext<'_>) -> String {
    format!(
        "{}\n\nProvide the final eBook details in JSON format.",
        ctx.header()
    )
}

pub fn idea_forced(ctx: RoundContext<'_>) -> String {
    format!(
        "{}\n\nForcefully generate the final eBook details.",
        ctx.header()
    )
}

// Chapter content

pub fn chapter_kickoff(concept: &BookConcept, author: &str) -> String {
    format!(
        "Title: {}\nAuthor: {}\nChapters:\n{}\nAnalyze the content.",
        concept.title,
        author,
        chapter_list(&concept.contents)
    )
}

/// Layout facts repeated at the top of every chapter prompt.
#[derive(Debug, Clone, Copy)]
pub struct PageFrame<'a> {
    pub page_size: &'a str,
    pub font_size: u32,
    pub chapter: &'a ChapterSpec,
}

impl PageFrame<'_> {
    fn layout(&self) -> String {
        format!("Page Size: {} and Font Size: {}", self.page_size, self.font_size)
    }

    fn chapter(&self) -> String {
        format!(
            "Chapter: {}\nContent: {}",
            self.chapter.title, self.chapter.content
        )
    }
}

pub fn chapter_framing(
    frame: PageFrame<'_>,
    head_history: &Transcript,
    history: &Transcript,
) -> String {
    format!(
        "{}\nHead History:\n{}\nHistory:\n{}\n{}\nPages: {}\n\
You have to discuss what to write for this chapter with the writer, fact checker and suggester. \
Now tell them what you think about this chapter and provide them with the content of the chapter to write.",
        frame.layout(),
        transcript(head_history),
        transcript(history),
        frame.chapter(),
        frame.chapter.pages
    )
}

/// Which team member a per-page prompt is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTask {
    Suggest,
    Check,
    Write,
}

pub fn page_turn(
    task: PageTask,
    frame: PageFrame<'_>,
    page: u32,
    brief: &str,
    history: &Transcript,
) -> String {
    let ask = match task {
        PageTask::Suggest => {
            "You have to suggest the content of the eBook page to the writer in Markdown format, ensuring it is well-structured and visually appealing."
        }
        PageTask::Check => {
            "You have to check the facts in the suggested content of the eBook page, keeping it in Markdown format, well-structured and visually appealing."
        }
        PageTask::Write => {
            "You have to write the content of the eBook page in Markdown format, ensuring it is well-structured and visually appealing."
        }
    };
    format!(
        "{}\nPage: {}/{}\nHead Brief: {}\nHistory:\n{}\n{}\nMAX_Pages: {}\n{}",
        frame.layout(),
        page,
        frame.chapter.pages,
        brief,
        transcript(history),
        frame.chapter(),
        frame.chapter.pages,
        ask
    )
}

pub fn chapter_assembly(frame: PageFrame<'_>, history: &Transcript) -> String {
    format!(
        "{}\n{}\nPages: {}\nHistory:\n{}\n\
The writer has written the content of the current chapter. Now generate the Markdown format content \
for each page in the chapter as the writer has written it. Chapter Pages Used: {}",
        frame.layout(),
        frame.chapter(),
        frame.chapter.pages,
        transcript(history),
        frame.chapter.pages
    )
}

// Cover

pub fn cover_choice(template_ids: &[String], guidance: &str) -> String {
    format!(
        "Here are the available SVG cover templates:\n{}\nChoose one and update its title and author name. {}",
        template_ids.join(", "),
        guidance
    )
    .trim_end()
    .to_string()
}

pub fn cover_credits(title: &str, author: &str, max_title: usize, max_author: usize) -> String {
    format!(
        "Title: {}\nAuthor: {}\nMax Title Length: {} characters\nMax Author Length: {} characters\n\
Provide the short title and author name in JSON format.",
        title, author, max_title, max_author
    )
}

// Contents page

/// Chapter markdown as the contents pipeline sees it.
pub fn book_text(chapters: &[ChapterMarkdown]) -> String {
    chapters
        .iter()
        .enumerate()
        .map(|(i, chapter)| {
            format!(
                "## Chapter {} (pages used: {})\n{}",
                i + 1,
                chapter.pages.len(),
                chapter.to_markdown()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn contents_page(book_text: &str, font_size: u32, page_size: &str) -> String {
    format!(
        "Generate the contents page for the eBook based on the following prompt:\n\n{}\n\
Font Size Used: {} and Page Size: {}\n\
Ensure the content page is structured properly in Markdown format, listing chapter names and \
use this format, for eg: Chapter 1: This is the chapter 1............... Pg. 1-2 \
don't use any table format or anything else, just use this format, this should be a markdown plain text \
not any link or anything else, just plain text but styled one.",
        book_text, font_size, page_size
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PageMarkdown, Role};

    #[test]
    fn empty_transcript_renders_placeholder() {
        assert_eq!(transcript(&Transcript::new()), "(none)");
    }

    #[test]
    fn transcript_lines_are_role_tagged() {
        let mut history = Transcript::new();
        history.push(Role::Head, "pick a topic");
        history.push(Role::Thinker(3), "gardening");
        assert_eq!(transcript(&history), "HEAD: pick a topic\nTHINKER 3: gardening");
    }

    #[test]
    fn round_prompts_show_remaining_counter() {
        let history = Transcript::new();
        let ctx = RoundContext {
            round: 4,
            max_rounds: 10,
            history: &history,
        };
        assert!(idea_thinker(ctx).starts_with("Thinks Remaining: 4/10"));
        assert!(idea_forced(ctx).ends_with("Forcefully generate the final eBook details."));
    }

    #[test]
    fn opening_without_custom_prompt_has_no_trailing_space() {
        assert_eq!(
            idea_opening(""),
            "Now command your thinkers to decide on an eBook topic."
        );
        assert!(idea_opening("About tea.").ends_with("About tea."));
    }

    #[test]
    fn page_turn_mentions_page_counter() {
        let chapter = ChapterSpec {
            title: "Roots".into(),
            content: "soil".into(),
            pages: 2,
        };
        let frame = PageFrame {
            page_size: "A4",
            font_size: 20,
            chapter: &chapter,
        };
        let prompt = page_turn(PageTask::Write, frame, 1, "brief", &Transcript::new());
        assert!(prompt.contains("Page: 1/2"));
        assert!(prompt.contains("MAX_Pages: 2"));
        assert!(prompt.contains("Chapter: Roots"));
        assert!(prompt.contains("History:\n(none)"));
    }

    #[test]
    fn book_text_numbers_chapters_from_one() {
        let chapters = vec![ChapterMarkdown {
            pages: vec![PageMarkdown { text: "# Intro".into() }],
            summary_response: String::new(),
        }];
        assert!(book_text(&chapters).starts_with("## Chapter 1 (pages used: 1)\n# Intro"));
    }
}
