pub mod book;
pub mod chapters;
pub mod contents;
pub mod cover;
pub mod idea;
pub mod llm;
pub mod prompts;
