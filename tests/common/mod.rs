//! Scripted generation backend and fake file collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use bookaura::config::{Config, Layout, Tools};
use bookaura::models::{BookConcept, ChapterSpec, Role};
use bookaura::render::{ImageConverter, PdfMerger, PdfRenderer};
use bookaura::services::llm::{ChatBackend, ChatRequest, SessionFactory};
use bookaura::{BookError, Result};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Call {
    pub agent: Role,
    pub schema: Option<&'static str>,
    pub prompt: String,
    pub messages: usize,
}

type Responder = Box<dyn Fn(&Call) -> String + Send + Sync>;

/// Answers every instruction turn with "Understood." and hands structured
/// requests to the responder.
pub struct ScriptedBackend {
    responder: Responder,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&Call) -> String + Send + Sync + 'static,
    {
        Arc::new(ScriptedBackend {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Structured calls only, as `(agent, schema)`.
    pub fn structured(&self) -> Vec<(Role, &'static str)> {
        self.calls()
            .into_iter()
            .filter_map(|call| call.schema.map(|schema| (call.agent, schema)))
            .collect()
    }

    pub fn count(&self, agent: Role, schema: &str) -> usize {
        self.structured()
            .into_iter()
            .filter(|(a, s)| *a == agent && *s == schema)
            .count()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn generate(&self, request: ChatRequest<'_>) -> Result<String> {
        let call = Call {
            agent: request.agent,
            schema: request.schema.as_ref().map(|(name, _)| *name),
            prompt: request.prompt().to_string(),
            messages: request.messages.len(),
        };
        self.calls.lock().unwrap().push(call.clone());
        match call.schema {
            None => Ok("Understood.".to_string()),
            Some(_) => Ok((self.responder)(&call)),
        }
    }
}

pub fn factory(backend: Arc<ScriptedBackend>) -> SessionFactory {
    SessionFactory::new(backend, "test-model")
}

pub fn concept(pages: &[u32]) -> BookConcept {
    BookConcept {
        title: "Tea: A Practical Guide".to_string(),
        contents: pages
            .iter()
            .enumerate()
            .map(|(i, pages)| ChapterSpec {
                title: format!("Chapter {}", i + 1),
                content: format!("About part {}", i + 1),
                pages: *pages,
            })
            .collect(),
        total_pages: pages.iter().sum(),
    }
}

/// A responder that confirms the idea immediately and answers every other
/// schema with something well-formed.
pub fn happy_responder(concept: BookConcept) -> impl Fn(&Call) -> String + Send + Sync + 'static {
    move |call: &Call| match call.schema.unwrap_or_default() {
        "HeadReply" => json!({ "response": "Agreed.", "isBookIdeaConformed": true }).to_string(),
        "BookConcept" => serde_json::to_string(&concept).unwrap(),
        "TextReply" => json!({ "response": format!("{} speaking", call.agent) }).to_string(),
        "ChapterMarkdown" => json!({
            "pages": [{ "text": "# Heading" }, { "text": "Body" }],
            "response": "chapter done"
        })
        .to_string(),
        "ContentsPage" => json!({ "markdown": "Chapter 1: One ..... Pg. 1-2" }).to_string(),
        "CoverChoice" => json!({ "response": "Number 3 fits.", "selected_template": "3" }).to_string(),
        "ShortCredits" => json!({ "title": "Tea Guide", "author": "Aura" }).to_string(),
        other => panic!("unexpected schema {other}"),
    }
}

pub fn test_config(root: &Path) -> Config {
    Config {
        api_key: "test-key".to_string(),
        api_url: "http://localhost".to_string(),
        model: "test-model".to_string(),
        author: "eBookAura".to_string(),
        output_dir: root.join("book"),
        templates_dir: root.join("Templates"),
        copyright_pdf: root.join("copyright.pdf"),
        max_rounds: 10,
        layout: Layout::default(),
        tools: Tools {
            wkhtmltopdf: "wkhtmltopdf".into(),
            pdfunite: "pdfunite".into(),
            rsvg_convert: "rsvg-convert".into(),
        },
    }
}

pub fn write_templates(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    for id in 1..=10 {
        std::fs::write(
            dir.join(format!("{}.svg", id)),
            format!(
                "<svg id=\"t{}\"><text>Your Title Here</text><text>Author Name</text></svg>",
                id
            ),
        )
        .unwrap();
    }
}

/// Writes the markdown it is given as the "PDF".
#[derive(Default)]
pub struct FakeRenderer {
    pub rendered: Mutex<Vec<(PathBuf, u32)>>,
}

#[async_trait]
impl PdfRenderer for FakeRenderer {
    async fn render(&self, markdown: &str, output: &Path, font_size: u32) -> Result<()> {
        std::fs::write(output, markdown)?;
        self.rendered
            .lock()
            .unwrap()
            .push((output.to_path_buf(), font_size));
        Ok(())
    }
}

/// Concatenates inputs into the output.
#[derive(Default)]
pub struct FakeMerger {
    pub merged: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl PdfMerger for FakeMerger {
    async fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let mut book = Vec::new();
        for input in inputs {
            book.extend(std::fs::read(input)?);
        }
        std::fs::write(output, book)?;
        self.merged.lock().unwrap().push(
            inputs
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect(),
        );
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeImages {
    pub fail_raster: bool,
}

#[async_trait]
impl ImageConverter for FakeImages {
    async fn vector_to_raster(&self, svg: &Path, png: &Path) -> Result<()> {
        if self.fail_raster {
            return Err(BookError::Rendering {
                tool: "rsvg-convert".into(),
                detail: "boom".into(),
            });
        }
        std::fs::copy(svg, png)?;
        Ok(())
    }

    async fn raster_recompress(&self, png: &Path, jpg: &Path, _size: (u32, u32)) -> Result<()> {
        std::fs::copy(png, jpg)?;
        Ok(())
    }
}
