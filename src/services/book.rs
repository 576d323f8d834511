use crate::config::Config;
use crate::error::Result;
use crate::models::{BookConcept, Termination};
use crate::render::{
    CoverConverter, ImageConverter, PdfMerger, PdfRenderer, PdfUnite, Wkhtmltopdf,
    delete_source_pdfs, merge_book,
};
use crate::services::chapters::write_chapters;
use crate::services::contents::generate_contents_page;
use crate::services::cover::{CoverTemplates, design_cover};
use crate::services::idea::negotiate_idea;
use crate::services::llm::{ChatBackend, GeminiBackend, SessionFactory};
use crate::utils::{copy_copyright_file, create_valid_folder, delete_file};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct BookOutput {
    pub title: String,
    pub folder: PathBuf,
    pub chapter_count: usize,
    pub termination: Termination,
    /// Whether the parts were merged into `<title>.pdf`.
    pub merged: bool,
    pub book_pdf: Option<PathBuf>,
    pub cover: PathBuf,
}

/// Runs every pipeline for one prompt and assembles the result on disk.
pub struct BookMaker {
    config: Config,
    agents: SessionFactory,
    renderer: Arc<dyn PdfRenderer>,
    merger: Arc<dyn PdfMerger>,
    images: Arc<dyn ImageConverter>,
}

impl BookMaker {
    pub fn new(
        config: Config,
        backend: Arc<dyn ChatBackend>,
        renderer: Arc<dyn PdfRenderer>,
        merger: Arc<dyn PdfMerger>,
        images: Arc<dyn ImageConverter>,
    ) -> Self {
        let agents = SessionFactory::new(backend, config.model.clone());
        BookMaker {
            config,
            agents,
            renderer,
            merger,
            images,
        }
    }

    /// Gemini plus the external tools named in `config`.
    pub fn from_config(config: Config) -> Self {
        let backend = Arc::new(GeminiBackend::from_config(&config));
        let renderer = Arc::new(Wkhtmltopdf::new(&config.tools.wkhtmltopdf));
        let merger = Arc::new(PdfUnite::new(&config.tools.pdfunite));
        let images = Arc::new(CoverConverter::new(&config.tools.rsvg_convert));
        Self::new(config, backend, renderer, merger, images)
    }

    pub async fn create_ebook(&self, prompt: &str) -> Result<BookOutput> {
        let templates = CoverTemplates::load(&self.config.templates_dir)?;
        let author = self.config.author.as_str();
        let layout = &self.config.layout;

        tracing::info!(prompt, "creating ebook");
        let negotiated = negotiate_idea(&self.agents, prompt, self.config.max_rounds).await?;
        let concept = negotiated.concept;

        let folder = create_valid_folder(&concept.title, &self.config.output_dir)?;
        std::fs::write(
            folder.join("data.json"),
            serde_json::to_string_pretty(&concept)?,
        )?;

        let run = write_chapters(&self.agents, &concept, author, layout).await?;
        for (index, chapter) in run.chapters.iter().enumerate() {
            let path = folder.join(format!("{}.pdf", index + 1));
            self.renderer
                .render(&chapter.to_markdown(), &path, layout.chapter_font_size)
                .await?;
        }

        let contents = generate_contents_page(
            &self.agents,
            &run.chapters,
            layout.contents_prompt_font_size,
            &layout.page_size,
        )
        .await?;
        self.renderer
            .render(
                &contents.markdown,
                &folder.join("contents.pdf"),
                layout.contents_font_size,
            )
            .await?;

        copy_copyright_file(&self.config.copyright_pdf, &folder)?;

        let merge = merge_book(&folder, self.merger.as_ref()).await;
        if merge.success {
            delete_source_pdfs(&folder, &merge.files);
        }

        let cover = self.make_cover(&templates, &concept, &folder).await?;

        tracing::info!(folder = %folder.display(), merged = merge.success, "ebook finished");
        Ok(BookOutput {
            title: concept.title,
            folder,
            chapter_count: run.chapters.len(),
            termination: negotiated.termination,
            merged: merge.success,
            book_pdf: merge.output,
            cover,
        })
    }

    async fn make_cover(
        &self,
        templates: &CoverTemplates,
        concept: &BookConcept,
        folder: &std::path::Path,
    ) -> Result<PathBuf> {
        let guidance = serde_json::to_string(concept)?;
        let design = design_cover(
            &self.agents,
            templates,
            &concept.title,
            &self.config.author,
            &guidance,
        )
        .await?;

        let svg = folder.join("cover.svg");
        let png = folder.join("cover.png");
        let jpg = folder.join("cover.jpg");
        std::fs::write(&svg, &design.svg)?;
        self.images.vector_to_raster(&svg, &png).await?;
        self.images
            .raster_recompress(&png, &jpg, self.config.layout.cover_size)
            .await?;
        delete_file(&svg);
        delete_file(&png);
        Ok(jpg)
    }
}
