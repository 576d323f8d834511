use crate::error::{BookError, Result};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_MAX_ROUNDS: u32 = 10;

/// Page and font settings shared by prompts and the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub page_size: String,
    pub chapter_font_size: u32,
    pub contents_font_size: u32,
    /// Font size the Head is told about when laying out the contents page.
    pub contents_prompt_font_size: u32,
    pub cover_size: (u32, u32),
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            page_size: "A4".to_string(),
            chapter_font_size: 20,
            contents_font_size: 22,
            contents_prompt_font_size: 24,
            cover_size: (500, 700),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tools {
    pub wkhtmltopdf: PathBuf,
    pub pdfunite: PathBuf,
    pub rsvg_convert: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub author: String,
    pub output_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub copyright_pdf: PathBuf,
    pub max_rounds: u32,
    pub layout: Layout,
    pub tools: Tools,
}

impl Config {
    /// Reads the process environment (after loading `.env`, if any).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(BookError::MissingCredential("GEMINI_API_KEY"))?;

        let max_rounds = match lookup("BOOKAURA_MAX_ROUNDS").filter(|v| !v.trim().is_empty()) {
            Some(raw) => parse_rounds(&raw)?,
            None => DEFAULT_MAX_ROUNDS,
        };

        Ok(Config {
            api_key,
            api_url: get("GEMINI_API_URL", DEFAULT_API_URL),
            model: get("BOOKAURA_MODEL", DEFAULT_MODEL),
            author: get("BOOKAURA_AUTHOR", "eBookAura"),
            output_dir: get("BOOKAURA_OUTPUT_DIR", "book").into(),
            templates_dir: get("BOOKAURA_TEMPLATES_DIR", "Templates").into(),
            copyright_pdf: get("BOOKAURA_COPYRIGHT_PDF", "./copyright.pdf").into(),
            max_rounds,
            layout: Layout::default(),
            tools: Tools {
                wkhtmltopdf: get("WKHTMLTOPDF_BIN", "wkhtmltopdf").into(),
                pdfunite: get("PDFUNITE_BIN", "pdfunite").into(),
                rsvg_convert: get("RSVG_CONVERT_BIN", "rsvg-convert").into(),
            },
        })
    }
}

pub fn parse_rounds(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(BookError::Config("max rounds must be at least 1".into())),
        Ok(rounds) => Ok(rounds),
        Err(e) => Err(BookError::Config(format!("invalid max rounds `{}`: {}", raw, e))),
    }
}
