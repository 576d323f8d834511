use super::{PdfMerger, PdfRenderer, run_tool};
use crate::error::{BookError, Result};
use crate::models::BookConcept;
use crate::utils::folder_name;
use async_trait::async_trait;
use pulldown_cmark::{Options, Parser, html};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Converts markdown to the HTML page handed to the PDF engine.
pub fn styled_html(markdown: &str, font_size: u32) -> String {
    let mut body = String::new();
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    html::push_html(&mut body, parser);

    format!(
        r#"<html>
<head>
    <meta charset="utf-8">
    <style>
        body {{
            font-size: {size}px;
            margin: 0;
            padding: 20mm;
            text-align: justify;
        }}
        h1 {{
            text-align: center;
            font-size: {heading}px;
        }}
        p {{
            line-height: 1.6;
        }}
    </style>
</head>
<body>
{body}
</body>
</html>
"#,
        size = font_size,
        heading = font_size + 4,
        body = body
    )
}

/// Renders through the `wkhtmltopdf` binary: A4, zero margins, UTF-8.
pub struct Wkhtmltopdf {
    binary: PathBuf,
}

impl Wkhtmltopdf {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Wkhtmltopdf {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl PdfRenderer for Wkhtmltopdf {
    async fn render(&self, markdown: &str, output: &Path, font_size: u32) -> Result<()> {
        let page = styled_html(markdown, font_size);
        let rendering = |detail: String| BookError::Rendering {
            tool: self.binary.display().to_string(),
            detail,
        };

        let mut child = Command::new(&self.binary)
            .args(["--quiet", "--page-size", "A4", "--encoding", "UTF-8", "--no-outline"])
            .args(["-T", "0mm", "-B", "0mm", "-L", "0mm", "-R", "0mm"])
            .arg("-")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| rendering(e.to_string()))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| rendering("stdin was not captured".to_string()))?;
        // The pipe closes when `feed` drops `stdin`.
        let feed = async move { stdin.write_all(page.as_bytes()).await };
        let (fed, result) = tokio::join!(feed, child.wait_with_output());
        let result = result?;
        if !result.status.success() {
            return Err(rendering(format!(
                "{}: {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }
        fed?;
        tracing::info!(output = %output.display(), font_size, "pdf rendered");
        Ok(())
    }
}

/// Merges through poppler's `pdfunite`.
pub struct PdfUnite {
    binary: PathBuf,
}

impl PdfUnite {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        PdfUnite {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl PdfMerger for PdfUnite {
    async fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        let mut command = Command::new(&self.binary);
        command.args(inputs).arg(output);
        run_tool(&mut command, &self.binary).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub success: bool,
    /// Source file names that went into the book; empty on failure.
    pub files: Vec<String>,
    pub output: Option<PathBuf>,
}

impl MergeOutcome {
    fn failed() -> Self {
        MergeOutcome {
            success: false,
            files: Vec::new(),
            output: None,
        }
    }
}

/// `copyright.pdf`, `contents.pdf`, then `1.pdf`..`N.pdf` in numeric order.
pub fn expected_merge_inputs(chapter_count: usize) -> Vec<String> {
    let mut files = vec!["copyright.pdf".to_string(), "contents.pdf".to_string()];
    files.extend((1..=chapter_count).map(|n| format!("{}.pdf", n)));
    files
}

/// Merges the parts in `folder` into `<sanitized title>.pdf`, taking the
/// title and chapter count from `data.json`. Any missing part aborts the
/// merge with `success == false`; nothing is written in that case.
pub async fn merge_book(folder: &Path, merger: &dyn PdfMerger) -> MergeOutcome {
    let concept = match read_concept(folder) {
        Ok(concept) => concept,
        Err(e) => {
            tracing::error!(folder = %folder.display(), error = %e, "cannot read data.json");
            return MergeOutcome::failed();
        }
    };

    let output = folder.join(format!("{}.pdf", folder_name(&concept.title)));

    let files = expected_merge_inputs(concept.contents.len());
    let mut inputs = Vec::with_capacity(files.len());
    for file in &files {
        let path = folder.join(file);
        if !path.exists() {
            tracing::error!(
                file = %file,
                folder = %folder.display(),
                "file not found, merge aborted"
            );
            return MergeOutcome::failed();
        }
        inputs.push(path);
    }

    if let Err(e) = merger.merge(&inputs, &output).await {
        tracing::error!(error = %e, "merge failed");
        return MergeOutcome::failed();
    }

    tracing::info!(output = %output.display(), parts = files.len(), "book created");
    MergeOutcome {
        success: true,
        files,
        output: Some(output),
    }
}

fn read_concept(folder: &Path) -> Result<BookConcept> {
    let raw = std::fs::read_to_string(folder.join("data.json"))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Removes merged source files; absent or undeletable files are logged only.
pub fn delete_source_pdfs(folder: &Path, files: &[String]) {
    for file in files {
        crate::utils::delete_file(&folder.join(file));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChapterSpec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMerger {
        calls: Mutex<Vec<(Vec<PathBuf>, PathBuf)>>,
    }

    #[async_trait]
    impl PdfMerger for RecordingMerger {
        async fn merge(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((inputs.to_vec(), output.to_path_buf()));
            Ok(())
        }
    }

    fn book_folder(chapters: usize) -> tempfile::TempDir {
        titled_book_folder("Tea: A Guide?", chapters)
    }

    fn titled_book_folder(title: &str, chapters: usize) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let concept = BookConcept {
            title: title.into(),
            contents: (0..chapters)
                .map(|i| ChapterSpec {
                    title: format!("C{}", i),
                    content: String::new(),
                    pages: 1,
                })
                .collect(),
            total_pages: chapters as u32,
        };
        std::fs::write(
            dir.path().join("data.json"),
            serde_json::to_string(&concept).unwrap(),
        )
        .unwrap();
        for file in expected_merge_inputs(chapters) {
            std::fs::write(dir.path().join(file), b"%PDF").unwrap();
        }
        dir
    }

    #[test]
    fn inputs_sort_numerically() {
        let files = expected_merge_inputs(11);
        assert_eq!(&files[..4], &["copyright.pdf", "contents.pdf", "1.pdf", "2.pdf"]);
        assert_eq!(files[11], "10.pdf");
        assert_eq!(files[12], "11.pdf");
    }

    #[tokio::test]
    async fn merges_in_fixed_order() {
        let dir = book_folder(2);
        let merger = RecordingMerger::default();
        let outcome = merge_book(dir.path(), &merger).await;

        assert!(outcome.success);
        assert_eq!(
            outcome.files,
            vec!["copyright.pdf", "contents.pdf", "1.pdf", "2.pdf"]
        );
        assert_eq!(outcome.output, Some(dir.path().join("Tea A Guide.pdf")));
        let calls = merger.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0[2], dir.path().join("1.pdf"));
    }

    #[tokio::test]
    async fn dot_dot_title_merges_inside_folder() {
        let dir = titled_book_folder("..", 1);
        let merger = RecordingMerger::default();
        let outcome = merge_book(dir.path(), &merger).await;

        assert!(outcome.success);
        assert_eq!(outcome.output, Some(dir.path().join("untitled.pdf")));
        assert_eq!(merger.calls.lock().unwrap()[0].1, dir.path().join("untitled.pdf"));
    }

    #[tokio::test]
    async fn any_missing_part_aborts() {
        for missing in expected_merge_inputs(3) {
            let dir = book_folder(3);
            std::fs::remove_file(dir.path().join(&missing)).unwrap();
            let merger = RecordingMerger::default();

            let outcome = merge_book(dir.path(), &merger).await;

            assert!(!outcome.success, "{} missing should abort", missing);
            assert!(outcome.files.is_empty());
            assert!(merger.calls.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn missing_data_json_aborts() {
        let dir = book_folder(1);
        std::fs::remove_file(dir.path().join("data.json")).unwrap();
        let outcome = merge_book(dir.path(), &RecordingMerger::default()).await;
        assert_eq!(outcome, MergeOutcome::failed());
    }

    #[test]
    fn html_keeps_font_sizes() {
        let page = styled_html("# Title\n\nBody text", 20);
        assert!(page.contains("font-size: 20px"));
        assert!(page.contains("font-size: 24px"));
        assert!(page.contains("<h1>Title</h1>"));
        assert!(page.contains("<p>Body text</p>"));
    }

    #[cfg(unix)]
    fn fake_engine(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn engine_stdin_and_stderr_are_drained_together() {
        let dir = tempfile::tempdir().unwrap();
        // Each engine fills stderr past the pipe buffer before touching stdin.
        let noisy = fake_engine(
            dir.path(),
            "noisy",
            "yes warning | head -c 300000 >&2\nfor last; do :; done\ncat > \"$last\"",
        );
        let failing = fake_engine(
            dir.path(),
            "failing",
            "yes warning | head -c 300000 >&2\ncat > /dev/null\nexit 3",
        );
        let early_exit = fake_engine(dir.path(), "early", "echo refused >&2\nexit 4");

        let markdown = "# Title\n\n".to_string() + &"long paragraph text ".repeat(20_000);
        let output = dir.path().join("out.pdf");
        let within = std::time::Duration::from_secs(30);

        tokio::time::timeout(within, Wkhtmltopdf::new(&noisy).render(&markdown, &output, 20))
            .await
            .expect("engine deadlocked")
            .unwrap();
        assert!(std::fs::read_to_string(&output).unwrap().contains("<h1>Title</h1>"));

        let err = tokio::time::timeout(
            within,
            Wkhtmltopdf::new(&failing).render(&markdown, &output, 20),
        )
        .await
        .expect("engine deadlocked")
        .unwrap_err();
        assert!(matches!(err, BookError::Rendering { .. }), "{err}");

        let err = tokio::time::timeout(
            within,
            Wkhtmltopdf::new(&early_exit).render(&markdown, &output, 20),
        )
        .await
        .expect("engine deadlocked")
        .unwrap_err();
        match err {
            BookError::Rendering { detail, .. } => assert!(detail.contains("refused"), "{detail}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn delete_sources_removes_listed_files() {
        let dir = book_folder(1);
        let files = expected_merge_inputs(1);
        delete_source_pdfs(dir.path(), &files);
        for file in files {
            assert!(!dir.path().join(file).exists());
        }
        assert!(dir.path().join("data.json").exists());
    }
}
