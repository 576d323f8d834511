use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

pub const FALLBACK_FOLDER: &str = "untitled";

fn invalid_chars() -> &'static Regex {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    INVALID.get_or_init(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("static pattern compiles"))
}

/// Strips `< > : " / \ | ? *` from `title`. Nothing else is touched.
pub fn sanitize_folder_name(title: &str) -> String {
    invalid_chars().replace_all(title, "").into_owned()
}

/// Sanitized `title`, or `untitled` unless the result is a single plain path
/// segment. Blank names, `.` and `..` all fall back.
pub fn folder_name(title: &str) -> String {
    let name = sanitize_folder_name(title);
    let mut components = Path::new(&name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.trim().is_empty() => name,
        _ => FALLBACK_FOLDER.to_string(),
    }
}

/// Creates `base_dir/<folder name>` and returns its path. The folder always
/// sits directly inside `base_dir`.
pub fn create_valid_folder(title: &str, base_dir: &Path) -> std::io::Result<PathBuf> {
    let folder = base_dir.join(folder_name(title));
    std::fs::create_dir_all(&folder)?;
    tracing::info!(folder = %folder.display(), "folder created");
    Ok(folder)
}

/// Copies the copyright page into `folder`. A missing source is reported and
/// skipped; the merge step will then refuse to run.
pub fn copy_copyright_file(source: &Path, folder: &Path) -> std::io::Result<()> {
    if !source.exists() {
        tracing::error!(source = %source.display(), "copyright file does not exist");
        return Ok(());
    }
    std::fs::create_dir_all(folder)?;
    let destination = folder.join("copyright.pdf");
    std::fs::copy(source, &destination)?;
    tracing::info!(destination = %destination.display(), "copyright copied");
    Ok(())
}

/// Deletes `path`, logging instead of failing when it is absent or locked.
pub fn delete_file(path: &Path) {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "file does not exist");
        return;
    }
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "deleted"),
        Err(e) => tracing::error!(path = %path.display(), error = %e, "delete failed"),
    }
}
