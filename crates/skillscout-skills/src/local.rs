use std::path::{Path, PathBuf};

use crate::source::{LocalSource, RawDocument};

pub const SKILL_FILE_NAME: &str = "SKILL.md";

/// Read every `SKILL.md` below the source directory, depth unbounded.
///
/// A missing or non-directory path yields nothing; unreadable files are
/// logged and skipped. Origins are absolute file paths, in file-name order
/// within each directory so repeated scans are identical.
#[must_use]
pub fn load_local(source: &LocalSource) -> Vec<RawDocument> {
    let requested = source.directory.display().to_string();
    let root = expand_tilde(&source.directory);

    if !root.exists() {
        tracing::warn!("local skill path {requested} does not exist, skipping");
        return Vec::new();
    }
    if !root.is_dir() {
        tracing::warn!("local skill path {requested} is not a directory, skipping");
        return Vec::new();
    }
    let root = match root.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("cannot resolve local skill path {requested}: {e}");
            return Vec::new();
        }
    };

    let documents: Vec<RawDocument> = find_skill_files(&root)
        .into_iter()
        .filter_map(|path| match std::fs::read_to_string(&path) {
            Ok(content) => Some(RawDocument {
                content,
                origin: path.display().to_string(),
            }),
            Err(e) => {
                tracing::warn!("failed to read {}: {e}", path.display());
                None
            }
        })
        .collect();

    tracing::info!(
        path = %root.display(),
        count = documents.len(),
        "loaded local skill documents"
    );
    documents
}

fn find_skill_files(root: &Path) -> Vec<PathBuf> {
    ignore::WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("error walking {}: {e}", root.display());
                None
            }
        })
        .filter(|e| e.file_name() == SKILL_FILE_NAME && is_regular_file(e))
        .map(ignore::DirEntry::into_path)
        .collect()
}

/// Symlinked files count when their target is a regular file.
fn is_regular_file(entry: &ignore::DirEntry) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_symlink() => match std::fs::metadata(entry.path()) {
            Ok(meta) => meta.is_file(),
            Err(e) => {
                tracing::warn!("skipping dangling link {}: {e}", entry.path().display());
                false
            }
        },
        _ => false,
    }
}

/// Expand a leading `~` to the user's home directory.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Some(raw) = path.to_str() else {
        return path.to_path_buf();
    };
    let rest = match raw.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => &rest[1..],
        _ => return path.to_path_buf(),
    };
    match std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}
