use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::RecommendedWatcher;
use notify_debouncer_mini::{DebouncedEvent, DebouncedEventKind, Debouncer, new_debouncer};
use tokio::sync::mpsc;

use crate::local::{SKILL_FILE_NAME, expand_tilde};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillEvent {
    /// One or more SKILL.md files were created, modified or removed.
    Changed { paths: Vec<PathBuf> },
}

/// Watches local skill directories and reports SKILL.md changes.
///
/// Dropping the watcher stops it: the debouncer goes first, which closes the
/// forwarding channel and ends the task.
pub struct SkillWatcher {
    watched: Vec<PathBuf>,
    _debouncer: Debouncer<RecommendedWatcher>,
    _handle: tokio::task::JoinHandle<()>,
}

impl SkillWatcher {
    /// Start watching `dirs` recursively.
    ///
    /// Directories that do not exist are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the filesystem watcher cannot be initialized or an
    /// existing directory cannot be watched.
    pub fn start(
        dirs: &[PathBuf],
        debounce: Duration,
        tx: mpsc::Sender<SkillEvent>,
    ) -> Result<Self, notify::Error> {
        let (notify_tx, mut notify_rx) = mpsc::channel::<Vec<PathBuf>>(16);

        let mut debouncer = new_debouncer(
            debounce,
            move |events: Result<Vec<DebouncedEvent>, notify::Error>| {
                let events = match events {
                    Ok(events) => events,
                    Err(e) => {
                        tracing::warn!("skill watcher error: {e}");
                        return;
                    }
                };

                let changed = skill_paths(&events);
                if !changed.is_empty() {
                    let _ = notify_tx.blocking_send(changed);
                }
            },
        )?;

        let mut watched = Vec::new();
        for dir in dirs {
            let dir = expand_tilde(dir);
            if !dir.is_dir() {
                tracing::warn!("not watching {}: not a directory", dir.display());
                continue;
            }
            debouncer
                .watcher()
                .watch(&dir, notify::RecursiveMode::Recursive)?;
            tracing::debug!("watching {} for SKILL.md changes", dir.display());
            watched.push(dir);
        }

        let handle = tokio::spawn(async move {
            while let Some(paths) = notify_rx.recv().await {
                if tx.send(SkillEvent::Changed { paths }).await.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            watched,
            _debouncer: debouncer,
            _handle: handle,
        })
    }

    #[must_use]
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }
}

fn skill_paths(events: &[DebouncedEvent]) -> Vec<PathBuf> {
    events
        .iter()
        .filter(|e| e.kind == DebouncedEventKind::Any && is_skill_file(&e.path))
        .map(|e| e.path.clone())
        .collect()
}

fn is_skill_file(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == SKILL_FILE_NAME)
}
