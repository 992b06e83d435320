use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock, Weak};

use async_std::task::{self, JoinHandle};
use core_types::RemotePath;
use remote_bridge::remote_file_name;

use crate::{
    batch_outcome::{BatchOutcome, FailureSummary},
    collaborators::{ConfirmationPrompt, FailureReport, FailureReporter},
    destination::Destination,
    destination_registry::DestinationRegistry,
    operation_lock::OperationLock,
    subscribers::{lock, read, write},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchKind {
    Delete,
    Copy,
}

impl BatchKind {
    fn verb(&self) -> &'static str {
        match self {
            BatchKind::Delete => "delete",
            BatchKind::Copy => "copy",
        }
    }
}

/// Orchestrates the active destination and the operations run against it.
///
/// Every remote-mutating batch goes through the shared `OperationLock`. When
/// the lock is busy those calls return `None` right away without touching the
/// device. Loads triggered by selecting a destination are best effort: they
/// are skipped while the lock is busy and need a manual `refresh` later.
pub struct DestinationController {
    lock: Arc<OperationLock>,
    confirmation: Arc<dyn ConfirmationPrompt>,
    reporter: Arc<dyn FailureReporter>,
    selected: RwLock<Option<Arc<Destination>>>,
    selected_files: Mutex<Vec<RemotePath>>,
}

impl DestinationController {
    pub fn new(
        lock: Arc<OperationLock>,
        confirmation: Arc<dyn ConfirmationPrompt>,
        reporter: Arc<dyn FailureReporter>,
    ) -> Arc<Self> {
        Arc::new(Self {
            lock,
            confirmation,
            reporter,
            selected: RwLock::new(None),
            selected_files: Mutex::new(Vec::new()),
        })
    }

    pub fn selected_destination(&self) -> Option<Arc<Destination>> {
        read(&self.selected).clone()
    }

    /// Whenever the destination list changes, select its first destination.
    ///
    /// Returns the handle of the load this may have started.
    pub fn on_destinations_changed(
        self: &Arc<Self>,
        destinations: &[Arc<Destination>],
    ) -> Option<JoinHandle<()>> {
        self.set_selected_destination(destinations.first().cloned())
    }

    /// Apply `on_destinations_changed` for every change the registry announces.
    ///
    /// The task ends once the registry is dropped.
    pub fn watch_registry(self: &Arc<Self>, registry: &Arc<DestinationRegistry>) -> JoinHandle<()> {
        let rx = registry.subscribe();
        let registry: Weak<DestinationRegistry> = Arc::downgrade(registry);
        let controller = Arc::clone(self);

        task::spawn(async move {
            while let Ok(event) = rx.recv_async().await {
                tracing::debug!(?event, "Registry changed");
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                controller.on_destinations_changed(&registry.current());
            }
        })
    }

    /// Select a destination, loading it in the background if it never was.
    pub fn set_selected_destination(
        self: &Arc<Self>,
        destination: Option<Arc<Destination>>,
    ) -> Option<JoinHandle<()>> {
        {
            let mut selected = write(&self.selected);
            let unchanged = match (selected.as_ref(), destination.as_ref()) {
                (Some(current), Some(new)) => Arc::ptr_eq(current, new),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                return None;
            }
            *selected = destination.clone();
        }
        lock(&self.selected_files).clear();

        self.on_selected_destination_changed(destination?)
    }

    fn on_selected_destination_changed(
        self: &Arc<Self>,
        destination: Arc<Destination>,
    ) -> Option<JoinHandle<()>> {
        if destination.has_loaded() {
            return None;
        }
        if !self.lock.is_free() {
            tracing::debug!(
                path = destination.path(),
                "Operation in progress, skipping automatic load"
            );
            return None;
        }

        let controller = Arc::clone(self);
        Some(task::spawn(async move {
            controller.refresh_destination(&destination).await;
        }))
    }

    /// Reload the active destination, reporting a failure instead of returning it.
    pub async fn refresh(&self) {
        if let Some(destination) = self.selected_destination() {
            self.refresh_destination(&destination).await;
        }
    }

    async fn refresh_destination(&self, destination: &Destination) {
        if let Err(e) = destination.load().await {
            self.reporter
                .report(FailureReport {
                    title: "Failed to load files".to_string(),
                    message: format!("Failed to load files from {}", destination.path()),
                    error: Some(e),
                })
                .await;
        }
    }

    pub fn select_file(&self, remote_path: impl Into<RemotePath>) {
        let remote_path = remote_path.into();
        let mut selected_files = lock(&self.selected_files);
        if !selected_files.contains(&remote_path) {
            selected_files.push(remote_path);
        }
    }

    pub fn deselect_file(&self, remote_path: &str) {
        lock(&self.selected_files).retain(|file| file != remote_path);
    }

    pub fn clear_selection(&self) {
        lock(&self.selected_files).clear();
    }

    pub fn selected_files(&self) -> Vec<RemotePath> {
        lock(&self.selected_files).clone()
    }

    pub fn can_delete_selected_files(&self) -> bool {
        !lock(&self.selected_files).is_empty() && self.lock.is_free()
    }

    pub fn can_use_destinations(&self) -> bool {
        read(&self.selected).is_some() && self.lock.is_free()
    }

    /// Delete the given files from the active destination, one after another.
    ///
    /// Every path is attempted even after failures. Returns `None` without
    /// doing anything if another operation holds the lock or no destination
    /// is selected.
    #[tracing::instrument(skip_all, fields(count = paths.len()))]
    pub async fn delete_files(&self, paths: &[RemotePath]) -> Option<BatchOutcome> {
        let destination = self.selected_destination()?;
        let Some(_guard) = self.lock.try_acquire() else {
            tracing::debug!("Operation in progress, ignoring delete request");
            return None;
        };

        let mut outcome = BatchOutcome::new();
        for path in paths {
            match destination.remove(path).await {
                Ok(()) => outcome.record_success(),
                Err(e) => {
                    tracing::error!(file_path = %path, error = %e, "Failed to delete file");
                    outcome.record_failure(path.as_str(), e);
                }
            }
        }

        tracing::info!(
            attempted = outcome.attempted(),
            failed = outcome.failed(),
            "Delete finished"
        );
        self.report_batch_failures(BatchKind::Delete, &outcome).await;
        Some(outcome)
    }

    /// Delete the current file selection, then forget selected files that are gone.
    pub async fn delete_selected_files(&self) -> Option<BatchOutcome> {
        let outcome = self.delete_files(&self.selected_files()).await;
        if let Some(destination) = self.selected_destination() {
            lock(&self.selected_files).retain(|file| destination.contains_file(file));
        }
        outcome
    }

    /// Delete every cached file of the active destination.
    ///
    /// With more than one file the user must confirm first, so that a whole
    /// folder is not wiped by accident.
    pub async fn delete_all_files(&self) -> Option<BatchOutcome> {
        let destination = self.selected_destination()?;
        if !self.lock.is_free() {
            tracing::debug!("Operation in progress, ignoring delete all request");
            return None;
        }
        let files = destination.files();

        if files.len() > 1
            && !self
                .confirmation
                .confirm_delete_all(files.len(), destination.name_plural())
                .await
        {
            tracing::debug!("Delete all was not confirmed");
            return None;
        }

        self.delete_files(&files).await
    }

    /// Copy local files into the active destination, one after another.
    ///
    /// Same locking and failure accounting as `delete_files`.
    #[tracing::instrument(skip_all, fields(count = local_paths.len()))]
    pub async fn copy_files(&self, local_paths: &[PathBuf]) -> Option<BatchOutcome> {
        let destination = self.selected_destination()?;
        let Some(_guard) = self.lock.try_acquire() else {
            tracing::debug!("Operation in progress, ignoring copy request");
            return None;
        };

        let mut outcome = BatchOutcome::new();
        for local_path in local_paths {
            match destination.copy(local_path).await {
                Ok(_) => outcome.record_success(),
                Err(e) => {
                    tracing::error!(file_path = %local_path.display(), error = %e, "Failed to copy file");
                    outcome.record_failure(local_path.to_string_lossy(), e);
                }
            }
        }

        tracing::info!(
            attempted = outcome.attempted(),
            failed = outcome.failed(),
            "Copy finished"
        );
        self.report_batch_failures(BatchKind::Copy, &outcome).await;
        Some(outcome)
    }

    async fn report_batch_failures(&self, kind: BatchKind, outcome: &BatchOutcome) {
        let report = match outcome.summary() {
            FailureSummary::None => return,
            FailureSummary::Single(item) => FailureReport {
                title: format!("Failed to {} file", kind.verb()),
                message: format!("Failed to {} {}", kind.verb(), kind.display_name(&item.path)),
                error: Some(item.error.clone()),
            },
            FailureSummary::Multiple { failed, total } => FailureReport {
                title: format!("Failed to {} files", kind.verb()),
                message: format!("{} out of {} files failed to {}", failed, total, kind.verb()),
                error: None,
            },
        };
        self.reporter.report(report).await;
    }
}

impl BatchKind {
    /// File name of a failed item. Deletes fail on remote paths, copies on local ones.
    fn display_name<'a>(&self, path: &'a str) -> &'a str {
        match self {
            BatchKind::Delete => remote_file_name(path),
            BatchKind::Copy => Path::new(path)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(path),
        }
    }
}

impl std::fmt::Debug for DestinationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DestinationController")
            .field("selected", &self.selected_destination())
            .field("selected_files", &self.selected_files())
            .field("lock", &self.lock)
            .finish()
    }
}
