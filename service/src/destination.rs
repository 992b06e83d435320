use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

use core_types::{DestinationInfo, RemotePath, events::DestinationEvent};
use remote_bridge::{BridgeError, RemoteBridgeOps, join_remote_path};

use crate::{
    error::Error,
    subscribers::{Subscribers, lock, read, write},
};

/// Loading flags of a destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStatus {
    /// Whether a loading attempt has finished, successfully or not.
    pub has_loaded: bool,
    /// Whether the most recent loading attempt failed.
    pub loading_failed: bool,
}

/// A remote folder whose contents are mirrored into a local cache.
///
/// The cache only changes through `load`, `copy` and `remove`. A load either
/// replaces the whole cache with the remote listing or leaves it untouched.
pub struct Destination {
    info: DestinationInfo,
    bridge: Arc<dyn RemoteBridgeOps>,
    files: RwLock<Vec<RemotePath>>,
    status: Mutex<LoadStatus>,
    subscribers: Subscribers<DestinationEvent>,
}

impl Destination {
    pub fn new(bridge: Arc<dyn RemoteBridgeOps>, info: DestinationInfo) -> Self {
        Self {
            info,
            bridge,
            files: RwLock::new(Vec::new()),
            status: Mutex::new(LoadStatus::default()),
            subscribers: Subscribers::default(),
        }
    }

    pub fn info(&self) -> &DestinationInfo {
        &self.info
    }

    pub fn name_singular(&self) -> &str {
        &self.info.name_singular
    }

    pub fn name_plural(&self) -> &str {
        &self.info.name_plural
    }

    pub fn path(&self) -> &str {
        &self.info.path
    }

    pub fn supported_extensions(&self) -> &[String] {
        &self.info.supported_extensions
    }

    /// Snapshot of the cached remote files, in listing order.
    pub fn files(&self) -> Vec<RemotePath> {
        read(&self.files).clone()
    }

    pub fn file_count(&self) -> usize {
        read(&self.files).len()
    }

    pub fn contains_file(&self, remote_path: &str) -> bool {
        read(&self.files).iter().any(|file| file == remote_path)
    }

    pub fn status(&self) -> LoadStatus {
        *lock(&self.status)
    }

    pub fn has_loaded(&self) -> bool {
        self.status().has_loaded
    }

    pub fn loading_failed(&self) -> bool {
        self.status().loading_failed
    }

    /// Subscribe to status and cache changes.
    pub fn subscribe(&self) -> flume::Receiver<DestinationEvent> {
        self.subscribers.subscribe()
    }

    /// Loads the contents of this destination, replacing the old contents if any.
    ///
    /// On failure the cache is left as it was, `loading_failed` is set and the
    /// error is returned for the caller to handle. `has_loaded` is set in both cases.
    #[tracing::instrument(skip_all, fields(path = %self.info.path), err)]
    pub async fn load(&self) -> Result<(), Error> {
        self.update_status(|status| {
            status.has_loaded = false;
            status.loading_failed = false;
        });

        let result = match self.fetch_listing().await {
            Ok(files) => {
                tracing::debug!(count = files.len(), "Loaded destination listing");
                self.replace_files(files);
                Ok(())
            }
            Err(e) => {
                self.update_status(|status| status.loading_failed = true);
                Err(Error::from(e))
            }
        };

        self.update_status(|status| status.has_loaded = true);
        result
    }

    async fn fetch_listing(&self) -> Result<Vec<RemotePath>, BridgeError> {
        // Create the destination if it does not exist
        self.bridge.create_directory(&self.info.path).await?;
        self.bridge.list_directory_files(&self.info.path).await
    }

    /// Copies a local file to this destination and returns its remote path.
    ///
    /// A file with the same name already in the destination is overwritten.
    #[tracing::instrument(skip_all, fields(path = %self.info.path, source = %local_path.display()), err)]
    pub async fn copy(&self, local_path: &Path) -> Result<RemotePath, Error> {
        let file_name = local_path
            .file_name()
            .ok_or_else(|| {
                Error::InvalidInput(format!("{} has no file name", local_path.display()))
            })?
            .to_str()
            .map(|name| name.to_string())
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "{} has a file name that is not valid UTF-8",
                    local_path.display()
                ))
            })?;

        self.bridge.create_directory(&self.info.path).await?;

        let destination_path = join_remote_path(&self.info.path, &file_name);
        self.bridge
            .upload_file(local_path, &destination_path)
            .await?;

        let added = {
            let mut files = write(&self.files);
            if files.contains(&destination_path) {
                false
            } else {
                files.push(destination_path.clone());
                true
            }
        };
        if added {
            self.subscribers.notify(DestinationEvent::FileAdded {
                path: destination_path.clone(),
            });
        }

        tracing::info!(destination = %destination_path, "Copied file");
        Ok(destination_path)
    }

    /// Deletes a file from the device, then drops it from the cache.
    ///
    /// A file that is already gone from the device counts as deleted.
    #[tracing::instrument(skip_all, fields(file = %remote_path), err)]
    pub async fn remove(&self, remote_path: &str) -> Result<(), Error> {
        match self.bridge.delete_file(remote_path).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!("File was already missing from the device, dropping it from the cache");
            }
            Err(e) => return Err(e.into()),
        }

        let removed = {
            let mut files = write(&self.files);
            let before = files.len();
            files.retain(|file| file != remote_path);
            files.len() != before
        };
        if removed {
            self.subscribers.notify(DestinationEvent::FileRemoved {
                path: remote_path.to_string(),
            });
        }
        Ok(())
    }

    fn replace_files(&self, files: Vec<RemotePath>) {
        *write(&self.files) = files.clone();
        self.subscribers
            .notify(DestinationEvent::FilesReplaced { files });
    }

    fn update_status(&self, update: impl FnOnce(&mut LoadStatus)) {
        let (before, after) = {
            let mut status = lock(&self.status);
            let before = *status;
            update(&mut status);
            (before, *status)
        };
        if before != after {
            self.subscribers.notify(DestinationEvent::LoadStateChanged {
                has_loaded: after.has_loaded,
                loading_failed: after.loading_failed,
            });
        }
    }
}

impl std::fmt::Debug for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Destination")
            .field("info", &self.info)
            .field("file_count", &self.file_count())
            .field("status", &self.status())
            .finish()
    }
}
