use std::path::Path;

use async_trait::async_trait;
use core_types::RemotePath;

use crate::BridgeError;

/// Trait for remote device operations to enable testing
///
/// All paths on the device side are absolute.
#[async_trait]
pub trait RemoteBridgeOps: Send + Sync {
    /// Create a directory (and its parents) on the device.
    ///
    /// Succeeds if the directory already exists.
    async fn create_directory(&self, path: &str) -> Result<(), BridgeError>;

    /// List the files directly inside a directory as absolute paths.
    async fn list_directory_files(&self, path: &str) -> Result<Vec<RemotePath>, BridgeError>;

    /// Upload a local file to the given remote path, overwriting any existing file.
    async fn upload_file(&self, local_path: &Path, remote_path: &str) -> Result<(), BridgeError>;

    /// Delete a file on the device
    async fn delete_file(&self, remote_path: &str) -> Result<(), BridgeError>;
}
