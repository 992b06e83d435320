use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use core_types::RemotePath;

use crate::{BridgeError, RemoteBridgeOps, remote_parent};

/// A call made against `MockRemoteBridge`, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCall {
    CreateDirectory { path: String },
    ListDirectoryFiles { path: String },
    UploadFile { local_path: PathBuf, remote_path: String },
    DeleteFile { remote_path: String },
}

/// Internal state for MockRemoteBridge.
///
/// Groups all mutable state into a single struct for simplified locking.
#[derive(Default)]
struct MockState {
    /// Directories that exist on the simulated device
    directories: HashSet<String>,
    /// Files on the simulated device in creation order (remote path -> local source)
    files: Vec<(String, Option<PathBuf>)>,
    /// Every call made, in order
    calls: Vec<BridgeCall>,
    /// Directories that should fail on create
    fail_create_paths: HashSet<String>,
    /// Directories that should fail on list
    fail_list_paths: HashSet<String>,
    /// Remote paths that should fail on upload
    fail_upload_paths: HashSet<String>,
    /// Remote paths that should fail on deletion, with the message to fail with
    fail_delete_paths: HashMap<String, String>,
}

/// Mock implementation of RemoteBridgeOps for testing
///
/// This mock allows you to:
/// - Seed a simulated device with directories and files
/// - Inject failures per operation and per path
/// - Verify which calls were made and in what order
#[derive(Clone, Default)]
pub struct MockRemoteBridge {
    state: Arc<Mutex<MockState>>,
}

impl MockRemoteBridge {
    /// Create a new mock with an empty device
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file that already exists on the device (its directory is created too)
    pub fn add_file(&self, remote_path: impl Into<String>) {
        let remote_path = remote_path.into();
        let mut state = self.state.lock().unwrap();
        state
            .directories
            .insert(remote_parent(&remote_path).to_string());
        if !state.files.iter().any(|(path, _)| *path == remote_path) {
            state.files.push((remote_path, None));
        }
    }

    /// Add a directory that already exists on the device
    pub fn add_directory(&self, path: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.directories.insert(normalize_dir(&path.into()));
    }

    /// Remove a file behind the caller's back, simulating an out-of-band change
    pub fn remove_file_externally(&self, remote_path: &str) {
        let mut state = self.state.lock().unwrap();
        state.files.retain(|(path, _)| path != remote_path);
    }

    /// Make directory creation fail for a specific path
    pub fn fail_create_directory_for(&self, path: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.fail_create_paths.insert(normalize_dir(&path.into()));
    }

    /// Make listing fail for a specific directory
    pub fn fail_list_for(&self, path: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.fail_list_paths.insert(normalize_dir(&path.into()));
    }

    /// Make upload fail for a specific remote path
    pub fn fail_upload_for(&self, remote_path: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state.fail_upload_paths.insert(remote_path.into());
    }

    /// Make deletion fail for a specific remote path
    pub fn fail_delete_for(&self, remote_path: impl Into<String>) {
        self.fail_delete_with(remote_path, "Mock deletion failure");
    }

    /// Make deletion fail for a specific remote path with the given message
    pub fn fail_delete_with(&self, remote_path: impl Into<String>, message: impl Into<String>) {
        let mut state = self.state.lock().unwrap();
        state
            .fail_delete_paths
            .insert(remote_path.into(), message.into());
    }

    /// Clear all injected failures, keeping the simulated device contents
    pub fn clear_failures(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_create_paths.clear();
        state.fail_list_paths.clear();
        state.fail_upload_paths.clear();
        state.fail_delete_paths.clear();
    }

    /// Check if a file currently exists on the device
    pub fn has_file(&self, remote_path: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.files.iter().any(|(path, _)| path == remote_path)
    }

    /// Check if a directory currently exists on the device
    pub fn has_directory(&self, path: &str) -> bool {
        let state = self.state.lock().unwrap();
        state.directories.contains(&normalize_dir(path))
    }

    /// Get the local source a remote file was last uploaded from
    pub fn uploaded_from(&self, remote_path: &str) -> Option<PathBuf> {
        let state = self.state.lock().unwrap();
        state
            .files
            .iter()
            .find(|(path, _)| path == remote_path)
            .and_then(|(_, source)| source.clone())
    }

    /// Get all calls made so far
    pub fn calls(&self) -> Vec<BridgeCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Get the remote paths of all delete calls, in call order
    pub fn delete_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BridgeCall::DeleteFile { remote_path } => Some(remote_path),
                _ => None,
            })
            .collect()
    }

    /// Get the number of calls made so far
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }
}

fn normalize_dir(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl RemoteBridgeOps for MockRemoteBridge {
    async fn create_directory(&self, path: &str) -> Result<(), BridgeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(BridgeCall::CreateDirectory {
            path: path.to_string(),
        });

        let path = normalize_dir(path);
        if state.fail_create_paths.contains(&path) {
            return Err(BridgeError::CommandFailed {
                command: format!("mkdir {}", path),
                message: "Mock create directory failure".to_string(),
            });
        }

        state.directories.insert(path);
        Ok(())
    }

    async fn list_directory_files(&self, path: &str) -> Result<Vec<RemotePath>, BridgeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(BridgeCall::ListDirectoryFiles {
            path: path.to_string(),
        });

        let path = normalize_dir(path);
        if state.fail_list_paths.contains(&path) {
            return Err(BridgeError::CommandFailed {
                command: format!("list {}", path),
                message: "Mock list failure".to_string(),
            });
        }
        if !state.directories.contains(&path) {
            return Err(BridgeError::NotFound { path });
        }

        Ok(state
            .files
            .iter()
            .filter(|(file, _)| remote_parent(file) == path)
            .map(|(file, _)| file.clone())
            .collect())
    }

    async fn upload_file(&self, local_path: &Path, remote_path: &str) -> Result<(), BridgeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(BridgeCall::UploadFile {
            local_path: local_path.to_path_buf(),
            remote_path: remote_path.to_string(),
        });

        if state.fail_upload_paths.contains(remote_path) {
            return Err(BridgeError::CommandFailed {
                command: format!("push {}", remote_path),
                message: "Mock upload failure".to_string(),
            });
        }
        if !state.directories.contains(remote_parent(remote_path)) {
            return Err(BridgeError::NotFound {
                path: remote_parent(remote_path).to_string(),
            });
        }

        // Overwrite keeps the original position in the listing
        let source = Some(local_path.to_path_buf());
        let existing = state.files.iter().position(|(path, _)| path == remote_path);
        match existing {
            Some(index) => state.files[index].1 = source,
            None => state.files.push((remote_path.to_string(), source)),
        }
        Ok(())
    }

    async fn delete_file(&self, remote_path: &str) -> Result<(), BridgeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(BridgeCall::DeleteFile {
            remote_path: remote_path.to_string(),
        });

        if let Some(message) = state.fail_delete_paths.get(remote_path) {
            return Err(BridgeError::CommandFailed {
                command: format!("rm {}", remote_path),
                message: message.clone(),
            });
        }

        let before = state.files.len();
        state.files.retain(|(path, _)| path != remote_path);
        if state.files.len() == before {
            return Err(BridgeError::NotFound {
                path: remote_path.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[async_std::test]
    async fn test_mock_create_and_list() {
        let mock = MockRemoteBridge::new();
        mock.create_directory("/sdcard/hats").await.unwrap();
        assert!(mock.has_directory("/sdcard/hats/"));

        let files = mock.list_directory_files("/sdcard/hats").await.unwrap();
        assert!(files.is_empty());
    }

    #[async_std::test]
    async fn test_mock_list_preserves_insertion_order() {
        let mock = MockRemoteBridge::new();
        mock.add_file("/sdcard/hats/b.png");
        mock.add_file("/sdcard/hats/a.png");
        mock.add_file("/sdcard/other/c.png");

        let files = mock.list_directory_files("/sdcard/hats").await.unwrap();
        assert_eq!(files, vec!["/sdcard/hats/b.png", "/sdcard/hats/a.png"]);
    }

    #[async_std::test]
    async fn test_mock_list_missing_directory() {
        let mock = MockRemoteBridge::new();
        let result = mock.list_directory_files("/sdcard/missing").await;
        assert!(matches!(result, Err(BridgeError::NotFound { .. })));
    }

    #[async_std::test]
    async fn test_mock_list_failure() {
        let mock = MockRemoteBridge::new();
        mock.add_directory("/sdcard/hats");
        mock.fail_list_for("/sdcard/hats");

        let result = mock.list_directory_files("/sdcard/hats").await;
        assert!(matches!(result, Err(BridgeError::CommandFailed { .. })));
    }

    #[async_std::test]
    async fn test_mock_upload_overwrites_in_place() {
        let mock = MockRemoteBridge::new();
        mock.add_file("/sdcard/hats/a.png");
        mock.add_file("/sdcard/hats/b.png");

        mock.upload_file(Path::new("/local/x/a.png"), "/sdcard/hats/a.png")
            .await
            .unwrap();

        let files = mock.list_directory_files("/sdcard/hats").await.unwrap();
        assert_eq!(files, vec!["/sdcard/hats/a.png", "/sdcard/hats/b.png"]);
        assert_eq!(
            mock.uploaded_from("/sdcard/hats/a.png"),
            Some(PathBuf::from("/local/x/a.png"))
        );
    }

    #[async_std::test]
    async fn test_mock_upload_failure() {
        let mock = MockRemoteBridge::new();
        mock.add_directory("/sdcard/hats");
        mock.fail_upload_for("/sdcard/hats/a.png");

        let result = mock
            .upload_file(Path::new("/local/a.png"), "/sdcard/hats/a.png")
            .await;

        assert!(result.is_err());
        assert!(!mock.has_file("/sdcard/hats/a.png"));
    }

    #[async_std::test]
    async fn test_mock_delete() {
        let mock = MockRemoteBridge::new();
        mock.add_file("/sdcard/hats/a.png");

        mock.delete_file("/sdcard/hats/a.png").await.unwrap();

        assert!(!mock.has_file("/sdcard/hats/a.png"));
        assert_eq!(mock.delete_calls(), vec!["/sdcard/hats/a.png"]);
    }

    #[async_std::test]
    async fn test_mock_delete_failure() {
        let mock = MockRemoteBridge::new();
        mock.add_file("/sdcard/hats/a.png");
        mock.fail_delete_with("/sdcard/hats/a.png", "permission denied");

        let result = mock.delete_file("/sdcard/hats/a.png").await;

        assert_eq!(
            result,
            Err(BridgeError::CommandFailed {
                command: "rm /sdcard/hats/a.png".to_string(),
                message: "permission denied".to_string(),
            })
        );
        assert!(mock.has_file("/sdcard/hats/a.png")); // Still there
    }

    #[async_std::test]
    async fn test_mock_delete_missing_file() {
        let mock = MockRemoteBridge::new();
        let result = mock.delete_file("/sdcard/hats/gone.png").await;
        assert!(matches!(result, Err(BridgeError::NotFound { .. })));
    }

    #[async_std::test]
    async fn test_clear_failures() {
        let mock = MockRemoteBridge::new();
        mock.fail_create_directory_for("/sdcard/hats");
        assert!(mock.create_directory("/sdcard/hats").await.is_err());

        mock.clear_failures();
        assert!(mock.create_directory("/sdcard/hats").await.is_ok());
        assert_eq!(mock.call_count(), 2);
    }
}
