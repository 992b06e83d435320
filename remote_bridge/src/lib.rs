// The bridge is the only way commands reach the device. Everything above this
// crate talks to `RemoteBridgeOps` so that the transport can be swapped out
// (adb over USB/wifi in production, `MockRemoteBridge` in tests).

pub mod adb;
pub mod mock;
pub mod ops;

pub use adb::AdbBridge;
pub use mock::MockRemoteBridge;
pub use ops::RemoteBridgeOps;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("Remote path not found: {path}")]
    NotFound { path: String },

    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl BridgeError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BridgeError::NotFound { .. })
    }
}

/// Joins a file name onto a remote directory using `/` separators.
pub fn join_remote_path(directory: &str, file_name: &str) -> String {
    let directory = directory.trim_end_matches('/');
    let file_name = file_name.trim_start_matches('/');
    format!("{}/{}", directory, file_name)
}

/// Returns the last component of a remote path.
pub fn remote_file_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}

/// Returns the directory part of a remote path, without trailing separator.
pub fn remote_parent(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => "/",
        Some(index) => &trimmed[..index],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_remote_path() {
        assert_eq!(join_remote_path("/sdcard/hats", "a.png"), "/sdcard/hats/a.png");
        assert_eq!(join_remote_path("/sdcard/hats/", "a.png"), "/sdcard/hats/a.png");
    }

    #[test]
    fn test_remote_file_name() {
        assert_eq!(remote_file_name("/sdcard/hats/a.png"), "a.png");
        assert_eq!(remote_file_name("a.png"), "a.png");
    }

    #[test]
    fn test_remote_parent() {
        assert_eq!(remote_parent("/sdcard/hats/a.png"), "/sdcard/hats");
        assert_eq!(remote_parent("/a.png"), "/");
        assert_eq!(remote_parent("a.png"), "");
    }

    #[test]
    fn test_error_display() {
        let err = BridgeError::NotFound {
            path: "/sdcard/hats/a.png".to_string(),
        };
        assert_eq!(err.to_string(), "Remote path not found: /sdcard/hats/a.png");
        assert!(err.is_not_found());

        let err = BridgeError::CommandFailed {
            command: "push".to_string(),
            message: "device offline".to_string(),
        };
        assert_eq!(err.to_string(), "Command 'push' failed: device offline");
        assert!(!err.is_not_found());
    }
}
