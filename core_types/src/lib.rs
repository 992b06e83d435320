use serde::{Deserialize, Serialize};

pub mod events;

/// Absolute path of a file or directory on the remote device.
pub type RemotePath = String;

/// Definition of a single file destination on the remote device.
///
/// Destinations are defined per context (e.g. per target application) and a
/// `Destination` in the service crate is created from each definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationInfo {
    /// Name of the destination, singular. E.g. "hat"
    pub name_singular: String,
    /// Name of the destination, plural. E.g. "hats"
    pub name_plural: String,
    /// Remote folder files are copied to and listed from
    pub path: RemotePath,
    /// File extensions accepted by this destination, lower case without the leading dot
    #[serde(default)]
    pub supported_extensions: Vec<String>,
}

impl DestinationInfo {
    pub fn new(
        name_singular: impl Into<String>,
        name_plural: impl Into<String>,
        path: impl Into<String>,
        supported_extensions: &[&str],
    ) -> Self {
        Self {
            name_singular: name_singular.into(),
            name_plural: name_plural.into(),
            path: path.into(),
            supported_extensions: supported_extensions
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
        }
    }

    /// Returns true if `extension` (with or without leading dot, any case) is accepted.
    pub fn supports_extension(&self, extension: &str) -> bool {
        let extension = normalize_extension(extension);
        self.supported_extensions.iter().any(|ext| *ext == extension)
    }
}

/// Lower cases the extension and strips a leading dot.
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}
