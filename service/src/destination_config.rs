use std::collections::HashMap;
use std::path::Path;

use core_types::{DestinationInfo, normalize_extension};
use serde::Deserialize;

use crate::error::Error;

/// Destination definitions per context (application id).
///
/// Stored as JSON:
///
/// ```json
/// {
///   "com.AnotherAxiom.GorillaTag": [
///     {
///       "nameSingular": "hat",
///       "namePlural": "hats",
///       "path": "/sdcard/ModData/com.AnotherAxiom.GorillaTag/Mods/Hats",
///       "supportedExtensions": ["hat"]
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct DestinationConfig {
    contexts: HashMap<String, Vec<DestinationInfo>>,
}

impl DestinationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, context: impl Into<String>, destinations: Vec<DestinationInfo>) -> Self {
        self.contexts.insert(context.into(), destinations);
        self.normalize();
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let mut config: DestinationConfig = serde_json::from_str(json)?;
        config.validate()?;
        config.normalize();
        Ok(config)
    }

    pub async fn load(path: &Path) -> Result<Self, Error> {
        tracing::debug!("Loading destination config from {}", path.display());
        let json = async_std::fs::read_to_string(path).await.map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Destinations for a context, in definition order. Unknown contexts have none.
    pub fn destinations_for(&self, context: &str) -> &[DestinationInfo] {
        self.contexts
            .get(context)
            .map(|destinations| destinations.as_slice())
            .unwrap_or(&[])
    }

    pub fn contexts(&self) -> Vec<&str> {
        let mut contexts: Vec<&str> = self.contexts.keys().map(|key| key.as_str()).collect();
        contexts.sort();
        contexts
    }

    fn validate(&self) -> Result<(), Error> {
        for (context, destinations) in &self.contexts {
            for destination in destinations {
                if !destination.path.starts_with('/') {
                    return Err(Error::ConfigError(format!(
                        "Destination '{}' of {} must have an absolute path, got '{}'",
                        destination.name_plural, context, destination.path
                    )));
                }
            }
        }
        Ok(())
    }

    fn normalize(&mut self) {
        for destination in self.contexts.values_mut().flatten() {
            for extension in destination.supported_extensions.iter_mut() {
                *extension = normalize_extension(extension);
            }
        }
    }
}
