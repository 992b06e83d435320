use std::sync::{Arc, RwLock};

use core_types::{events::RegistryEvent, normalize_extension};
use remote_bridge::RemoteBridgeOps;

use crate::{
    destination::Destination,
    destination_config::DestinationConfig,
    subscribers::{Subscribers, read, write},
};

#[derive(Default)]
struct RegistryState {
    context: Option<String>,
    destinations: Vec<Arc<Destination>>,
}

/// Owns the destinations of the active context.
///
/// Switching context replaces the whole list; destinations of the previous
/// context are dropped along with their caches.
pub struct DestinationRegistry {
    config: DestinationConfig,
    bridge: Arc<dyn RemoteBridgeOps>,
    state: RwLock<RegistryState>,
    subscribers: Subscribers<RegistryEvent>,
}

impl DestinationRegistry {
    pub fn new(config: DestinationConfig, bridge: Arc<dyn RemoteBridgeOps>) -> Self {
        Self {
            config,
            bridge,
            state: RwLock::new(RegistryState::default()),
            subscribers: Subscribers::default(),
        }
    }

    /// Switch to the destinations of `context`, or to none.
    pub fn set_context(&self, context: Option<&str>) -> Vec<Arc<Destination>> {
        let destinations: Vec<Arc<Destination>> = context
            .map(|context| self.config.destinations_for(context))
            .unwrap_or(&[])
            .iter()
            .map(|info| Arc::new(Destination::new(self.bridge.clone(), info.clone())))
            .collect();

        tracing::info!(
            context = context.unwrap_or("<none>"),
            count = destinations.len(),
            "Destinations changed"
        );

        {
            let mut state = write(&self.state);
            state.context = context.map(|context| context.to_string());
            state.destinations = destinations.clone();
        }
        self.subscribers.notify(RegistryEvent::DestinationsChanged {
            context: context.map(|context| context.to_string()),
            destination_count: destinations.len(),
        });

        destinations
    }

    pub fn current_context(&self) -> Option<String> {
        read(&self.state).context.clone()
    }

    pub fn current(&self) -> Vec<Arc<Destination>> {
        read(&self.state).destinations.clone()
    }

    /// Destinations of the current context accepting files with `extension`.
    pub fn destinations_for_extension(&self, extension: &str) -> Vec<Arc<Destination>> {
        let extension = normalize_extension(extension);
        read(&self.state)
            .destinations
            .iter()
            .filter(|destination| destination.info().supports_extension(&extension))
            .cloned()
            .collect()
    }

    pub fn subscribe(&self) -> flume::Receiver<RegistryEvent> {
        self.subscribers.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use core_types::DestinationInfo;
    use remote_bridge::MockRemoteBridge;

    use super::*;

    fn registry() -> DestinationRegistry {
        let config = DestinationConfig::new()
            .with_context(
                "gorilla",
                vec![
                    DestinationInfo::new("hat", "hats", "/sdcard/hats", &["hat"]),
                    DestinationInfo::new("material", "materials", "/sdcard/materials", &["mat", "hat"]),
                ],
            )
            .with_context(
                "saber",
                vec![DestinationInfo::new("saber", "sabers", "/sdcard/sabers", &["saber"])],
            );
        DestinationRegistry::new(config, Arc::new(MockRemoteBridge::new()))
    }

    #[test]
    fn test_set_context_replaces_destinations() {
        let registry = registry();
        assert!(registry.current().is_empty());

        registry.set_context(Some("gorilla"));
        let names: Vec<String> = registry
            .current()
            .iter()
            .map(|d| d.name_plural().to_string())
            .collect();
        assert_eq!(names, vec!["hats", "materials"]);

        registry.set_context(Some("saber"));
        assert_eq!(registry.current().len(), 1);
        assert_eq!(registry.current_context(), Some("saber".to_string()));
    }

    #[test]
    fn test_unknown_or_no_context_is_empty() {
        let registry = registry();
        assert!(registry.set_context(Some("unknown")).is_empty());
        assert!(registry.set_context(None).is_empty());
        assert_eq!(registry.current_context(), None);
    }

    #[test]
    fn test_context_switch_creates_fresh_destinations() {
        let registry = registry();
        let first = registry.set_context(Some("gorilla"));
        let second = registry.set_context(Some("gorilla"));
        assert!(!Arc::ptr_eq(&first[0], &second[0]));
    }

    #[test]
    fn test_change_notification() {
        let registry = registry();
        let rx = registry.subscribe();

        registry.set_context(Some("gorilla"));

        assert_eq!(
            rx.try_recv(),
            Ok(RegistryEvent::DestinationsChanged {
                context: Some("gorilla".to_string()),
                destination_count: 2,
            })
        );
    }

    #[test]
    fn test_destinations_for_extension() {
        let registry = registry();
        registry.set_context(Some("gorilla"));

        let for_hat = registry.destinations_for_extension(".HAT");
        assert_eq!(for_hat.len(), 2);
        let for_mat = registry.destinations_for_extension("mat");
        assert_eq!(for_mat.len(), 1);
        assert_eq!(for_mat[0].name_plural(), "materials");
        assert!(registry.destinations_for_extension("png").is_empty());
    }
}
