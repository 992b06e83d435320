use crate::RemotePath;

/// Change notifications emitted by a destination.
#[derive(Debug, Clone, PartialEq)]
pub enum DestinationEvent {
    /// Emitted only when one of the loading flags actually changes.
    LoadStateChanged {
        has_loaded: bool,
        loading_failed: bool,
    },
    /// The whole cached listing was replaced by a load.
    FilesReplaced { files: Vec<RemotePath> },
    FileAdded { path: RemotePath },
    FileRemoved { path: RemotePath },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationLockEvent {
    FreeChanged { is_free: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// The destination list was replaced wholesale, e.g. after a context switch.
    DestinationsChanged {
        context: Option<String>,
        destination_count: usize,
    },
}
