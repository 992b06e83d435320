pub mod batch_outcome;
pub mod collaborators;
pub mod destination;
pub mod destination_config;
pub mod destination_controller;
pub mod destination_registry;
pub mod error;
pub mod operation_lock;
mod subscribers;
