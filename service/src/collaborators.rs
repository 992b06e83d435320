//! Ports for the user-facing collaborators the controller depends on.
//!
//! The front end decides how a confirmation is asked or a failure shown;
//! the controller only needs an answer or a place to send the report.

use async_trait::async_trait;

use crate::error::Error;

/// A failure to be shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureReport {
    pub title: String,
    pub message: String,
    pub error: Option<Error>,
}

#[async_trait]
pub trait FailureReporter: Send + Sync {
    async fn report(&self, report: FailureReport);
}

#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    /// Ask whether all `count` files of a destination should be deleted.
    async fn confirm_delete_all(&self, count: usize, name_plural: &str) -> bool;
}

/// Reporter that only writes the failure to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingFailureReporter;

#[async_trait]
impl FailureReporter for LoggingFailureReporter {
    async fn report(&self, report: FailureReport) {
        match &report.error {
            Some(error) => tracing::error!(%error, "{}: {}", report.title, report.message),
            None => tracing::error!("{}: {}", report.title, report.message),
        }
    }
}

pub mod mock {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Reporter that records every report for later inspection.
    #[derive(Clone, Default)]
    pub struct RecordingFailureReporter {
        reports: Arc<Mutex<Vec<FailureReport>>>,
    }

    impl RecordingFailureReporter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reports(&self) -> Vec<FailureReport> {
            self.reports.lock().unwrap().clone()
        }

        pub fn report_count(&self) -> usize {
            self.reports.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl FailureReporter for RecordingFailureReporter {
        async fn report(&self, report: FailureReport) {
            self.reports.lock().unwrap().push(report);
        }
    }

    /// Confirmation prompt with a fixed answer that records what it was asked.
    #[derive(Clone)]
    pub struct MockConfirmationPrompt {
        answer: bool,
        calls: Arc<Mutex<Vec<(usize, String)>>>,
    }

    impl MockConfirmationPrompt {
        pub fn answering(answer: bool) -> Self {
            Self {
                answer,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Every (count, plural name) the prompt was asked about.
        pub fn calls(&self) -> Vec<(usize, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ConfirmationPrompt for MockConfirmationPrompt {
        async fn confirm_delete_all(&self, count: usize, name_plural: &str) -> bool {
            self.calls
                .lock()
                .unwrap()
                .push((count, name_plural.to_string()));
            self.answer
        }
    }
}
