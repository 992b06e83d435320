use core_types::RemotePath;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct FailedItem {
    pub path: RemotePath,
    pub error: Error,
}

/// What a failure report for a batch should contain.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureSummary<'a> {
    None,
    /// Exactly one item failed; the report names it and its error.
    Single(&'a FailedItem),
    /// More than one item failed; only the counts are reported.
    Multiple { failed: usize, total: usize },
}

/// Result of a sequential batch operation where each item may fail on its own.
///
/// Only a single failure is kept in detail. As soon as a second failure is
/// recorded the detail is dropped and only the counts remain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    attempted: usize,
    failed: usize,
    single_failure: Option<FailedItem>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.attempted += 1;
    }

    pub fn record_failure(&mut self, path: impl Into<RemotePath>, error: Error) {
        self.attempted += 1;
        self.failed += 1;
        self.single_failure = if self.failed == 1 {
            Some(FailedItem {
                path: path.into(),
                error,
            })
        } else {
            None
        };
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn summary(&self) -> FailureSummary<'_> {
        match (self.failed, &self.single_failure) {
            (0, _) => FailureSummary::None,
            (1, Some(item)) => FailureSummary::Single(item),
            (failed, _) => FailureSummary::Multiple {
                failed,
                total: self.attempted,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use remote_bridge::BridgeError;

    use super::*;

    fn bridge_error(message: &str) -> Error {
        Error::BridgeError(BridgeError::Other(message.to_string()))
    }

    #[test]
    fn test_no_failures() {
        let mut outcome = BatchOutcome::new();
        outcome.record_success();
        outcome.record_success();

        assert_eq!(outcome.attempted(), 2);
        assert_eq!(outcome.succeeded(), 2);
        assert!(outcome.is_success());
        assert_eq!(outcome.summary(), FailureSummary::None);
    }

    #[test]
    fn test_single_failure_keeps_detail() {
        let mut outcome = BatchOutcome::new();
        outcome.record_success();
        outcome.record_failure("/sdcard/hats/b.png", bridge_error("denied"));
        outcome.record_success();

        match outcome.summary() {
            FailureSummary::Single(item) => {
                assert_eq!(item.path, "/sdcard/hats/b.png");
                assert_eq!(item.error, bridge_error("denied"));
            }
            other => panic!("Expected single failure, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_failures_only_count() {
        let mut outcome = BatchOutcome::new();
        outcome.record_failure("/a", bridge_error("one"));
        outcome.record_success();
        outcome.record_failure("/b", bridge_error("two"));
        outcome.record_failure("/c", bridge_error("three"));

        assert_eq!(outcome.failed(), 3);
        assert_eq!(outcome.succeeded(), 1);
        assert_eq!(
            outcome.summary(),
            FailureSummary::Multiple {
                failed: 3,
                total: 4
            }
        );
    }
}
