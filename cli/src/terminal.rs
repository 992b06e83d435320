use async_std::io::{self, WriteExt};
use async_trait::async_trait;
use service::collaborators::{ConfirmationPrompt, FailureReport, FailureReporter};

/// Asks on the terminal, defaulting to "no" on anything but y/yes.
pub struct TerminalConfirmationPrompt;

#[async_trait]
impl ConfirmationPrompt for TerminalConfirmationPrompt {
    async fn confirm_delete_all(&self, count: usize, name_plural: &str) -> bool {
        let mut stdout = io::stdout();
        let question = format!("Delete all {} {}? [y/N] ", count, name_plural);
        if stdout.write_all(question.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().read_line(&mut answer).await {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Prints failures to stderr and logs them.
pub struct TerminalFailureReporter;

#[async_trait]
impl FailureReporter for TerminalFailureReporter {
    async fn report(&self, report: FailureReport) {
        match &report.error {
            Some(error) => {
                tracing::error!(%error, "{}", report.message);
                eprintln!("{}: {}\n  {}", report.title, report.message, error);
            }
            None => {
                tracing::error!("{}", report.message);
                eprintln!("{}: {}", report.title, report.message);
            }
        }
    }
}
