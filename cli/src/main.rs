mod logging;
mod terminal;

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use async_std::task;
use clap::{Parser, Subcommand};
use remote_bridge::{AdbBridge, RemoteBridgeOps, join_remote_path};
use service::{
    batch_outcome::BatchOutcome,
    destination::Destination,
    destination_config::DestinationConfig,
    destination_controller::DestinationController,
    destination_registry::DestinationRegistry,
    error::Error,
    operation_lock::OperationLock,
};
use terminal::{TerminalConfirmationPrompt, TerminalFailureReporter};

#[derive(Parser, Debug)]
#[command(about = "Copy files to and manage files in folders on an adb connected device")]
struct Cli {
    /// Destination definitions (JSON, keyed by application id)
    #[arg(long)]
    config: PathBuf,

    /// Application id whose destinations are used
    #[arg(long)]
    app_id: String,

    /// Destination to use, by singular or plural name. Defaults to the first one
    #[arg(long)]
    destination: Option<String>,

    /// adb executable name or full path
    #[arg(long, env = "ADB_PATH", default_value = "adb")]
    adb: PathBuf,

    /// Serial of the device, when more than one is connected
    #[arg(long)]
    serial: Option<String>,

    /// Also write JSON logs to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the destinations of the application
    Destinations,
    /// List the files in the destination
    List,
    /// Copy local files into the destination
    Copy { files: Vec<PathBuf> },
    /// Delete files from the destination, by name or absolute path
    Delete { files: Vec<String> },
    /// Delete every file in the destination
    DeleteAll,
}

fn main() -> ExitCode {
    let args = Cli::parse();
    let _guard = logging::init_logging(args.log_dir.as_deref());

    match task::block_on(run(args)) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<ExitCode, Error> {
    let config = DestinationConfig::load(&args.config).await?;

    let mut bridge = AdbBridge::new(&args.adb);
    if let Some(serial) = &args.serial {
        bridge = bridge.with_serial(serial);
    }
    let bridge: Arc<dyn RemoteBridgeOps> = Arc::new(bridge);

    let registry = Arc::new(DestinationRegistry::new(config, bridge));
    let controller = DestinationController::new(
        Arc::new(OperationLock::new()),
        Arc::new(TerminalConfirmationPrompt),
        Arc::new(TerminalFailureReporter),
    );

    let destinations = registry.set_context(Some(&args.app_id));
    if destinations.is_empty() {
        return Err(Error::ConfigError(format!(
            "No destinations defined for {}",
            args.app_id
        )));
    }

    if let Command::Destinations = args.command {
        for destination in &destinations {
            println!(
                "{}\t{}\t{}",
                destination.name_plural(),
                destination.path(),
                destination.supported_extensions().join(",")
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let selected = select(&destinations, args.destination.as_deref())?;
    if let Some(load) = controller.set_selected_destination(Some(selected.clone())) {
        load.await;
    }
    if selected.loading_failed() {
        return Ok(ExitCode::FAILURE);
    }

    let outcome = match args.command {
        Command::Destinations => return Ok(ExitCode::SUCCESS),
        Command::List => {
            for file in selected.files() {
                println!("{}", file);
            }
            return Ok(ExitCode::SUCCESS);
        }
        Command::Copy { files } => controller.copy_files(&files).await,
        Command::Delete { files } => {
            let paths: Vec<String> = files
                .iter()
                .map(|file| {
                    if file.starts_with('/') {
                        file.clone()
                    } else {
                        join_remote_path(selected.path(), file)
                    }
                })
                .collect();
            controller.delete_files(&paths).await
        }
        Command::DeleteAll => controller.delete_all_files().await,
    };

    Ok(exit_code(outcome.as_ref()))
}

fn select(destinations: &[Arc<Destination>], name: Option<&str>) -> Result<Arc<Destination>, Error> {
    let found = match name {
        None => destinations.first(),
        Some(name) => destinations.iter().find(|destination| {
            destination.name_plural().eq_ignore_ascii_case(name)
                || destination.name_singular().eq_ignore_ascii_case(name)
        }),
    };
    found
        .cloned()
        .ok_or_else(|| Error::InvalidInput(format!("Unknown destination: {}", name.unwrap_or(""))))
}

fn exit_code(outcome: Option<&BatchOutcome>) -> ExitCode {
    match outcome {
        Some(outcome) if outcome.is_success() => {
            println!("{} file(s) done", outcome.attempted());
            ExitCode::SUCCESS
        }
        // Not confirmed, nothing was done
        None => ExitCode::SUCCESS,
        Some(_) => ExitCode::FAILURE,
    }
}
