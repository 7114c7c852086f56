use clap::Parser;

use job_alerts::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match load_and_merge_config(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };

    let _log_handle = match init_logger_from_settings(&settings) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Logger initialization error: {:#}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        name = %settings.application.name,
        version = job_alerts::pkg_version(),
        command = ?cli.command,
        "Starting"
    );

    if let Err(e) = execute_command(&cli, settings).await {
        tracing::error!(error = ?e, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
