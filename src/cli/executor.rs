//! Command executor for dispatching CLI commands
//!
//! Entry point for executing CLI commands after parsing and configuration
//! loading.

use super::handlers::{
    CheckCommandHandler, FeedCommandHandler, MigrateCommandHandler, ScheduleCommandHandler,
    SweepCommandHandler,
};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::db::{establish_async_connection_pool, run_pending_migrations};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Execute a CLI command with the given settings
///
/// Without a subcommand the scheduler runs, as `schedule` would.
///
/// # Errors
/// Returns errors from command handlers or validation failures
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    validate_command_args(cli)?;

    let command = cli.command.clone().unwrap_or(Commands::Schedule {
        once: false,
        concurrency: None,
        log_level: None,
    });

    match command {
        Commands::Migrate { dry_run, rollback } => {
            MigrateCommandHandler::new(settings)
                .execute(dry_run, rollback)
                .await
        }
        Commands::Check => CheckCommandHandler::new(settings).execute().await,
        Commands::Sweep { user, force } => {
            let state = connect(settings).await?;
            SweepCommandHandler::new(state.services.alerts)
                .execute(user, force)
                .await
                .map(|_| ())
        }
        Commands::Feed { user, limit } => {
            let state = connect(settings).await?;
            FeedCommandHandler::new(state.services.feed)
                .execute(user, limit)
                .await
                .map(|_| ())
        }
        Commands::Schedule { once, .. } => {
            let scheduler_config = settings.scheduler.clone();
            let state = connect(settings).await?;
            let handler = ScheduleCommandHandler::new(state.services.alerts, scheduler_config);
            if once {
                handler.run_once().await.map(|_| ())
            } else {
                handler.run().await
            }
        }
    }
}

/// Builds the pool and services, applying migrations first when configured.
async fn connect(settings: Settings) -> AppResult<AppState> {
    if settings.database.auto_migrate {
        let applied = run_pending_migrations(settings.database.url.clone()).await?;
        tracing::info!(applied = applied.len(), "Automatic migrations finished");
    }

    let pool = establish_async_connection_pool(&settings.database).await?;
    tracing::debug!(
        max_connections = settings.database.max_connections,
        "Database pool ready"
    );
    Ok(AppState::new(pool, settings))
}

fn validate_command_args(cli: &Cli) -> AppResult<()> {
    cli.validate().map_err(|msg| AppError::Validation {
        field: "cli_arguments".to_string(),
        reason: msg,
    })?;

    if let Some(Commands::Migrate {
        rollback: Some(steps),
        ..
    }) = cli.command
        && steps > 50
    {
        eprintln!(
            "Warning: Rolling back {} migrations is a large operation. Consider using smaller steps.",
            steps
        );
    }

    Ok(())
}
