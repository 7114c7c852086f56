//! Check command handler
//!
//! Validates configuration and probes the database without side effects.

use crate::config::Settings;
use crate::db::{checkout, establish_async_connection_pool};
use crate::error::{AppError, AppResult};

pub struct CheckCommandHandler {
    config: Settings,
}

impl CheckCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> AppResult<()> {
        use diesel_async::RunQueryDsl;

        self.config.validate()?;
        println!("✓ Configuration is valid");
        println!("  alert window:        {} day(s)", self.config.alerts.window_days);
        println!(
            "  coalesce interval:   {}s",
            self.config.alerts.coalesce_interval_secs
        );
        println!(
            "  email alerts:        {}",
            if self.config.alerts.email_enabled { "enabled" } else { "disabled" }
        );
        println!(
            "  scheduler:           {} ({})",
            if self.config.scheduler.enabled { "enabled" } else { "disabled" },
            self.config.scheduler.cron
        );

        let pool = establish_async_connection_pool(&self.config.database).await?;
        let mut conn = checkout(&pool).await?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map_err(|e| AppError::store("database health check", e))?;
        println!("✓ Database reachable");

        Ok(())
    }
}
