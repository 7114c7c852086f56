//! Application state shared by CLI commands and the scheduler.

use crate::config::Settings;
use crate::db::AsyncDbPool;
use crate::repositories::Repositories;
use crate::services::{Services, Stores};

/// Services wired over the Postgres repositories.
///
/// Cloning is cheap since both Services and AsyncDbPool use Arc internally.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Direct access to the database connection pool
    pub db_pool: AsyncDbPool,
    pub settings: Settings,
}

impl AppState {
    /// Initializes all repositories and services from the provided pool.
    ///
    /// # Example
    /// ```ignore
    /// let pool = establish_async_connection_pool(&settings.database).await?;
    /// let state = AppState::new(pool, settings);
    /// ```
    pub fn new(pool: AsyncDbPool, settings: Settings) -> Self {
        let stores = Stores::from(Repositories::new(pool.clone()));
        let services = Services::new(stores, &settings);
        Self {
            services,
            db_pool: pool,
            settings,
        }
    }
}
