use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use jiff_diesel::ToDiesel;

use crate::db::{AsyncDbPool, checkout};
use crate::error::{AppError, AppResult};
use crate::models::{Job, JobRecord};
use crate::repositories::traits::JobStore;
use crate::schema::jobs;

#[derive(Clone)]
pub struct JobRepository {
    pool: AsyncDbPool,
}

impl JobRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

}

#[async_trait]
impl JobStore for JobRepository {
    async fn list_jobs(&self, posted_since: Timestamp) -> AppResult<Vec<Job>> {
        let mut conn = checkout(&self.pool).await?;

        let records = jobs::table
            .filter(jobs::is_open.eq(true))
            .filter(jobs::posted_at.ge(posted_since.to_diesel()))
            .order((jobs::posted_at.desc(), jobs::id.asc()))
            .select(JobRecord::as_select())
            .load::<JobRecord>(&mut conn)
            .await
            .map_err(|e| AppError::store("list jobs in window", e))?;

        Ok(records.into_iter().map(Job::from).collect())
    }

    async fn list_all_open_jobs(&self) -> AppResult<Vec<Job>> {
        let mut conn = checkout(&self.pool).await?;

        let records = jobs::table
            .filter(jobs::is_open.eq(true))
            .order((jobs::posted_at.desc(), jobs::id.asc()))
            .select(JobRecord::as_select())
            .load::<JobRecord>(&mut conn)
            .await
            .map_err(|e| AppError::store("list open jobs", e))?;

        Ok(records.into_iter().map(Job::from).collect())
    }
}
