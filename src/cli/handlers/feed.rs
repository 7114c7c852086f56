//! Feed command handler

use jiff::Timestamp;

use crate::error::{AppError, AppResult};
use crate::matching::MatchResult;
use crate::models::UserId;
use crate::services::FeedService;

/// Prints the ranked feed as JSON lines
pub struct FeedCommandHandler {
    feed: FeedService,
}

impl FeedCommandHandler {
    pub fn new(feed: FeedService) -> Self {
        Self { feed }
    }

    /// Returns how many jobs were printed.
    pub async fn execute(&self, user_id: Option<UserId>, limit: usize) -> AppResult<usize> {
        let ranked = self.feed.feed(user_id, Timestamp::now()).await?;

        let lines = render_lines(&ranked, limit)?;
        for line in &lines {
            println!("{}", line);
        }
        tracing::info!(shown = lines.len(), total = ranked.len(), "Feed printed");

        Ok(lines.len())
    }
}

fn render_lines(ranked: &[MatchResult], limit: usize) -> AppResult<Vec<String>> {
    ranked
        .iter()
        .take(limit)
        .map(|result| {
            serde_json::to_string(result).map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })
        })
        .collect()
}
