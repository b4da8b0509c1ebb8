use anyhow::Result;
use async_trait::async_trait;

use super::models::{CompletedGame, FutureGame};

/// Trait that every source of game results and schedules must implement.
///
/// An empty vector means "no games available" and is not an error.
#[async_trait]
pub trait GameSource: Send + Sync {
    /// All completed games of a season, in feed order.
    async fn fetch_completed_games(&self, year: i32) -> Result<Vec<CompletedGame>>;

    /// Scheduled games of a season from `from_week` onwards.
    async fn fetch_future_games(&self, year: i32, from_week: u32) -> Result<Vec<FutureGame>>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
