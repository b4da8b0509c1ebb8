use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures_util::future::try_join;
use tracing::info;

use crate::config::Config;
use crate::games::{CompletedGame, GameSource};
use crate::league::Team;
use crate::model::{self, predict, PredictionTable, StrengthModel};
use crate::pool::{self, PickCandidate, PickPlan, ProbabilityGrid};
use crate::report;

/// Ties a game source to the estimators, the predictor and the pick planner.
pub struct Runner {
    config: Config,
    source: Arc<dyn GameSource>,
}

impl Runner {
    pub fn new(config: Config, source: Arc<dyn GameSource>) -> Self {
        Runner { config, source }
    }

    /// Last season's and this season's completed games, fetched together.
    async fn load_seasons(&self, year: i32) -> Result<(Vec<CompletedGame>, Vec<CompletedGame>)> {
        let (prior, current) = try_join(
            self.source.fetch_completed_games(year - 1),
            self.source.fetch_completed_games(year),
        )
        .await?;
        info!(
            "{}: {} completed game(s) in {}, {} in {}",
            self.source.name(),
            prior.len(),
            year - 1,
            current.len(),
            year
        );
        Ok((prior, current))
    }

    pub async fn strengths(&self, year: i32, week: u32) -> Result<StrengthModel> {
        let (prior, current) = self.load_seasons(year).await?;
        let estimator = self.config.estimator();
        let model = model::estimate(estimator, &prior, &current, &self.config.params(week))
            .with_context(|| format!("Failed to estimate strengths for {year} week {week}"))?;
        match model.home_field {
            Some(k) => info!(
                "Estimator {}: variance {:.3}, home field {:.3}",
                estimator.label(),
                model.variance,
                k
            ),
            None => info!("Estimator {}: variance {:.3}", estimator.label(), model.variance),
        }
        Ok(model)
    }

    /// Win probabilities from `week` through the end of the regular season.
    pub async fn predictions(&self, year: i32, week: u32) -> Result<PredictionTable> {
        let end_week = self.config.season_weeks;
        let (model, future) = try_join(
            self.strengths(year, week),
            self.source.fetch_future_games(year, week),
        )
        .await?;
        info!("{} scheduled game(s) from week {}", future.len(), week);
        let table = predict::predict_schedule(&model, &future, week, end_week)
            .context("Failed to predict schedule")?;
        Ok(table)
    }

    /// Probability grid for pick planning: a saved text report when given,
    /// fresh predictions otherwise.
    pub async fn pick_grid(
        &self,
        year: i32,
        week: u32,
        saved: Option<&Path>,
    ) -> Result<ProbabilityGrid> {
        match saved {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| {
                        format!("Failed to read predictions from {}", path.display())
                    })?;
                let grid = report::parse_text_predictions(&raw, week)
                    .with_context(|| format!("Invalid predictions in {}", path.display()))?;
                info!(
                    "Loaded {} team(s) x {} week(s) from {}",
                    grid.rows.len(),
                    grid.num_weeks,
                    path.display()
                );
                Ok(grid)
            }
            None => Ok(ProbabilityGrid::from_table(&self.predictions(year, week).await?)),
        }
    }

    pub async fn picks(
        &self,
        year: i32,
        week: u32,
        saved: Option<&Path>,
        exclude: &BTreeSet<Team>,
    ) -> Result<PickPlan> {
        let grid = self.pick_grid(year, week, saved).await?;
        let plan = pool::optimal_picks(&grid, exclude).context("Failed to plan picks")?;
        info!("Optimal plan: {:.3} expected wins", plan.expected_wins);
        Ok(plan)
    }

    pub async fn compare(
        &self,
        year: i32,
        week: u32,
        saved: Option<&Path>,
        exclude: &BTreeSet<Team>,
    ) -> Result<Vec<PickCandidate>> {
        let grid = self.pick_grid(year, week, saved).await?;
        pool::compare_first_week(&grid, exclude).context("Failed to compare picks")
    }
}
