//! Team-strength estimation and win-probability prediction.
//!
//! Every estimator is a pure function of the two seasons of completed games
//! and the requested week. Identical inputs give bit-identical outputs.

pub mod mle;
pub mod predict;
pub mod simple;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::EngineError;
use crate::games::CompletedGame;
use crate::league::{Team, NUM_WEEKS_PER_SEASON};

pub use mle::Normalization;
pub use predict::{Matchup, PredictionTable, WeekOutlook};

/// How much to weight games from last season compared to this season.
pub const LAST_SEASON_WEIGHT: f64 = 0.25;

/// Historical variance of the margin of victory of a single game
/// (13.45 points standard deviation).
pub const GAME_VARIANCE: f64 = 13.45 * 13.45;

/// Variance of the zero-mean prior on team strengths used by the ridge fit.
pub const PRIOR_VARIANCE: f64 = 7.0 * 7.0;

/// Result of an estimation: relative team scores plus the spread of outcomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrengthModel {
    /// Variance of a single game's margin around its expectation.
    pub variance: f64,
    /// Points added to the home team's expected margin. Only the
    /// least-squares estimators fit this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_field: Option<f64>,
    /// One score per team; only differences are meaningful.
    pub scores: BTreeMap<Team, f64>,
}

impl StrengthModel {
    pub fn score(&self, team: Team) -> Result<f64, EngineError> {
        self.scores
            .get(&team)
            .copied()
            .ok_or_else(|| EngineError::InsufficientData {
                team: Some(team),
                reason: "no score in strength model".into(),
            })
    }
}

/// Where the reported game variance comes from in the least-squares fits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarianceSource {
    /// Weighted mean squared residual at the optimum.
    Fitted,
    /// The long-run league value [`GAME_VARIANCE`].
    Historical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimator {
    /// Weighted average margin of victory per team.
    Simple,
    /// Weighted least squares over strengths and home field.
    LeastSquares {
        normalization: Normalization,
        variance: VarianceSource,
    },
}

impl Estimator {
    pub fn label(&self) -> &'static str {
        match self {
            Estimator::Simple => "simple",
            Estimator::LeastSquares {
                normalization: Normalization::SumToZero,
                ..
            } => "mle",
            Estimator::LeastSquares {
                normalization: Normalization::Ridge { .. },
                ..
            } => "ridge",
        }
    }
}

/// Inputs shared by every estimator besides the games themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimationParams {
    /// The week about to be played; only current-season games before it count.
    pub week: u32,
    pub last_season_weight: f64,
    /// Weeks in the regular season. Later numbered weeks are postseason.
    pub season_weeks: u32,
}

impl EstimationParams {
    pub fn new(week: u32) -> Self {
        EstimationParams {
            week,
            last_season_weight: LAST_SEASON_WEIGHT,
            season_weeks: NUM_WEEKS_PER_SEASON,
        }
    }
}

/// A completed game together with its importance in the fit.
#[derive(Debug, Clone, Copy)]
pub struct WeightedGame<'a> {
    pub game: &'a CompletedGame,
    pub weight: f64,
}

/// Assemble the weighted training pool.
///
/// Last season's games carry `last_season_weight`; its postseason is kept only
/// when `include_prior_postseason` is set. This season's games count fully when
/// their numbered week is before `params.week`; labelled postseason weeks of
/// the current season never count.
pub fn training_pool<'a>(
    prior_season: &'a [CompletedGame],
    current_season: &'a [CompletedGame],
    params: &EstimationParams,
    include_prior_postseason: bool,
) -> Vec<WeightedGame<'a>> {
    let prior = prior_season
        .iter()
        .filter(|g| include_prior_postseason || g.week.is_regular_season(params.season_weeks))
        .map(|game| WeightedGame {
            game,
            weight: params.last_season_weight,
        });
    let current = current_season
        .iter()
        .filter(|g| g.week.is_before(params.week))
        .map(|game| WeightedGame { game, weight: 1.0 });
    let pool: Vec<WeightedGame<'a>> = prior.chain(current).collect();
    debug!(
        "Training pool: {} games ({} prior-season candidates, {} current-season candidates)",
        pool.len(),
        prior_season.len(),
        current_season.len()
    );
    pool
}

/// Estimate team strengths from last season's and this season's games.
pub fn estimate(
    estimator: Estimator,
    prior_season: &[CompletedGame],
    current_season: &[CompletedGame],
    params: &EstimationParams,
) -> Result<StrengthModel, EngineError> {
    match estimator {
        Estimator::Simple => {
            let pool = training_pool(prior_season, current_season, params, false);
            simple::estimate(&pool, params.season_weeks)
        }
        Estimator::LeastSquares {
            normalization,
            variance,
        } => {
            let pool = training_pool(prior_season, current_season, params, true);
            mle::estimate(&pool, normalization, variance)
        }
    }
}

/// Weighted number of games each team appears in, indexed by team.
pub(crate) fn weighted_appearances(pool: &[WeightedGame<'_>]) -> Vec<f64> {
    let mut totals = vec![0.0; crate::league::NUM_TEAMS];
    for wg in pool {
        totals[wg.game.winning_team.index()] += wg.weight;
        totals[wg.game.losing_team.index()] += wg.weight;
    }
    totals
}

/// First team with no weighted games, as an error.
pub(crate) fn require_appearances(totals: &[f64]) -> Result<(), EngineError> {
    match Team::all().find(|t| totals[t.index()] <= 0.0) {
        Some(team) => Err(EngineError::InsufficientData {
            team: Some(team),
            reason: "no weighted games in the training pool".into(),
        }),
        None => Ok(()),
    }
}
