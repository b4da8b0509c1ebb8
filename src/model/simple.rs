//! Average margin of victory.
//!
//! If the margin of team i over team j is normal with mean `s_i - s_j`, and a
//! team's opponents average out to strength zero (a balanced schedule), then
//! the sample mean of its margins is the MLE of its strength. No home-field
//! term and no normalization are needed under that assumption.

use std::collections::BTreeMap;

use super::{require_appearances, weighted_appearances, StrengthModel, WeightedGame};
use crate::error::EngineError;
use crate::league::{Team, NUM_TEAMS};

pub fn estimate(
    pool: &[WeightedGame<'_>],
    season_weeks: u32,
) -> Result<StrengthModel, EngineError> {
    if pool.len() < 2 {
        return Err(EngineError::insufficient(format!(
            "{} game(s) in the training pool, need at least 2",
            pool.len()
        )));
    }

    let mut total_point_diff = vec![0.0; NUM_TEAMS];
    for wg in pool {
        let differential = wg.game.point_differential() as f64;
        total_point_diff[wg.game.winning_team.index()] += wg.weight * differential;
        total_point_diff[wg.game.losing_team.index()] -= wg.weight * differential;
    }
    let total_weighted_games = weighted_appearances(pool);
    require_appearances(&total_weighted_games)?;

    let scores: BTreeMap<Team, f64> = Team::all()
        .map(|t| (t, total_point_diff[t.index()] / total_weighted_games[t.index()]))
        .collect();

    // Unweighted: the spread of outcomes is not expected to move between
    // seasons. Regular season only, to keep postseason matchups out.
    let mut total_sq_error = 0.0;
    let mut num_games = 0usize;
    for wg in pool.iter().filter(|wg| wg.game.week.is_regular_season(season_weeks)) {
        let differential = wg.game.point_differential() as f64;
        let estimated = scores[&wg.game.winning_team] - scores[&wg.game.losing_team];
        total_sq_error += (differential - estimated).powi(2);
        num_games += 1;
    }
    if num_games < 2 {
        return Err(EngineError::insufficient(format!(
            "{num_games} regular-season game(s) for the variance estimate, need at least 2"
        )));
    }
    let variance = total_sq_error / (num_games - 1) as f64;
    if !(variance > 0.0) {
        return Err(EngineError::insufficient("margins fit exactly, variance is zero"));
    }

    Ok(StrengthModel {
        variance,
        home_field: None,
        scores,
    })
}
