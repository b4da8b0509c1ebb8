//! Strength of schedule aware estimate.
//!
//! When team h hosts team a, the home-minus-away margin is modelled as
//! `Normal(s_h - s_a + k, sigma^2)`, with `k` a league-wide home-field
//! advantage. At a neutral site the winner-minus-loser margin is modelled as
//! `Normal(s_w - s_l, sigma^2)`. Maximizing the weighted log likelihood over
//! `(s, k)` is the weighted least-squares problem
//!
//! ```text
//! minimize  sum_i w_i (x_i . theta - d_i)^2,   theta = (s_1 .. s_n, k)
//! ```
//!
//! whose normal equations `A theta = b` have `A = sum w x x^T` and
//! `b = sum w x d`. The likelihood does not change when a constant is added to
//! every `s_i`, so `A` is rank deficient and one of two normalizations picks
//! a unique answer:
//!
//! * [`Normalization::SumToZero`]: hard constraint `sum s_i = 0`, solved as the
//!   KKT system `[[A, c], [c^T, 0]] [theta; mu] = [b; 0]`. A score is then a
//!   team's expected margin against a uniformly random opponent.
//! * [`Normalization::Ridge`]: penalty `lambda * sum s_i^2`, a zero-mean Gaussian
//!   prior on strengths, solved as `(A + lambda D) theta = b` with
//!   `D = diag(1, .., 1, 0)`.
//!
//! The two do not give the same scores and are never combined.

use std::collections::BTreeMap;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use super::{
    require_appearances, weighted_appearances, StrengthModel, VarianceSource, WeightedGame,
    GAME_VARIANCE,
};
use crate::error::EngineError;
use crate::league::{Team, NUM_TEAMS};

/// Column of the home-field constant in the parameter vector.
const HOME_FIELD: usize = NUM_TEAMS;
const NUM_PARAMS: usize = NUM_TEAMS + 1;

/// Singular values below this fraction of the largest count as zero.
const RANK_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Normalization {
    SumToZero,
    Ridge { lambda: f64 },
}

impl Normalization {
    /// Ridge penalty equivalent to a `Normal(0, prior_variance)` prior on each
    /// strength when a game has the historical [`GAME_VARIANCE`].
    pub fn ridge_from_prior(prior_variance: f64) -> Self {
        Normalization::Ridge {
            lambda: GAME_VARIANCE / prior_variance,
        }
    }
}

/// Sparse design row of one game and its observed margin.
fn design_row(wg: &WeightedGame<'_>) -> ([(usize, f64); 3], f64) {
    let game = wg.game;
    match game.home_and_away() {
        Some((home, away)) => (
            [(home.index(), 1.0), (away.index(), -1.0), (HOME_FIELD, 1.0)],
            game.signed_margin(),
        ),
        None => (
            [
                (game.winning_team.index(), 1.0),
                (game.losing_team.index(), -1.0),
                (HOME_FIELD, 0.0),
            ],
            game.signed_margin(),
        ),
    }
}

fn normal_equations(pool: &[WeightedGame<'_>]) -> (DMatrix<f64>, DVector<f64>) {
    let mut a = DMatrix::<f64>::zeros(NUM_PARAMS, NUM_PARAMS);
    let mut b = DVector::<f64>::zeros(NUM_PARAMS);
    for wg in pool {
        let (row, margin) = design_row(wg);
        for &(i, xi) in &row {
            if xi == 0.0 {
                continue;
            }
            b[i] += wg.weight * xi * margin;
            for &(j, xj) in &row {
                if xj != 0.0 {
                    a[(i, j)] += wg.weight * xi * xj;
                }
            }
        }
    }
    (a, b)
}

fn solve_sum_to_zero(a: &DMatrix<f64>, b: &DVector<f64>) -> Result<DVector<f64>, EngineError> {
    let dim = NUM_PARAMS + 1;
    let mut kkt = DMatrix::<f64>::zeros(dim, dim);
    kkt.view_mut((0, 0), (NUM_PARAMS, NUM_PARAMS)).copy_from(a);
    for i in 0..NUM_TEAMS {
        kkt[(i, NUM_PARAMS)] = 1.0;
        kkt[(NUM_PARAMS, i)] = 1.0;
    }
    let mut rhs = DVector::<f64>::zeros(dim);
    rhs.rows_mut(0, NUM_PARAMS).copy_from(b);

    let svd = kkt.svd(true, true);
    let tolerance = svd.singular_values.max() * RANK_TOLERANCE;
    let rank = svd.rank(tolerance);
    if rank < dim {
        return Err(EngineError::SingularSystem {
            reason: format!(
                "constrained normal equations have rank {rank} of {dim}; \
                 the schedule does not connect every team or identify home field"
            ),
        });
    }
    let solution = svd
        .solve(&rhs, tolerance)
        .map_err(|e| EngineError::SingularSystem { reason: e.to_string() })?;
    Ok(solution.rows(0, NUM_PARAMS).into_owned())
}

fn solve_ridge(
    mut a: DMatrix<f64>,
    b: &DVector<f64>,
    lambda: f64,
) -> Result<DVector<f64>, EngineError> {
    for i in 0..NUM_TEAMS {
        a[(i, i)] += lambda;
    }
    let chol = a.cholesky().ok_or_else(|| EngineError::SingularSystem {
        reason: "regularized normal equations are not positive definite".into(),
    })?;
    Ok(chol.solve(b))
}

/// Fit strengths and home field by weighted least squares.
pub fn estimate(
    pool: &[WeightedGame<'_>],
    normalization: Normalization,
    variance_source: VarianceSource,
) -> Result<StrengthModel, EngineError> {
    if pool.len() < 2 {
        return Err(EngineError::insufficient(format!(
            "{} game(s) in the training pool, need at least 2",
            pool.len()
        )));
    }
    require_appearances(&weighted_appearances(pool))?;

    let (a, b) = normal_equations(pool);
    if a[(HOME_FIELD, HOME_FIELD)] <= 0.0 {
        return Err(EngineError::SingularSystem {
            reason: "no home/away game in the training pool to identify home field".into(),
        });
    }
    let theta = match normalization {
        Normalization::SumToZero => solve_sum_to_zero(&a, &b)?,
        Normalization::Ridge { lambda } => {
            if !(lambda > 0.0) {
                return Err(EngineError::SingularSystem {
                    reason: format!("ridge penalty must be positive, got {lambda}"),
                });
            }
            solve_ridge(a, &b, lambda)?
        }
    };

    // Data term only, without the ridge penalty.
    let mut total_sq_error = 0.0;
    let mut total_weight = 0.0;
    for wg in pool {
        let (row, margin) = design_row(wg);
        let predicted: f64 = row.iter().map(|&(i, x)| x * theta[i]).sum();
        total_sq_error += wg.weight * (predicted - margin).powi(2);
        total_weight += wg.weight;
    }
    let fitted_variance = total_sq_error / total_weight;
    debug!(
        "Least-squares fit: {:?}, weighted games {:.2}, fitted variance {:.3}",
        normalization, total_weight, fitted_variance
    );

    let variance = match variance_source {
        VarianceSource::Fitted => {
            if !(fitted_variance > 0.0) {
                return Err(EngineError::insufficient(
                    "margins fit exactly, variance is zero",
                ));
            }
            fitted_variance
        }
        VarianceSource::Historical => GAME_VARIANCE,
    };

    let scores: BTreeMap<Team, f64> = Team::all().map(|t| (t, theta[t.index()])).collect();
    Ok(StrengthModel {
        variance,
        home_field: Some(theta[HOME_FIELD]),
        scores,
    })
}
