//! Optimal pick sequences.
//!
//! A week-by-week DP would need the set of used teams as state (2^32 subsets).
//! Going team by team instead, the state is the set of weeks already covered:
//! `best[set]` is the most expected wins obtainable by covering exactly the
//! weeks in `set` with distinct teams among those processed so far. For every
//! team we remember which week (if any) it took to reach each state, and walk
//! those choices backwards to recover the plan.

use std::collections::BTreeSet;

use tracing::debug;

use super::{Pick, PickCandidate, PickPlan, ProbabilityGrid, MAX_WEEKS};
use crate::error::EngineError;
use crate::league::Team;

/// Team not used for any week in this state.
const NOT_PICKED: u8 = 0;

/// Highest expected wins over weeks `first_week..num_weeks` using `teams`, and
/// the team picked for each of those weeks.
fn solve(
    grid: &ProbabilityGrid,
    teams: &[Team],
    first_week: usize,
) -> Result<(f64, Vec<Team>), EngineError> {
    let weeks = grid.num_weeks.saturating_sub(first_week);
    if weeks > MAX_WEEKS {
        return Err(EngineError::TooManyWeeks {
            weeks,
            max: MAX_WEEKS,
        });
    }
    if teams.len() < weeks {
        return Err(EngineError::NoFeasiblePicks {
            available: teams.len(),
            weeks,
        });
    }

    let states = 1usize << weeks;
    let mut best = vec![f64::NEG_INFINITY; states];
    best[0] = 0.0;
    // choices[i][set]: week + 1 taken by team i to reach `set`, or NOT_PICKED.
    let mut choices: Vec<Vec<u8>> = Vec::with_capacity(teams.len());

    for &team in teams {
        let mut next = best.clone();
        let mut choice = vec![NOT_PICKED; states];
        for (set, &value) in best.iter().enumerate() {
            if value == f64::NEG_INFINITY {
                continue;
            }
            for week in 0..weeks {
                let bit = 1usize << week;
                if set & bit != 0 {
                    continue;
                }
                let candidate = value + grid.value(team, first_week + week);
                if candidate > next[set | bit] {
                    next[set | bit] = candidate;
                    choice[set | bit] = week as u8 + 1;
                }
            }
        }
        best = next;
        choices.push(choice);
    }

    let full = states - 1;
    let optimum = best[full];
    if optimum == f64::NEG_INFINITY {
        return Err(EngineError::NoFeasiblePicks {
            available: teams.len(),
            weeks,
        });
    }

    let mut sequence = vec![None; weeks];
    let mut set = full;
    for (i, choice) in choices.iter().enumerate().rev() {
        let c = choice[set];
        if c != NOT_PICKED {
            let week = (c - 1) as usize;
            sequence[week] = Some(teams[i]);
            set &= !(1usize << week);
        }
    }
    let sequence = sequence
        .into_iter()
        .collect::<Option<Vec<Team>>>()
        .ok_or(EngineError::NoFeasiblePicks {
            available: teams.len(),
            weeks,
        })?;
    Ok((optimum, sequence))
}

/// Best pick for every week of the grid, never using a team in `exclude` and
/// never using a team twice.
pub fn optimal_picks(
    grid: &ProbabilityGrid,
    exclude: &BTreeSet<Team>,
) -> Result<PickPlan, EngineError> {
    let teams: Vec<Team> = grid.available(exclude).collect();
    let (expected_wins, sequence) = solve(grid, &teams, 0)?;
    debug!(
        "Planned {} week(s) from {} team(s): {:.3} expected wins",
        grid.num_weeks,
        teams.len(),
        expected_wins
    );
    let picks = sequence
        .into_iter()
        .enumerate()
        .map(|(offset, team)| Pick {
            week: grid.week_number(offset),
            team,
            win_probability: grid
                .rows
                .get(&team)
                .and_then(|row| row.get(offset).copied().flatten()),
        })
        .collect();
    Ok(PickPlan {
        expected_wins,
        picks,
    })
}

/// Every team that plays in the first week, ranked by the expected wins of
/// picking it now and the remaining weeks optimally without it.
pub fn compare_first_week(
    grid: &ProbabilityGrid,
    exclude: &BTreeSet<Team>,
) -> Result<Vec<PickCandidate>, EngineError> {
    let teams: Vec<Team> = grid.available(exclude).collect();
    if grid.num_weeks == 0 {
        return Ok(vec![]);
    }
    if teams.len() < grid.num_weeks {
        return Err(EngineError::NoFeasiblePicks {
            available: teams.len(),
            weeks: grid.num_weeks,
        });
    }

    let mut candidates = Vec::new();
    for &team in &teams {
        let Some(now) = grid.rows.get(&team).and_then(|row| row.first().copied().flatten()) else {
            continue;
        };
        let rest: Vec<Team> = teams.iter().copied().filter(|t| *t != team).collect();
        let (later, _) = solve(grid, &rest, 1)?;
        candidates.push(PickCandidate {
            team,
            expected_wins: now + later,
        });
    }
    candidates.sort_by(|a, b| b.expected_wins.total_cmp(&a.expected_wins));
    Ok(candidates)
}
