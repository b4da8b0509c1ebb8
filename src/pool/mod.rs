//! Survivor-pool pick planning.
//!
//! In a survivor pool each week you pick one team to win, and you may pick a
//! team at most once per season. Given a grid of win probabilities, the plan
//! that maximises expected wins is found by dynamic programming over
//! (team prefix, subset of weeks); see [`picks`].

pub mod picks;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::model::PredictionTable;
use crate::league::Team;

pub use picks::{compare_first_week, optimal_picks};

/// At most this many weeks are planned at once: the table has `2^weeks`
/// states per team.
pub const MAX_WEEKS: usize = 20;

/// Win probabilities for consecutive weeks starting at `start_week`.
/// `None` marks a bye. Teams absent from `rows` are never picked.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityGrid {
    pub start_week: u32,
    pub num_weeks: usize,
    pub rows: BTreeMap<Team, Vec<Option<f64>>>,
}

impl ProbabilityGrid {
    pub fn from_table(table: &PredictionTable) -> Self {
        let rows = table
            .rows
            .keys()
            .map(|&team| {
                let probs = table
                    .weeks()
                    .map(|w| table.get(team, w).and_then(|o| o.win_probability()))
                    .collect();
                (team, probs)
            })
            .collect();
        ProbabilityGrid {
            start_week: table.start_week,
            num_weeks: table.weeks().count(),
            rows,
        }
    }

    /// Teams that may still be picked, in alphabetical order.
    pub fn available<'a>(&'a self, exclude: &'a BTreeSet<Team>) -> impl Iterator<Item = Team> + 'a {
        self.rows.keys().copied().filter(move |t| !exclude.contains(t))
    }

    /// Probability for `team` in the week at `offset` from the start. Byes and
    /// unknown teams count as 0.
    pub fn value(&self, team: Team, offset: usize) -> f64 {
        self.rows
            .get(&team)
            .and_then(|row| row.get(offset).copied().flatten())
            .unwrap_or(0.0)
    }

    pub fn week_number(&self, offset: usize) -> u32 {
        self.start_week + offset as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pick {
    pub week: u32,
    pub team: Team,
    /// `None` when the plan has to spend a team on its bye.
    pub win_probability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickPlan {
    pub expected_wins: f64,
    pub picks: Vec<Pick>,
}

/// Value of picking `team` this week and then playing the rest optimally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PickCandidate {
    pub team: Team,
    pub expected_wins: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::fixtures::team;
    use crate::model::{Matchup, WeekOutlook};

    #[test]
    fn grid_from_table_keeps_byes() {
        let mut rows = BTreeMap::new();
        let mut den = BTreeMap::new();
        den.insert(
            5,
            WeekOutlook::Game(Matchup {
                opponent: team("OAK"),
                at_home: true,
                win_probability: 0.8,
            }),
        );
        den.insert(6, WeekOutlook::Bye);
        rows.insert(team("DEN"), den);
        let table = PredictionTable {
            start_week: 5,
            end_week: 6,
            rows,
        };

        let grid = ProbabilityGrid::from_table(&table);
        assert_eq!(grid.num_weeks, 2);
        assert_eq!(grid.rows[&team("DEN")], vec![Some(0.8), None]);
        assert_eq!(grid.value(team("DEN"), 0), 0.8);
        assert_eq!(grid.value(team("DEN"), 1), 0.0);
        assert_eq!(grid.value(team("OAK"), 0), 0.0);
        assert_eq!(grid.week_number(1), 6);
    }
}
