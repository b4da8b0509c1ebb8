//! Gaussian-difference win probabilities.
//!
//! The home margin of a scheduled game is `Normal(s_H - s_A + k, sigma^2)`, so
//! the home team wins with probability `Phi((s_H - s_A + k) / sigma)`.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

use super::StrengthModel;
use crate::error::EngineError;
use crate::games::FutureGame;
use crate::league::Team;

/// Standard normal CDF. Exactly 0.5 at zero.
pub fn standard_normal_cdf(z: f64) -> f64 {
    Normal::standard().cdf(z)
}

/// Probability that a `Normal(margin, variance)` outcome is positive.
pub fn margin_win_probability(margin: f64, variance: f64) -> Result<f64, EngineError> {
    if !(variance > 0.0) || !variance.is_finite() {
        return Err(EngineError::insufficient(format!(
            "game variance must be positive, got {variance}"
        )));
    }
    Ok(standard_normal_cdf(margin / variance.sqrt()))
}

/// Expected home-minus-away margin of a game, home field included.
pub fn expected_margin(
    model: &StrengthModel,
    home: Team,
    away: Team,
) -> Result<f64, EngineError> {
    Ok(model.score(home)? - model.score(away)? + model.home_field.unwrap_or(0.0))
}

/// Probability that `home` beats `away` at `home`'s field.
pub fn home_win_probability(
    model: &StrengthModel,
    home: Team,
    away: Team,
) -> Result<f64, EngineError> {
    margin_win_probability(expected_margin(model, home, away)?, model.variance)
}

/// One team's scheduled game in a week.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Matchup {
    pub opponent: Team,
    pub at_home: bool,
    pub win_probability: f64,
}

/// What a team does in a given week: play a game, or sit out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeekOutlook {
    Game(Matchup),
    Bye,
}

impl WeekOutlook {
    /// Win probability, or `None` on a bye.
    pub fn win_probability(&self) -> Option<f64> {
        match self {
            WeekOutlook::Game(m) => Some(m.win_probability),
            WeekOutlook::Bye => None,
        }
    }
}

impl Serialize for WeekOutlook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            WeekOutlook::Game(m) => m.serialize(serializer),
            WeekOutlook::Bye => serializer.serialize_none(),
        }
    }
}

/// Win probability of every team in every week of a range.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionTable {
    pub start_week: u32,
    pub end_week: u32,
    /// Team → week → outlook. Every team has every week of the range.
    pub rows: BTreeMap<Team, BTreeMap<u32, WeekOutlook>>,
}

impl PredictionTable {
    pub fn get(&self, team: Team, week: u32) -> Option<&WeekOutlook> {
        self.rows.get(&team).and_then(|weeks| weeks.get(&week))
    }

    pub fn weeks(&self) -> impl Iterator<Item = u32> {
        self.start_week..=self.end_week
    }
}

impl Serialize for PredictionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Weeks as string keys so the JSON object is well formed.
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (team, weeks) in &self.rows {
            let weeks: BTreeMap<String, &WeekOutlook> =
                weeks.iter().map(|(w, o)| (w.to_string(), o)).collect();
            map.serialize_entry(team, &weeks)?;
        }
        map.end()
    }
}

/// Predict every game scheduled in weeks `start_week..=end_week`.
///
/// Teams without a game in a week get [`WeekOutlook::Bye`]. Schedule rows with
/// a labelled week, a week outside the range, or a team playing itself are
/// ignored.
pub fn predict_schedule(
    model: &StrengthModel,
    future_games: &[FutureGame],
    start_week: u32,
    end_week: u32,
) -> Result<PredictionTable, EngineError> {
    let mut rows: BTreeMap<Team, BTreeMap<u32, WeekOutlook>> = Team::all()
        .map(|t| (t, (start_week..=end_week).map(|w| (w, WeekOutlook::Bye)).collect()))
        .collect();

    let mut predicted = 0usize;
    for game in future_games {
        let Some(week) = game.week.number() else {
            continue;
        };
        if week < start_week || week > end_week {
            continue;
        }
        if game.home_team == game.away_team {
            warn!("Ignoring week {} game of {} against itself", week, game.home_team);
            continue;
        }

        let p_home = home_win_probability(model, game.home_team, game.away_team)?;
        for (team, outlook) in [
            (
                game.home_team,
                Matchup {
                    opponent: game.away_team,
                    at_home: true,
                    win_probability: p_home,
                },
            ),
            (
                game.away_team,
                Matchup {
                    opponent: game.home_team,
                    at_home: false,
                    win_probability: 1.0 - p_home,
                },
            ),
        ] {
            if let Some(slot) = rows.get_mut(&team).and_then(|weeks| weeks.get_mut(&week)) {
                if let WeekOutlook::Game(previous) = slot {
                    warn!(
                        "{} scheduled twice in week {} (against {} and {}); keeping the later game",
                        team, week, previous.opponent, outlook.opponent
                    );
                }
                *slot = WeekOutlook::Game(outlook);
            }
        }
        predicted += 1;
    }
    debug!(
        "Predicted {} game(s) for weeks {}..={}",
        predicted, start_week, end_week
    );

    Ok(PredictionTable {
        start_week,
        end_week,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::fixtures::{game, schedule, team};
    use crate::games::{HomeAway, Week};
    use crate::model::{estimate, EstimationParams, Estimator, GAME_VARIANCE};
    use approx::assert_relative_eq;

    fn model(scores: &[(&str, f64)], home_field: Option<f64>, variance: f64) -> StrengthModel {
        StrengthModel {
            variance,
            home_field,
            scores: Team::all()
                .map(|t| {
                    let s = scores
                        .iter()
                        .find(|(abbr, _)| *abbr == t.abbreviation())
                        .map(|(_, s)| *s)
                        .unwrap_or(0.0);
                    (t, s)
                })
                .collect(),
        }
    }

    #[test]
    fn cdf_reference_values() {
        assert_eq!(standard_normal_cdf(0.0), 0.5);
        // The normal CDF is accurate to about 1e-11.
        assert_relative_eq!(standard_normal_cdf(1.0), 0.841_344_746_068_543, epsilon = 1e-9);
        assert_relative_eq!(standard_normal_cdf(-1.96), 0.024_997_895_148_220, epsilon = 1e-9);
    }

    #[test]
    fn probability_is_monotonic_in_strength_gap() {
        let mut last = 0.0;
        for gap in -20..=20 {
            let m = model(&[("DEN", gap as f64)], Some(2.5), 180.0);
            let p = home_win_probability(&m, team("DEN"), team("OAK")).unwrap();
            assert!(p > last, "gap {gap}: {p} <= {last}");
            last = p;
        }
    }

    #[test]
    fn even_matchup_is_a_coin_flip() {
        let m = model(&[("SEA", 3.0), ("SF", 3.0)], None, GAME_VARIANCE);
        assert_eq!(home_win_probability(&m, team("SEA"), team("SF")).unwrap(), 0.5);

        // Home field cancelling a strength gap.
        let m = model(&[("SEA", 1.0), ("SF", 4.0)], Some(3.0), GAME_VARIANCE);
        assert_eq!(home_win_probability(&m, team("SEA"), team("SF")).unwrap(), 0.5);
    }

    #[test]
    fn home_and_away_probabilities_sum_to_one() {
        let m = model(&[("GB", 6.0), ("CHI", -2.0)], Some(2.0), 150.0);
        let future = vec![FutureGame {
            week: Week::Numbered(4),
            home_team: team("CHI"),
            away_team: team("GB"),
        }];
        let table = predict_schedule(&m, &future, 4, 4).unwrap();
        let chi = table.get(team("CHI"), 4).unwrap().win_probability().unwrap();
        let gb = table.get(team("GB"), 4).unwrap().win_probability().unwrap();
        assert_relative_eq!(chi + gb, 1.0, epsilon = 1e-15);
        assert!(gb > chi);
        assert_relative_eq!(chi, standard_normal_cdf(-6.0 / 150f64.sqrt()), epsilon = 1e-15);
    }

    #[test]
    fn non_positive_variance_is_rejected() {
        assert!(matches!(
            margin_win_probability(1.0, 0.0),
            Err(EngineError::InsufficientData { .. })
        ));
        assert!(margin_win_probability(1.0, f64::NAN).is_err());
    }

    #[test]
    fn strong_team_favoured_and_byes_marked() {
        // DEN wins big every week, JAX loses big every week.
        let mut prior = Vec::new();
        let others: Vec<Team> = Team::all()
            .filter(|t| *t != team("DEN") && *t != team("JAX"))
            .collect();
        for (i, pair) in others.chunks(2).enumerate() {
            let week = (i % 15 + 1).to_string();
            let (a, b) = (pair[0].abbreviation(), pair[1].abbreviation());
            prior.push(game(&week, a, b, HomeAway::HomeWon, 20, 17));
            prior.push(game(&week, b, a, HomeAway::HomeWon, 20, 17));
            prior.push(game(&week, "DEN", a, HomeAway::HomeWon, 33, 20));
            prior.push(game(&week, b, "JAX", HomeAway::HomeWon, 26, 17));
        }
        let m = estimate(Estimator::Simple, &prior, &[], &EstimationParams::new(1)).unwrap();
        assert_relative_eq!(m.scores[&team("DEN")], 13.0, epsilon = 1e-12);
        assert_relative_eq!(m.scores[&team("JAX")], -9.0, epsilon = 1e-12);

        let future = schedule(1, 3, team("DEN"), 2);
        let table = predict_schedule(&m, &future, 1, 3).unwrap();
        assert_eq!(table.rows.len(), crate::league::NUM_TEAMS);
        assert!(table.rows.values().all(|weeks| weeks.len() == 3));

        let den = table.get(team("DEN"), 1).unwrap().win_probability().unwrap();
        let jax = table.get(team("JAX"), 1).unwrap().win_probability().unwrap();
        assert!(den > 0.5, "DEN {den}");
        assert!(jax < 0.5, "JAX {jax}");
        assert_eq!(table.get(team("DEN"), 2), Some(&WeekOutlook::Bye));
        assert_eq!(table.get(team("DEN"), 2).unwrap().win_probability(), None);
        assert!(matches!(table.get(team("DEN"), 3), Some(WeekOutlook::Game(_))));
    }

    #[test]
    fn out_of_range_and_labelled_weeks_are_ignored() {
        let m = model(&[], Some(2.0), 150.0);
        let future = vec![
            FutureGame {
                week: Week::Numbered(9),
                home_team: team("NE"),
                away_team: team("NYJ"),
            },
            FutureGame {
                week: Week::Label("WildCard".into()),
                home_team: team("NE"),
                away_team: team("MIA"),
            },
            FutureGame {
                week: Week::Numbered(10),
                home_team: team("BUF"),
                away_team: team("BUF"),
            },
        ];
        let table = predict_schedule(&m, &future, 10, 11).unwrap();
        assert!(table
            .rows
            .values()
            .all(|weeks| weeks.values().all(|o| *o == WeekOutlook::Bye)));
        assert_eq!(table.weeks().collect::<Vec<_>>(), vec![10, 11]);
    }

    #[test]
    fn structured_byes_are_null() {
        let m = model(&[], None, 100.0);
        let future = vec![FutureGame {
            week: Week::Numbered(1),
            home_team: team("ARI"),
            away_team: team("ATL"),
        }];
        let table = predict_schedule(&m, &future, 1, 2).unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["ARI"]["1"]["opponent"], "ATL");
        assert_eq!(json["ARI"]["1"]["at_home"], true);
        assert_eq!(json["ARI"]["1"]["win_probability"], 0.5);
        assert!(json["ARI"]["2"].is_null());
        assert!(json["DEN"]["1"].is_null());
    }
}
