//! The fixed team universe of the league and the shape of a season.
//!
//! Teams are identified by a `Team` index into [`TEAM_ABBREVIATIONS`], which is
//! sorted alphabetically. Index order therefore doubles as the deterministic
//! output order of every report, and as the column order of the linear system
//! in the least-squares estimator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EngineError;

/// Number of teams in the league.
pub const NUM_TEAMS: usize = 32;
/// Regular-season weeks, bye week included.
pub const NUM_WEEKS_PER_SEASON: u32 = 17;
/// Regular-season games played by each team.
pub const NUM_GAMES_PER_TEAM: usize = 16;
pub const NUM_REGULAR_SEASON_GAMES: usize = NUM_TEAMS * NUM_GAMES_PER_TEAM / 2;
pub const NUM_PLAYOFF_TEAMS: usize = 12;
/// Single elimination.
pub const NUM_PLAYOFF_GAMES: usize = NUM_PLAYOFF_TEAMS - 1;

/// Team abbreviations, sorted alphabetically. A `Team` is an index into this.
pub const TEAM_ABBREVIATIONS: [&str; NUM_TEAMS] = [
    "ARI", "ATL", "BAL", "BUF", "CAR", "CHI", "CIN", "CLE", "DAL", "DEN", "DET", "GB", "HOU",
    "IND", "JAX", "KC", "MIA", "MIN", "NE", "NO", "NYG", "NYJ", "OAK", "PHI", "PIT", "SD", "SEA",
    "SF", "STL", "TB", "TEN", "WAS",
];

/// Full franchise names, index-aligned with [`TEAM_ABBREVIATIONS`].
const TEAM_NAMES: [&str; NUM_TEAMS] = [
    "Arizona Cardinals",
    "Atlanta Falcons",
    "Baltimore Ravens",
    "Buffalo Bills",
    "Carolina Panthers",
    "Chicago Bears",
    "Cincinnati Bengals",
    "Cleveland Browns",
    "Dallas Cowboys",
    "Denver Broncos",
    "Detroit Lions",
    "Green Bay Packers",
    "Houston Texans",
    "Indianapolis Colts",
    "Jacksonville Jaguars",
    "Kansas City Chiefs",
    "Miami Dolphins",
    "Minnesota Vikings",
    "New England Patriots",
    "New Orleans Saints",
    "New York Giants",
    "New York Jets",
    "Oakland Raiders",
    "Philadelphia Eagles",
    "Pittsburgh Steelers",
    "San Diego Chargers",
    "Seattle Seahawks",
    "San Francisco 49ers",
    "St. Louis Rams",
    "Tampa Bay Buccaneers",
    "Tennessee Titans",
    "Washington Redskins",
];

/// One team of the league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Team(u8);

impl Team {
    /// Look a team up by its abbreviation (`"DEN"`), case-insensitive.
    pub fn from_abbreviation(abbr: &str) -> Option<Team> {
        let abbr = abbr.trim();
        TEAM_ABBREVIATIONS
            .iter()
            .position(|a| a.eq_ignore_ascii_case(abbr))
            .map(|i| Team(i as u8))
    }

    /// Look a team up by its full name (`"Denver Broncos"`).
    pub fn from_name(name: &str) -> Option<Team> {
        let name = name.trim();
        TEAM_NAMES
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|i| Team(i as u8))
    }

    /// Resolve either a full name or an abbreviation.
    pub fn resolve(raw: &str) -> Result<Team, EngineError> {
        Team::from_abbreviation(raw)
            .or_else(|| Team::from_name(raw))
            .ok_or_else(|| EngineError::UnrecognizedTeam {
                name: raw.trim().to_string(),
            })
    }

    /// Team at position `index` of the alphabetical ordering.
    #[cfg(test)]
    pub fn from_index(index: usize) -> Option<Team> {
        (index < NUM_TEAMS).then(|| Team(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn abbreviation(self) -> &'static str {
        TEAM_ABBREVIATIONS[self.index()]
    }

    #[cfg(test)]
    pub fn name(self) -> &'static str {
        TEAM_NAMES[self.index()]
    }

    /// Every team, in alphabetical order of abbreviation.
    pub fn all() -> impl Iterator<Item = Team> {
        (0..NUM_TEAMS as u8).map(Team)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Team {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Team::resolve(s)
    }
}

impl Serialize for Team {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.abbreviation())
    }
}

impl<'de> Deserialize<'de> for Team {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Team::resolve(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviations_are_sorted_and_unique() {
        let mut sorted = TEAM_ABBREVIATIONS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, TEAM_ABBREVIATIONS.to_vec());
    }

    #[test]
    fn index_order_matches_alphabetical_order() {
        let teams: Vec<Team> = Team::all().collect();
        assert_eq!(teams.len(), NUM_TEAMS);
        for pair in teams.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].abbreviation() < pair[1].abbreviation());
        }
    }

    #[test]
    fn resolves_names_and_abbreviations() {
        let den = Team::resolve("Denver Broncos").unwrap();
        assert_eq!(den.abbreviation(), "DEN");
        assert_eq!(Team::resolve("den").unwrap(), den);
        assert_eq!(Team::resolve(" SF ").unwrap().name(), "San Francisco 49ers");
        assert_eq!(Team::resolve("St. Louis Rams").unwrap().abbreviation(), "STL");
    }

    #[test]
    fn unknown_team_is_an_error() {
        match Team::resolve("London Monarchs") {
            Err(EngineError::UnrecognizedTeam { name }) => assert_eq!(name, "London Monarchs"),
            other => panic!("expected UnrecognizedTeam, got {other:?}"),
        }
    }

    #[test]
    fn season_shape() {
        assert_eq!(NUM_REGULAR_SEASON_GAMES, 256);
        assert_eq!(NUM_PLAYOFF_GAMES, 11);
        assert!(Team::from_index(NUM_TEAMS).is_none());
    }

    #[test]
    fn serializes_as_abbreviation() {
        let sea = Team::resolve("SEA").unwrap();
        assert_eq!(serde_json::to_string(&sea).unwrap(), "\"SEA\"");
        let back: Team = serde_json::from_str("\"Seattle Seahawks\"").unwrap();
        assert_eq!(back, sea);
    }
}
