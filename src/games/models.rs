use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::league::Team;

/// Week label of a game: a number for regular-season weeks, or a postseason
/// label such as `"WildCard"` or `"SuperBowl"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Week {
    Numbered(u32),
    Label(String),
}

impl Week {
    pub fn parse(raw: &str) -> Week {
        let raw = raw.trim();
        if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = raw.parse::<u32>() {
                return Week::Numbered(n);
            }
        }
        Week::Label(raw.to_string())
    }

    pub fn number(&self) -> Option<u32> {
        match self {
            Week::Numbered(n) => Some(*n),
            Week::Label(_) => None,
        }
    }

    /// Numeric week strictly before `week`. Labelled weeks never are.
    pub fn is_before(&self, week: u32) -> bool {
        self.number().is_some_and(|n| n < week)
    }

    /// Regular season: a numbered week within the first `season_weeks` weeks.
    pub fn is_regular_season(&self, season_weeks: u32) -> bool {
        self.number().is_some_and(|n| n >= 1 && n <= season_weeks)
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Week::Numbered(n) => write!(f, "{n}"),
            Week::Label(label) => f.write_str(label),
        }
    }
}

impl Serialize for Week {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Week {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Week::parse(&raw))
    }
}

/// Where a completed game was played, relative to its winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeAway {
    HomeWon,
    HomeLost,
    /// No home team, e.g. the championship game.
    NeutralSite,
}

impl HomeAway {
    /// Site column symbol: empty when the winner was at home, `@` when the
    /// winner was away, `N` for a neutral site.
    pub fn from_symbol(symbol: &str) -> Option<HomeAway> {
        match symbol.trim() {
            "" => Some(HomeAway::HomeWon),
            "@" => Some(HomeAway::HomeLost),
            "N" | "n" => Some(HomeAway::NeutralSite),
            _ => None,
        }
    }
}

/// A game that has been played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedGame {
    pub week: Week,
    pub winning_team: Team,
    pub losing_team: Team,
    pub home_away: HomeAway,
    pub winning_points: u32,
    pub losing_points: u32,
}

impl CompletedGame {
    /// Margin of victory, never negative.
    pub fn point_differential(&self) -> u32 {
        self.winning_points.saturating_sub(self.losing_points)
    }

    /// `(home, away)` for games with a home team.
    pub fn home_and_away(&self) -> Option<(Team, Team)> {
        match self.home_away {
            HomeAway::HomeWon => Some((self.winning_team, self.losing_team)),
            HomeAway::HomeLost => Some((self.losing_team, self.winning_team)),
            HomeAway::NeutralSite => None,
        }
    }

    /// Home-minus-away points, or winner-minus-loser at a neutral site.
    pub fn signed_margin(&self) -> f64 {
        let diff = self.point_differential() as f64;
        match self.home_away {
            HomeAway::HomeWon | HomeAway::NeutralSite => diff,
            HomeAway::HomeLost => -diff,
        }
    }
}

/// A game on the schedule that has not been played yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureGame {
    pub week: Week,
    pub home_team: Team,
    pub away_team: Team,
}
