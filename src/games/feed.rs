use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::models::{CompletedGame, FutureGame, HomeAway, Week};
use super::provider::GameSource;
use crate::error::EngineError;
use crate::league::{Team, NUM_PLAYOFF_GAMES, NUM_REGULAR_SEASON_GAMES};

/// Game source backed by one JSON file per season, `<data_dir>/<year>.json`:
///
/// ```json
/// { "completed": [{"week": "1", "winner": "Denver Broncos", "site": "",
///                  "loser": "Baltimore Ravens", "pts_w": "49", "pts_l": "27"}],
///   "schedule":  [{"week": "1", "home": "SEA", "away": "GB"}] }
/// ```
pub struct SeasonFiles {
    data_dir: PathBuf,
}

/// Completed games parsed from a feed, with the number of rows dropped as malformed.
#[derive(Debug, Clone, Default)]
pub struct ParsedGames {
    pub games: Vec<CompletedGame>,
    pub malformed: usize,
}

impl SeasonFiles {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        SeasonFiles {
            data_dir: data_dir.into(),
        }
    }

    fn season_path(&self, year: i32) -> PathBuf {
        self.data_dir.join(format!("{year}.json"))
    }

    /// Read a season file. A missing file is an empty season.
    async fn load_season(&self, year: i32) -> Result<Option<Value>> {
        let path = self.season_path(year);
        debug!("Loading season {} from {}", year, path.display());
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse season file {}", path.display()))?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No season file for {} at {}", year, path.display());
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[async_trait]
impl GameSource for SeasonFiles {
    fn name(&self) -> &str {
        "SeasonFiles"
    }

    async fn fetch_completed_games(&self, year: i32) -> Result<Vec<CompletedGame>> {
        let Some(raw) = self.load_season(year).await? else {
            return Ok(vec![]);
        };
        let parsed = parse_completed_games(&raw)
            .with_context(|| format!("Invalid completed games for season {year}"))?;
        if parsed.games.len() > NUM_REGULAR_SEASON_GAMES + NUM_PLAYOFF_GAMES {
            warn!(
                "Season {}: {} completed games, more than a season holds",
                year,
                parsed.games.len()
            );
        }
        if parsed.malformed > 0 {
            warn!(
                "Season {}: dropped {} malformed game row(s), kept {}",
                year,
                parsed.malformed,
                parsed.games.len()
            );
        }
        Ok(parsed.games)
    }

    async fn fetch_future_games(&self, year: i32, from_week: u32) -> Result<Vec<FutureGame>> {
        let Some(raw) = self.load_season(year).await? else {
            return Ok(vec![]);
        };
        let games = parse_schedule(&raw)
            .with_context(|| format!("Invalid schedule for season {year}"))?;
        Ok(games
            .into_iter()
            .filter(|g| g.week.number().is_some_and(|n| n >= from_week))
            .collect())
    }
}

/// Parse the `completed` array of a season document.
///
/// Rows with bad points or site markers are dropped and counted; a team name
/// outside the league aborts the whole parse.
pub fn parse_completed_games(raw: &Value) -> Result<ParsedGames, EngineError> {
    let rows = match raw["completed"].as_array() {
        Some(a) => a,
        None => return Ok(ParsedGames::default()),
    };

    let mut parsed = ParsedGames::default();
    for (idx, row) in rows.iter().enumerate() {
        match parse_completed_row(row) {
            Ok(game) => parsed.games.push(game),
            Err(EngineError::MalformedGame { reason }) => {
                warn!("Dropping completed game row {}: {}", idx, reason);
                parsed.malformed += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(parsed)
}

fn parse_completed_row(row: &Value) -> Result<CompletedGame, EngineError> {
    let week = field_text(row, "week").ok_or_else(|| malformed("missing week"))?;
    let winner = row["winner"]
        .as_str()
        .ok_or_else(|| malformed("missing winner"))?;
    let loser = row["loser"]
        .as_str()
        .ok_or_else(|| malformed("missing loser"))?;
    let winning_team = Team::resolve(winner)?;
    let losing_team = Team::resolve(loser)?;
    if winning_team == losing_team {
        return Err(malformed(format!("{winning_team} listed as both winner and loser")));
    }

    let site = row["site"].as_str().unwrap_or("");
    let home_away = HomeAway::from_symbol(site)
        .ok_or_else(|| malformed(format!("unrecognized home/away symbol {site:?}")))?;

    let winning_points = parse_points(&row["pts_w"])
        .ok_or_else(|| malformed(format!("unparseable winning points {}", row["pts_w"])))?;
    let losing_points = parse_points(&row["pts_l"])
        .ok_or_else(|| malformed(format!("unparseable losing points {}", row["pts_l"])))?;
    if winning_points < losing_points {
        return Err(malformed(format!(
            "winner scored {winning_points} but loser scored {losing_points}"
        )));
    }

    Ok(CompletedGame {
        week: Week::parse(&week),
        winning_team,
        losing_team,
        home_away,
        winning_points,
        losing_points,
    })
}

/// Parse the `schedule` array of a season document.
pub fn parse_schedule(raw: &Value) -> Result<Vec<FutureGame>, EngineError> {
    let rows = match raw["schedule"].as_array() {
        Some(a) => a,
        None => return Ok(vec![]),
    };

    let mut games = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let (Some(week), Some(home), Some(away)) = (
            field_text(row, "week"),
            row["home"].as_str(),
            row["away"].as_str(),
        ) else {
            warn!("Dropping schedule row {}: missing week or teams", idx);
            continue;
        };
        games.push(FutureGame {
            week: Week::parse(&week),
            home_team: Team::resolve(home)?,
            away_team: Team::resolve(away)?,
        });
    }
    Ok(games)
}

fn field_text(row: &Value, key: &str) -> Option<String> {
    match &row[key] {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_points(v: &Value) -> Option<u32> {
    v.as_str()
        .and_then(|s| s.trim().parse().ok())
        .or_else(|| v.as_u64().and_then(|n| u32::try_from(n).ok()))
}

fn malformed(reason: impl Into<String>) -> EngineError {
    EngineError::MalformedGame {
        reason: reason.into(),
    }
}
