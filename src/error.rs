use thiserror::Error;

use crate::league::Team;

/// Errors raised by the estimation core, the predictor and the pick optimiser.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A game references a team outside the league.
    #[error("Unrecognized team: {name}")]
    UnrecognizedTeam { name: String },

    /// A structurally valid record with an unusable score or site marker.
    /// Feeds drop these rows and count them; it is never fatal on its own.
    #[error("Malformed game: {reason}")]
    MalformedGame { reason: String },

    #[error(
        "Insufficient data{}: {reason}",
        .team.map(|t| format!(" for {t}")).unwrap_or_default()
    )]
    InsufficientData { team: Option<Team>, reason: String },

    #[error("Singular system: {reason}")]
    SingularSystem { reason: String },

    #[error("Too many weeks to optimise picks over: {weeks} (max {max})")]
    TooManyWeeks { weeks: usize, max: usize },

    #[error("No feasible picks: {available} available teams for {weeks} weeks")]
    NoFeasiblePicks { available: usize, weeks: usize },
}

impl EngineError {
    pub fn insufficient(reason: impl Into<String>) -> Self {
        EngineError::InsufficientData {
            team: None,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message_names_team() {
        let team = Team::resolve("JAX").unwrap();
        let err = EngineError::InsufficientData {
            team: Some(team),
            reason: "no weighted games".into(),
        };
        assert_eq!(err.to_string(), "Insufficient data for JAX: no weighted games");
        assert_eq!(
            EngineError::insufficient("fewer than two games").to_string(),
            "Insufficient data: fewer than two games"
        );
    }
}
