//! Rendering of strengths, predictions and pick plans, and reading saved
//! prediction reports back.
//!
//! Text output is one line per team in alphabetical order of abbreviation.
//! Structured output is JSON.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::Serialize;

use crate::league::Team;
use crate::model::{PredictionTable, StrengthModel};
use crate::pool::{PickCandidate, PickPlan, ProbabilityGrid};

/// Text marker for a week without a game.
pub const BYE_MARKER: &str = "-";

#[derive(Serialize)]
struct PredictionReport<'a> {
    start_week: u32,
    end_week: u32,
    predictions: &'a PredictionTable,
}

#[derive(Serialize)]
struct ComparisonReport<'a> {
    week: u32,
    candidates: &'a [PickCandidate],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Positional text, one line per team
    Text,
    /// JSON
    Structured,
}

pub fn render_strengths(model: &StrengthModel, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = format!("variance {:.4}\n", model.variance);
            if let Some(k) = model.home_field {
                out.push_str(&format!("home_field {k:.4}\n"));
            }
            for (team, score) in &model.scores {
                out.push_str(&format!("{team} {score:.4}\n"));
            }
            Ok(out)
        }
        OutputFormat::Structured => {
            serde_json::to_string_pretty(model).context("Failed to serialize strengths")
        }
    }
}

/// Text rows are `ABBR p_start .. p_end`, byes as [`BYE_MARKER`]; this is the
/// format [`parse_text_predictions`] reads.
pub fn render_predictions(table: &PredictionTable, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            for (team, weeks) in &table.rows {
                out.push_str(team.abbreviation());
                for week in table.weeks() {
                    match weeks.get(&week).and_then(|o| o.win_probability()) {
                        Some(p) => out.push_str(&format!(" {p:.4}")),
                        None => {
                            out.push(' ');
                            out.push_str(BYE_MARKER);
                        }
                    }
                }
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Structured => serde_json::to_string_pretty(&PredictionReport {
            start_week: table.start_week,
            end_week: table.end_week,
            predictions: table,
        })
        .context("Failed to serialize predictions"),
    }
}

pub fn render_plan(plan: &PickPlan, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = format!(
                "Optimal expected wins: {:.4}\nOptimal pick sequence:\n",
                plan.expected_wins
            );
            for pick in &plan.picks {
                match pick.win_probability {
                    Some(p) => {
                        out.push_str(&format!("  Week {}: {} ({p:.4})\n", pick.week, pick.team))
                    }
                    None => out.push_str(&format!("  Week {}: {} (bye)\n", pick.week, pick.team)),
                }
            }
            Ok(out)
        }
        OutputFormat::Structured => {
            serde_json::to_string_pretty(plan).context("Failed to serialize pick plan")
        }
    }
}

pub fn render_candidates(
    week: u32,
    candidates: &[PickCandidate],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = format!("Comparing different picks for week {week}:\n");
            for c in candidates {
                out.push_str(&format!("  {}: {:.4}\n", c.team, c.expected_wins));
            }
            Ok(out)
        }
        OutputFormat::Structured => {
            serde_json::to_string_pretty(&ComparisonReport { week, candidates })
                .context("Failed to serialize pick comparison")
        }
    }
}

/// Read a text prediction report: one `ABBR p1 p2 ..` line per team, `-` for a
/// bye. Blank lines and `#` comments are skipped. Every row must have the same
/// number of weeks.
pub fn parse_text_predictions(input: &str, start_week: u32) -> Result<ProbabilityGrid> {
    let mut rows: BTreeMap<Team, Vec<Option<f64>>> = BTreeMap::new();
    let mut num_weeks: Option<usize> = None;

    for (lineno, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let Some(name) = fields.next() else {
            continue;
        };
        let team = Team::resolve(name).with_context(|| format!("line {}", lineno + 1))?;

        let mut probs = Vec::new();
        for field in fields {
            if field == BYE_MARKER {
                probs.push(None);
                continue;
            }
            let p: f64 = field
                .parse()
                .with_context(|| format!("line {}: bad probability {field:?}", lineno + 1))?;
            if !(0.0..=1.0).contains(&p) {
                bail!("line {}: probability {p} outside [0, 1]", lineno + 1);
            }
            probs.push(Some(p));
        }

        match num_weeks {
            None => num_weeks = Some(probs.len()),
            Some(n) if n != probs.len() => bail!(
                "line {}: {team} has {} week(s), expected {n}",
                lineno + 1,
                probs.len()
            ),
            Some(_) => {}
        }
        if rows.insert(team, probs).is_some() {
            bail!("line {}: {team} listed twice", lineno + 1);
        }
    }

    Ok(ProbabilityGrid {
        start_week,
        num_weeks: num_weeks.unwrap_or(0),
        rows,
    })
}
