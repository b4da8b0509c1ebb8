use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Datelike, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::league::{Team, NUM_WEEKS_PER_SEASON};
use crate::model::{
    EstimationParams, Estimator, Normalization, VarianceSource, LAST_SEASON_WEIGHT, PRIOR_VARIANCE,
};
use crate::report::OutputFormat;

/// League team strengths, win predictions and survivor-pool picks
#[derive(Parser, Debug, Clone)]
#[command(name = "nflpool", version, about)]
pub struct Config {
    /// Directory holding one <year>.json file per season
    #[arg(long, env = "NFLPOOL_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    /// Report format
    #[arg(long, env = "NFLPOOL_FORMAT", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Strength estimator
    #[arg(long, env = "NFLPOOL_ESTIMATOR", value_enum, default_value = "mle", global = true)]
    pub estimator: EstimatorArg,

    /// Weight of last season's games relative to this season's (0.0–1.0]
    #[arg(long, env = "LAST_SEASON_WEIGHT", default_value_t = LAST_SEASON_WEIGHT, global = true)]
    pub last_season_weight: f64,

    /// Variance of the prior on team strengths for the ridge estimator
    #[arg(long, env = "PRIOR_VARIANCE", default_value_t = PRIOR_VARIANCE, global = true)]
    pub prior_variance: f64,

    /// Report the historical game variance (13.45²) instead of the fitted one
    #[arg(long, env = "HISTORICAL_VARIANCE", default_value = "false", global = true)]
    pub historical_variance: bool,

    /// Weeks in the regular season; predictions run through the last one
    #[arg(long, env = "SEASON_WEEKS", default_value_t = NUM_WEEKS_PER_SEASON, global = true)]
    pub season_weeks: u32,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EstimatorArg {
    /// Average margin of victory
    Simple,
    /// Least squares with strengths summing to zero
    Mle,
    /// Least squares with a Gaussian prior on strengths
    Ridge,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print team strengths estimated from games before WEEK
    Strengths(WeekArgs),
    /// Print each team's win probability from WEEK to the end of the season
    Predict(WeekArgs),
    /// Plan one pick per remaining week, each team at most once
    Picks(PickArgs),
    /// Rank this week's possible picks by expected wins over the season
    Compare(PickArgs),
}

#[derive(Args, Debug, Clone)]
pub struct WeekArgs {
    /// Week about to be played
    pub week: u32,

    /// Season year (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,
}

impl WeekArgs {
    pub fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| Utc::now().year())
    }
}

#[derive(Args, Debug, Clone)]
pub struct PickArgs {
    #[command(flatten)]
    pub target: WeekArgs,

    /// Teams already used, comma separated (e.g. ARI,BUF)
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Read win probabilities from a saved text report instead of predicting
    #[arg(long)]
    pub predictions: Option<PathBuf>,
}

impl PickArgs {
    pub fn excluded_teams(&self) -> anyhow::Result<BTreeSet<Team>> {
        self.exclude
            .iter()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| Team::resolve(raw).context("Invalid --exclude"))
            .collect()
    }
}

impl Command {
    pub fn week_args(&self) -> &WeekArgs {
        match self {
            Command::Strengths(w) | Command::Predict(w) => w,
            Command::Picks(p) | Command::Compare(p) => &p.target,
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.season_weeks == 0 {
            anyhow::bail!("season_weeks must be positive");
        }
        if !(self.last_season_weight > 0.0 && self.last_season_weight <= 1.0) {
            anyhow::bail!("last_season_weight must be in (0.0, 1.0]");
        }
        if !(self.prior_variance > 0.0 && self.prior_variance.is_finite()) {
            anyhow::bail!("prior_variance must be positive");
        }
        let week = self.command.week_args().week;
        if week == 0 || week > self.season_weeks + 1 {
            anyhow::bail!(
                "week must be between 1 and {} (got {})",
                self.season_weeks + 1,
                week
            );
        }
        if let Command::Picks(p) | Command::Compare(p) = &self.command {
            p.excluded_teams()?;
        }
        Ok(())
    }

    pub fn estimator(&self) -> Estimator {
        let variance = if self.historical_variance {
            VarianceSource::Historical
        } else {
            VarianceSource::Fitted
        };
        match self.estimator {
            EstimatorArg::Simple => Estimator::Simple,
            EstimatorArg::Mle => Estimator::LeastSquares {
                normalization: Normalization::SumToZero,
                variance,
            },
            EstimatorArg::Ridge => Estimator::LeastSquares {
                normalization: Normalization::ridge_from_prior(self.prior_variance),
                variance,
            },
        }
    }

    pub fn params(&self, week: u32) -> EstimationParams {
        EstimationParams {
            last_season_weight: self.last_season_weight,
            season_weeks: self.season_weeks,
            ..EstimationParams::new(week)
        }
    }
}
