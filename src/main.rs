use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

mod config;
mod error;
mod games;
mod league;
mod model;
mod pool;
mod report;
mod runner;

use config::{Command, Config};
use games::{GameSource, SeasonFiles};
use runner::Runner;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    let source = SeasonFiles::new(&config.data_dir);
    info!("Reading seasons from {}", source.data_dir().display());
    let source: Arc<dyn GameSource> = Arc::new(source);

    let format = config.format;
    let command = config.command.clone();
    let year = command.week_args().year();
    let runner = Runner::new(config, source);

    let output = match &command {
        Command::Strengths(args) => {
            let model = runner.strengths(year, args.week).await?;
            report::render_strengths(&model, format)?
        }
        Command::Predict(args) => {
            let table = runner.predictions(year, args.week).await?;
            report::render_predictions(&table, format)?
        }
        Command::Picks(args) => {
            let exclude = args.excluded_teams()?;
            let plan = runner
                .picks(year, args.target.week, args.predictions.as_deref(), &exclude)
                .await?;
            report::render_plan(&plan, format)?
        }
        Command::Compare(args) => {
            let exclude = args.excluded_teams()?;
            let candidates = runner
                .compare(year, args.target.week, args.predictions.as_deref(), &exclude)
                .await?;
            report::render_candidates(args.target.week, &candidates, format)?
        }
    };
    print!("{output}");
    if format == report::OutputFormat::Structured {
        println!();
    }

    Ok(())
}
