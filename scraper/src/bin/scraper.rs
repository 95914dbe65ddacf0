use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mlb_scraper::dates::{parse_date, DateRange};
use mlb_scraper::{pipeline, Config, Fetcher};

/// Builds an MLB dataset of box scores, starting pitchers and over/under lines
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file (defaults are used for anything not set)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape box scores day by day
    Games {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "games.csv")]
        out: PathBuf,
    },
    /// Scrape over/under lines day by day
    Odds {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "odds.csv")]
        out: PathBuf,
    },
    /// Add each starter's pregame ERA to a games file
    Era {
        #[arg(long)]
        games: PathBuf,
        #[arg(long, default_value = "games_era.csv")]
        out: PathBuf,
    },
    /// Join games with odds and label the over/under outcome
    Merge {
        #[arg(long)]
        games: PathBuf,
        #[arg(long)]
        odds: PathBuf,
        #[arg(long, default_value = "dataset.csv")]
        out: PathBuf,
    },
    /// Run every stage for one season into the configured output directory
    Season {
        #[arg(long)]
        year: i32,
    },
}

fn date_range(start: &str, end: &str) -> Result<DateRange> {
    let start = parse_date(start).context("Invalid --start")?;
    let end = parse_date(end).context("Invalid --end")?;
    Ok(DateRange::new(start, end)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Games { start, end, out } => {
            let range = date_range(&start, &end)?;
            let mut fetcher = Fetcher::new(&config)?;
            pipeline::scrape_games(&mut fetcher, &config, range, &out)?;
        }
        Command::Odds { start, end, out } => {
            let range = date_range(&start, &end)?;
            let mut fetcher = Fetcher::new(&config)?;
            pipeline::scrape_odds(&mut fetcher, &config, range, &out)?;
        }
        Command::Era { games, out } => {
            pipeline::annotate_era_file(&games, &out)?;
        }
        Command::Merge { games, odds, out } => {
            pipeline::merge_files(&games, &odds, &out)?;
        }
        Command::Season { year } => {
            let mut fetcher = Fetcher::new(&config)?;
            pipeline::run_season(&mut fetcher, &config, year)?;
        }
    }

    Ok(())
}
