//! Stage drivers shared by the CLI: scrape day by day, annotate, merge.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::boxscore::{self, Game};
use crate::config::Config;
use crate::dataset::{merge, MergeOutcome};
use crate::dates::DateRange;
use crate::era::annotate_pregame_era;
use crate::http::PageSource;
use crate::odds::{self, OddsLine};
use crate::store::{append_csv, read_csv, write_csv};

/// A day whose pages were all scraped, kept in a file next to the output.
#[derive(Debug, Serialize, Deserialize)]
struct DoneDay {
    date: NaiveDate,
}

/// `games_2019.csv` -> `games_2019.days.csv`
pub fn progress_path(out: &Path) -> PathBuf {
    out.with_extension("days.csv")
}

fn done_days(out: &Path) -> Result<HashSet<NaiveDate>> {
    let path = progress_path(out);
    if !path.exists() {
        return Ok(HashSet::new());
    }
    let days: Vec<DoneDay> = read_csv(&path)
        .with_context(|| format!("Failed to read progress file {}", path.display()))?;
    Ok(days.into_iter().map(|d| d.date).collect())
}

fn mark_done(out: &Path, date: NaiveDate) -> Result<()> {
    let path = progress_path(out);
    append_csv(&path, &[DoneDay { date }])
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn existing_rows<T: DeserializeOwned>(out: &Path) -> Result<Vec<T>> {
    if !out.exists() {
        return Ok(Vec::new());
    }
    read_csv(out).with_context(|| format!("Failed to read existing output {}", out.display()))
}

fn game_id(game: &Game) -> (NaiveDate, u8, String) {
    (game.date, game.game_number, game.home_team.clone())
}

/// Scrape box scores day by day, appending to `out`.
///
/// A day is only marked done once every box score on it parsed, so a rerun
/// picks up the games that were skipped and nothing else.
pub fn scrape_games(
    source: &mut impl PageSource,
    config: &Config,
    range: DateRange,
    out: &Path,
) -> Result<usize> {
    let done = done_days(out)?;
    let mut seen: HashSet<_> = existing_rows::<Game>(out)?.iter().map(game_id).collect();
    let mut total = 0;

    for date in range.iter() {
        if done.contains(&date) {
            info!("{}: already scraped, skipping", date);
            continue;
        }
        let day = boxscore::scrape_day(source, &config.boxscore_base_url, date)
            .with_context(|| format!("Failed to scrape box scores for {}", date))?;
        let games: Vec<Game> = day
            .games
            .into_iter()
            .filter(|g| seen.insert(game_id(g)))
            .collect();
        append_csv(out, &games).with_context(|| format!("Failed to write {}", out.display()))?;
        total += games.len();

        if day.skipped.is_empty() {
            mark_done(out, date)?;
        } else {
            warn!(
                "{}: {} box scores skipped, the day will be retried on the next run",
                date,
                day.skipped.len()
            );
        }
    }

    println!("Scraped {} games into {}", total, out.display());
    Ok(total)
}

/// Scrape odds day by day. An odds page is all or nothing, so any day
/// already present in `out` counts as done too.
pub fn scrape_odds(
    source: &mut impl PageSource,
    config: &Config,
    range: DateRange,
    out: &Path,
) -> Result<usize> {
    let mut done = done_days(out)?;
    done.extend(existing_rows::<OddsLine>(out)?.iter().map(|o| o.date));
    let mut total = 0;

    for date in range.iter() {
        if done.contains(&date) {
            info!("{}: already scraped, skipping", date);
            continue;
        }
        let lines = odds::scrape_day(source, &config.odds_base_url, date)
            .with_context(|| format!("Failed to scrape odds for {}", date))?;
        append_csv(out, &lines).with_context(|| format!("Failed to write {}", out.display()))?;
        mark_done(out, date)?;
        total += lines.len();
    }

    println!("Scraped {} odds lines into {}", total, out.display());
    Ok(total)
}

pub fn annotate_era_file(games_path: &Path, out: &Path) -> Result<Vec<Game>> {
    let mut games: Vec<Game> = read_csv(games_path)
        .with_context(|| format!("Failed to read games from {}", games_path.display()))?;
    annotate_pregame_era(&mut games);
    write_csv(out, &games).with_context(|| format!("Failed to write {}", out.display()))?;

    let with_era = games
        .iter()
        .filter(|g| g.away_starter_pregame_era.is_some())
        .count();
    println!(
        "Annotated {} games ({} away starters with a pregame ERA) into {}",
        games.len(),
        with_era,
        out.display()
    );
    Ok(games)
}

pub fn merge_files(games_path: &Path, odds_path: &Path, out: &Path) -> Result<MergeOutcome> {
    let games: Vec<Game> = read_csv(games_path)
        .with_context(|| format!("Failed to read games from {}", games_path.display()))?;
    let lines: Vec<OddsLine> = read_csv(odds_path)
        .with_context(|| format!("Failed to read odds from {}", odds_path.display()))?;

    let outcome = merge(&games, &lines);
    write_csv(out, &outcome.rows).with_context(|| format!("Failed to write {}", out.display()))?;

    println!("Merged {} rows into {}", outcome.rows.len(), out.display());
    println!("  Games without odds: {}", outcome.unmatched_games.len());
    println!("  Odds without a game: {}", outcome.unmatched_odds.len());
    println!("  Duplicate keys: {}", outcome.collisions);
    Ok(outcome)
}

/// Every stage for one season, written under `config.output_dir`.
pub fn run_season(source: &mut impl PageSource, config: &Config, year: i32) -> Result<MergeOutcome> {
    let range = DateRange::season(year)?;
    let dir = config.output_dir.as_path();
    let games_path = dir.join(format!("games_{}.csv", year));
    let odds_path = dir.join(format!("odds_{}.csv", year));
    let era_path = dir.join(format!("games_era_{}.csv", year));
    let dataset_path = dir.join(format!("dataset_{}.csv", year));

    scrape_games(source, config, range, &games_path)?;
    scrape_odds(source, config, range, &odds_path)?;
    annotate_era_file(&games_path, &era_path)?;
    merge_files(&era_path, &odds_path, &dataset_path)
}
