//! Joining box scores with odds lines into the model's training table.

use std::collections::{HashMap, VecDeque};

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::boxscore::Game;
use crate::error::Result;
use crate::odds::OddsLine;
use crate::pitching::Innings;
use crate::teams::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Over,
    Under,
    Push,
}

impl Outcome {
    pub fn from_total(total_runs: u32, line: f64) -> Outcome {
        let runs = total_runs as f64;
        if runs > line {
            Outcome::Over
        } else if runs < line {
            Outcome::Under
        } else {
            Outcome::Push
        }
    }
}

/// Composite join key. Not unique: a doubleheader can repeat a score line.
pub fn game_key(
    date: NaiveDate,
    away: &str,
    home: &str,
    away_runs: u32,
    home_runs: u32,
) -> String {
    format!("{}|{}|{}|{}-{}", date, away, home, away_runs, home_runs)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub date: NaiveDate,
    pub game_number: u8,
    pub away_team: String,
    pub home_team: String,
    pub away_runs: u32,
    pub home_runs: u32,
    pub total_runs: u32,
    pub away_starter: String,
    pub away_starter_ip: Innings,
    pub away_starter_er: u32,
    pub away_starter_pregame_era: Option<f64>,
    pub home_starter: String,
    pub home_starter_ip: Innings,
    pub home_starter_er: u32,
    pub home_starter_pregame_era: Option<f64>,
    pub opening_total: Option<f64>,
    pub closing_total: Option<f64>,
    pub outcome: Option<Outcome>,
}

impl DatasetRow {
    fn new(game: &Game, away: &Team, home: &Team, odds: &OddsLine) -> Self {
        let line = odds.closing_total.or(odds.opening_total);
        DatasetRow {
            date: game.date,
            game_number: game.game_number,
            away_team: away.abbr.to_string(),
            home_team: home.abbr.to_string(),
            away_runs: game.away_runs,
            home_runs: game.home_runs,
            total_runs: game.total_runs,
            away_starter: game.away_starter.clone(),
            away_starter_ip: game.away_starter_ip,
            away_starter_er: game.away_starter_er,
            away_starter_pregame_era: game.away_starter_pregame_era,
            home_starter: game.home_starter.clone(),
            home_starter_ip: game.home_starter_ip,
            home_starter_er: game.home_starter_er,
            home_starter_pregame_era: game.home_starter_pregame_era,
            opening_total: odds.opening_total,
            closing_total: odds.closing_total,
            outcome: line.map(|l| Outcome::from_total(game.total_runs, l)),
        }
    }
}

#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub rows: Vec<DatasetRow>,
    pub unmatched_games: Vec<Game>,
    pub unmatched_odds: Vec<OddsLine>,
    /// Keys seen more than once on either side
    pub collisions: usize,
}

fn odds_key(odds: &OddsLine) -> Result<String> {
    let away = Team::resolve(&odds.away_team)?;
    let home = Team::resolve(&odds.home_team)?;
    Ok(game_key(
        odds.date,
        away.abbr,
        home.abbr,
        odds.away_score,
        odds.home_score,
    ))
}

/// Inner join on the composite key, keeping both sides' leftovers.
///
/// Duplicate keys are paired in order of appearance rather than overwritten.
pub fn merge(games: &[Game], odds: &[OddsLine]) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    let mut by_key: HashMap<String, VecDeque<&OddsLine>> = HashMap::new();
    for line in odds {
        match odds_key(line) {
            Ok(key) => {
                let queue = by_key.entry(key).or_default();
                if !queue.is_empty() {
                    outcome.collisions += 1;
                }
                queue.push_back(line);
            }
            Err(e) => {
                warn!("odds line {} {} @ {}: {}", line.date, line.away_team, line.home_team, e);
                outcome.unmatched_odds.push(line.clone());
            }
        }
    }

    let mut seen_games: HashMap<String, usize> = HashMap::new();
    for game in games {
        let teams = Team::resolve(&game.away_team).and_then(|away| {
            Team::resolve(&game.home_team).map(|home| (away, home))
        });
        let (away, home) = match teams {
            Ok(teams) => teams,
            Err(e) => {
                warn!("game {} {} @ {}: {}", game.date, game.away_team, game.home_team, e);
                outcome.unmatched_games.push(game.clone());
                continue;
            }
        };

        let key = game_key(game.date, away.abbr, home.abbr, game.away_runs, game.home_runs);
        let count = seen_games.entry(key.clone()).or_default();
        *count += 1;
        if *count > 1 {
            outcome.collisions += 1;
        }

        match by_key.get_mut(&key).and_then(|q| q.pop_front()) {
            Some(line) => outcome.rows.push(DatasetRow::new(game, away, home, line)),
            None => {
                debug!("no odds for {}", key);
                outcome.unmatched_games.push(game.clone());
            }
        }
    }

    for queue in by_key.into_values() {
        outcome.unmatched_odds.extend(queue.into_iter().cloned());
    }
    outcome.unmatched_odds.sort_by(|a, b| a.date.cmp(&b.date));

    outcome
}
