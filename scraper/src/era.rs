//! Running pregame ERA for starting pitchers.
//!
//! A starter's pregame ERA only counts games strictly before the one being
//! annotated, within the same season. First outings have no ERA.

use std::collections::HashMap;

use crate::boxscore::Game;
use crate::dates::season_of;
use crate::pitching::Innings;

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    earned_runs: u32,
    innings: Innings,
}

#[derive(Debug, Default)]
pub struct EraTracker {
    totals: HashMap<(String, i32), Totals>,
}

pub fn era(earned_runs: u32, innings: Innings) -> Option<f64> {
    if innings.outs() == 0 {
        return None;
    }
    // ER / (outs / 3) * 9
    Some(earned_runs as f64 * 27.0 / innings.outs() as f64)
}

impl EraTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// ERA over everything recorded so far for this pitcher and season.
    pub fn pregame(&self, pitcher: &str, season: i32) -> Option<f64> {
        let totals = self.totals.get(&(pitcher.to_string(), season))?;
        era(totals.earned_runs, totals.innings)
    }

    pub fn record(&mut self, pitcher: &str, season: i32, earned_runs: u32, innings: Innings) {
        let totals = self
            .totals
            .entry((pitcher.to_string(), season))
            .or_default();
        totals.earned_runs += earned_runs;
        totals.innings = totals.innings + innings;
    }
}

/// Sort games chronologically and fill in both starters' pregame ERA.
pub fn annotate_pregame_era(games: &mut [Game]) {
    games.sort_by_key(|g| (g.date, g.game_number));

    let mut tracker = EraTracker::new();
    for game in games.iter_mut() {
        let season = season_of(game.date);

        game.away_starter_pregame_era = tracker.pregame(&game.away_starter, season);
        game.home_starter_pregame_era = tracker.pregame(&game.home_starter, season);

        tracker.record(
            &game.away_starter,
            season,
            game.away_starter_er,
            game.away_starter_ip,
        );
        tracker.record(
            &game.home_starter,
            season,
            game.home_starter_er,
            game.home_starter_ip,
        );
    }
}
