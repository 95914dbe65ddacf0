pub mod boxscore;
pub mod config;
pub mod dataset;
pub mod dates;
pub mod era;
pub mod error;
pub mod http;
pub mod odds;
pub mod pipeline;
pub mod pitching;
pub mod store;
pub mod teams;

// Fixture-driven tests
#[cfg(test)]
pub mod tests;

// Re-export key types and functions for easier access
pub use crate::boxscore::{parse_box_score, parse_scoreboard, Game};
pub use crate::config::Config;
pub use crate::dataset::{merge, DatasetRow, MergeOutcome, Outcome};
pub use crate::era::{annotate_pregame_era, EraTracker};
pub use crate::error::{Result, ScrapeError};
pub use crate::http::{Fetcher, PageSource};
pub use crate::odds::{parse_odds_page, OddsLine};
pub use crate::pitching::{parse_pitching_tables, Innings, PitcherLine};
pub use crate::teams::Team;
