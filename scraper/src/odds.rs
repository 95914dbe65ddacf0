//! Over/under lines from the odds archive, one page per day.

use chrono::NaiveDate;
use log::{info, warn};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::http::PageSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsLine {
    pub date: NaiveDate,
    pub away_team: String,
    pub home_team: String,
    pub away_score: u32,
    pub home_score: u32,
    pub opening_total: Option<f64>,
    pub closing_total: Option<f64>,
}

pub fn odds_url(base: &str, date: NaiveDate) -> String {
    format!(
        "{}/betting-odds/mlb-baseball/totals/?date={}",
        base.trim_end_matches('/'),
        date.format("%Y%m%d")
    )
}

/// Runs in a totals cell: "8½ -110", "o8.5", "u9 +100", "9-115".
pub fn parse_total(text: &str) -> Option<f64> {
    let text = text
        .trim()
        .trim_start_matches(|c: char| c == 'o' || c == 'u' || c == 'O' || c == 'U')
        .trim_start();

    let digits: String = text
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let mut total: f64 = digits.trim_end_matches('.').parse().ok()?;
    if text[digits.len()..].starts_with('½') {
        total += 0.5;
    }
    Some(total)
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn first_total(event: &ElementRef, container: &Selector) -> Option<f64> {
    let value_selector = Selector::parse("div.eventLine-book-value").unwrap();
    event
        .select(container)
        .next()?
        .select(&value_selector)
        .find_map(|v| parse_total(&element_text(&v)))
}

pub fn parse_odds_page(html: &str, date: NaiveDate) -> Result<Vec<OddsLine>> {
    let document = Html::parse_document(html);
    let event_selector = Selector::parse("div.event-holder").unwrap();
    let team_selector = Selector::parse("span.team-name").unwrap();
    let score_selector = Selector::parse("span.current-score").unwrap();
    let opener_selector = Selector::parse("div.eventLine-opener").unwrap();
    let book_selector = Selector::parse("div.eventLine-book").unwrap();

    let mut lines = Vec::new();
    for event in document.select(&event_selector) {
        let teams: Vec<String> = event
            .select(&team_selector)
            .map(|t| element_text(&t))
            .filter(|t| !t.is_empty())
            .collect();
        if teams.len() != 2 {
            warn!("{}: odds event with {} teams, skipping", date, teams.len());
            continue;
        }

        let scores: Vec<u32> = event
            .select(&score_selector)
            .filter_map(|s| element_text(&s).parse().ok())
            .collect();
        if scores.len() != 2 {
            // postponed or not yet final
            continue;
        }

        lines.push(OddsLine {
            date,
            away_team: teams[0].clone(),
            home_team: teams[1].clone(),
            away_score: scores[0],
            home_score: scores[1],
            opening_total: first_total(&event, &opener_selector),
            closing_total: first_total(&event, &book_selector),
        });
    }

    Ok(lines)
}

pub fn scrape_day(
    source: &mut impl PageSource,
    base: &str,
    date: NaiveDate,
) -> Result<Vec<OddsLine>> {
    let html = source.fetch(&odds_url(base, date))?;
    let lines = parse_odds_page(&html, date)?;
    info!("{}: {} odds lines", date, lines.len());
    Ok(lines)
}
