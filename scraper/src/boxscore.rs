use chrono::NaiveDate;
use log::{info, warn};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};
use crate::http::PageSource;
use crate::pitching::{parse_pitching_tables, Innings, PitcherLine};

/// One game as published on the box-score site, one CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub date: NaiveDate,
    /// 0 for a single game, 1 or 2 for the halves of a doubleheader
    pub game_number: u8,
    pub away_team: String,
    pub home_team: String,
    pub away_runs: u32,
    pub home_runs: u32,
    pub total_runs: u32,
    pub away_starter: String,
    pub away_starter_ip: Innings,
    pub away_starter_er: u32,
    pub away_starter_h: u32,
    pub away_starter_bb: u32,
    pub away_starter_so: u32,
    #[serde(default)]
    pub away_starter_pregame_era: Option<f64>,
    pub home_starter: String,
    pub home_starter_ip: Innings,
    pub home_starter_er: u32,
    pub home_starter_h: u32,
    pub home_starter_bb: u32,
    pub home_starter_so: u32,
    #[serde(default)]
    pub home_starter_pregame_era: Option<f64>,
}

impl Game {
    pub fn new(
        id: &GameId,
        away: (String, u32, &PitcherLine),
        home: (String, u32, &PitcherLine),
    ) -> Self {
        let (away_team, away_runs, away_sp) = away;
        let (home_team, home_runs, home_sp) = home;
        Game {
            date: id.date,
            game_number: id.game_number,
            away_team,
            home_team,
            away_runs,
            home_runs,
            total_runs: away_runs + home_runs,
            away_starter: away_sp.name.clone(),
            away_starter_ip: away_sp.ip,
            away_starter_er: away_sp.er,
            away_starter_h: away_sp.h,
            away_starter_bb: away_sp.bb,
            away_starter_so: away_sp.so,
            away_starter_pregame_era: None,
            home_starter: home_sp.name.clone(),
            home_starter_ip: home_sp.ip,
            home_starter_er: home_sp.er,
            home_starter_h: home_sp.h,
            home_starter_bb: home_sp.bb,
            home_starter_so: home_sp.so,
            home_starter_pregame_era: None,
        }
    }
}

/// What a box-score file name encodes: `NYA201904010.shtml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameId {
    pub home_code: String,
    pub date: NaiveDate,
    pub game_number: u8,
}

pub fn parse_game_id(url: &str) -> Result<GameId> {
    let file = url.rsplit('/').next().unwrap_or(url);
    let stem = file.split('.').next().unwrap_or(file);

    if stem.len() != 12 || !stem.is_ascii() {
        return Err(ScrapeError::invalid("game id", url));
    }
    let (home_code, rest) = stem.split_at(3);
    let (date, number) = rest.split_at(8);

    let date = NaiveDate::parse_from_str(date, "%Y%m%d")
        .map_err(|_| ScrapeError::invalid("game id", url))?;
    let game_number = number
        .parse()
        .map_err(|_| ScrapeError::invalid("game id", url))?;

    Ok(GameId {
        home_code: home_code.to_string(),
        date,
        game_number,
    })
}

pub fn scoreboard_url(base: &str, date: NaiveDate) -> String {
    format!(
        "{}/boxes/?year={}&month={}&day={}",
        base.trim_end_matches('/'),
        date.format("%Y"),
        date.format("%-m"),
        date.format("%-d")
    )
}

/// Box-score links on a day's scoreboard. An off day has none.
pub fn parse_scoreboard(html: &str, base: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("div.game_summary td.gamelink a").unwrap();

    let mut links: Vec<String> = Vec::new();
    for a in document.select(&link_selector) {
        let href = match a.value().attr("href") {
            Some(href) if !href.is_empty() => href,
            _ => continue,
        };
        let url = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{}{}", base.trim_end_matches('/'), href)
        };
        if !links.contains(&url) {
            links.push(url);
        }
    }

    Ok(links)
}

pub fn parse_box_score(html: &str, url: &str) -> Result<Game> {
    let id = parse_game_id(url)?;
    let document = Html::parse_document(html);

    let team_box_selector = Selector::parse("div.scorebox > div").unwrap();
    let name_selector = Selector::parse("strong a").unwrap();
    let strong_selector = Selector::parse("strong").unwrap();
    let score_selector = Selector::parse("div.score").unwrap();

    let mut teams = Vec::new();
    for team_box in document.select(&team_box_selector) {
        let score = match team_box.select(&score_selector).next() {
            Some(score) => score.text().collect::<String>().trim().to_string(),
            None => continue,
        };
        let name = team_box
            .select(&name_selector)
            .next()
            .or_else(|| team_box.select(&strong_selector).next())
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ScrapeError::missing("team name", url))?;
        let runs: u32 = score
            .parse()
            .map_err(|_| ScrapeError::invalid("score", score.clone()))?;
        teams.push((name, runs));
    }

    if teams.len() != 2 {
        return Err(ScrapeError::missing(
            format!("two scorebox teams (found {})", teams.len()),
            url,
        ));
    }

    let tables = parse_pitching_tables(html)?;
    let away_sp = tables[0]
        .starter()
        .ok_or_else(|| ScrapeError::missing("away starter", url))?;
    let home_sp = tables[1]
        .starter()
        .ok_or_else(|| ScrapeError::missing("home starter", url))?;

    let mut teams = teams.into_iter();
    let (away_team, away_runs) = teams.next().unwrap_or_default();
    let (home_team, home_runs) = teams.next().unwrap_or_default();

    Ok(Game::new(
        &id,
        (away_team, away_runs, away_sp),
        (home_team, home_runs, home_sp),
    ))
}

/// Every game played on `date`. Games that fail to parse are logged and skipped.
/// One day's box scores, plus the links that could not be fetched or parsed.
#[derive(Debug, Default)]
pub struct DayGames {
    pub games: Vec<Game>,
    pub skipped: Vec<String>,
}

pub fn scrape_day(source: &mut impl PageSource, base: &str, date: NaiveDate) -> Result<DayGames> {
    let url = scoreboard_url(base, date);
    let html = source.fetch(&url)?;
    let links = parse_scoreboard(&html, base)?;

    let mut day = DayGames::default();
    if links.is_empty() {
        info!("{}: no games", date);
        return Ok(day);
    }

    for link in links {
        let game = source
            .fetch(&link)
            .and_then(|html| parse_box_score(&html, &link));
        match game {
            Ok(game) => day.games.push(game),
            Err(e) => {
                warn!("skipping {}: {}", link, e);
                day.skipped.push(link);
            }
        }
    }

    info!(
        "{}: parsed {}/{} box scores",
        date,
        day.games.len(),
        day.games.len() + day.skipped.len()
    );
    Ok(day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_game_id() {
        let id = parse_game_id("https://www.baseball-reference.com/boxes/NYA/NYA201904010.shtml")
            .unwrap();
        assert_eq!(id.home_code, "NYA");
        assert_eq!(id.date, NaiveDate::from_ymd_opt(2019, 4, 1).unwrap());
        assert_eq!(id.game_number, 0);

        let id = parse_game_id("/boxes/CHN/CHN201907042.shtml").unwrap();
        assert_eq!(id.game_number, 2);
    }

    #[test]
    fn test_parse_game_id_rejects_other_pages() {
        assert!(parse_game_id("https://example.com/boxes/").is_err());
        assert!(parse_game_id("/boxes/NYA/NYA20191301x.shtml").is_err());
    }

    #[test]
    fn test_scoreboard_url() {
        let date = NaiveDate::from_ymd_opt(2019, 4, 1).unwrap();
        assert_eq!(
            scoreboard_url("https://www.baseball-reference.com/", date),
            "https://www.baseball-reference.com/boxes/?year=2019&month=4&day=1"
        );
    }

    #[test]
    fn test_parse_scoreboard_dedups_and_absolutizes() {
        let html = r#"<html><body>
            <div class="game_summary"><table><tr><td class="gamelink"><a href="/boxes/NYA/NYA201904010.shtml">Final</a></td></tr></table></div>
            <div class="game_summary"><table><tr><td class="gamelink"><a href="/boxes/NYA/NYA201904010.shtml">Final</a></td></tr></table></div>
            <div class="game_summary"><table><tr><td class="gamelink"><a href="https://other.example/boxes/SDN/SDN201904010.shtml">Final</a></td></tr></table></div>
        </body></html>"#;
        let links = parse_scoreboard(html, "https://www.baseball-reference.com").unwrap();
        assert_eq!(
            links,
            vec![
                "https://www.baseball-reference.com/boxes/NYA/NYA201904010.shtml",
                "https://other.example/boxes/SDN/SDN201904010.shtml"
            ]
        );
    }

    #[test]
    fn test_off_day_scoreboard_is_empty() {
        let html = "<html><body><p>No games today</p></body></html>";
        assert!(parse_scoreboard(html, "https://x").unwrap().is_empty());
    }
}
