//! Pitching tables from box-score pages.
//!
//! The box-score site only renders its first few tables live; the pitching
//! tables arrive as commented-out markup (`<div id="all_..."><!-- <table ...> -->`)
//! that is swapped in by script. We find those comment nodes in the parsed DOM
//! and run them back through the HTML parser instead of slicing strings.

use std::fmt;
use std::ops::Add;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, ScrapeError};

/// Innings pitched, stored as outs so that 5.1 + 0.2 == 6.0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Innings {
    outs: u32,
}

impl Innings {
    pub fn from_outs(outs: u32) -> Self {
        Self { outs }
    }

    pub fn outs(&self) -> u32 {
        self.outs
    }

    pub fn as_f64(&self) -> f64 {
        self.outs as f64 / 3.0
    }

    /// Box-score notation: the digit after the dot counts outs, not tenths.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() || text == "." {
            return Err(ScrapeError::invalid("innings", text));
        }
        let (whole, frac) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, "0"),
        };
        let whole: u32 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| ScrapeError::invalid("innings", text))?
        };
        let outs: u32 = match frac {
            "0" | "" => 0,
            "1" => 1,
            "2" => 2,
            _ => return Err(ScrapeError::invalid("innings", text)),
        };
        whole
            .checked_mul(3)
            .and_then(|w| w.checked_add(outs))
            .map(Self::from_outs)
            .ok_or_else(|| ScrapeError::invalid("innings", text))
    }
}

impl Add for Innings {
    type Output = Innings;

    fn add(self, rhs: Innings) -> Innings {
        Innings {
            outs: self.outs.saturating_add(rhs.outs),
        }
    }
}

impl fmt::Display for Innings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.outs / 3, self.outs % 3)
    }
}

impl Serialize for Innings {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Innings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Innings::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitcherLine {
    pub name: String,
    pub ip: Innings,
    pub h: u32,
    pub r: u32,
    pub er: u32,
    pub bb: u32,
    pub so: u32,
    /// "W", "L", "S", "H", "BS" as printed after the name
    pub decision: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PitchingTable {
    pub team_id: String,
    pub lines: Vec<PitcherLine>,
}

impl PitchingTable {
    /// Pitchers are listed in order of appearance.
    pub fn starter(&self) -> Option<&PitcherLine> {
        self.lines.first()
    }
}

/// Fold accents and whitespace so the same pitcher matches across pages.
pub fn normalize_name(name: &str) -> String {
    unidecode::unidecode(name)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of every comment node that carries table markup.
pub fn commented_tables(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut out = Vec::new();
    for node in document.tree.root().descendants() {
        if let Some(comment) = node.value().as_comment() {
            let text: &str = &comment.comment;
            if text.contains("<table") {
                out.push(text.to_string());
            }
        }
    }
    out
}

fn is_pitching_table(el: &ElementRef) -> bool {
    el.value().name() == "table"
        && el
            .value()
            .id()
            .map_or(false, |id| id.ends_with("pitching"))
}

/// Both teams' pitching tables, away first, whether live or commented out.
pub fn parse_pitching_tables(html: &str) -> Result<Vec<PitchingTable>> {
    let document = Html::parse_document(html);
    let table_selector = Selector::parse("table").unwrap();
    let mut tables = Vec::new();

    for node in document.tree.root().descendants() {
        if let Some(el) = ElementRef::wrap(node) {
            if is_pitching_table(&el) {
                tables.push(parse_table(&el)?);
            }
        } else if let Some(comment) = node.value().as_comment() {
            let text: &str = &comment.comment;
            if !text.contains("pitching") {
                continue;
            }
            let fragment = Html::parse_fragment(text);
            for el in fragment.select(&table_selector) {
                if is_pitching_table(&el) {
                    tables.push(parse_table(&el)?);
                }
            }
        }
    }

    if tables.len() != 2 {
        return Err(ScrapeError::missing(
            format!("two pitching tables (found {})", tables.len()),
            "box score",
        ));
    }
    Ok(tables)
}

fn parse_table(table: &ElementRef) -> Result<PitchingTable> {
    let team_id = table
        .value()
        .id()
        .unwrap_or_default()
        .trim_end_matches("pitching")
        .to_string();

    let row_selector = Selector::parse("tbody tr").unwrap();
    let player_selector = Selector::parse(r#"th[data-stat="player"]"#).unwrap();

    let mut lines = Vec::new();
    for row in table.select(&row_selector) {
        let th = match row.select(&player_selector).next() {
            Some(th) => th,
            None => continue,
        };
        if let Some(line) = parse_row(&row, &th)? {
            lines.push(line);
        }
    }

    if lines.is_empty() {
        return Err(ScrapeError::missing(
            "pitcher rows",
            format!("pitching table {}", team_id),
        ));
    }
    Ok(PitchingTable { team_id, lines })
}

fn parse_row(row: &ElementRef, th: &ElementRef) -> Result<Option<PitcherLine>> {
    let link_selector = Selector::parse("a").unwrap();
    let full_text = th.text().collect::<String>();
    let full_text = full_text.trim();

    let name = match th.select(&link_selector).next() {
        Some(a) => a.text().collect::<String>(),
        None => full_text.split(',').next().unwrap_or("").to_string(),
    };
    let name = normalize_name(&name);
    if name.is_empty() || name == "Pitcher" || name == "Team Totals" {
        return Ok(None);
    }

    // "Gerrit Cole, W (1-0)"
    let decision = full_text
        .split_once(',')
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .map(|d| d.to_string());

    Ok(Some(PitcherLine {
        ip: Innings::parse(&cell(row, "IP")?)?,
        h: count(row, "H", false)?,
        r: count(row, "R", true)?,
        er: count(row, "ER", true)?,
        bb: count(row, "BB", false)?,
        so: count(row, "SO", false)?,
        name,
        decision,
    }))
}

fn cell(row: &ElementRef, stat: &str) -> Result<String> {
    let selector = Selector::parse(&format!(r#"td[data-stat="{}"]"#, stat)).unwrap();
    row.select(&selector)
        .next()
        .map(|td| td.text().collect::<String>().trim().to_string())
        .ok_or_else(|| ScrapeError::missing(format!("{} cell", stat), "pitching row"))
}

fn count(row: &ElementRef, stat: &str, required: bool) -> Result<u32> {
    let text = match cell(row, stat) {
        Ok(text) => text,
        Err(_) if !required => return Ok(0),
        Err(e) => return Err(e),
    };
    if text.is_empty() && !required {
        return Ok(0);
    }
    text.parse().map_err(|_| ScrapeError::invalid(stat, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(id: &str, rows: &str) -> String {
        format!(
            r#"<table id="{}"><thead><tr><th data-stat="player">Pitching</th></tr></thead><tbody>{}</tbody></table>"#,
            id, rows
        )
    }

    fn row(name: &str, ip: &str, er: &str) -> String {
        format!(
            r#"<tr><th data-stat="player"><a href="/p.shtml">{}</a></th><td data-stat="IP">{}</td><td data-stat="H">5</td><td data-stat="R">{}</td><td data-stat="ER">{}</td><td data-stat="BB">1</td><td data-stat="SO">7</td></tr>"#,
            name, ip, er, er
        )
    }

    #[test]
    fn test_innings_notation() {
        assert_eq!(Innings::parse("5.1").unwrap().outs(), 16);
        assert_eq!(Innings::parse("6.2").unwrap().outs(), 20);
        assert_eq!(Innings::parse("7").unwrap().outs(), 21);
        assert_eq!(Innings::parse("0.0").unwrap().outs(), 0);
        assert!(Innings::parse("5.3").is_err());
        assert!(Innings::parse("").is_err());
        assert!(Innings::parse("abc").is_err());
    }

    #[test]
    fn test_innings_too_large() {
        assert!(matches!(
            Innings::parse("1431655766"),
            Err(ScrapeError::InvalidValue { .. })
        ));
        assert_eq!(Innings::parse("1431655765").unwrap().outs(), 4294967295);
        let total = Innings::from_outs(u32::MAX) + Innings::from_outs(3);
        assert_eq!(total.outs(), u32::MAX);
    }

    #[test]
    fn test_innings_add_and_display() {
        let total = Innings::parse("5.1").unwrap() + Innings::parse("0.2").unwrap();
        assert_eq!(total, Innings::parse("6.0").unwrap());
        assert_eq!(total.to_string(), "6.0");
        assert!((Innings::parse("4.2").unwrap().as_f64() - 14.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_commented_tables_found() {
        let html = format!(
            r#"<html><body><div id="all_x"><!-- {} --></div><!-- plain comment --></body></html>"#,
            table("Apitching", &row("A One", "6", "2"))
        );
        let found = commented_tables(&html);
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("Apitching"));
    }

    #[test]
    fn test_live_and_commented_tables_in_document_order() {
        let html = format!(
            r#"<html><body>{}<div id="all_home"><!-- {} --></div></body></html>"#,
            table("Awaypitching", &row("Away Starter", "5.1", "3")),
            table(
                "Homepitching",
                &(row("Home Starter", "7", "1") + &row("Home Reliever", "2", "0"))
            ),
        );
        let tables = parse_pitching_tables(&html).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].team_id, "Away");
        assert_eq!(tables[0].starter().unwrap().name, "Away Starter");
        assert_eq!(tables[0].starter().unwrap().ip.outs(), 16);
        assert_eq!(tables[1].lines.len(), 2);
        assert_eq!(tables[1].starter().unwrap().er, 1);
    }

    #[test]
    fn test_decision_and_accents() {
        let rows = r#"<tr><th data-stat="player"><a href="/b.shtml">José Berríos</a>, W (2-0)</th><td data-stat="IP">6</td><td data-stat="H">4</td><td data-stat="R">1</td><td data-stat="ER">1</td><td data-stat="BB"></td><td data-stat="SO">8</td></tr>
            <tr><th data-stat="player">Team Totals</th><td data-stat="IP">9</td><td data-stat="R">1</td><td data-stat="ER">1</td></tr>"#;
        let html = format!(
            "<html><body>{}{}</body></html>",
            table("Twinspitching", rows),
            table("Tigerspitching", &row("Other Guy", "8", "4"))
        );
        let tables = parse_pitching_tables(&html).unwrap();
        let starter = tables[0].starter().unwrap();
        assert_eq!(starter.name, "Jose Berrios");
        assert_eq!(starter.decision.as_deref(), Some("W"));
        assert_eq!(starter.bb, 0);
        assert_eq!(tables[0].lines.len(), 1);
    }

    #[test]
    fn test_missing_tables() {
        let html = format!(
            "<html><body>{}</body></html>",
            table("Onlypitching", &row("Solo", "9", "0"))
        );
        let err = parse_pitching_tables(&html).unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_bad_innings_cell() {
        let html = format!(
            "<html><body>{}{}</body></html>",
            table("Apitching", &row("A", "5.4", "0")),
            table("Bpitching", &row("B", "5", "0"))
        );
        assert!(matches!(
            parse_pitching_tables(&html),
            Err(ScrapeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Félix   Hernández "), "Felix Hernandez");
    }
}
