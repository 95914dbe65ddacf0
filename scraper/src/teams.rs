//! Franchise table used to reconcile the names the two sites print.
//!
//! The box-score site writes full names ("New York Yankees") and historical
//! URL codes ("NYA"); the odds site writes short city forms ("N.Y. Yankees").
//! Everything is resolved to the canonical abbreviation before merging.

use std::fmt;

use stringmetrics::levenshtein;

use crate::error::{Result, ScrapeError};

#[derive(Debug, PartialEq, Eq)]
pub struct Team {
    pub abbr: &'static str,
    pub name: &'static str,
    nicknames: &'static [&'static str],
    aliases: &'static [&'static str],
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.abbr)
    }
}

macro_rules! team {
    ($abbr:expr, $name:expr, [$($nick:expr),*], [$($alias:expr),*]) => {
        Team {
            abbr: $abbr,
            name: $name,
            nicknames: &[$($nick),*],
            aliases: &[$($alias),*],
        }
    };
}

pub static TEAMS: [Team; 30] = [
    team!("ARI", "Arizona Diamondbacks", ["Diamondbacks", "D-backs"], ["AZ"]),
    team!("ATL", "Atlanta Braves", ["Braves"], []),
    team!("BAL", "Baltimore Orioles", ["Orioles"], []),
    team!("BOS", "Boston Red Sox", ["Red Sox"], []),
    team!("CHC", "Chicago Cubs", ["Cubs"], ["CHN"]),
    team!("CHW", "Chicago White Sox", ["White Sox"], ["CHA", "CWS"]),
    team!("CIN", "Cincinnati Reds", ["Reds"], []),
    team!("CLE", "Cleveland Guardians", ["Guardians", "Indians"], ["Cleveland Indians"]),
    team!("COL", "Colorado Rockies", ["Rockies"], []),
    team!("DET", "Detroit Tigers", ["Tigers"], []),
    team!("HOU", "Houston Astros", ["Astros"], []),
    team!("KC", "Kansas City Royals", ["Royals"], ["KCA", "KCR"]),
    team!(
        "LAA",
        "Los Angeles Angels",
        ["Angels"],
        ["ANA", "Los Angeles Angels of Anaheim", "Anaheim Angels", "California Angels"]
    ),
    team!("LAD", "Los Angeles Dodgers", ["Dodgers"], ["LAN"]),
    team!("MIA", "Miami Marlins", ["Marlins"], ["FLA", "FLO", "Florida Marlins"]),
    team!("MIL", "Milwaukee Brewers", ["Brewers"], []),
    team!("MIN", "Minnesota Twins", ["Twins"], []),
    team!("NYM", "New York Mets", ["Mets"], ["NYN"]),
    team!("NYY", "New York Yankees", ["Yankees"], ["NYA"]),
    team!("OAK", "Oakland Athletics", ["Athletics"], ["A's", "Oakland A's", "ATH"]),
    team!("PHI", "Philadelphia Phillies", ["Phillies"], []),
    team!("PIT", "Pittsburgh Pirates", ["Pirates"], []),
    team!("SD", "San Diego Padres", ["Padres"], ["SDN", "SDP"]),
    team!("SF", "San Francisco Giants", ["Giants"], ["SFN", "SFG"]),
    team!("SEA", "Seattle Mariners", ["Mariners"], []),
    team!("STL", "St. Louis Cardinals", ["Cardinals"], ["SLN"]),
    team!(
        "TB",
        "Tampa Bay Rays",
        ["Rays", "Devil Rays"],
        ["TBA", "TBD", "TBR", "Tampa Bay Devil Rays"]
    ),
    team!("TEX", "Texas Rangers", ["Rangers"], []),
    team!("TOR", "Toronto Blue Jays", ["Blue Jays"], []),
    team!("WSH", "Washington Nationals", ["Nationals"], ["WAS", "WSN"]),
];

/// Lowercase ASCII alphanumerics only, so "N.Y. Yankees" and "ny yankees" compare equal.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl Team {
    fn exact_names(&'static self) -> impl Iterator<Item = &'static str> {
        [self.abbr, self.name]
            .into_iter()
            .chain(self.aliases.iter().copied())
            .chain(self.nicknames.iter().copied())
    }

    pub fn by_abbr(abbr: &str) -> Option<&'static Team> {
        TEAMS.iter().find(|t| t.abbr.eq_ignore_ascii_case(abbr))
    }

    /// Resolve any spelling either site uses to a franchise.
    pub fn resolve(input: &str) -> Result<&'static Team> {
        let normalized = normalize(input);
        let key = normalized.as_str();
        if key.is_empty() {
            return Err(ScrapeError::UnknownTeam(input.to_string()));
        }

        if let Some(team) = TEAMS
            .iter()
            .find(|&t| t.exact_names().any(|n| normalize(n) == key))
        {
            return Ok(team);
        }

        // "N.Y. Yankees", "Chi. White Sox": the nickname is the reliable part
        let suffix_match = TEAMS
            .iter()
            .flat_map(|t| t.nicknames.iter().map(move |n| (t, normalize(n))))
            .filter(|(_, nick)| key.ends_with(nick.as_str()))
            .max_by_key(|(_, nick)| nick.len());
        if let Some((team, _)) = suffix_match {
            return Ok(team);
        }

        // City alone ("Baltimore") is fine as long as only one franchise plays there
        let mut by_city = TEAMS
            .iter()
            .filter(|t| key.len() >= 4 && normalize(t.name).starts_with(key));
        if let (Some(team), None) = (by_city.next(), by_city.next()) {
            return Ok(team);
        }

        let limit = std::cmp::max(2, key.len() as u32 / 5);
        let fuzzy = TEAMS
            .iter()
            .flat_map(|t| {
                t.exact_names()
                    .filter(|n| n.len() > 3)
                    .map(move |n| (t, levenshtein(key, &normalize(n))))
            })
            .min_by_key(|(_, distance)| *distance);
        match fuzzy {
            Some((team, distance)) if distance <= limit => {
                log::debug!("fuzzy matched team {:?} to {} ({})", input, team.abbr, distance);
                Ok(team)
            }
            _ => Err(ScrapeError::UnknownTeam(input.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abbr(name: &str) -> &'static str {
        Team::resolve(name).unwrap().abbr
    }

    #[test]
    fn test_full_names_and_codes() {
        assert_eq!(abbr("New York Yankees"), "NYY");
        assert_eq!(abbr("NYA"), "NYY");
        assert_eq!(abbr("nyn"), "NYM");
        assert_eq!(abbr("St. Louis Cardinals"), "STL");
        assert_eq!(abbr("SLN"), "STL");
    }

    #[test]
    fn test_short_city_forms() {
        assert_eq!(abbr("N.Y. Yankees"), "NYY");
        assert_eq!(abbr("NY Mets"), "NYM");
        assert_eq!(abbr("Chi. White Sox"), "CHW");
        assert_eq!(abbr("Chi. Cubs"), "CHC");
        assert_eq!(abbr("L.A. Dodgers"), "LAD");
        assert_eq!(abbr("LA Angels"), "LAA");
        assert_eq!(abbr("Boston Red Sox"), "BOS");
    }

    #[test]
    fn test_city_only() {
        assert_eq!(abbr("Baltimore"), "BAL");
        assert_eq!(abbr("San Diego"), "SD");
        assert!(Team::resolve("New York").is_err());
        assert!(Team::resolve("Chicago").is_err());
    }

    #[test]
    fn test_renamed_franchises() {
        assert_eq!(abbr("Cleveland Indians"), "CLE");
        assert_eq!(abbr("Florida Marlins"), "MIA");
        assert_eq!(abbr("Tampa Bay Devil Rays"), "TB");
        assert_eq!(abbr("Los Angeles Angels of Anaheim"), "LAA");
        assert_eq!(abbr("A's"), "OAK");
        assert_eq!(abbr("Oakland A's"), "OAK");
    }

    #[test]
    fn test_fuzzy_misspelling() {
        assert_eq!(abbr("Philadelphia Philies"), "PHI");
        assert_eq!(abbr("Pittsburg Pirates"), "PIT");
    }

    #[test]
    fn test_unknown_team() {
        assert!(matches!(
            Team::resolve("Springfield Isotopes"),
            Err(ScrapeError::UnknownTeam(_))
        ));
        assert!(Team::resolve("").is_err());
    }

    #[test]
    fn test_abbreviations_are_unique() {
        for (i, team) in TEAMS.iter().enumerate() {
            assert!(TEAMS[i + 1..].iter().all(|t| t.abbr != team.abbr));
            assert_eq!(Team::by_abbr(team.abbr), Some(team));
        }
    }
}
