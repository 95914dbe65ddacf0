use chrono::{Datelike, NaiveDate};

use crate::error::{Result, ScrapeError};

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ScrapeError::invalid("date", s))
}

/// Seasons are played within one calendar year.
pub fn season_of(date: NaiveDate) -> i32 {
    date.year()
}

/// Inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ScrapeError::invalid(
                "date range",
                format!("{} is after {}", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    /// March 1 through November 30, wide enough for spring openers and late World Series games.
    pub fn season(year: i32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, 3, 1)
            .ok_or_else(|| ScrapeError::invalid("season", year.to_string()))?;
        let end = NaiveDate::from_ymd_opt(year, 11, 30)
            .ok_or_else(|| ScrapeError::invalid("season", year.to_string()))?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_range_is_inclusive() {
        let range = DateRange::new(date(2019, 3, 30), date(2019, 4, 2)).unwrap();
        let days: Vec<_> = range.iter().collect();
        assert_eq!(
            days,
            vec![
                date(2019, 3, 30),
                date(2019, 3, 31),
                date(2019, 4, 1),
                date(2019, 4, 2)
            ]
        );
        assert_eq!(range.days(), 4);
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::new(date(2019, 4, 1), date(2019, 4, 1)).unwrap();
        assert_eq!(range.iter().count(), 1);
    }

    #[test]
    fn test_reversed_range_is_rejected() {
        assert!(DateRange::new(date(2019, 4, 2), date(2019, 4, 1)).is_err());
    }

    #[test]
    fn test_season_window() {
        let range = DateRange::season(2021).unwrap();
        assert_eq!(range.start(), date(2021, 3, 1));
        assert_eq!(range.end(), date(2021, 11, 30));
        assert_eq!(season_of(range.end()), 2021);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2019-04-01").unwrap(), date(2019, 4, 1));
        assert!(parse_date("04/01/2019").is_err());
    }
}
