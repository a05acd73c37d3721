use chrono::Datelike;
use thiserror::Error;

use crate::{MAX_WEEK, MIN_SEASON, TeamCode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Invalid season. Must be a four-digit year from 1920 onward.")]
    Season,
    #[error("Invalid week. Must be a number between 1 and 22.")]
    Week,
    #[error("Invalid opponent team ID.")]
    Opponent,
}

/// Optional season/week/opponent restriction applied to a game log table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameLogFilter {
    pub season: Option<i32>,
    pub week: Option<i32>,
    pub opponent: Option<TeamCode>,
}

impl GameLogFilter {
    pub fn parse(
        season: Option<&str>,
        week: Option<&str>,
        opponent: Option<&str>,
    ) -> Result<Self, FilterError> {
        Self::parse_for_year(season, week, opponent, chrono::Utc::now().year())
    }

    pub fn parse_for_year(
        season: Option<&str>,
        week: Option<&str>,
        opponent: Option<&str>,
        current_year: i32,
    ) -> Result<Self, FilterError> {
        let season = present(season)
            .map(|raw| {
                raw.parse::<i32>()
                    .ok()
                    .filter(|s| (MIN_SEASON..=current_year).contains(s))
                    .ok_or(FilterError::Season)
            })
            .transpose()?;
        let week = present(week)
            .map(|raw| {
                raw.parse::<i32>()
                    .ok()
                    .filter(|w| (1..=MAX_WEEK).contains(w))
                    .ok_or(FilterError::Week)
            })
            .transpose()?;
        let opponent = present(opponent)
            .map(|raw| TeamCode::parse(raw).ok_or(FilterError::Opponent))
            .transpose()?;
        Ok(Self {
            season,
            week,
            opponent,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.season.is_none() && self.week.is_none() && self.opponent.is_none()
    }
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_filters() {
        let filter =
            GameLogFilter::parse_for_year(Some("2023"), Some("5"), Some("kc"), 2024).unwrap();
        assert_eq!(filter.season, Some(2023));
        assert_eq!(filter.week, Some(5));
        assert_eq!(filter.opponent, TeamCode::parse("KC"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_absent_and_blank_filters() {
        let filter = GameLogFilter::parse_for_year(None, Some(""), Some("  "), 2024).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_season_bounds() {
        assert!(GameLogFilter::parse_for_year(Some("1920"), None, None, 2024).is_ok());
        assert!(GameLogFilter::parse_for_year(Some("2024"), None, None, 2024).is_ok());
        assert_eq!(
            GameLogFilter::parse_for_year(Some("1919"), None, None, 2024),
            Err(FilterError::Season)
        );
        assert_eq!(
            GameLogFilter::parse_for_year(Some("2025"), None, None, 2024),
            Err(FilterError::Season)
        );
        assert_eq!(
            GameLogFilter::parse_for_year(Some("twenty"), None, None, 2024),
            Err(FilterError::Season)
        );
    }

    #[test]
    fn test_week_bounds() {
        assert!(GameLogFilter::parse_for_year(None, Some("1"), None, 2024).is_ok());
        assert!(GameLogFilter::parse_for_year(None, Some("22"), None, 2024).is_ok());
        assert_eq!(
            GameLogFilter::parse_for_year(None, Some("0"), None, 2024),
            Err(FilterError::Week)
        );
        assert_eq!(
            GameLogFilter::parse_for_year(None, Some("23"), None, 2024),
            Err(FilterError::Week)
        );
    }

    #[test]
    fn test_first_failure_wins() {
        assert_eq!(
            GameLogFilter::parse_for_year(Some("1800"), Some("99"), Some("XX"), 2024),
            Err(FilterError::Season)
        );
        assert_eq!(
            GameLogFilter::parse_for_year(Some("2020"), Some("99"), Some("XX"), 2024),
            Err(FilterError::Week)
        );
        assert_eq!(
            GameLogFilter::parse_for_year(Some("2020"), Some("2"), Some("XX"), 2024),
            Err(FilterError::Opponent)
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FilterError::Week.to_string(),
            "Invalid week. Must be a number between 1 and 22."
        );
        assert_eq!(FilterError::Opponent.to_string(), "Invalid opponent team ID.");
    }
}
