use playbook_core::{GameLogFilter, JsonRow, filter_null_values};
use serde_json::Value;

use crate::{ServiceError, ServiceResult};

/// Identifying and filtering query parameters shared by every stats endpoint.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct StatsQuery {
    pub id: Option<String>,
    pub team: Option<String>,
    pub season: Option<String>,
    pub week: Option<String>,
    pub opponent: Option<String>,
}

impl StatsQuery {
    pub fn filter(&self) -> ServiceResult<GameLogFilter> {
        GameLogFilter::parse(
            self.season.as_deref(),
            self.week.as_deref(),
            self.opponent.as_deref(),
        )
        .map_err(|e| ServiceError::BadRequest(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatsResponse {
    Found(Value),
    /// Rows matched, but the requested column was null in all of them.
    AllNull(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatsType {
    Extra,
    Info,
    Passing,
    Receiving,
    Rushing,
}

impl PlayerStatsType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "extra" => Some(Self::Extra),
            "info" => Some(Self::Info),
            "passing" => Some(Self::Passing),
            "receiving" => Some(Self::Receiving),
            "rushing" => Some(Self::Rushing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamStatsType {
    Results,
    Defensive,
    Info,
    Offensive,
    Passing,
    Receiving,
    Record,
    Roster,
    Rushing,
    Special,
}

impl TeamStatsType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "results" => Some(Self::Results),
            "defensive" => Some(Self::Defensive),
            "info" => Some(Self::Info),
            "offensive" => Some(Self::Offensive),
            "passing" => Some(Self::Passing),
            "receiving" => Some(Self::Receiving),
            "record" => Some(Self::Record),
            "roster" => Some(Self::Roster),
            "rushing" => Some(Self::Rushing),
            "special" => Some(Self::Special),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsTarget {
    Player(PlayerStatsType),
    Team(TeamStatsType),
}

impl StatsTarget {
    /// Resolves the `x-entity-type` / `x-stats-type` header pair, case-insensitively.
    pub fn from_headers(entity_type: Option<&str>, stats_type: Option<&str>) -> ServiceResult<Self> {
        let entity_type = normalize_header(entity_type);
        let stats_type = normalize_header(stats_type);

        let Some(entity_type) = entity_type else {
            return ServiceError::bad_request("Missing required header: x-entity-type");
        };
        let Some(stats_type) = stats_type else {
            return ServiceError::bad_request("Missing required header: x-stats-type");
        };

        match entity_type.as_str() {
            "player" => PlayerStatsType::parse(&stats_type)
                .map(StatsTarget::Player)
                .ok_or_else(|| ServiceError::BadRequest("Invalid x-stats-type.".to_string())),
            "team" => TeamStatsType::parse(&stats_type)
                .map(StatsTarget::Team)
                .ok_or_else(|| {
                    ServiceError::BadRequest("Invalid stats type for team.".to_string())
                }),
            _ => ServiceError::bad_request("Invalid x-entity-type."),
        }
    }
}

fn normalize_header(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

/// Zero rows is a 404, rows whose `key` column is all null is a 204,
/// anything else gets shaped into the response body.
pub(crate) fn respond_non_null(
    rows: Vec<JsonRow>,
    key: &str,
    not_found: &str,
    all_null: &str,
    shape: impl FnOnce(Vec<JsonRow>) -> Value,
) -> ServiceResult<StatsResponse> {
    if rows.is_empty() {
        return ServiceError::not_found(not_found);
    }
    let filtered = filter_null_values(rows, key);
    if filtered.is_empty() {
        return Ok(StatsResponse::AllNull(all_null.to_string()));
    }
    Ok(StatsResponse::Found(shape(filtered)))
}

pub(crate) fn respond_rows(
    rows: Vec<JsonRow>,
    not_found: &str,
    shape: impl FnOnce(Vec<JsonRow>) -> Value,
) -> ServiceResult<StatsResponse> {
    if rows.is_empty() {
        return ServiceError::not_found(not_found);
    }
    Ok(StatsResponse::Found(shape(rows)))
}

pub(crate) fn column(key: &str) -> impl FnOnce(Vec<JsonRow>) -> Value + '_ {
    move |rows| {
        Value::Array(
            rows.into_iter()
                .map(|mut row| row.remove(key).unwrap_or(Value::Null))
                .collect(),
        )
    }
}

pub(crate) fn whole_rows(rows: Vec<JsonRow>) -> Value {
    Value::Array(rows.into_iter().map(Value::Object).collect())
}

/// A single stored JSON document; a null document counts as empty.
pub(crate) fn respond_document(
    document: Option<Value>,
    not_found: &str,
    all_null: &str,
) -> ServiceResult<StatsResponse> {
    match document {
        None => ServiceError::not_found(not_found),
        Some(Value::Null) => Ok(StatsResponse::AllNull(all_null.to_string())),
        Some(Value::String(s)) if s == "null" => Ok(StatsResponse::AllNull(all_null.to_string())),
        Some(document) => Ok(StatsResponse::Found(document)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn message(err: ServiceError) -> String {
        match err {
            ServiceError::BadRequest(msg) => msg,
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_headers() {
        assert_eq!(
            StatsTarget::from_headers(Some("Player"), Some("PASSING")).unwrap(),
            StatsTarget::Player(PlayerStatsType::Passing)
        );
        assert_eq!(
            StatsTarget::from_headers(Some("team"), Some(" record ")).unwrap(),
            StatsTarget::Team(TeamStatsType::Record)
        );
    }

    #[test]
    fn test_missing_headers() {
        assert_eq!(
            message(StatsTarget::from_headers(None, Some("passing")).unwrap_err()),
            "Missing required header: x-entity-type"
        );
        assert_eq!(
            message(StatsTarget::from_headers(Some("player"), Some("")).unwrap_err()),
            "Missing required header: x-stats-type"
        );
        assert_eq!(
            message(StatsTarget::from_headers(None, None).unwrap_err()),
            "Missing required header: x-entity-type"
        );
    }

    #[test]
    fn test_invalid_headers() {
        assert_eq!(
            message(StatsTarget::from_headers(Some("coach"), Some("info")).unwrap_err()),
            "Invalid x-entity-type."
        );
        assert_eq!(
            message(StatsTarget::from_headers(Some("player"), Some("roster")).unwrap_err()),
            "Invalid x-stats-type."
        );
        assert_eq!(
            message(StatsTarget::from_headers(Some("team"), Some("extra")).unwrap_err()),
            "Invalid stats type for team."
        );
    }

    #[test]
    fn test_respond_non_null() {
        let rows: Vec<JsonRow> = vec![
            json!({"passing_stats": {"yards": 250}, "week": 1}),
            json!({"passing_stats": null, "week": 2}),
        ]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();

        let response =
            respond_non_null(rows, "passing_stats", "none", "all null", column("passing_stats"))
                .unwrap();
        assert_eq!(response, StatsResponse::Found(json!([{"yards": 250}])));

        let null_rows = vec![json!({"passing_stats": "null"}).as_object().cloned().unwrap()];
        assert_eq!(
            respond_non_null(null_rows, "passing_stats", "none", "all null", whole_rows).unwrap(),
            StatsResponse::AllNull("all null".to_string())
        );

        assert!(matches!(
            respond_non_null(vec![], "passing_stats", "none", "all null", whole_rows),
            Err(ServiceError::NotFound(msg)) if msg == "none"
        ));
    }

    #[test]
    fn test_query_filter_errors_are_bad_requests() {
        let query = StatsQuery {
            week: Some("40".to_string()),
            ..Default::default()
        };
        assert_eq!(
            message(query.filter().unwrap_err()),
            "Invalid week. Must be a number between 1 and 22."
        );
    }
}
