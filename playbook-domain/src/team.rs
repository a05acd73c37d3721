use std::{collections::HashSet, sync::Arc};

use log::{debug, error, warn};
use playbook_core::{
    GameLogFilter, JsonRow, PlayerId, TeamCode,
    record::{TeamRecord, parse_outcome},
};
use serde_json::{Map, Value, json};

use crate::{
    ServiceError, ServiceResult,
    player::ArcPlayerRepository,
    stats::{
        StatsQuery, StatsResponse, TeamStatsType, column, respond_document, respond_non_null,
        respond_rows, whole_rows,
    },
};

/// Column sets read from a team's game-log table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamLogQuery {
    Results,
    Defensive,
    Offensive,
    Passing,
    Rushing,
    Receiving,
    Special,
}

impl TeamLogQuery {
    /// Selected columns. The passing and rushing aggregates are computed by the repository
    /// out of `offensive_stats`.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            TeamLogQuery::Results => &["game_result"],
            TeamLogQuery::Defensive => &["season", "week", "opponent_team", "defensive_stats"],
            TeamLogQuery::Offensive => &["offensive_stats"],
            TeamLogQuery::Passing => &[
                "season",
                "week",
                "season_type",
                "opponent_team",
                "game_result",
                "aggregated_passing_stats",
                "player_passing_stats",
            ],
            TeamLogQuery::Rushing => &[
                "season",
                "week",
                "season_type",
                "opponent_team",
                "game_result",
                "aggregated_rushing_stats",
                "player_rushing_stats",
            ],
            TeamLogQuery::Receiving => &["season", "week", "opponent_team", "player_recieving_stats"],
            TeamLogQuery::Special => &["special_teams"],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamSearchRow {
    pub abbr: String,
    pub name: Option<String>,
    pub nick: Option<String>,
}

pub type ArcTeamRepository = Arc<Box<dyn TeamRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait TeamRepository {
    async fn get_team_info(&self, team: TeamCode) -> ServiceResult<Option<Value>>;
    async fn get_game_logs(
        &self,
        team: TeamCode,
        query: TeamLogQuery,
        filter: &GameLogFilter,
    ) -> ServiceResult<Vec<JsonRow>>;
    async fn search_teams(&self, term: &str, limit: i64) -> ServiceResult<Vec<TeamSearchRow>>;
    async fn sample_rows(&self, limit: i64) -> ServiceResult<Vec<Value>>;
}

pub type ArcTeamStatsService = Arc<Box<dyn TeamStatsService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait TeamStatsService {
    fn resolve_team(&self, raw: Option<&str>) -> ServiceResult<TeamCode>;
    async fn get_stats(
        &self,
        stats_type: TeamStatsType,
        query: &StatsQuery,
    ) -> ServiceResult<StatsResponse>;
}

pub struct TeamStatsServiceImpl {
    team_repository: ArcTeamRepository,
    player_repository: ArcPlayerRepository,
}

impl TeamStatsServiceImpl {
    pub fn new(team_repository: ArcTeamRepository, player_repository: ArcPlayerRepository) -> Self {
        Self {
            team_repository,
            player_repository,
        }
    }

    async fn game_logs(
        &self,
        team: TeamCode,
        query: TeamLogQuery,
        filter: &GameLogFilter,
    ) -> ServiceResult<Vec<JsonRow>> {
        self.team_repository.get_game_logs(team, query, filter).await
    }

    async fn receiving_yards(
        &self,
        team: TeamCode,
        filter: &GameLogFilter,
    ) -> ServiceResult<StatsResponse> {
        let rows = self
            .game_logs(team, TeamLogQuery::Receiving, filter)
            .await?;
        if rows.is_empty() {
            return ServiceError::not_found("No game logs found for the specified criteria.");
        }

        let mut player_ids: Vec<String> = Vec::new();
        for row in &rows {
            for stat in receiving_entries(row) {
                if let Some(id) = stat.get("player_id").and_then(Value::as_str) {
                    if !player_ids.iter().any(|known| known == id) {
                        player_ids.push(id.to_string());
                    }
                }
            }
        }

        let positions = if player_ids.is_empty() {
            Default::default()
        } else {
            match self.player_repository.get_positions(&player_ids).await {
                Ok(positions) => positions,
                Err(e) => {
                    error!(
                        "Failed to fetch player positions, treating {} players as unknown: {}",
                        player_ids.len(),
                        e
                    );
                    Default::default()
                }
            }
        };
        for id in &player_ids {
            if !positions.contains_key(id) {
                warn!("No position known for player {}", id);
            }
        }

        let aggregated = rows
            .iter()
            .map(|row| {
                let mut yards = PositionalYards::default();
                for stat in receiving_entries(row) {
                    let position = stat
                        .get("player_id")
                        .and_then(Value::as_str)
                        .and_then(|id| positions.get(id))
                        .map(|p| p.trim().to_ascii_uppercase())
                        .unwrap_or_default();
                    yards.add(&position, receiving_yards(stat));
                }
                json!({
                    "season": row.get("season").cloned().unwrap_or(Value::Null),
                    "week": row.get("week").cloned().unwrap_or(Value::Null),
                    "opponent_team": row.get("opponent_team").cloned().unwrap_or(Value::Null),
                    "wr_yards": number(yards.wr),
                    "te_yards": number(yards.te),
                    "rb_yards": number(yards.rb),
                })
            })
            .collect();
        Ok(StatsResponse::Found(Value::Array(aggregated)))
    }

    async fn record(&self, team: TeamCode, filter: &GameLogFilter) -> ServiceResult<StatsResponse> {
        let rows = self.game_logs(team, TeamLogQuery::Results, filter).await?;
        if rows.is_empty() {
            return ServiceError::not_found("No game results found for the specified criteria.");
        }

        let mut record = TeamRecord::default();
        for row in &rows {
            let Some(result) = row.get("game_result").filter(|r| !r.is_null()) else {
                continue;
            };
            match parse_outcome(result) {
                Ok(Some(outcome)) => record.record(outcome),
                Ok(None) => {}
                Err(e) => warn!("Skipping game result for {}: {}", team, e),
            }
        }
        let body = serde_json::to_value(record).map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(StatsResponse::Found(body))
    }

    async fn roster(&self, team: TeamCode, filter: &GameLogFilter) -> ServiceResult<StatsResponse> {
        let entries = self.player_repository.get_roster(team.as_str()).await?;
        if entries.is_empty() {
            return ServiceError::not_found("No players found for the specified team.");
        }

        let kept: Vec<_> = if filter.is_empty() {
            entries
        } else {
            let ids: Vec<PlayerId> = entries
                .iter()
                .filter_map(|entry| {
                    let id = PlayerId::from_canonical(&entry.id);
                    if id.is_none() {
                        warn!("Skipping roster entry with malformed id {}", entry.id);
                    }
                    id
                })
                .collect();
            let matching: HashSet<String> = self
                .player_repository
                .players_with_game_logs(&ids, filter)
                .await?;
            debug!(
                "{} of {} {} players match the roster filter",
                matching.len(),
                entries.len(),
                team
            );
            entries
                .into_iter()
                .filter(|entry| matching.contains(&entry.id))
                .collect()
        };

        if kept.is_empty() {
            return ServiceError::not_found("No players found matching the specified criteria.");
        }

        let roster: Map<String, Value> = kept
            .into_iter()
            .map(|entry| {
                let name = entry.name.unwrap_or_else(|| entry.id.clone());
                (name, Value::String(entry.id))
            })
            .collect();
        Ok(StatsResponse::Found(Value::Object(roster)))
    }
}

#[async_trait::async_trait]
impl TeamStatsService for TeamStatsServiceImpl {
    fn resolve_team(&self, raw: Option<&str>) -> ServiceResult<TeamCode> {
        let Some(raw) = raw.filter(|r| !r.is_empty()) else {
            return ServiceError::bad_request("No team provided");
        };
        TeamCode::parse(raw).ok_or_else(|| ServiceError::BadRequest("Invalid team ID".to_string()))
    }

    async fn get_stats(
        &self,
        stats_type: TeamStatsType,
        query: &StatsQuery,
    ) -> ServiceResult<StatsResponse> {
        let team = self.resolve_team(query.team.as_deref())?;
        let filter = query.filter()?;
        debug!("Fetching {:?} stats for {} ({})", stats_type, team, team.name());

        match stats_type {
            TeamStatsType::Info => respond_document(
                self.team_repository.get_team_info(team).await?,
                "Team not found.",
                "All info found for team was null.",
            ),
            TeamStatsType::Results => respond_non_null(
                self.game_logs(team, TeamLogQuery::Results, &filter).await?,
                "game_result",
                "No game results found for the specified criteria.",
                "All game results found for specified criteria were null.",
                column("game_result"),
            ),
            TeamStatsType::Defensive => respond_non_null(
                self.game_logs(team, TeamLogQuery::Defensive, &filter).await?,
                "defensive_stats",
                "No defensive stats found for the specified criteria.",
                "All team defensive stats found for specified criteria were null.",
                merge_game_context,
            ),
            TeamStatsType::Offensive => respond_non_null(
                self.game_logs(team, TeamLogQuery::Offensive, &filter).await?,
                "offensive_stats",
                "No offensive stats found for the specified criteria.",
                "All team offensive stats found for specified criteria were null.",
                column("offensive_stats"),
            ),
            TeamStatsType::Passing => respond_non_null(
                self.game_logs(team, TeamLogQuery::Passing, &filter).await?,
                "aggregated_passing_stats",
                "No team passing stats found for the specified criteria.",
                "All team passing stats found for specified criteria were null.",
                whole_rows,
            ),
            TeamStatsType::Rushing => respond_non_null(
                self.game_logs(team, TeamLogQuery::Rushing, &filter).await?,
                "aggregated_rushing_stats",
                "No rushing stats found for the specified criteria.",
                "All team rushing stats found for specified criteria were null.",
                whole_rows,
            ),
            TeamStatsType::Receiving => self.receiving_yards(team, &filter).await,
            TeamStatsType::Record => self.record(team, &filter).await,
            TeamStatsType::Roster => self.roster(team, &filter).await,
            TeamStatsType::Special => respond_rows(
                self.game_logs(team, TeamLogQuery::Special, &filter).await?,
                "No special team stats found for the specified criteria.",
                column("special_teams"),
            ),
        }
    }
}

/// Copies `week` and `opponent_team` into each `defensive_stats` object unless the stats
/// already carry their own.
fn merge_game_context(rows: Vec<JsonRow>) -> Value {
    Value::Array(
        rows.into_iter()
            .map(|mut row| {
                let stats = row.remove("defensive_stats").unwrap_or(Value::Null);
                let Value::Object(mut stats) = stats else {
                    return stats;
                };
                for key in ["week", "opponent_team"] {
                    if let Some(value) = row.remove(key) {
                        stats.entry(key).or_insert(value);
                    }
                }
                Value::Object(stats)
            })
            .collect(),
    )
}

fn receiving_entries(row: &JsonRow) -> impl Iterator<Item = &Map<String, Value>> {
    row.get("player_recieving_stats")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Numbers count as is, numeric strings are parsed, anything else is zero.
fn receiving_yards(stat: &Map<String, Value>) -> f64 {
    let yards = match stat.get("receiving_yards") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    yards.filter(|y| y.is_finite()).unwrap_or(0.0)
}

#[derive(Debug, Default)]
struct PositionalYards {
    wr: f64,
    te: f64,
    rb: f64,
}

impl PositionalYards {
    fn add(&mut self, position: &str, yards: f64) {
        match position {
            "WR" => self.wr += yards,
            "TE" => self.te += yards,
            "RB" | "HB" | "FB" => self.rb += yards,
            _ => {}
        }
    }
}

fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}
