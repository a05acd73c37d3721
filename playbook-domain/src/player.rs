use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use log::error;
use playbook_core::{GameLogFilter, JsonRow, PlayerId};
use serde_json::Value;

use crate::{
    ServiceError, ServiceResult,
    stats::{
        PlayerStatsType, StatsQuery, StatsResponse, column, respond_non_null, respond_rows,
        whole_rows,
    },
};

/// Column sets read from a player's game-log table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerLogQuery {
    Extra,
    Passing,
    Receiving,
    Rushing,
}

impl PlayerLogQuery {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            PlayerLogQuery::Extra => &["extra_data"],
            PlayerLogQuery::Passing => &["passing_stats", "season", "week", "opponent_team"],
            PlayerLogQuery::Receiving => &["receiving_stats", "season", "week", "opponent_team"],
            PlayerLogQuery::Rushing => &["rushing_stats", "season", "week", "opponent_team"],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSearchRow {
    pub id: String,
    pub display_name: Option<String>,
    pub name: Option<String>,
}

pub type ArcPlayerRepository = Arc<Box<dyn PlayerRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PlayerRepository {
    async fn player_exists(&self, id: &PlayerId) -> ServiceResult<bool>;
    async fn get_player_info(&self, id: &PlayerId) -> ServiceResult<Option<Value>>;
    async fn get_game_logs(
        &self,
        id: &PlayerId,
        query: PlayerLogQuery,
        filter: &GameLogFilter,
    ) -> ServiceResult<Vec<JsonRow>>;
    /// Maps player id to the `position` field of its basic info. Unknown ids are absent.
    async fn get_positions(&self, ids: &[String]) -> ServiceResult<HashMap<String, String>>;
    async fn get_roster(&self, team: &str) -> ServiceResult<Vec<RosterEntry>>;
    /// Ids among `ids` owning at least one game-log row matching `filter`.
    /// Players without a game-log table are left out.
    async fn players_with_game_logs(
        &self,
        ids: &[PlayerId],
        filter: &GameLogFilter,
    ) -> ServiceResult<HashSet<String>>;
    /// Case-insensitive substring match on display name or name, exact matches first,
    /// then prefix matches.
    async fn search_players(&self, term: &str, limit: i64) -> ServiceResult<Vec<PlayerSearchRow>>;
    async fn sample_rows(&self, limit: i64) -> ServiceResult<Vec<Value>>;
}

pub type ArcPlayerStatsService = Arc<Box<dyn PlayerStatsService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PlayerStatsService {
    async fn resolve_player_id(&self, raw: Option<&str>) -> ServiceResult<PlayerId>;
    async fn get_stats(
        &self,
        stats_type: PlayerStatsType,
        query: &StatsQuery,
    ) -> ServiceResult<StatsResponse>;
}

pub struct PlayerStatsServiceImpl {
    player_repository: ArcPlayerRepository,
}

impl PlayerStatsServiceImpl {
    pub fn new(player_repository: ArcPlayerRepository) -> Self {
        Self { player_repository }
    }
}

#[async_trait::async_trait]
impl PlayerStatsService for PlayerStatsServiceImpl {
    async fn resolve_player_id(&self, raw: Option<&str>) -> ServiceResult<PlayerId> {
        let Some(raw) = raw.filter(|r| !r.is_empty()) else {
            return ServiceError::bad_request("No player ID provided");
        };
        let Some(id) = PlayerId::parse(raw) else {
            return ServiceError::bad_request("Invalid player ID");
        };
        match self.player_repository.player_exists(&id).await {
            Ok(true) => Ok(id),
            Ok(false) => ServiceError::bad_request("Invalid player ID"),
            Err(e) => {
                error!("Failed to check existence of player {}: {}", id, e);
                ServiceError::bad_request("Invalid player ID")
            }
        }
    }

    async fn get_stats(
        &self,
        stats_type: PlayerStatsType,
        query: &StatsQuery,
    ) -> ServiceResult<StatsResponse> {
        let id = self.resolve_player_id(query.id.as_deref()).await?;
        let filter = query.filter()?;

        let log_query = match stats_type {
            PlayerStatsType::Info => {
                return match self.player_repository.get_player_info(&id).await? {
                    Some(info) => Ok(StatsResponse::Found(info)),
                    None => ServiceError::not_found("Player not found"),
                };
            }
            PlayerStatsType::Extra => PlayerLogQuery::Extra,
            PlayerStatsType::Passing => PlayerLogQuery::Passing,
            PlayerStatsType::Receiving => PlayerLogQuery::Receiving,
            PlayerStatsType::Rushing => PlayerLogQuery::Rushing,
        };

        let rows = self
            .player_repository
            .get_game_logs(&id, log_query, &filter)
            .await?;

        match log_query {
            PlayerLogQuery::Extra => respond_rows(
                rows,
                "No extra data found for the specified criteria.",
                column("extra_data"),
            ),
            PlayerLogQuery::Passing => respond_non_null(
                rows,
                "passing_stats",
                "No passing stats found for the specified criteria.",
                "All player passing stats found for specified criteria were null.",
                column("passing_stats"),
            ),
            PlayerLogQuery::Receiving => respond_rows(
                rows,
                "No receiving stats found for the specified criteria.",
                whole_rows,
            ),
            PlayerLogQuery::Rushing => respond_non_null(
                rows,
                "rushing_stats",
                "No rushing stats found for the specified criteria.",
                "All player rushing stats found for specified criteria were null.",
                column("rushing_stats"),
            ),
        }
    }
}
