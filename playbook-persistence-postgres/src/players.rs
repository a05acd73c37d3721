use std::collections::{HashMap, HashSet};

use log::debug;
use playbook_core::{GameLogFilter, JsonRow, PlayerId, into_rows};
use playbook_domain::{
    ServiceResult,
    player::{PlayerLogQuery, PlayerRepository, PlayerSearchRow, RosterEntry},
};
use serde_json::Value;
use sqlx::PgPool;

use crate::{
    game_log_error, query_error,
    sql::{bind_filter, escape_like, game_log_query, game_log_table_name, matching_players_query},
};

pub struct PostgresPlayerRepository {
    pool: PgPool,
}

impl PostgresPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Game-log tables that actually exist among the given players.
    async fn existing_log_tables(&self, ids: &[PlayerId]) -> ServiceResult<HashSet<String>> {
        let names: Vec<String> = ids.iter().map(|id| game_log_table_name(id.as_str())).collect();
        let found: Vec<String> = sqlx::query_scalar(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name::text = ANY($1)",
        )
        .bind(&names)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;
        Ok(found.into_iter().collect())
    }
}

#[async_trait::async_trait]
impl PlayerRepository for PostgresPlayerRepository {
    async fn player_exists(&self, id: &PlayerId) -> ServiceResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM player_basic_info WHERE id = $1)")
            .bind(id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)
    }

    async fn get_player_info(&self, id: &PlayerId) -> ServiceResult<Option<Value>> {
        let info: Option<Option<Value>> =
            sqlx::query_scalar("SELECT info FROM player_basic_info WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(query_error)?;
        Ok(info.map(|info| info.unwrap_or(Value::Null)))
    }

    async fn get_game_logs(
        &self,
        id: &PlayerId,
        query: PlayerLogQuery,
        filter: &GameLogFilter,
    ) -> ServiceResult<Vec<JsonRow>> {
        let (sql, values) = game_log_query(id.as_str(), query.columns(), filter);
        debug!("Player game log query: {} {:?}", sql, values);
        let rows: Vec<Value> = bind_filter(sqlx::query_scalar(&sql), values)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| game_log_error(e, id.as_str()))?;
        Ok(into_rows(rows))
    }

    async fn get_positions(&self, ids: &[String]) -> ServiceResult<HashMap<String, String>> {
        let rows: Vec<(String, Option<String>)> = sqlx::query_as(
            "SELECT id, info->>'position' AS position FROM player_basic_info WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;
        Ok(rows
            .into_iter()
            .filter_map(|(id, position)| {
                let position = position?.trim().to_string();
                (!position.is_empty()).then_some((id, position))
            })
            .collect())
    }

    async fn get_roster(&self, team: &str) -> ServiceResult<Vec<RosterEntry>> {
        let rows: Vec<(String, Option<String>)> = sqlx::query_as(
            "SELECT id, info->>'name' AS name FROM player_basic_info \
             WHERE info->>'team' = $1 ORDER BY id",
        )
        .bind(team)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| RosterEntry { id, name })
            .collect())
    }

    async fn players_with_game_logs(
        &self,
        ids: &[PlayerId],
        filter: &GameLogFilter,
    ) -> ServiceResult<HashSet<String>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let tables = self.existing_log_tables(ids).await?;
        let present: Vec<&PlayerId> = ids
            .iter()
            .filter(|id| tables.contains(&game_log_table_name(id.as_str())))
            .collect();
        if present.is_empty() {
            return Ok(HashSet::new());
        }

        let (sql, values) = matching_players_query(&present, filter);
        let matched: Vec<String> = bind_filter(sqlx::query_scalar(&sql), values)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(matched.into_iter().collect())
    }

    async fn search_players(&self, term: &str, limit: i64) -> ServiceResult<Vec<PlayerSearchRow>> {
        let escaped = escape_like(term);
        let rows: Vec<(String, Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT id, info->>'display_name' AS display_name, info->>'name' AS name \
             FROM player_basic_info \
             WHERE info->>'display_name' ILIKE $1 OR info->>'name' ILIKE $1 \
             ORDER BY CASE \
                 WHEN lower(info->>'display_name') = lower($2) OR lower(info->>'name') = lower($2) THEN 0 \
                 WHEN info->>'display_name' ILIKE $3 OR info->>'name' ILIKE $3 THEN 1 \
                 ELSE 2 \
             END, info->>'display_name' \
             LIMIT $4",
        )
        .bind(format!("%{}%", escaped))
        .bind(term)
        .bind(format!("{}%", escaped))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;
        Ok(rows
            .into_iter()
            .map(|(id, display_name, name)| PlayerSearchRow {
                id,
                display_name,
                name,
            })
            .collect())
    }

    async fn sample_rows(&self, limit: i64) -> ServiceResult<Vec<Value>> {
        sqlx::query_scalar("SELECT row_to_json(p) FROM (SELECT * FROM player_basic_info LIMIT $1) p")
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)
    }
}
