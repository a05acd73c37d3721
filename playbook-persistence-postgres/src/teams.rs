use log::debug;
use playbook_core::{GameLogFilter, JsonRow, TeamCode, into_rows};
use playbook_domain::{
    ServiceResult,
    team::{TeamLogQuery, TeamRepository, TeamSearchRow},
};
use serde_json::Value;
use sqlx::PgPool;

use crate::{
    game_log_error, query_error,
    sql::{bind_filter, escape_like, game_log_query},
};

pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn get_team_info(&self, team: TeamCode) -> ServiceResult<Option<Value>> {
        let data: Option<Option<Value>> =
            sqlx::query_scalar("SELECT team_data FROM team_info WHERE team_abbr = $1")
                .bind(team.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(query_error)?;
        Ok(data.map(|data| data.unwrap_or(Value::Null)))
    }

    async fn get_game_logs(
        &self,
        team: TeamCode,
        query: TeamLogQuery,
        filter: &GameLogFilter,
    ) -> ServiceResult<Vec<JsonRow>> {
        let (sql, values) = game_log_query(team.as_str(), query.columns(), filter);
        debug!("Team game log query: {} {:?}", sql, values);
        let rows: Vec<Value> = bind_filter(sqlx::query_scalar(&sql), values)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| game_log_error(e, team.as_str()))?;
        Ok(into_rows(rows))
    }

    async fn search_teams(&self, term: &str, limit: i64) -> ServiceResult<Vec<TeamSearchRow>> {
        let rows: Vec<(String, Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT team_abbr, team_data->>'team_name' AS team_name, team_data->>'team_nick' AS team_nick \
             FROM team_info \
             WHERE team_data->>'team_name' ILIKE $1 \
                OR team_data->>'team_nick' ILIKE $1 \
                OR team_data->>'team_city' ILIKE $1 \
                OR team_data->>'team_abbr' ILIKE $1 \
             ORDER BY team_abbr \
             LIMIT $2",
        )
        .bind(format!("%{}%", escape_like(term)))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;
        Ok(rows
            .into_iter()
            .map(|(abbr, name, nick)| TeamSearchRow { abbr, name, nick })
            .collect())
    }

    async fn sample_rows(&self, limit: i64) -> ServiceResult<Vec<Value>> {
        sqlx::query_scalar("SELECT row_to_json(t) FROM (SELECT * FROM team_info LIMIT $1) t")
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)
    }
}
