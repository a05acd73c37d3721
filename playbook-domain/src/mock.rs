//! In-memory repositories backing the service tests and the HTTP tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use playbook_core::{GameLogFilter, JsonRow, PlayerId, TeamCode, into_rows};
use serde_json::{Value, json};

use crate::{
    ServiceError, ServiceResult,
    player::{PlayerLogQuery, PlayerRepository, PlayerSearchRow, RosterEntry},
    team::{TeamLogQuery, TeamRepository, TeamSearchRow},
};

fn matches_filter(row: &JsonRow, filter: &GameLogFilter) -> bool {
    let int = |key: &str| row.get(key).and_then(Value::as_i64);
    filter.season.is_none_or(|s| int("season") == Some(s as i64))
        && filter.week.is_none_or(|w| int("week") == Some(w as i64))
        && filter.opponent.is_none_or(|o| {
            row.get("opponent_team").and_then(Value::as_str) == Some(o.as_str())
        })
}

fn project(row: &JsonRow, columns: &[&str]) -> JsonRow {
    columns
        .iter()
        .map(|c| (c.to_string(), row.get(*c).cloned().unwrap_or(Value::Null)))
        .collect()
}

fn select(
    logs: &HashMap<String, Vec<JsonRow>>,
    owner: &str,
    columns: &[&str],
    filter: &GameLogFilter,
) -> ServiceResult<Vec<JsonRow>> {
    let rows = logs
        .get(owner)
        .ok_or_else(|| ServiceError::missing_game_logs(owner))?;
    Ok(rows
        .iter()
        .filter(|row| matches_filter(row, filter))
        .map(|row| project(row, columns))
        .collect())
}

fn rank(candidate: &str, term: &str) -> Option<u8> {
    let candidate = candidate.to_lowercase();
    if candidate == term {
        Some(0)
    } else if candidate.starts_with(term) {
        Some(1)
    } else if candidate.contains(term) {
        Some(2)
    } else {
        None
    }
}

#[derive(Clone, Default)]
pub struct MockPlayerRepository {
    players: Vec<(String, Value)>,
    game_logs: HashMap<String, Vec<JsonRow>>,
    failing: Arc<AtomicBool>,
}

impl MockPlayerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_player(mut self, id: &str, info: Value) -> Self {
        self.players.push((id.to_string(), info));
        self
    }

    pub fn with_game_logs(mut self, id: &str, rows: Vec<Value>) -> Self {
        self.game_logs.insert(id.to_string(), into_rows(rows));
        self
    }

    /// Every later query fails as if the database went away.
    pub fn fail_queries(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> ServiceResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return ServiceError::internal("connection refused");
        }
        Ok(())
    }

    fn info(&self, id: &str) -> Option<&Value> {
        self.players
            .iter()
            .find(|(player_id, _)| player_id == id)
            .map(|(_, info)| info)
    }
}

#[async_trait::async_trait]
impl PlayerRepository for MockPlayerRepository {
    async fn player_exists(&self, id: &PlayerId) -> ServiceResult<bool> {
        self.check()?;
        Ok(self.info(id.as_str()).is_some())
    }

    async fn get_player_info(&self, id: &PlayerId) -> ServiceResult<Option<Value>> {
        self.check()?;
        Ok(self.info(id.as_str()).cloned())
    }

    async fn get_game_logs(
        &self,
        id: &PlayerId,
        query: PlayerLogQuery,
        filter: &GameLogFilter,
    ) -> ServiceResult<Vec<JsonRow>> {
        self.check()?;
        select(&self.game_logs, id.as_str(), query.columns(), filter)
    }

    async fn get_positions(&self, ids: &[String]) -> ServiceResult<HashMap<String, String>> {
        self.check()?;
        Ok(ids
            .iter()
            .filter_map(|id| {
                let position = self.info(id)?.get("position")?.as_str()?;
                Some((id.clone(), position.to_string()))
            })
            .collect())
    }

    async fn get_roster(&self, team: &str) -> ServiceResult<Vec<RosterEntry>> {
        self.check()?;
        Ok(self
            .players
            .iter()
            .filter(|(_, info)| info.get("team").and_then(Value::as_str) == Some(team))
            .map(|(id, info)| RosterEntry {
                id: id.clone(),
                name: info.get("name").and_then(Value::as_str).map(String::from),
            })
            .collect())
    }

    async fn players_with_game_logs(
        &self,
        ids: &[PlayerId],
        filter: &GameLogFilter,
    ) -> ServiceResult<HashSet<String>> {
        self.check()?;
        Ok(ids
            .iter()
            .filter(|id| {
                self.game_logs
                    .get(id.as_str())
                    .is_some_and(|rows| rows.iter().any(|row| matches_filter(row, filter)))
            })
            .map(|id| id.to_string())
            .collect())
    }

    async fn search_players(&self, term: &str, limit: i64) -> ServiceResult<Vec<PlayerSearchRow>> {
        self.check()?;
        let term = term.to_lowercase();
        let mut ranked: Vec<(u8, PlayerSearchRow)> = self
            .players
            .iter()
            .filter_map(|(id, info)| {
                let field = |key: &str| info.get(key).and_then(Value::as_str).map(String::from);
                let display_name = field("display_name");
                let name = field("name");
                let best = [&display_name, &name]
                    .into_iter()
                    .flatten()
                    .filter_map(|candidate| rank(candidate, &term))
                    .min()?;
                Some((
                    best,
                    PlayerSearchRow {
                        id: id.clone(),
                        display_name,
                        name,
                    },
                ))
            })
            .collect();
        ranked.sort_by_key(|(rank, _)| *rank);
        Ok(ranked
            .into_iter()
            .take(limit as usize)
            .map(|(_, row)| row)
            .collect())
    }

    async fn sample_rows(&self, limit: i64) -> ServiceResult<Vec<Value>> {
        self.check()?;
        Ok(self
            .players
            .iter()
            .take(limit as usize)
            .map(|(id, info)| json!({"id": id, "info": info}))
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct MockTeamRepository {
    teams: Vec<(String, Value)>,
    search_rows: Vec<TeamSearchRow>,
    game_logs: HashMap<String, Vec<JsonRow>>,
}

impl MockTeamRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_team(mut self, abbr: &str, team_data: Value) -> Self {
        self.teams.push((abbr.to_string(), team_data));
        self
    }

    pub fn with_search_row(mut self, abbr: &str, name: Option<&str>, nick: Option<&str>) -> Self {
        self.search_rows.push(TeamSearchRow {
            abbr: abbr.to_string(),
            name: name.map(String::from),
            nick: nick.map(String::from),
        });
        self
    }

    pub fn with_game_logs(mut self, abbr: &str, rows: Vec<Value>) -> Self {
        self.game_logs.insert(abbr.to_string(), into_rows(rows));
        self
    }
}

#[async_trait::async_trait]
impl TeamRepository for MockTeamRepository {
    async fn get_team_info(&self, team: TeamCode) -> ServiceResult<Option<Value>> {
        Ok(self
            .teams
            .iter()
            .find(|(abbr, _)| abbr == team.as_str())
            .map(|(_, data)| data.clone()))
    }

    async fn get_game_logs(
        &self,
        team: TeamCode,
        query: TeamLogQuery,
        filter: &GameLogFilter,
    ) -> ServiceResult<Vec<JsonRow>> {
        select(&self.game_logs, team.as_str(), query.columns(), filter)
    }

    async fn search_teams(&self, term: &str, limit: i64) -> ServiceResult<Vec<TeamSearchRow>> {
        let term = term.to_lowercase();
        Ok(self
            .search_rows
            .iter()
            .filter(|row| {
                [Some(&row.abbr), row.name.as_ref(), row.nick.as_ref()]
                    .into_iter()
                    .flatten()
                    .any(|candidate| candidate.to_lowercase().contains(&term))
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn sample_rows(&self, limit: i64) -> ServiceResult<Vec<Value>> {
        Ok(self
            .teams
            .iter()
            .take(limit as usize)
            .map(|(abbr, data)| json!({"team_abbr": abbr, "team_data": data}))
            .collect())
    }
}

/// A small league: a retired quarterback with passing logs, a Kansas City roster, and a few
/// receivers with known positions.
pub fn sample_player_repository() -> MockPlayerRepository {
    MockPlayerRepository::new()
        .with_player(
            "00-0019596",
            json!({"name": "Tom Brady", "display_name": "Tom Brady", "position": "QB", "team": "TB"}),
        )
        .with_player(
            "00-0019597",
            json!({"name": "Tom Brady Jr.", "display_name": "Tom Brady Jr.", "position": "QB", "team": "TB"}),
        )
        .with_player(
            "00-0033873",
            json!({"name": "Patrick Mahomes", "display_name": "Patrick Mahomes", "position": "QB", "team": "KC"}),
        )
        .with_player(
            "00-0030506",
            json!({"name": "Travis Kelce", "position": "te", "team": "KC"}),
        )
        .with_player("00-0036212", json!({"position": "RB", "team": "KC"}))
        .with_player(
            "00-0035640",
            json!({"name": "Tyreek Hill", "display_name": "Tyreek Hill", "position": "WR", "team": "MIA"}),
        )
        .with_game_logs(
            "00-0019596",
            vec![
                json!({
                    "season": 2022, "week": 1, "opponent_team": "DAL",
                    "passing_stats": {"completions": 25, "attempts": 35, "passing_yards": 301},
                    "rushing_stats": {"carries": 2, "rushing_yards": -1},
                    "receiving_stats": null,
                    "extra_data": {"snaps": 68},
                }),
                json!({
                    "season": 2022, "week": 2, "opponent_team": "NO",
                    "passing_stats": null,
                    "rushing_stats": null,
                    "receiving_stats": null,
                    "extra_data": {"snaps": 64},
                }),
                json!({
                    "season": 2022, "week": 3, "opponent_team": "GB",
                    "passing_stats": {"completions": 18, "attempts": 30, "passing_yards": 212},
                    "rushing_stats": {"carries": 1, "rushing_yards": 3},
                    "receiving_stats": null,
                    "extra_data": {"snaps": 61},
                }),
            ],
        )
        .with_game_logs(
            "00-0030506",
            vec![json!({
                "season": 2023, "week": 1, "opponent_team": "BAL",
                "receiving_stats": {"receptions": 7, "receiving_yards": 80.5},
            })],
        )
        .with_game_logs(
            "00-0036212",
            vec![json!({
                "season": 2023, "week": 3, "opponent_team": "CHI",
                "rushing_stats": {"carries": 14, "rushing_yards": 61},
            })],
        )
}

pub fn sample_team_repository() -> MockTeamRepository {
    MockTeamRepository::new()
        .with_team(
            "KC",
            json!({"team_name": "Kansas City Chiefs", "team_nick": "Chiefs", "team_city": "Kansas City"}),
        )
        .with_team("BUF", Value::Null)
        .with_team(
            "TB",
            json!({"team_name": "Tampa Bay Buccaneers", "team_nick": "Buccaneers"}),
        )
        .with_search_row("KC", Some("Kansas City Chiefs"), Some("Chiefs"))
        .with_search_row("BUF", None, Some("Bills"))
        .with_search_row("TB", Some("Tampa Bay Buccaneers"), Some("Buccaneers"))
        .with_game_logs(
            "KC",
            vec![
                json!({
                    "season": 2023, "week": 1, "season_type": "REG", "opponent_team": "BAL",
                    "game_result": {"team_score": 27, "opponent_score": 20},
                    "defensive_stats": {"sacks": 3, "interceptions": 1},
                    "offensive_stats": {"completions": "24", "attempts": "33", "passing_yards": "262"},
                    "aggregated_passing_stats": {"completions": "24", "attempts": "33", "passing_yards": "262", "passing_tds": "2"},
                    "player_passing_stats": [{"player_id": "00-0033873", "passing_yards": 262}],
                    "aggregated_rushing_stats": {"carries": "21", "rushing_yards": "88", "rushing_tds": "1"},
                    "player_rushing_stats": [{"player_id": "00-0036212", "rushing_yards": 44}],
                    "player_recieving_stats": [
                        {"player_id": "00-0035640", "receiving_yards": 95},
                        {"player_id": "00-0030506", "receiving_yards": "80.5"},
                        {"player_id": "00-0036212", "receiving_yards": 12},
                        {"player_id": "00-0099999", "receiving_yards": 30},
                    ],
                    "special_teams": {"field_goals_made": 2},
                }),
                json!({
                    "season": 2023, "week": 2, "season_type": "REG", "opponent_team": "BUF",
                    "game_result": "BYE",
                    "defensive_stats": null,
                    "offensive_stats": null,
                    "player_recieving_stats": null,
                    "special_teams": null,
                }),
                json!({
                    "season": 2023, "week": 3, "season_type": "REG", "opponent_team": "CHI",
                    "game_result": "{\"team_score\": 10, \"opponent_score\": 17}",
                    "defensive_stats": {"sacks": 2, "interceptions": 0},
                    "offensive_stats": null,
                    "player_recieving_stats": [],
                    "special_teams": {"field_goals_made": 1},
                }),
                json!({
                    "season": 2023, "week": 4, "season_type": "REG", "opponent_team": "NYJ",
                    "game_result": "[object Object]",
                    "defensive_stats": null,
                    "offensive_stats": {"completions": "30"},
                    "player_recieving_stats": [],
                    "special_teams": null,
                }),
            ],
        )
}
