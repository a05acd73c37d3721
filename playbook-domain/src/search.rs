use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::{ServiceError, ServiceResult, player::ArcPlayerRepository, team::ArcTeamRepository};

const MIN_TERM_LEN: usize = 2;

const PLAYER_SEARCH_LIMIT: i64 = 20;

const TEAM_SEARCH_LIMIT: i64 = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSearchResult {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSearchResult {
    pub code: String,
    pub name: String,
}

pub type ArcSearchService = Arc<Box<dyn SearchService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait SearchService {
    async fn search_players(&self, name: Option<&str>) -> ServiceResult<Vec<PlayerSearchResult>>;
    async fn search_teams(&self, query: Option<&str>) -> ServiceResult<Vec<TeamSearchResult>>;
}

pub struct SearchServiceImpl {
    player_repository: ArcPlayerRepository,
    team_repository: ArcTeamRepository,
}

impl SearchServiceImpl {
    pub fn new(player_repository: ArcPlayerRepository, team_repository: ArcTeamRepository) -> Self {
        Self {
            player_repository,
            team_repository,
        }
    }
}

fn search_term(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|term| term.chars().count() >= MIN_TERM_LEN)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[async_trait::async_trait]
impl SearchService for SearchServiceImpl {
    async fn search_players(&self, name: Option<&str>) -> ServiceResult<Vec<PlayerSearchResult>> {
        let Some(term) = search_term(name) else {
            return ServiceError::bad_request("Search term must be at least 2 characters long.");
        };
        let rows = self
            .player_repository
            .search_players(term, PLAYER_SEARCH_LIMIT)
            .await?;
        if rows.is_empty() {
            info!("No players found matching term: {}", term);
        }
        Ok(rows
            .into_iter()
            .map(|row| PlayerSearchResult {
                name: non_empty(row.display_name)
                    .or(non_empty(row.name))
                    .unwrap_or_else(|| "Unknown Name".to_string()),
                id: row.id,
            })
            .collect())
    }

    async fn search_teams(&self, query: Option<&str>) -> ServiceResult<Vec<TeamSearchResult>> {
        let Some(term) = search_term(query) else {
            return ServiceError::bad_request("Search query must be at least 2 characters long.");
        };
        let rows = self
            .team_repository
            .search_teams(term, TEAM_SEARCH_LIMIT)
            .await?;
        if rows.is_empty() {
            info!("No teams found matching query: {}", term);
        }
        Ok(rows
            .into_iter()
            .map(|row| {
                let abbr = non_empty(Some(row.abbr.clone()));
                TeamSearchResult {
                    name: non_empty(row.name)
                        .or(non_empty(row.nick))
                        .or(abbr)
                        .unwrap_or_else(|| "Unknown Team".to_string()),
                    code: row.abbr,
                }
            })
            .collect())
    }
}
