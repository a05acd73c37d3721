use axum::{
    Json,
    extract::State,
};
use playbook_domain::{
    app::AppState,
    search::{PlayerSearchResult, TeamSearchResult},
};

use crate::{ApiError, ApiQuery};

#[derive(serde::Deserialize)]
pub struct PlayerSearchParams {
    name: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct TeamSearchParams {
    query: Option<String>,
}

pub async fn search_players(
    State(app): State<AppState>,
    ApiQuery(params): ApiQuery<PlayerSearchParams>,
) -> Result<Json<Vec<PlayerSearchResult>>, ApiError> {
    let results = app
        .search_service
        .search_players(params.name.as_deref())
        .await?;
    Ok(Json(results))
}

pub async fn search_teams(
    State(app): State<AppState>,
    ApiQuery(params): ApiQuery<TeamSearchParams>,
) -> Result<Json<Vec<TeamSearchResult>>, ApiError> {
    let results = app
        .search_service
        .search_teams(params.query.as_deref())
        .await?;
    Ok(Json(results))
}
