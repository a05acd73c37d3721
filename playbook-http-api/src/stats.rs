use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use log::debug;
use playbook_domain::{
    app::AppState,
    stats::{PlayerStatsType, StatsQuery, StatsResponse, StatsTarget, TeamStatsType},
    summary::SummaryResponse,
};

use crate::{ApiError, ApiQuery};

pub(crate) const ENTITY_TYPE_HEADER: &str = "x-entity-type";

pub(crate) const STATS_TYPE_HEADER: &str = "x-stats-type";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn target_from_headers(headers: &HeaderMap) -> Result<StatsTarget, ApiError> {
    Ok(StatsTarget::from_headers(
        header(headers, ENTITY_TYPE_HEADER),
        header(headers, STATS_TYPE_HEADER),
    )?)
}

fn all_null(msg: String) -> Response {
    (
        StatusCode::NO_CONTENT,
        Json(serde_json::json!({ "error": msg })),
    )
        .into_response()
}

async fn fetch(
    app: &AppState,
    target: StatsTarget,
    query: &StatsQuery,
) -> Result<Response, ApiError> {
    match app.dispatch_service.fetch(target, query).await? {
        StatsResponse::Found(body) => Ok(Json(body).into_response()),
        StatsResponse::AllNull(msg) => Ok(all_null(msg)),
    }
}

pub async fn dispatch(
    State(app): State<AppState>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<StatsQuery>,
) -> Result<Response, ApiError> {
    let target = target_from_headers(&headers)?;
    fetch(&app, target, &query).await
}

pub async fn summary(
    State(app): State<AppState>,
    headers: HeaderMap,
    ApiQuery(query): ApiQuery<StatsQuery>,
) -> Result<Response, ApiError> {
    let target = target_from_headers(&headers)?;
    match app.summary_service.summarize(target, &query).await? {
        SummaryResponse::Found(summary) => Ok(Json(summary).into_response()),
        SummaryResponse::AllNull(msg) => Ok(all_null(msg)),
    }
}

const DEPRECATED_ROUTES: [(&str, StatsTarget); 15] = [
    ("/player-info", StatsTarget::Player(PlayerStatsType::Info)),
    ("/player-extra-data", StatsTarget::Player(PlayerStatsType::Extra)),
    ("/player-passing-stats", StatsTarget::Player(PlayerStatsType::Passing)),
    ("/player-receiving-stats", StatsTarget::Player(PlayerStatsType::Receiving)),
    ("/player-rushing-stats", StatsTarget::Player(PlayerStatsType::Rushing)),
    ("/game-results", StatsTarget::Team(TeamStatsType::Results)),
    ("/team-info", StatsTarget::Team(TeamStatsType::Info)),
    ("/team-defensive-stats", StatsTarget::Team(TeamStatsType::Defensive)),
    ("/team-offensive-stats", StatsTarget::Team(TeamStatsType::Offensive)),
    ("/team-passing-stats", StatsTarget::Team(TeamStatsType::Passing)),
    ("/team-rushing-stats", StatsTarget::Team(TeamStatsType::Rushing)),
    ("/team-receiving-stats", StatsTarget::Team(TeamStatsType::Receiving)),
    ("/team-record", StatsTarget::Team(TeamStatsType::Record)),
    ("/team-roster", StatsTarget::Team(TeamStatsType::Roster)),
    ("/team-special-teams-stats", StatsTarget::Team(TeamStatsType::Special)),
];

/// Path-style aliases of the header dispatch, kept for older clients.
pub(crate) fn deprecated_routes() -> Router<AppState> {
    DEPRECATED_ROUTES
        .into_iter()
        .fold(Router::new(), |router, (path, target)| {
            router.route(
                path,
                get(
                    move |State(app): State<AppState>,
                          ApiQuery(query): ApiQuery<StatsQuery>| async move {
                        debug!("Deprecated route {} hit, prefer header dispatch on /", path);
                        fetch(&app, target, &query).await
                    },
                ),
            )
        })
}
