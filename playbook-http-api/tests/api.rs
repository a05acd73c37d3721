use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use playbook_domain::{
    app::construct_app,
    mock::{MockPlayerRepository, sample_player_repository, sample_team_repository},
};
use playbook_http_api::{InFlightRequests, RateLimiter, build_router};
use serde_json::{Value, json};
use tower::util::ServiceExt;

fn router_with(players: MockPlayerRepository, rate_limit: u32) -> Router {
    let app = construct_app(
        Arc::new(Box::new(players)),
        Arc::new(Box::new(sample_team_repository())),
    );
    build_router(app, RateLimiter::new(rate_limit), InFlightRequests::new())
}

fn router() -> Router {
    router_with(sample_player_repository(), 100)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(router, request).await;
    (status, serde_json::from_str(&body).unwrap_or(Value::Null))
}

async fn dispatch(uri: &str, entity: &str, stats: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .header("x-entity-type", entity)
        .header("x-stats-type", stats)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router(), request).await;
    (status, serde_json::from_str(&body).unwrap_or(Value::Null))
}

#[tokio::test]
async fn status_page_is_up() {
    for uri in ["/status", "/status/"] {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send(router(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<h1>API IS UP</h1>"));
    }
}

#[tokio::test]
async fn routes_lists_fixed_routes() {
    let (status, body) = get_json(router(), "/routes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "routes": [
                { "route": "/status", "methods": ["GET"] },
                { "route": "/routes", "methods": ["GET"] },
                { "route": "/players", "methods": ["GET", "POST", "PUT", "DELETE"] },
                { "route": "/teams", "methods": ["GET", "POST", "PUT", "DELETE"] },
                { "route": "/defense/performance", "methods": ["GET"] },
                { "route": "/games", "methods": ["GET", "POST"] },
                { "route": "/rosters", "methods": ["GET", "POST", "PUT", "DELETE"] },
            ]
        })
    );
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let request = Request::builder()
        .uri("/test-cors")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "message": "CORS is working" }));
}

#[tokio::test]
async fn dispatch_rejects_unknown_player() {
    let (status, body) = dispatch("/?id=00-0000001", "player", "passing").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid player ID" }));
}

#[tokio::test]
async fn dispatch_requires_headers() {
    let (status, body) = get_json(router(), "/?id=00-0019596").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Missing required header: x-entity-type" })
    );

    let (status, body) = dispatch("/?team=KC", "Team", "kicking").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Invalid stats type for team." }));
}

#[tokio::test]
async fn dispatch_player_passing() {
    let (status, body) = dispatch("/?id=0019596&season=2022", "PLAYER", "Passing").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
    assert_eq!(body[0]["passing_yards"], json!(301));
}

#[tokio::test]
async fn dispatch_all_null_is_no_content() {
    let (status, _) = dispatch("/?id=00-0019596&week=2", "player", "rushing").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn dispatch_rejects_bad_season() {
    let (status, body) = dispatch("/?team=KC&season=1900", "team", "record").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Invalid season. Must be a four-digit year from 1920 onward." })
    );
}

#[tokio::test]
async fn malformed_query_string_is_json_error() {
    let (status, body) = dispatch("/?team=KC&season=2022&season=2023", "team", "record").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let msg = body["error"].as_str().unwrap_or_default();
    assert!(msg.starts_with("Failed to deserialize query string"), "{}", msg);
    assert!(msg.contains("season"), "{}", msg);

    let (status, body) = dispatch("/stats?id=1&id=2", "player", "passing").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    for uri in [
        "/team-record?team=KC&team=BUF",
        "/search?name=Tom&name=Brady",
        "/search-team?query=chiefs&query=bills",
    ] {
        let (status, body) = get_json(router(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }
}

#[tokio::test]
async fn missing_team_logs_name_the_team() {
    let (status, body) = dispatch("/?team=ne", "team", "defensive").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "error": "Game logs not found for 'NE'. Ensure data is ingested." })
    );
}

#[tokio::test]
async fn stats_summarizes_columns() {
    let (status, body) = dispatch("/stats?id=00-0019596", "player", "passing").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["passing_yards"]["median"], json!(256.5));
    assert_eq!(body["attempts"]["mode"], json!(30.0));
}

#[tokio::test]
async fn search_endpoints() {
    let (status, body) = get_json(router(), "/search?name=Tom%20Brady").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0], json!({ "id": "00-0019596", "name": "Tom Brady" }));

    let (status, body) = get_json(router(), "/search?name=T").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Search term must be at least 2 characters long." })
    );

    let (status, body) = get_json(router(), "/search-team?query=chiefs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "code": "KC", "name": "Kansas City Chiefs" }]));
}

#[tokio::test]
async fn deprecated_alias_matches_dispatch() {
    let (status, body) = get_json(router(), "/team-record?team=kc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "wins": 1, "losses": 1, "ties": 0, "gamesCounted": 2 })
    );

    let (status, body) = get_json(router(), "/player-info").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No player ID provided" }));
}

#[tokio::test]
async fn test_db_reports_samples() {
    let (status, body) = get_json(router(), "/test-db").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Database connections verified."));
    assert_eq!(body["players"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["teams"].as_array().map(Vec::len), Some(3));

    let players = sample_player_repository();
    players.fail_queries();
    let (status, body) = get_json(router_with(players, 100), "/test-db").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Database query failed" }));
}

#[tokio::test]
async fn infrastructure_errors_are_generic() {
    let players = sample_player_repository();
    players.fail_queries();
    let (status, body) = get_json(router_with(players, 100), "/search?name=Tom").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
}

#[tokio::test]
async fn rate_limit_rejects_excess_requests() {
    let router = router_with(sample_player_repository(), 2);
    for _ in 0..2 {
        let (status, _) = get_json(router.clone(), "/test-cors").await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = get_json(router, "/test-cors").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body,
        json!({ "error": "Too many requests, please try again later." })
    );
}

#[tokio::test]
async fn in_flight_counter_settles() {
    let in_flight = InFlightRequests::new();
    let app = construct_app(
        Arc::new(Box::new(sample_player_repository())),
        Arc::new(Box::new(sample_team_repository())),
    );
    let router = build_router(app, RateLimiter::new(100), in_flight.clone());
    let (status, _) = get_json(router, "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(in_flight.count(), 0);
}
