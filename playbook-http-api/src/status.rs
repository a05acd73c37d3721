use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use log::error;
use playbook_domain::app::AppState;
use serde_json::{Value, json};

use crate::error_response;

const STATUS_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>API Status</title>
    <style>
        body {
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
            margin: 0;
            font-family: Arial, sans-serif;
            background: linear-gradient(135deg, #667eea, #764ba2);
            color: white;
        }
        .container { text-align: center; }
        h1 { font-size: 3rem; margin-bottom: 1rem; }
        p { font-size: 1.2rem; }
    </style>
</head>
<body>
    <div class="container">
        <h1>API IS UP</h1>
        <p>Playbook Insights is running smoothly</p>
    </div>
</body>
</html>
"#;

pub async fn status() -> Html<&'static str> {
    Html(STATUS_PAGE)
}

pub async fn routes() -> Json<Value> {
    Json(json!({
        "routes": [
            { "route": "/status", "methods": ["GET"] },
            { "route": "/routes", "methods": ["GET"] },
            { "route": "/players", "methods": ["GET", "POST", "PUT", "DELETE"] },
            { "route": "/teams", "methods": ["GET", "POST", "PUT", "DELETE"] },
            { "route": "/defense/performance", "methods": ["GET"] },
            { "route": "/games", "methods": ["GET", "POST"] },
            { "route": "/rosters", "methods": ["GET", "POST", "PUT", "DELETE"] },
        ]
    }))
}

pub async fn test_db(State(app): State<AppState>) -> Response {
    match app.health_service.sample().await {
        Ok(sample) => Json(json!({
            "message": "Database connections verified.",
            "players": sample.players,
            "teams": sample.teams,
        }))
        .into_response(),
        Err(e) => {
            error!("Database query error: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Database query failed")
        }
    }
}

pub async fn test_cors() -> Json<Value> {
    Json(json!({ "message": "CORS is working" }))
}
