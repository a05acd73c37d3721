use std::{sync::Arc, time::Duration};

use log::{error, info, warn};
use playbook_domain::{app::construct_app, player::ArcPlayerRepository, team::ArcTeamRepository};
use playbook_http_api::{InFlightRequests, ServerConfig};
use playbook_persistence_postgres::{
    DatabaseConfig, PostgresPlayerRepository, PostgresTeamRepository,
};
use tokio_util::sync::CancellationToken;

mod logs;

const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}

#[tokio::main]
async fn main() {
    // A missing .env is fine, the environment may already be populated.
    let dotenv = dotenvy::dotenv();

    logs::init_logger();

    if let Err(e) = dotenv {
        info!("No .env file loaded: {}", e);
    }

    let db_config = DatabaseConfig::from_env().expect("Invalid database configuration");
    let team_pool = db_config.create_team_db_pool();
    let player_pool = db_config.create_player_db_pool();

    let player_repository: ArcPlayerRepository = Arc::new(Box::new(
        PostgresPlayerRepository::new(player_pool.clone()),
    ));
    let team_repository: ArcTeamRepository =
        Arc::new(Box::new(PostgresTeamRepository::new(team_pool.clone())));

    let app = construct_app(player_repository, team_repository);

    let grace = Duration::from_secs(
        std::env::var("SHUTDOWN_GRACE_SECS")
            .map(|v| v.parse().expect("SHUTDOWN_GRACE_SECS must be a valid u64"))
            .unwrap_or(DEFAULT_SHUTDOWN_GRACE_SECS),
    );

    let in_flight = InFlightRequests::new();
    let shutdown = CancellationToken::new();
    let mut server = tokio::spawn(playbook_http_api::run(
        app,
        ServerConfig::from_env(),
        in_flight.clone(),
        shutdown.clone().cancelled_owned(),
    ));

    let server_exited = tokio::select! {
        _ = shutdown_signal() => false,
        result = &mut server => {
            if let Err(e) = result {
                error!("API server task failed: {}", e);
            }
            true
        }
    };

    if !server_exited {
        shutdown.cancel();
        info!(
            "Waiting up to {:?} for {} in-flight requests",
            grace,
            in_flight.count()
        );
        if tokio::time::timeout(grace, &mut server).await.is_err() {
            warn!(
                "{} requests still in flight after {:?}, forcing shutdown",
                in_flight.count(),
                grace
            );
            server.abort();
        }
    }

    team_pool.close().await;
    player_pool.close().await;
    info!("Database connections closed");
}
