use playbook_domain::ServiceError;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use thiserror::Error;

mod players;
mod sql;
mod teams;

pub use players::PostgresPlayerRepository;
pub use teams::PostgresTeamRepository;

const DEFAULT_PORT: u16 = 5432;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} env var not set")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Connection settings shared by the team and player databases.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub team_database: String,
    pub player_database: String,
    pub require_ssl: bool,
    pub max_connections: u32,
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn parsed<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(key, raw)),
        Err(_) => Ok(default),
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: required("DB_SERVER_HOSTNAME")?,
            port: parsed("DB_SERVER_PORT", DEFAULT_PORT)?,
            username: required("DB_SERVER_USERNAME")?,
            password: required("DB_SERVER_PASSWORD")?,
            team_database: required("TEAM_DB_NAME")?,
            player_database: required("PLAYER_DB_NAME")?,
            require_ssl: std::env::var("DB_REQUIRE_SSL")
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            max_connections: parsed("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
        })
    }

    fn connect_options(&self, database: &str) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(database)
            .ssl_mode(if self.require_ssl {
                PgSslMode::Require
            } else {
                PgSslMode::Prefer
            })
    }

    fn create_pool(&self, database: &str) -> PgPool {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .connect_lazy_with(self.connect_options(database))
    }

    pub fn create_team_db_pool(&self) -> PgPool {
        self.create_pool(&self.team_database)
    }

    pub fn create_player_db_pool(&self) -> PgPool {
        self.create_pool(&self.player_database)
    }
}

fn query_error(e: sqlx::Error) -> ServiceError {
    match e {
        sqlx::Error::PoolClosed => ServiceError::uninitialized(),
        e => ServiceError::Internal(e.to_string()),
    }
}

/// Like [`query_error`], but an undefined table means the owner's game logs were never ingested.
fn game_log_error(e: sqlx::Error, owner: &str) -> ServiceError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some(sql::UNDEFINED_TABLE) {
            return ServiceError::missing_game_logs(owner);
        }
    }
    query_error(e)
}
