use std::sync::Arc;

use serde_json::Value;

use crate::{ServiceResult, player::ArcPlayerRepository, team::ArcTeamRepository};

const SAMPLE_SIZE: i64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSample {
    pub players: Vec<Value>,
    pub teams: Vec<Value>,
}

pub type ArcHealthService = Arc<Box<dyn HealthService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait HealthService {
    /// Reads a handful of rows from both databases.
    async fn sample(&self) -> ServiceResult<DatabaseSample>;
}

pub struct HealthServiceImpl {
    player_repository: ArcPlayerRepository,
    team_repository: ArcTeamRepository,
}

impl HealthServiceImpl {
    pub fn new(player_repository: ArcPlayerRepository, team_repository: ArcTeamRepository) -> Self {
        Self {
            player_repository,
            team_repository,
        }
    }
}

#[async_trait::async_trait]
impl HealthService for HealthServiceImpl {
    async fn sample(&self) -> ServiceResult<DatabaseSample> {
        let players = self.player_repository.sample_rows(SAMPLE_SIZE).await?;
        let teams = self.team_repository.sample_rows(SAMPLE_SIZE).await?;
        Ok(DatabaseSample { players, teams })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{sample_player_repository, sample_team_repository};

    #[tokio::test]
    async fn test_sample_is_capped() {
        let service = HealthServiceImpl::new(
            Arc::new(Box::new(sample_player_repository())),
            Arc::new(Box::new(sample_team_repository())),
        );
        let sample = service.sample().await.unwrap();
        assert!(sample.players.len() <= 5);
        assert!(!sample.players.is_empty());
        assert_eq!(sample.teams.len(), 3);
    }

    #[tokio::test]
    async fn test_sample_fails_with_database() {
        let players = sample_player_repository();
        players.fail_queries();
        let service = HealthServiceImpl::new(
            Arc::new(Box::new(players)),
            Arc::new(Box::new(sample_team_repository())),
        );
        assert!(service.sample().await.is_err());
    }
}
