use std::sync::Arc;

use log::debug;

use crate::{
    ServiceResult,
    player::ArcPlayerStatsService,
    stats::{StatsQuery, StatsResponse, StatsTarget},
    team::ArcTeamStatsService,
};

pub type ArcDispatchService = Arc<Box<dyn DispatchService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait DispatchService {
    async fn fetch(&self, target: StatsTarget, query: &StatsQuery) -> ServiceResult<StatsResponse>;
}

pub struct DispatchServiceImpl {
    player_stats_service: ArcPlayerStatsService,
    team_stats_service: ArcTeamStatsService,
}

impl DispatchServiceImpl {
    pub fn new(
        player_stats_service: ArcPlayerStatsService,
        team_stats_service: ArcTeamStatsService,
    ) -> Self {
        Self {
            player_stats_service,
            team_stats_service,
        }
    }
}

#[async_trait::async_trait]
impl DispatchService for DispatchServiceImpl {
    async fn fetch(&self, target: StatsTarget, query: &StatsQuery) -> ServiceResult<StatsResponse> {
        debug!("Dispatching {:?}", target);
        match target {
            StatsTarget::Player(stats_type) => {
                self.player_stats_service.get_stats(stats_type, query).await
            }
            StatsTarget::Team(stats_type) => {
                self.team_stats_service.get_stats(stats_type, query).await
            }
        }
    }
}
