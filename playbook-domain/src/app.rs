use std::sync::Arc;

use crate::{
    dispatch::{ArcDispatchService, DispatchServiceImpl},
    health::{ArcHealthService, HealthServiceImpl},
    player::{ArcPlayerRepository, ArcPlayerStatsService, PlayerStatsServiceImpl},
    search::{ArcSearchService, SearchServiceImpl},
    summary::{ArcSummaryService, SummaryServiceImpl},
    team::{ArcTeamRepository, ArcTeamStatsService, TeamStatsServiceImpl},
};

#[derive(Clone)]
pub struct AppState {
    pub player_stats_service: ArcPlayerStatsService,
    pub team_stats_service: ArcTeamStatsService,
    pub dispatch_service: ArcDispatchService,
    pub summary_service: ArcSummaryService,
    pub search_service: ArcSearchService,
    pub health_service: ArcHealthService,
}

pub fn construct_app(
    player_repository: ArcPlayerRepository,
    team_repository: ArcTeamRepository,
) -> AppState {
    let player_stats_service: ArcPlayerStatsService = Arc::new(Box::new(
        PlayerStatsServiceImpl::new(player_repository.clone()),
    ));
    let team_stats_service: ArcTeamStatsService = Arc::new(Box::new(TeamStatsServiceImpl::new(
        team_repository.clone(),
        player_repository.clone(),
    )));
    let dispatch_service: ArcDispatchService = Arc::new(Box::new(DispatchServiceImpl::new(
        player_stats_service.clone(),
        team_stats_service.clone(),
    )));
    let summary_service: ArcSummaryService =
        Arc::new(Box::new(SummaryServiceImpl::new(dispatch_service.clone())));
    let search_service: ArcSearchService = Arc::new(Box::new(SearchServiceImpl::new(
        player_repository.clone(),
        team_repository.clone(),
    )));
    let health_service: ArcHealthService = Arc::new(Box::new(HealthServiceImpl::new(
        player_repository,
        team_repository,
    )));

    AppState {
        player_stats_service,
        team_stats_service,
        dispatch_service,
        summary_service,
        search_service,
        health_service,
    }
}
