use std::{collections::BTreeMap, sync::Arc};

use playbook_core::statistics::{Summary, summarize};

use crate::{
    ServiceResult,
    dispatch::ArcDispatchService,
    stats::{StatsQuery, StatsResponse, StatsTarget},
};

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryResponse {
    Found(BTreeMap<String, Summary>),
    AllNull(String),
}

pub type ArcSummaryService = Arc<Box<dyn SummaryService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait SummaryService {
    /// Per-column descriptive statistics over whatever the target returns.
    async fn summarize(
        &self,
        target: StatsTarget,
        query: &StatsQuery,
    ) -> ServiceResult<SummaryResponse>;
}

pub struct SummaryServiceImpl {
    dispatch_service: ArcDispatchService,
}

impl SummaryServiceImpl {
    pub fn new(dispatch_service: ArcDispatchService) -> Self {
        Self { dispatch_service }
    }
}

#[async_trait::async_trait]
impl SummaryService for SummaryServiceImpl {
    async fn summarize(
        &self,
        target: StatsTarget,
        query: &StatsQuery,
    ) -> ServiceResult<SummaryResponse> {
        match self.dispatch_service.fetch(target, query).await? {
            StatsResponse::Found(data) => Ok(SummaryResponse::Found(summarize(&data))),
            StatsResponse::AllNull(msg) => Ok(SummaryResponse::AllNull(msg)),
        }
    }
}
