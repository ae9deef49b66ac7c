use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{FindLimits, ServiceResult};
use crate::dao::GenUnitStore;
use crate::database::models::{GenUnit, PingState};
use crate::filter::GenUnitFilter;
use crate::types::unix_now;

#[derive(Debug, Clone, Deserialize)]
pub struct PingUpdate {
    pub id: String,
    /// 0 down, 1 up
    pub code: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PingFailure {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PingReport {
    pub updated: usize,
    pub failed: Vec<PingFailure>,
}

#[derive(Clone)]
pub struct GenUnitService {
    units: Arc<dyn GenUnitStore>,
    limits: FindLimits,
}

impl GenUnitService {
    pub fn new(units: Arc<dyn GenUnitStore>, limits: FindLimits) -> Self {
        Self { units, limits }
    }

    pub async fn get(&self, id: &str) -> ServiceResult<GenUnit> {
        Ok(self.units.get(id).await?)
    }

    pub async fn find(&self, mut filter: GenUnitFilter) -> ServiceResult<Vec<GenUnit>> {
        filter.limit = self.limits.apply(filter.limit);
        Ok(self.units.find(&filter).await?)
    }

    /// Records one ping result per unit; units that fail are listed, the rest still apply
    pub async fn update_pings(&self, pings: Vec<PingUpdate>) -> PingReport {
        let time = unix_now();
        let results = join_all(pings.iter().map(|ping| {
            let state = PingState { code: ping.code, time };
            async move { (ping.id.clone(), self.units.append_ping(&ping.id, &state).await) }
        }))
        .await;

        let mut report = PingReport { updated: 0, failed: Vec::new() };
        for (id, result) in results {
            match result {
                Ok(_) => report.updated += 1,
                Err(e) => {
                    warn!("ping update for {} failed: {}", id, e);
                    report.failed.push(PingFailure { id, error: e.to_string() });
                }
            }
        }
        debug!("ping batch: {} updated, {} failed", report.updated, report.failed.len());
        report
    }
}
