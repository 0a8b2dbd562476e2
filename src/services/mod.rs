//! Business logic services

pub mod inventory;
pub mod reports;

use crate::{config::ReportsConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub reports: reports::ReportsService,
    pub inventory: inventory::InventoryService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, reports_config: ReportsConfig) -> Self {
        Self {
            reports: reports::ReportsService::new(repository.clone(), reports_config),
            inventory: inventory::InventoryService::new(repository),
        }
    }
}
