//! Inventory collaborator: seeding and equipment registration

use crate::{
    error::AppResult,
    models::equipment::{CreateEquipment, Equipment},
    repository::{equipment::SeedSummary, fixtures, Repository},
};

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Replace the store contents with the university dataset
    pub async fn reseed(&self) -> AppResult<SeedSummary> {
        self.repository.reseed(fixtures::university_dataset()).await
    }

    /// Register equipment and link it from its laboratory
    pub async fn create_equipment(&self, data: CreateEquipment) -> AppResult<Equipment> {
        self.repository.equipment_create(data).await
    }

    /// Check store connectivity
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
