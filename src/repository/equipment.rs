//! Write-side collaborator operations on Repository: equipment creation
//! with laboratory back-references, and bulk reseeding

use bson::{oid::ObjectId, Bson, Document};
use serde::Serialize;

use super::{bounded, fixtures::Dataset, Collection, Repository};
use crate::{
    error::{AppError, AppResult},
    models::equipment::{CreateEquipment, Equipment},
    query::Projection,
};

/// Number of documents written by a reseed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub users: usize,
    pub laboratories: usize,
    pub equipment: usize,
}

impl Repository {
    /// Create equipment, then append it to its laboratory's `equipos`.
    /// The append only runs once the insert has succeeded.
    pub async fn equipment_create(&self, data: CreateEquipment) -> AppResult<Equipment> {
        let timeout = self.query_timeout();
        let laboratory = data.laboratory;

        let existing = bounded(
            timeout,
            self.store().fetch_by_ids(
                Collection::Laboratories,
                &[laboratory],
                &Projection::include(["_id"]),
            ),
        )
        .await?;
        if existing.is_empty() {
            return Err(AppError::NotFound(format!(
                "Laboratory {} not found",
                laboratory.to_hex()
            )));
        }

        let equipment = data.into_equipment(ObjectId::new());
        let document = bson::to_document(&equipment)?;
        bounded(
            timeout,
            self.store().insert_many(Collection::Equipment, vec![document]),
        )
        .await?;

        self.laboratory_append_equipment(laboratory, vec![equipment.id])
            .await?;

        tracing::info!(code = %equipment.code, laboratory = %laboratory, "Equipment created");
        Ok(equipment)
    }

    async fn laboratory_append_equipment(
        &self,
        laboratory: ObjectId,
        equipment: Vec<ObjectId>,
    ) -> AppResult<()> {
        let values: Vec<Bson> = equipment.into_iter().map(Bson::ObjectId).collect();
        let updated = bounded(
            self.query_timeout(),
            self.store()
                .push_to_array(Collection::Laboratories, laboratory, "equipos", values),
        )
        .await?;
        if !updated {
            return Err(AppError::NotFound(format!(
                "Laboratory {} not found",
                laboratory.to_hex()
            )));
        }
        Ok(())
    }

    /// Wipe the three collections and load `dataset`
    pub async fn reseed(&self, dataset: Dataset) -> AppResult<SeedSummary> {
        let timeout = self.query_timeout();
        for collection in [
            Collection::Users,
            Collection::Laboratories,
            Collection::Equipment,
        ] {
            let removed = bounded(timeout, self.store().delete_all(collection)).await?;
            tracing::debug!(collection = collection.name(), removed, "Collection wiped");
        }

        let users = encode_all(&dataset.users)?;
        let mut laboratories = encode_all(&dataset.laboratories)?;
        // Back-references are appended after the equipment exists
        for lab in &mut laboratories {
            lab.insert("equipos", Bson::Array(Vec::new()));
        }
        let equipment = encode_all(&dataset.equipment)?;

        let summary = SeedSummary {
            users: users.len(),
            laboratories: laboratories.len(),
            equipment: equipment.len(),
        };

        bounded(timeout, self.store().insert_many(Collection::Users, users)).await?;
        bounded(
            timeout,
            self.store()
                .insert_many(Collection::Laboratories, laboratories),
        )
        .await?;
        bounded(
            timeout,
            self.store().insert_many(Collection::Equipment, equipment),
        )
        .await?;

        for lab in &dataset.laboratories {
            let owned: Vec<ObjectId> = dataset
                .equipment
                .iter()
                .filter(|e| e.laboratory == lab.id)
                .map(|e| e.id)
                .collect();
            if !owned.is_empty() {
                self.laboratory_append_equipment(lab.id, owned).await?;
            }
        }

        tracing::info!(
            users = summary.users,
            laboratories = summary.laboratories,
            equipment = summary.equipment,
            "Store reseeded"
        );
        Ok(summary)
    }
}

fn encode_all<T: Serialize>(items: &[T]) -> AppResult<Vec<Document>> {
    items
        .iter()
        .map(|item| bson::to_document(item).map_err(AppError::from))
        .collect()
}
