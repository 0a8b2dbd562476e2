//! In-process entity store

use std::collections::HashMap;

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;

use super::store::{assign_ids, Collection, EntityStore, FindQuery};
use crate::{error::AppResult, query::Projection};

/// Entity store held in memory, used for demo mode and tests.
/// Documents keep insertion order.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find(&self, collection: Collection, query: &FindQuery) -> AppResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut matched: Vec<Document> = collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| query.filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        query.sort.sort(&mut matched);
        Ok(matched
            .iter()
            .map(|doc| query.projection.apply(doc))
            .collect())
    }

    async fn fetch_by_ids(
        &self,
        collection: Collection,
        ids: &[ObjectId],
        projection: &Projection,
    ) -> AppResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| {
                        doc.get_object_id("_id")
                            .map(|id| ids.contains(&id))
                            .unwrap_or(false)
                    })
                    .map(|doc| projection.apply(doc))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_many(
        &self,
        collection: Collection,
        mut documents: Vec<Document>,
    ) -> AppResult<Vec<ObjectId>> {
        let ids = assign_ids(&mut documents);
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .extend(documents);
        Ok(ids)
    }

    async fn delete_all(&self, collection: Collection) -> AppResult<u64> {
        let removed = self.collections.write().await.remove(&collection);
        Ok(removed.map(|docs| docs.len() as u64).unwrap_or(0))
    }

    async fn push_to_array(
        &self,
        collection: Collection,
        id: ObjectId,
        field: &str,
        values: Vec<Bson>,
    ) -> AppResult<bool> {
        let mut collections = self.collections.write().await;
        let target = collections.get_mut(&collection).and_then(|docs| {
            docs.iter_mut()
                .find(|doc| doc.get_object_id("_id").map(|d| d == id).unwrap_or(false))
        });
        let Some(doc) = target else {
            return Ok(false);
        };
        match doc.get_array_mut(field) {
            Ok(items) => items.extend(values),
            Err(_) => {
                doc.insert(field, Bson::Array(values));
            }
        }
        Ok(true)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
