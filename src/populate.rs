//! Reference resolver: replace stored identifiers with the documents they
//! point at.

use std::collections::HashMap;

use bson::{oid::ObjectId, Bson, Document};
use indexmap::IndexSet;

use crate::{
    error::AppResult,
    query::{Filter, Projection},
    repository::{Collection, FindQuery, StoreSession},
};

/// One reference field to resolve.
///
/// The field holds a single id or an array of ids into `target`. With a
/// `filter`, targets that do not match are treated as unresolved: dropped
/// from arrays, and a single reference is removed from its document.
#[derive(Debug, Clone)]
pub struct Populate {
    path: String,
    target: Collection,
    filter: Option<Filter>,
    projection: Projection,
}

impl Populate {
    pub fn new(path: impl Into<String>, target: Collection) -> Self {
        Self {
            path: path.into(),
            target,
            filter: None,
            projection: Projection::all(),
        }
    }

    pub fn users(path: impl Into<String>) -> Self {
        Self::new(path, Collection::Users)
    }

    pub fn laboratories(path: impl Into<String>) -> Self {
        Self::new(path, Collection::Laboratories)
    }

    pub fn equipment(path: impl Into<String>) -> Self {
        Self::new(path, Collection::Equipment)
    }

    /// Only resolve to targets matching `filter`
    pub fn matching(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Fields to keep on resolved targets (`_id` always kept)
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Projection::include(fields);
        self
    }

    /// Resolve the field on every document with one batched read
    pub async fn resolve(&self, session: &StoreSession, docs: &mut [Document]) -> AppResult<()> {
        let mut ids: IndexSet<ObjectId> = IndexSet::new();
        for doc in docs.iter() {
            match doc.get(&self.path) {
                Some(Bson::ObjectId(id)) => {
                    ids.insert(*id);
                }
                Some(Bson::Array(items)) => {
                    ids.extend(items.iter().filter_map(Bson::as_object_id));
                }
                _ => {}
            }
        }
        if ids.is_empty() {
            return Ok(());
        }

        let ids: Vec<ObjectId> = ids.into_iter().collect();
        let targets = match &self.filter {
            Some(filter) => {
                let query = FindQuery::new(Filter::is_in("_id", ids.clone()).and(filter.clone()))
                    .project(self.projection.clone());
                session.find(self.target, &query).await?
            }
            None => {
                session
                    .fetch_by_ids(self.target, &ids, &self.projection)
                    .await?
            }
        };
        tracing::debug!(
            field = %self.path,
            target = self.target.name(),
            requested = ids.len(),
            resolved = targets.len(),
            "references populated"
        );

        let by_id: HashMap<ObjectId, Document> = targets
            .into_iter()
            .filter_map(|doc| doc.get_object_id("_id").ok().map(|id| (id, doc)))
            .collect();

        for doc in docs.iter_mut() {
            let resolved = match doc.get(&self.path) {
                Some(Bson::ObjectId(id)) => by_id.get(id).cloned().map(Bson::Document),
                Some(Bson::Array(items)) => Some(Bson::Array(
                    items
                        .iter()
                        .filter_map(Bson::as_object_id)
                        .filter_map(|id| by_id.get(&id).cloned().map(Bson::Document))
                        .collect(),
                )),
                _ => continue,
            };
            match resolved {
                Some(value) => {
                    doc.insert(self.path.clone(), value);
                }
                None => {
                    doc.remove(&self.path);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::StoreConfig,
        repository::{memory::MemoryStore, EntityStore, MockEntityStore, Repository},
    };
    use bson::doc;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_array_reference_keeps_matching_targets_in_order() {
        let store = MemoryStore::new();
        let ids = store
            .insert_many(
                Collection::Equipment,
                vec![
                    doc! { "codigo": "PC-001", "estado": "disponible", "marca": "HP" },
                    doc! { "codigo": "OSC-001", "estado": "mantenimiento" },
                    doc! { "codigo": "PRY-001", "estado": "disponible" },
                ],
            )
            .await
            .unwrap();
        let repository = Repository::new(Arc::new(store), &StoreConfig::default());
        let session = repository.session("test").await.unwrap();

        let mut labs = vec![doc! {
            "codigo": "LAB-001",
            "equipos": [ids[2], ids[1], ObjectId::new(), ids[0]],
        }];
        Populate::equipment("equipos")
            .matching(Filter::eq("estado", "disponible"))
            .select(["codigo"])
            .resolve(&session, &mut labs)
            .await
            .unwrap();

        let equipment = labs[0].get_array("equipos").unwrap();
        let codes: Vec<&str> = equipment
            .iter()
            .map(|e| e.as_document().unwrap().get_str("codigo").unwrap())
            .collect();
        assert_eq!(codes, ["PRY-001", "PC-001"]);
        assert!(!equipment[0].as_document().unwrap().contains_key("marca"));
    }

    #[tokio::test]
    async fn test_unresolved_single_reference_is_removed() {
        let repository = Repository::new(Arc::new(MemoryStore::new()), &StoreConfig::default());
        let session = repository.session("test").await.unwrap();

        let mut labs = vec![doc! { "codigo": "LAB-001", "responsable": ObjectId::new() }];
        Populate::users("responsable")
            .resolve(&session, &mut labs)
            .await
            .unwrap();
        assert!(!labs[0].contains_key("responsable"));
    }

    #[tokio::test]
    async fn test_no_ids_issues_no_read() {
        let mut store = MockEntityStore::new();
        store.expect_fetch_by_ids().never();
        store.expect_find().never();
        let repository = Repository::new(Arc::new(store), &StoreConfig::default());
        let session = repository.session("test").await.unwrap();

        let mut docs = vec![doc! { "nombre": "sin referencia" }];
        Populate::users("usuarioAsignado")
            .resolve(&session, &mut docs)
            .await
            .unwrap();
        assert_eq!(docs[0], doc! { "nombre": "sin referencia" });
    }
}
