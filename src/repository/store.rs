//! Entity store adapter interface

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};

use crate::{
    error::AppResult,
    query::{Filter, Projection, SortSpec},
};

/// The three persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Laboratories,
    Equipment,
}

impl Collection {
    /// Stored collection name
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "usuarios",
            Collection::Laboratories => "laboratorios",
            Collection::Equipment => "equipos",
        }
    }
}

/// Filter + projection + sort for a `find`
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filter: Filter,
    pub projection: Projection,
    pub sort: SortSpec,
}

impl FindQuery {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn project(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }
}

/// Minimal document-store API consumed by the core.
///
/// Reads return documents in store order unless a sort is requested. The
/// write operations exist for the seeding / creation collaborators only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn find(&self, collection: Collection, query: &FindQuery) -> AppResult<Vec<Document>>;

    /// Batched read by identifier; unknown ids are simply absent
    async fn fetch_by_ids(
        &self,
        collection: Collection,
        ids: &[ObjectId],
        projection: &Projection,
    ) -> AppResult<Vec<Document>>;

    /// Insert documents, assigning an `_id` where missing
    async fn insert_many(
        &self,
        collection: Collection,
        documents: Vec<Document>,
    ) -> AppResult<Vec<ObjectId>>;

    async fn delete_all(&self, collection: Collection) -> AppResult<u64>;

    /// Append values to an array field of one document; false if no such document
    async fn push_to_array(
        &self,
        collection: Collection,
        id: ObjectId,
        field: &str,
        values: Vec<Bson>,
    ) -> AppResult<bool>;

    async fn ping(&self) -> AppResult<()>;
}

/// Ensure every document carries an `_id`, returning the ids in order
pub(crate) fn assign_ids(documents: &mut [Document]) -> Vec<ObjectId> {
    documents
        .iter_mut()
        .map(|doc| match doc.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => {
                let id = ObjectId::new();
                doc.insert("_id", id);
                id
            }
        })
        .collect()
}
