//! MongoDB entity store

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures::TryStreamExt;
use mongodb::{
    options::{ClientOptions, FindOptions, IndexOptions},
    Client, Database, IndexModel,
};

use super::store::{assign_ids, Collection, EntityStore, FindQuery};
use crate::{
    error::AppResult,
    query::{Filter, Projection},
};

/// Entity store backed by a MongoDB database
pub struct MongoStore {
    #[allow(dead_code)]
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Connect and verify the server answers a ping
    pub async fn connect(uri: &str, db_name: &str) -> AppResult<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;
        let db = client.database(db_name);

        db.run_command(doc! { "ping": 1 }, None).await?;
        tracing::info!("Connected to MongoDB: {}", db_name);

        let store = Self { client, db };
        store.ensure_indexes().await;
        Ok(store)
    }

    /// Create the lookup indexes of every collection. Failures are logged
    /// and the store stays usable.
    async fn ensure_indexes(&self) {
        for collection in [Collection::Users, Collection::Laboratories, Collection::Equipment] {
            let indexes = index_keys(collection)
                .into_iter()
                .map(|(keys, unique)| {
                    IndexModel::builder()
                        .keys(keys)
                        .options(unique.then(|| IndexOptions::builder().unique(true).build()))
                        .build()
                })
                .collect::<Vec<_>>();

            if let Err(e) = self.collection(collection).create_indexes(indexes, None).await {
                tracing::warn!(collection = collection.name(), "Failed to create indexes: {}", e);
            } else {
                tracing::info!(collection = collection.name(), "Indexes ensured");
            }
        }
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.db.collection(collection.name())
    }
}

/// Index keys per collection, each flagged unique or not
fn index_keys(collection: Collection) -> Vec<(Document, bool)> {
    match collection {
        Collection::Users => vec![
            (doc! { "correo": 1 }, true),
            (doc! { "cedula": 1 }, true),
            (doc! { "rol": 1, "activo": 1 }, false),
        ],
        Collection::Laboratories => vec![
            (doc! { "codigo": 1 }, true),
            (doc! { "tipo": 1, "estado": 1 }, false),
            (doc! { "responsable": 1 }, false),
        ],
        Collection::Equipment => vec![
            (doc! { "codigo": 1 }, true),
            (doc! { "tipo": 1, "estado": 1 }, false),
            (doc! { "laboratorio": 1 }, false),
            (doc! { "usuarioAsignado": 1 }, false),
        ],
    }
}

#[async_trait]
impl EntityStore for MongoStore {
    async fn find(&self, collection: Collection, query: &FindQuery) -> AppResult<Vec<Document>> {
        let options = FindOptions::builder()
            .projection(query.projection.to_document())
            .sort(query.sort.to_document())
            .build();
        let cursor = self
            .collection(collection)
            .find(query.filter.to_document(), options)
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs)
    }

    async fn fetch_by_ids(
        &self,
        collection: Collection,
        ids: &[ObjectId],
        projection: &Projection,
    ) -> AppResult<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let filter = Filter::is_in("_id", ids.iter().copied());
        let options = FindOptions::builder()
            .projection(projection.to_document())
            .build();
        let cursor = self
            .collection(collection)
            .find(filter.to_document(), options)
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs)
    }

    async fn insert_many(
        &self,
        collection: Collection,
        mut documents: Vec<Document>,
    ) -> AppResult<Vec<ObjectId>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let ids = assign_ids(&mut documents);
        self.collection(collection)
            .insert_many(documents, None)
            .await?;
        Ok(ids)
    }

    async fn delete_all(&self, collection: Collection) -> AppResult<u64> {
        let result = self
            .collection(collection)
            .delete_many(Document::new(), None)
            .await?;
        Ok(result.deleted_count)
    }

    async fn push_to_array(
        &self,
        collection: Collection,
        id: ObjectId,
        field: &str,
        values: Vec<Bson>,
    ) -> AppResult<bool> {
        let mut each = Document::new();
        each.insert("$each", Bson::Array(values));
        let mut push = Document::new();
        push.insert(field, each);

        let result = self
            .collection(collection)
            .update_one(doc! { "_id": id }, doc! { "$push": push }, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_keys_cover_reference_fields() {
        let equipment = index_keys(Collection::Equipment);
        assert!(equipment.contains(&(doc! { "laboratorio": 1 }, false)));
        assert!(equipment.contains(&(doc! { "usuarioAsignado": 1 }, false)));
        assert!(index_keys(Collection::Laboratories).contains(&(doc! { "responsable": 1 }, false)));
    }

    #[test]
    fn test_compound_index_keeps_key_order() {
        let users = index_keys(Collection::Users);
        let (keys, unique) = &users[2];
        assert_eq!(keys.keys().collect::<Vec<_>>(), ["rol", "activo"]);
        assert!(!unique);

        let unique_keys: Vec<&Document> = users.iter().filter(|(_, u)| *u).map(|(k, _)| k).collect();
        assert_eq!(unique_keys, [&doc! { "correo": 1 }, &doc! { "cedula": 1 }]);
    }
}
