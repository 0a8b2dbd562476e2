//! Aggregation pipeline executed over store reads.
//!
//! A [`Pipeline`] is an ordered list of [`Stage`]s. Each stage consumes the
//! full output of the previous one. A leading `Match` is pushed down to the
//! store as the source query; every `Lookup` issues one batched read.

pub mod expr;
pub mod group;

use bson::{Bson, Document};
use indexmap::IndexMap;

pub use expr::Expr;
pub use group::{Accumulator, Group};

use crate::{
    error::AppResult,
    query::{path::lookup, Filter, SortSpec},
    repository::{Collection, FindQuery, StoreSession},
};

/// Left outer join against a second collection
#[derive(Debug, Clone)]
pub struct Lookup {
    pub from: Collection,
    pub local_field: String,
    pub foreign_field: String,
    pub as_field: String,
}

impl Lookup {
    async fn apply(&self, session: &StoreSession, docs: Vec<Document>) -> AppResult<Vec<Document>> {
        let mut keys: IndexMap<String, Bson> = IndexMap::new();
        for doc in &docs {
            for value in local_values(doc, &self.local_field) {
                keys.entry(value.clone().into_canonical_extjson().to_string())
                    .or_insert(value);
            }
        }

        let foreign = if keys.is_empty() {
            Vec::new()
        } else {
            let filter = Filter::In(self.foreign_field.clone(), keys.into_values().collect());
            session.find(self.from, &FindQuery::new(filter)).await?
        };
        tracing::trace!(
            from = self.from.name(),
            local = %self.local_field,
            candidates = foreign.len(),
            "lookup"
        );

        Ok(docs
            .into_iter()
            .map(|mut doc| {
                let values = local_values(&doc, &self.local_field);
                let joined: Vec<Bson> = if values.is_empty() {
                    Vec::new()
                } else {
                    let predicate = Filter::In(self.foreign_field.clone(), values);
                    foreign
                        .iter()
                        .filter(|candidate| predicate.matches(candidate))
                        .cloned()
                        .map(Bson::Document)
                        .collect()
                };
                doc.insert(self.as_field.clone(), Bson::Array(joined));
                doc
            })
            .collect())
    }
}

/// Values of the local join field; an array contributes each element
fn local_values(doc: &Document, path: &str) -> Vec<Bson> {
    match lookup(doc, path) {
        None | Some(Bson::Null) => Vec::new(),
        Some(Bson::Array(items)) => items.clone(),
        Some(value) => vec![value.clone()],
    }
}

#[derive(Debug, Clone)]
pub enum Stage {
    Match(Filter),
    Lookup(Lookup),
    /// Output fields in order; `_id` is carried over unless redefined
    Project(Vec<(String, Expr)>),
    Group(Group),
    Sort(SortSpec),
}

/// Typed pipeline builder
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matching(mut self, filter: Filter) -> Self {
        self.stages.push(Stage::Match(filter));
        self
    }

    pub fn lookup(
        mut self,
        from: Collection,
        local_field: impl Into<String>,
        foreign_field: impl Into<String>,
        as_field: impl Into<String>,
    ) -> Self {
        self.stages.push(Stage::Lookup(Lookup {
            from,
            local_field: local_field.into(),
            foreign_field: foreign_field.into(),
            as_field: as_field.into(),
        }));
        self
    }

    pub fn project<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Expr)>,
        S: Into<String>,
    {
        self.stages.push(Stage::Project(
            fields
                .into_iter()
                .map(|(name, expr)| (name.into(), expr))
                .collect(),
        ));
        self
    }

    pub fn group(mut self, group: Group) -> Self {
        self.stages.push(Stage::Group(group));
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.stages.push(Stage::Sort(sort));
        self
    }

    /// Read `source` and run every stage over it
    pub async fn run(&self, session: &StoreSession, source: Collection) -> AppResult<Vec<Document>> {
        let (filter, rest) = match self.stages.split_first() {
            Some((Stage::Match(filter), rest)) => (filter.clone(), rest),
            _ => (Filter::All, self.stages.as_slice()),
        };
        let docs = session.find(source, &FindQuery::new(filter)).await?;
        tracing::trace!(source = source.name(), documents = docs.len(), "pipeline source read");
        run_stages(rest, session, docs).await
    }
}

async fn run_stages(
    stages: &[Stage],
    session: &StoreSession,
    mut docs: Vec<Document>,
) -> AppResult<Vec<Document>> {
    for stage in stages {
        docs = match stage {
            Stage::Match(filter) => docs.into_iter().filter(|d| filter.matches(d)).collect(),
            Stage::Lookup(lookup) => lookup.apply(session, docs).await?,
            Stage::Project(fields) => docs.iter().map(|d| project(d, fields)).collect(),
            Stage::Group(group) => group.apply(docs),
            Stage::Sort(sort) => {
                sort.sort(&mut docs);
                docs
            }
        };
        tracing::trace!(stage = stage.name(), documents = docs.len(), "stage done");
    }
    Ok(docs)
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::Match(_) => "match",
            Stage::Lookup(_) => "lookup",
            Stage::Project(_) => "project",
            Stage::Group(_) => "group",
            Stage::Sort(_) => "sort",
        }
    }
}

fn project(doc: &Document, fields: &[(String, Expr)]) -> Document {
    let mut out = Document::new();
    if let Some(id) = doc.get("_id") {
        out.insert("_id", id.clone());
    }
    for (name, expr) in fields {
        match expr.eval(doc) {
            Some(value) => {
                out.insert(name.clone(), value);
            }
            None => {
                out.remove(name);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::StoreConfig,
        repository::{memory::MemoryStore, EntityStore, Repository},
    };
    use bson::{doc, oid::ObjectId};
    use std::sync::Arc;

    async fn repository_with(labs: Vec<Document>, equipment: Vec<Document>) -> Repository {
        let store = MemoryStore::new();
        store.insert_many(Collection::Laboratories, labs).await.unwrap();
        store.insert_many(Collection::Equipment, equipment).await.unwrap();
        Repository::new(Arc::new(store), &StoreConfig::default())
    }

    #[tokio::test]
    async fn test_lookup_attaches_matches_and_empty_arrays() {
        let (lab1, lab2) = (ObjectId::new(), ObjectId::new());
        let repository = repository_with(
            vec![
                doc! { "_id": lab1, "codigo": "LAB-001" },
                doc! { "_id": lab2, "codigo": "LAB-002" },
            ],
            vec![
                doc! { "codigo": "PC-001", "laboratorio": lab1 },
                doc! { "codigo": "PRY-001", "laboratorio": lab1 },
            ],
        )
        .await;
        let session = repository.session("test").await.unwrap();

        let out = Pipeline::new()
            .lookup(Collection::Equipment, "_id", "laboratorio", "equiposDetalle")
            .project([
                ("codigo", Expr::field("codigo")),
                ("cantidad", Expr::size(Expr::field("equiposDetalle"))),
            ])
            .sort(SortSpec::new().asc("codigo"))
            .run(&session, Collection::Laboratories)
            .await
            .unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].get_i64("cantidad").unwrap(), 2);
        assert_eq!(out[1].get_i64("cantidad").unwrap(), 0);
        assert!(out[0].get_object_id("_id").is_ok());
    }

    #[tokio::test]
    async fn test_group_then_sort_orders_by_count_desc() {
        let mut equipment = Vec::new();
        for (status, n) in [("disponible", 3), ("mantenimiento", 5), ("dañado", 1)] {
            for i in 0..n {
                equipment.push(doc! { "estado": status, "codigo": format!("{status}-{i}") });
            }
        }
        let repository = repository_with(Vec::new(), equipment).await;
        let session = repository.session("test").await.unwrap();

        let out = Pipeline::new()
            .group(Group::by(Expr::field("estado")).count("cantidad"))
            .sort(SortSpec::new().desc("cantidad").asc("_id"))
            .run(&session, Collection::Equipment)
            .await
            .unwrap();

        let order: Vec<&str> = out.iter().map(|g| g.get_str("_id").unwrap()).collect();
        assert_eq!(order, ["mantenimiento", "disponible", "dañado"]);
    }

    #[tokio::test]
    async fn test_leading_match_and_missing_local_field() {
        let lab = ObjectId::new();
        let repository = repository_with(
            vec![doc! { "_id": lab, "estado": "disponible" }],
            vec![
                doc! { "codigo": "PC-001", "laboratorio": lab, "estado": "disponible" },
                doc! { "codigo": "OSC-001", "estado": "mantenimiento" },
            ],
        )
        .await;
        let session = repository.session("test").await.unwrap();

        let out = Pipeline::new()
            .matching(Filter::eq("estado", "mantenimiento"))
            .lookup(Collection::Laboratories, "laboratorio", "_id", "lab")
            .run(&session, Collection::Equipment)
            .await
            .unwrap();

        assert_eq!(out.len(), 1);
        assert!(out[0].get_array("lab").unwrap().is_empty());
    }
}
