//! Field projections

use bson::{Bson, Document};

/// Top-level inclusion projection. `_id` is always kept; an empty list keeps
/// the whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keep only projected fields, preserving the document's field order
    pub fn apply(&self, doc: &Document) -> Document {
        if self.is_all() {
            return doc.clone();
        }
        doc.iter()
            .filter(|(key, _)| key.as_str() == "_id" || self.fields.iter().any(|f| f == *key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Equivalent MongoDB projection document, `None` for the whole document
    pub fn to_document(&self) -> Option<Document> {
        if self.is_all() {
            return None;
        }
        Some(
            self.fields
                .iter()
                .map(|f| (f.clone(), Bson::Int32(1)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};

    #[test]
    fn test_apply_keeps_id() {
        let id = ObjectId::new();
        let user = doc! { "_id": id, "nombre": "Ana", "cedula": "5544332211", "correo": "a@b.c" };
        let projected = Projection::include(["nombre", "correo"]).apply(&user);
        assert_eq!(projected, doc! { "_id": id, "nombre": "Ana", "correo": "a@b.c" });
    }

    #[test]
    fn test_empty_projection_keeps_everything() {
        let d = doc! { "a": 1, "b": 2 };
        assert_eq!(Projection::all().apply(&d), d);
        assert!(Projection::all().to_document().is_none());
    }
}
