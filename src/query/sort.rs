//! Multi-key sort specifications

use std::cmp::Ordering;

use bson::{Bson, Document};

use super::path::{compare, lookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Ordered sort keys. Ties fall through to the next key and finally keep
/// input order (sorting is stable).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<(String, SortOrder)>,
}

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(mut self, path: impl Into<String>) -> Self {
        self.keys.push((path.into(), SortOrder::Ascending));
        self
    }

    pub fn desc(mut self, path: impl Into<String>) -> Self {
        self.keys.push((path.into(), SortOrder::Descending));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for (path, order) in &self.keys {
            let ord = compare(lookup(a, path), lookup(b, path));
            let ord = match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    pub fn sort(&self, docs: &mut [Document]) {
        if !self.is_empty() {
            docs.sort_by(|a, b| self.compare(a, b));
        }
    }

    /// Equivalent MongoDB sort document, `None` when unsorted
    pub fn to_document(&self) -> Option<Document> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.keys
                .iter()
                .map(|(path, order)| {
                    let direction = match order {
                        SortOrder::Ascending => 1,
                        SortOrder::Descending => -1,
                    };
                    (path.clone(), Bson::Int32(direction))
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_surname_then_name() {
        let mut users = vec![
            doc! { "apellido": "Pérez", "nombre": "Juan" },
            doc! { "apellido": "González", "nombre": "María" },
            doc! { "apellido": "Pérez", "nombre": "Ana" },
        ];
        SortSpec::new().asc("apellido").asc("nombre").sort(&mut users);
        let names: Vec<&str> = users.iter().map(|u| u.get_str("nombre").unwrap()).collect();
        assert_eq!(names, vec!["María", "Ana", "Juan"]);
    }

    #[test]
    fn test_stable_on_full_ties() {
        let mut docs = vec![
            doc! { "k": 1, "seq": 0 },
            doc! { "k": 2, "seq": 1 },
            doc! { "k": 1, "seq": 2 },
        ];
        SortSpec::new().desc("k").sort(&mut docs);
        let seq: Vec<i32> = docs.iter().map(|d| d.get_i32("seq").unwrap()).collect();
        assert_eq!(seq, vec![1, 0, 2]);
    }

    #[test]
    fn test_to_document() {
        let order = SortSpec::new().desc("cantidad").asc("_id");
        assert_eq!(order.to_document(), Some(doc! { "cantidad": -1, "_id": 1 }));
    }
}
