//! Typed document filters

use std::cmp::Ordering;

use bson::{Bson, Document};
use regex::{Regex, RegexBuilder};

use super::path::{compare, lookup, same_bracket, values_equal};

/// Predicate over a document.
///
/// Paths are dotted (see [`lookup`]). Equality and membership against an
/// array-valued field match when any element matches; range comparisons only
/// match values of the same type bracket.
#[derive(Debug, Clone, Default)]
pub enum Filter {
    #[default]
    All,
    Eq(String, Bson),
    Ne(String, Bson),
    In(String, Vec<Bson>),
    Lt(String, Bson),
    Regex {
        path: String,
        regex: Regex,
        case_insensitive: bool,
    },
    Exists(String, bool),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(path: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::Eq(path.into(), value.into())
    }

    pub fn ne(path: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::Ne(path.into(), value.into())
    }

    pub fn is_in<I, V>(path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        Filter::In(path.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn lt(path: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::Lt(path.into(), value.into())
    }

    pub fn exists(path: impl Into<String>, present: bool) -> Self {
        Filter::Exists(path.into(), present)
    }

    /// Match string fields against a regular expression
    pub fn regex(
        path: impl Into<String>,
        pattern: &str,
        case_insensitive: bool,
    ) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()?;
        Ok(Filter::Regex {
            path: path.into(),
            regex,
            case_insensitive,
        })
    }

    pub fn any(filters: Vec<Filter>) -> Self {
        Filter::Or(filters)
    }

    /// Conjunction, flattening nested `And`s and dropping `All`
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::All, f) | (f, Filter::All) => f,
            (Filter::And(mut left), Filter::And(right)) => {
                left.extend(right);
                Filter::And(left)
            }
            (Filter::And(mut left), f) => {
                left.push(f);
                Filter::And(left)
            }
            (f, Filter::And(mut right)) => {
                right.insert(0, f);
                Filter::And(right)
            }
            (f, g) => Filter::And(vec![f, g]),
        }
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(path, value) => {
                any_element(lookup(doc, path), |v| values_equal(v, Some(value)))
            }
            Filter::Ne(path, value) => {
                !any_element(lookup(doc, path), |v| values_equal(v, Some(value)))
            }
            Filter::In(path, values) => any_element(lookup(doc, path), |v| {
                values.iter().any(|candidate| values_equal(v, Some(candidate)))
            }),
            Filter::Lt(path, bound) => {
                any_element(lookup(doc, path), |v| ranged(v, bound, Ordering::is_lt))
            }
            Filter::Regex { path, regex, .. } => any_element(lookup(doc, path), |v| {
                matches!(v, Some(Bson::String(s)) if regex.is_match(s))
            }),
            Filter::Exists(path, present) => lookup(doc, path).is_some() == *present,
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }

    /// Equivalent MongoDB filter document
    pub fn to_document(&self) -> Document {
        let mut out = Document::new();
        match self {
            Filter::All => {}
            Filter::Eq(path, value) => {
                out.insert(path.clone(), operator("$eq", value.clone()));
            }
            Filter::Ne(path, value) => {
                out.insert(path.clone(), operator("$ne", value.clone()));
            }
            Filter::In(path, values) => {
                out.insert(path.clone(), operator("$in", Bson::Array(values.clone())));
            }
            Filter::Lt(path, value) => {
                out.insert(path.clone(), operator("$lt", value.clone()));
            }
            Filter::Regex {
                path,
                regex,
                case_insensitive,
            } => {
                let mut clause = Document::new();
                clause.insert("$regex", regex.as_str());
                if *case_insensitive {
                    clause.insert("$options", "i");
                }
                out.insert(path.clone(), clause);
            }
            Filter::Exists(path, present) => {
                out.insert(path.clone(), operator("$exists", Bson::Boolean(*present)));
            }
            Filter::And(filters) => {
                out.insert("$and", clauses(filters));
            }
            Filter::Or(filters) => {
                out.insert("$or", clauses(filters));
            }
        }
        out
    }
}

/// Apply a predicate to a field value, or to each element when the field is
/// an array (the array itself is also tried as a whole).
fn any_element(field: Option<&Bson>, predicate: impl Fn(Option<&Bson>) -> bool) -> bool {
    match field {
        Some(Bson::Array(items)) => {
            predicate(field) || items.iter().any(|item| predicate(Some(item)))
        }
        _ => predicate(field),
    }
}

fn ranged(value: Option<&Bson>, bound: &Bson, accept: fn(Ordering) -> bool) -> bool {
    value.is_some()
        && same_bracket(value, Some(bound))
        && accept(compare(value, Some(bound)))
}

fn operator(name: &str, value: Bson) -> Document {
    let mut clause = Document::new();
    clause.insert(name, value);
    clause
}

fn clauses(filters: &[Filter]) -> Bson {
    Bson::Array(
        filters
            .iter()
            .map(|f| Bson::Document(f.to_document()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EquipmentStatus, LabStatus};
    use bson::{doc, oid::ObjectId, DateTime};

    #[test]
    fn test_status_enum_matches_stored_slug() {
        let damaged = doc! { "estado": "dañado" };
        assert!(Filter::eq("estado", EquipmentStatus::Damaged).matches(&damaged));
        assert!(!Filter::eq("estado", EquipmentStatus::Maintenance).matches(&damaged));
        assert_eq!(
            Filter::eq("estado", LabStatus::Available).to_document(),
            doc! { "estado": { "$eq": "disponible" } }
        );
    }

    #[test]
    fn test_eq_matches_array_elements() {
        let lab = ObjectId::new();
        let user = doc! { "laboratoriosAsignados": [lab] };
        assert!(Filter::eq("laboratoriosAsignados", lab).matches(&user));
        assert!(!Filter::eq("laboratoriosAsignados", ObjectId::new()).matches(&user));
    }

    #[test]
    fn test_regex_is_case_insensitive() {
        let filter = Filter::regex("correo", r"@universidad\.edu$", true).unwrap();
        assert!(filter.matches(&doc! { "correo": "A@universidad.edu" }));
        assert!(filter.matches(&doc! { "correo": "a@UNIVERSIDAD.EDU" }));
        assert!(!filter.matches(&doc! { "correo": "a@estudiante.edu" }));
        assert!(!filter.matches(&doc! { "nombre": "sin correo" }));
    }

    #[test]
    fn test_exists_on_first_array_element() {
        let empty = doc! { "historialMantenimiento": [] };
        let serviced = doc! { "historialMantenimiento": [{ "tipo": "preventivo" }] };
        let filter = Filter::exists("historialMantenimiento.0", false);
        assert!(filter.matches(&empty));
        assert!(filter.matches(&doc! {}));
        assert!(!filter.matches(&serviced));
    }

    #[test]
    fn test_lt_only_matches_same_bracket() {
        let cutoff = DateTime::from_millis(1_000_000);
        let filter = Filter::lt("fechaAdquisicion", cutoff);
        assert!(filter.matches(&doc! { "fechaAdquisicion": DateTime::from_millis(10) }));
        assert!(!filter.matches(&doc! { "fechaAdquisicion": DateTime::from_millis(2_000_000) }));
        assert!(!filter.matches(&doc! { "fechaAdquisicion": "2020-01-01" }));
        assert!(!filter.matches(&doc! {}));
    }

    #[test]
    fn test_and_flattens() {
        let f = Filter::eq("a", 1).and(Filter::eq("b", 2)).and(Filter::All);
        match f {
            Filter::And(parts) => assert_eq!(parts.len(), 2),
            other => panic!("unexpected filter {:?}", other),
        }
    }

    #[test]
    fn test_to_document_translation() {
        let filter = Filter::any(vec![
            Filter::eq("estado", "mantenimiento"),
            Filter::regex("correo", "x$", true).unwrap(),
        ]);
        assert_eq!(
            filter.to_document(),
            doc! {
                "$or": [
                    { "estado": { "$eq": "mantenimiento" } },
                    { "correo": { "$regex": "x$", "$options": "i" } },
                ]
            }
        );
    }
}
