//! Projection expressions

use bson::{Bson, Document};

use crate::query::{path::as_f64, Filter};

/// Computed value over the current document
#[derive(Debug, Clone)]
pub enum Expr {
    /// Dotted field path; traversing an array maps the rest of the path over
    /// its elements (`equiposDetalle.valorAdquisicion` is an array of values)
    Field(String),
    Literal(Bson),
    /// Length of an array
    Size(Box<Expr>),
    /// Array elements satisfying a predicate
    Filter { input: Box<Expr>, cond: Filter },
    /// Element by index, negative from the end
    ElemAt(Box<Expr>, i64),
    /// Sum of the numbers in an array (or of a single number)
    Sum(Box<Expr>),
    Subtract(Box<Expr>, Box<Expr>),
    Multiply(Box<Expr>, Box<Expr>),
    /// Floating-point division; a zero divisor yields 0
    Divide(Box<Expr>, Box<Expr>),
    Cond {
        when: Filter,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// Embedded document built from named expressions
    Record(Vec<(String, Expr)>),
}

impl Expr {
    pub fn field(path: impl Into<String>) -> Self {
        Expr::Field(path.into())
    }

    pub fn lit(value: impl Into<Bson>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn size(input: Expr) -> Self {
        Expr::Size(Box::new(input))
    }

    pub fn filter(input: Expr, cond: Filter) -> Self {
        Expr::Filter {
            input: Box::new(input),
            cond,
        }
    }

    pub fn elem_at(input: Expr, index: i64) -> Self {
        Expr::ElemAt(Box::new(input), index)
    }

    pub fn sum(input: Expr) -> Self {
        Expr::Sum(Box::new(input))
    }

    pub fn subtract(left: Expr, right: Expr) -> Self {
        Expr::Subtract(Box::new(left), Box::new(right))
    }

    pub fn multiply(left: Expr, right: Expr) -> Self {
        Expr::Multiply(Box::new(left), Box::new(right))
    }

    pub fn divide(left: Expr, right: Expr) -> Self {
        Expr::Divide(Box::new(left), Box::new(right))
    }

    pub fn cond(when: Filter, then: Expr, otherwise: Expr) -> Self {
        Expr::Cond {
            when,
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Expr)>,
        S: Into<String>,
    {
        Expr::Record(
            fields
                .into_iter()
                .map(|(name, expr)| (name.into(), expr))
                .collect(),
        )
    }

    /// Evaluate against `doc`; `None` means the value is missing and the
    /// field is left out of the output
    pub fn eval(&self, doc: &Document) -> Option<Bson> {
        match self {
            Expr::Field(path) => resolve_field(doc, path),
            Expr::Literal(value) => Some(value.clone()),
            Expr::Size(input) => match input.eval(doc)? {
                Bson::Array(items) => Some(Bson::Int64(items.len() as i64)),
                _ => None,
            },
            Expr::Filter { input, cond } => match input.eval(doc)? {
                Bson::Array(items) => Some(Bson::Array(
                    items
                        .into_iter()
                        .filter(|item| match item {
                            Bson::Document(element) => cond.matches(element),
                            _ => matches!(cond, Filter::All),
                        })
                        .collect(),
                )),
                _ => None,
            },
            Expr::ElemAt(input, index) => match input.eval(doc)? {
                Bson::Array(mut items) => {
                    let len = items.len() as i64;
                    let position = if *index < 0 { len + index } else { *index };
                    if (0..len).contains(&position) {
                        Some(items.swap_remove(position as usize))
                    } else {
                        None
                    }
                }
                _ => None,
            },
            Expr::Sum(input) => {
                let total = match input.eval(doc) {
                    Some(Bson::Array(items)) => items
                        .iter()
                        .filter_map(Number::from_bson)
                        .fold(Number::ZERO, Number::add),
                    Some(value) => Number::from_bson(&value).unwrap_or(Number::ZERO),
                    None => Number::ZERO,
                };
                Some(total.into_bson())
            }
            Expr::Subtract(left, right) => {
                let (l, r) = operands(doc, left, right)?;
                Some(l.add(r.negate()).into_bson())
            }
            Expr::Multiply(left, right) => {
                let (l, r) = operands(doc, left, right)?;
                Some(l.multiply(r).into_bson())
            }
            Expr::Divide(left, right) => {
                let (l, r) = operands(doc, left, right)?;
                let divisor = r.as_f64();
                if divisor == 0.0 {
                    Some(Bson::Double(0.0))
                } else {
                    Some(Bson::Double(l.as_f64() / divisor))
                }
            }
            Expr::Cond {
                when,
                then,
                otherwise,
            } => {
                if when.matches(doc) {
                    then.eval(doc)
                } else {
                    otherwise.eval(doc)
                }
            }
            Expr::Record(fields) => Some(Bson::Document(
                fields
                    .iter()
                    .filter_map(|(name, expr)| expr.eval(doc).map(|value| (name.clone(), value)))
                    .collect(),
            )),
        }
    }
}

fn operands(doc: &Document, left: &Expr, right: &Expr) -> Option<(Number, Number)> {
    let l = Number::from_bson(&left.eval(doc)?)?;
    let r = Number::from_bson(&right.eval(doc)?)?;
    Some((l, r))
}

/// Resolve a field path for expressions (arrays map over their elements)
pub fn resolve_field(doc: &Document, path: &str) -> Option<Bson> {
    let segments: Vec<&str> = path.split('.').collect();
    let (head, rest) = segments.split_first()?;
    resolve(doc.get(*head)?, rest)
}

fn resolve(value: &Bson, segments: &[&str]) -> Option<Bson> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value.clone());
    };
    match value {
        Bson::Document(inner) => resolve(inner.get(*head)?, rest),
        Bson::Array(items) => Some(Bson::Array(
            items
                .iter()
                .filter_map(|item| resolve(item, segments))
                .collect(),
        )),
        _ => None,
    }
}

/// Integer-preserving numeric accumulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(crate) const ZERO: Number = Number::Int(0);

    pub(crate) fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::Int32(v) => Some(Number::Int(i64::from(*v))),
            Bson::Int64(v) => Some(Number::Int(*v)),
            other => as_f64(other).map(Number::Float),
        }
    }

    pub(crate) fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => match a.checked_add(b) {
                Some(sum) => Number::Int(sum),
                None => Number::Float(a as f64 + b as f64),
            },
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    fn negate(self) -> Number {
        match self {
            Number::Int(v) => Number::Int(-v),
            Number::Float(v) => Number::Float(-v),
        }
    }

    fn multiply(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => match a.checked_mul(b) {
                Some(product) => Number::Int(product),
                None => Number::Float(a as f64 * b as f64),
            },
            (a, b) => Number::Float(a.as_f64() * b.as_f64()),
        }
    }

    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    pub(crate) fn into_bson(self) -> Bson {
        match self {
            Number::Int(v) => Bson::Int64(v),
            Number::Float(v) => Bson::Double(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn lab_with_equipment() -> Document {
        doc! {
            "nombre": "Laboratorio de Informática 1",
            "equiposDetalle": [
                { "estado": "disponible", "valorAdquisicion": 1200 },
                { "estado": "mantenimiento", "valorAdquisicion": 450.5 },
                { "estado": "disponible" },
            ],
            "responsableDetalle": [{ "nombre": "Juan" }],
        }
    }

    #[test]
    fn test_size_and_filtered_size() {
        let lab = lab_with_equipment();
        assert_eq!(Expr::size(Expr::field("equiposDetalle")).eval(&lab), Some(Bson::Int64(3)));
        let available = Expr::size(Expr::filter(
            Expr::field("equiposDetalle"),
            Filter::eq("estado", "disponible"),
        ));
        assert_eq!(available.eval(&lab), Some(Bson::Int64(2)));
    }

    #[test]
    fn test_sum_over_array_path_skips_missing() {
        let lab = lab_with_equipment();
        let total = Expr::sum(Expr::field("equiposDetalle.valorAdquisicion")).eval(&lab);
        assert_eq!(total, Some(Bson::Double(1650.5)));
        assert_eq!(Expr::sum(Expr::field("nada")).eval(&lab), Some(Bson::Int64(0)));
    }

    #[test]
    fn test_elem_at() {
        let lab = lab_with_equipment();
        let first = Expr::elem_at(Expr::field("responsableDetalle"), 0).eval(&lab);
        assert_eq!(first, Some(Bson::Document(doc! { "nombre": "Juan" })));
        assert!(Expr::elem_at(Expr::field("responsableDetalle"), 1).eval(&lab).is_none());
        assert!(Expr::elem_at(Expr::field("responsableDetalle"), -1).eval(&lab).is_some());
    }

    #[test]
    fn test_divide_by_zero_is_zero() {
        let d = doc! { "activos": 3, "cantidad": 0 };
        let ratio = Expr::divide(Expr::field("activos"), Expr::field("cantidad"));
        assert_eq!(ratio.eval(&d), Some(Bson::Double(0.0)));
    }

    #[test]
    fn test_cond_and_subtract() {
        let d = doc! { "activo": true, "cantidad": 5, "activos": 3 };
        let flag = Expr::cond(Filter::eq("activo", true), Expr::lit(1), Expr::lit(0));
        assert_eq!(flag.eval(&d), Some(Bson::Int32(1)));
        let inactive = Expr::subtract(Expr::field("cantidad"), Expr::field("activos"));
        assert_eq!(inactive.eval(&d), Some(Bson::Int64(2)));
    }
}
