//! Group stage

use bson::{Bson, Document};
use indexmap::IndexMap;

use super::expr::{Expr, Number};

/// Per-group reduction
#[derive(Debug, Clone)]
pub enum Accumulator {
    /// Number of documents in the group
    Count,
    Sum(Expr),
    /// Sum divided by the number of documents; missing values count as 0
    Avg(Expr),
    /// Collect one value per document
    Push(Expr),
}

/// Partition documents by a key expression and reduce each partition.
///
/// A literal key puts every document in a single group, which is emitted
/// even for an empty input.
#[derive(Debug, Clone)]
pub struct Group {
    key: Expr,
    accumulators: Vec<(String, Accumulator)>,
}

impl Group {
    pub fn by(key: Expr) -> Self {
        Self {
            key,
            accumulators: Vec::new(),
        }
    }

    /// Single group over everything (`_id: null`)
    pub fn all() -> Self {
        Self::by(Expr::Literal(Bson::Null))
    }

    pub fn count(self, name: impl Into<String>) -> Self {
        self.accumulate(name, Accumulator::Count)
    }

    pub fn sum(self, name: impl Into<String>, expr: Expr) -> Self {
        self.accumulate(name, Accumulator::Sum(expr))
    }

    pub fn avg(self, name: impl Into<String>, expr: Expr) -> Self {
        self.accumulate(name, Accumulator::Avg(expr))
    }

    pub fn push(self, name: impl Into<String>, expr: Expr) -> Self {
        self.accumulate(name, Accumulator::Push(expr))
    }

    fn accumulate(mut self, name: impl Into<String>, accumulator: Accumulator) -> Self {
        self.accumulators.push((name.into(), accumulator));
        self
    }

    pub(crate) fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
        // Keyed by canonical extended JSON so equal keys land together;
        // IndexMap keeps first-occurrence order
        let mut groups: IndexMap<String, (Bson, Vec<State>)> = IndexMap::new();

        for doc in &docs {
            let key = self.key.eval(doc).unwrap_or(Bson::Null);
            let canonical = key.clone().into_canonical_extjson().to_string();
            let (_, states) = groups
                .entry(canonical)
                .or_insert_with(|| (key, self.initial_states()));
            for (state, (_, accumulator)) in states.iter_mut().zip(&self.accumulators) {
                state.update(accumulator, doc);
            }
        }

        if groups.is_empty() {
            if let Expr::Literal(key) = &self.key {
                groups.insert(String::new(), (key.clone(), self.initial_states()));
            }
        }

        groups
            .into_values()
            .map(|(key, states)| {
                let mut out = Document::new();
                out.insert("_id", key);
                for (state, (name, _)) in states.into_iter().zip(&self.accumulators) {
                    out.insert(name.clone(), state.finish());
                }
                out
            })
            .collect()
    }

    fn initial_states(&self) -> Vec<State> {
        self.accumulators
            .iter()
            .map(|(_, accumulator)| match accumulator {
                Accumulator::Count => State::Count(0),
                Accumulator::Sum(_) => State::Sum(Number::ZERO),
                Accumulator::Avg(_) => State::Avg {
                    total: 0.0,
                    count: 0,
                },
                Accumulator::Push(_) => State::Push(Vec::new()),
            })
            .collect()
    }
}

#[derive(Debug)]
enum State {
    Count(i64),
    Sum(Number),
    Avg { total: f64, count: i64 },
    Push(Vec<Bson>),
}

impl State {
    fn update(&mut self, accumulator: &Accumulator, doc: &Document) {
        match (self, accumulator) {
            (State::Count(n), Accumulator::Count) => *n += 1,
            (State::Sum(total), Accumulator::Sum(expr)) => {
                if let Some(value) = expr.eval(doc).as_ref().and_then(Number::from_bson) {
                    *total = total.add(value);
                }
            }
            (State::Avg { total, count }, Accumulator::Avg(expr)) => {
                *count += 1;
                if let Some(value) = expr.eval(doc).as_ref().and_then(Number::from_bson) {
                    *total += value.as_f64();
                }
            }
            (State::Push(values), Accumulator::Push(expr)) => {
                values.push(expr.eval(doc).unwrap_or(Bson::Null));
            }
            _ => {}
        }
    }

    fn finish(self) -> Bson {
        match self {
            State::Count(n) => Bson::Int64(n),
            State::Sum(total) => total.into_bson(),
            State::Avg { total, count } => {
                if count == 0 {
                    Bson::Double(0.0)
                } else {
                    Bson::Double(total / count as f64)
                }
            }
            State::Push(values) => Bson::Array(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn statuses(list: &[&str]) -> Vec<Document> {
        list.iter()
            .enumerate()
            .map(|(i, status)| doc! { "estado": *status, "codigo": format!("EQ-{:03}", i) })
            .collect()
    }

    #[test]
    fn test_group_counts_partition_input() {
        let docs = statuses(&["disponible", "mantenimiento", "disponible", "dañado"]);
        let groups = Group::by(Expr::field("estado"))
            .count("cantidad")
            .push("codigos", Expr::field("codigo"))
            .apply(docs);

        assert_eq!(groups.len(), 3);
        let total: i64 = groups.iter().map(|g| g.get_i64("cantidad").unwrap()).sum();
        assert_eq!(total, 4);
        assert_eq!(groups[0].get_str("_id").unwrap(), "disponible");
        assert_eq!(groups[0].get_array("codigos").unwrap().len(), 2);
    }

    #[test]
    fn test_avg_over_empty_group_all_is_zero() {
        let groups = Group::all()
            .count("totalLaboratorios")
            .sum("totalEquipos", Expr::field("cantidadEquipos"))
            .avg("promedio", Expr::field("cantidadEquipos"))
            .apply(Vec::new());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].get("_id"), Some(&Bson::Null));
        assert_eq!(groups[0].get_i64("totalLaboratorios").unwrap(), 0);
        assert_eq!(groups[0].get_i64("totalEquipos").unwrap(), 0);
        assert_eq!(groups[0].get_f64("promedio").unwrap(), 0.0);
    }

    #[test]
    fn test_avg_counts_missing_values_as_zero() {
        let docs = vec![
            doc! { "cantidadEquipos": 3 },
            doc! { "cantidadEquipos": 2 },
            doc! {},
        ];
        let groups = Group::all()
            .avg("promedio", Expr::field("cantidadEquipos"))
            .apply(docs);
        let average = groups[0].get_f64("promedio").unwrap();
        assert!((average - 5.0 / 3.0).abs() < 1e-9);
    }
}
