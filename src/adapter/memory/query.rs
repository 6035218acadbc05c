//! Queries over JSON records.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field-equality filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

/// One sort criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub ascending: bool,
}

/// Query descriptor for [`MemoryAdapter`](super::MemoryAdapter).
///
/// A record matches when every filter matches its top-level field. Results
/// are ordered by the sort keys in turn, then by record key.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub filters: Vec<FieldFilter>,
    #[serde(default)]
    pub sort: Vec<SortKey>,
}

impl Query {
    /// Every record, ordered by key.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, ascending: bool) -> Self {
        self.sort.push(SortKey {
            field: field.into(),
            ascending,
        });
        self
    }

    pub fn matches(&self, record: &Value) -> bool {
        self.filters
            .iter()
            .all(|filter| record.get(&filter.field) == Some(&filter.value))
    }

    /// Order two records by the sort keys. Equal records compare `Equal`.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for key in &self.sort {
            let ord = compare_values(a.get(&key.field), b.get(&key.field));
            let ord = if key.ascending { ord } else { ord.reverse() };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

fn rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

/// Missing and null sort first, then booleans, numbers, strings, arrays, objects.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) if rank(a) == rank(b) => x.to_string().cmp(&y.to_string()),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_matches_everything() {
        assert!(Query::all().matches(&json!({"title": "x"})));
        assert!(Query::all().matches(&json!(null)));
    }

    #[test]
    fn field_filter_requires_equal_value() {
        let query = Query::all().field_eq("artist", "Nils Frahm");
        assert!(query.matches(&json!({"artist": "Nils Frahm", "title": "Says"})));
        assert!(!query.matches(&json!({"artist": "Olafur Arnalds"})));
        assert!(!query.matches(&json!({"title": "Says"})));
    }

    #[test]
    fn sort_keys_apply_in_turn() {
        let query = Query::all().sort_by("year", false).sort_by("title", true);
        let a = json!({"title": "A", "year": 2014});
        let b = json!({"title": "B", "year": 2014});
        let c = json!({"title": "C", "year": 2020});
        assert_eq!(query.compare(&a, &b), Ordering::Less);
        assert_eq!(query.compare(&c, &a), Ordering::Less);
    }

    #[test]
    fn missing_fields_sort_first() {
        let query = Query::all().sort_by("title", true);
        assert_eq!(
            query.compare(&json!({}), &json!({"title": "A"})),
            Ordering::Less
        );
    }
}
