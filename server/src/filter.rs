//! Structured predicates over stored documents.
//!
//! A `Filter` is evaluated against the JSON projection of a record, so the
//! same predicate works for every document type without per-type code.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    Eq { field: String, value: Value },
    /// Field equals one of `values`.
    In { field: String, values: Vec<Value> },
    /// Every inner filter matches. An empty list matches everything.
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn one_of<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Conjunction of `self` and `other`, flattening nested `And`s.
    pub fn and(self, other: Filter) -> Self {
        let mut parts = match self {
            Filter::All => return other,
            Filter::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Filter::All => {}
            Filter::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        Filter::And(parts)
    }

    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => lookup(doc, field) == value,
            Filter::In { field, values } => {
                let actual = lookup(doc, field);
                values.iter().any(|v| v == actual)
            }
            Filter::And(parts) => parts.iter().all(|f| f.matches(doc)),
        }
    }
}

fn lookup<'a>(doc: &'a Value, field: &str) -> &'a Value {
    doc.get(field).unwrap_or(&Value::Null)
}
