//! Observed label values per classification field, for autocompletion.

use std::collections::{BTreeMap, BTreeSet};

use crate::schema::Schema;
use crate::traits::RecordObserver;
use crate::types::{Record, Value};

/// Top-level key under which a record's annotations are written.
pub const LABEL_KEY: &str = "_fex";

/// Whether `updated` may replace `original`: every key it carries, apart from
/// [`LABEL_KEY`], must already exist in `original` with the same value.
pub fn only_labels_changed(original: &Record, updated: &Record) -> bool {
    let (Some(before), Some(after)) = (original.as_mapping(), updated.as_mapping()) else {
        return false;
    };
    after
        .iter()
        .filter(|(key, _)| key.as_str() != LABEL_KEY)
        .all(|(key, value)| before.get(key) == Some(value))
}

#[derive(Debug, Clone, Default)]
pub struct LabelValues {
    fields: BTreeMap<String, Tracked>,
}

#[derive(Debug, Clone)]
struct Tracked {
    path: Vec<String>,
    values: BTreeSet<String>,
}

impl LabelValues {
    /// Tracks every `multiclass`/`multilabel` field, seeded with its declared values.
    pub fn from_schema(schema: &Schema) -> Self {
        let fields = schema
            .fields()
            .iter()
            .filter(|f| f.kind.is_classification())
            .map(|f| (f.name.clone(), Tracked { path: f.path.clone(), values: f.values.clone() }))
            .collect();
        Self { fields }
    }

    /// Sorted values seen for `field`, or `None` if the field is not tracked.
    pub fn values(&self, field: &str) -> Option<Vec<&str>> {
        self.fields.get(field).map(|t| t.values.iter().map(String::as_str).collect())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl RecordObserver for LabelValues {
    fn observe(&mut self, record: &Record) {
        for tracked in self.fields.values_mut() {
            collect(record, &tracked.path, &mut tracked.values);
        }
    }
}

fn collect(node: &Value, path: &[String], out: &mut BTreeSet<String>) {
    let Some((head, rest)) = path.split_first() else {
        match node {
            Value::Scalar(s) => {
                out.insert(s.to_string());
            }
            Value::Sequence(items) => items.iter().for_each(|v| collect(v, &[], out)),
            Value::Null | Value::Mapping(_) => {}
        }
        return;
    };
    match node.get(head) {
        Some(Value::Sequence(items)) => items.iter().for_each(|v| collect(v, rest, out)),
        Some(child) => collect(child, rest, out),
        None => {}
    }
}
