use fastex_core::types::Record;

use crate::matcher::{matches, Predicate};

/// One compiled `[!][field:]value` unit of a query.
///
/// A record satisfies the condition when any of `field_names` matches,
/// inverted when `negated`. An empty field set matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub negated: bool,
    pub field_names: Vec<String>,
    pub predicate: Predicate,
}

impl Condition {
    /// `*` always becomes a wildcard; otherwise bare terms search by
    /// substring and qualified ones by exact value.
    pub fn new(negated: bool, field_names: Vec<String>, value: String, qualified: bool) -> Self {
        let predicate = if value == "*" {
            Predicate::Wildcard
        } else if qualified {
            Predicate::Exact(value)
        } else {
            Predicate::Contains(value)
        };
        Self { negated, field_names, predicate }
    }

    pub fn matches(&self, record: &Record) -> bool {
        let hit = self.field_names.iter().any(|name| {
            let path: Vec<&str> = name.split('.').collect();
            matches(record, &path, &self.predicate)
        });
        hit != self.negated
    }
}
