//! Field-path matching over record trees.
//!
//! A path is a list of mapping keys. Descent only ever follows the named key;
//! a sequence found under a key is flattened once, at that point, by trying
//! every element against the rest of the path.

use fastex_core::types::Value;

/// How a reached leaf is compared with the condition value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Present and non-null, whatever the content.
    Wildcard,
    /// Textual form equals the value, case-sensitively.
    Exact(String),
    /// Textual form contains the value.
    Contains(String),
}

impl Predicate {
    /// Evaluates the predicate on the node reached at the end of a path.
    ///
    /// Sequences are checked element by element; mappings and nulls never
    /// satisfy a value comparison.
    pub fn test(&self, node: &Value) -> bool {
        match (self, node) {
            (_, Value::Null) => false,
            (Predicate::Wildcard, _) => true,
            (_, Value::Sequence(items)) => items.iter().any(|item| self.test(item)),
            (_, Value::Mapping(_)) => false,
            (Predicate::Exact(expected), Value::Scalar(s)) => s.to_string() == *expected,
            (Predicate::Contains(needle), Value::Scalar(s)) => s.to_string().contains(needle.as_str()),
        }
    }
}

/// Whether any value reachable from `node` along `path` satisfies `predicate`.
pub fn matches(node: &Value, path: &[&str], predicate: &Predicate) -> bool {
    let Some((key, rest)) = path.split_first() else {
        return predicate.test(node);
    };
    match node.get(key) {
        Some(Value::Sequence(items)) => items.iter().any(|item| matches(item, rest, predicate)),
        Some(child) => matches(child, rest, predicate),
        None => false,
    }
}
