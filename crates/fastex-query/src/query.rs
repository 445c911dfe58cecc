//! Query evaluation: a conjunction of conditions over a record sequence.

use fastex_core::error::{Diagnostic, Result};
use fastex_core::schema::Schema;
use fastex_core::types::Record;

use crate::condition::Condition;
use crate::tokenize::{parse_condition, split_conditions};

/// A parsed query line. Built per request and dropped after one scan.
#[derive(Debug, Clone, Default)]
pub struct Query {
    conditions: Vec<Condition>,
    diagnostics: Vec<Diagnostic>,
}

impl Query {
    /// Parses `text` against an optional schema.
    ///
    /// Bare terms search the schema's text fields; without a schema they
    /// have no fields and match nothing. Qualified fields missing from the
    /// schema are reported but still matched by their raw path, since records
    /// often carry structure the schema does not declare.
    pub fn parse(text: &str, schema: Option<&Schema>) -> Result<Self> {
        let text_fields: Vec<String> = schema
            .map(|s| s.text_fields().map(str::to_string).collect())
            .unwrap_or_default();

        let mut query = Query::default();
        for token in split_conditions(text) {
            let raw = parse_condition(&token)?;
            tracing::debug!(negated = raw.negated, field = ?raw.field, value = %raw.value, "Searching for condition");

            let condition = match raw.field {
                None => Condition::new(raw.negated, text_fields.clone(), raw.value, false),
                Some(field) => {
                    if let Some(schema) = schema {
                        if !schema.has_field(&field) {
                            let diagnostic = Diagnostic::UnknownField(field.clone());
                            tracing::warn!("{}", diagnostic);
                            query.diagnostics.push(diagnostic);
                        }
                    }
                    Condition::new(raw.negated, vec![field], raw.value, true)
                }
            };
            query.conditions.push(condition);
        }
        Ok(query)
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// A query without conditions matches every record.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }

    /// Indices of matching records, in dataset order.
    pub fn filter_indices(&self, records: &[Record]) -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, rec)| self.matches(rec))
            .map(|(i, _)| i)
            .collect()
    }
}

/// Indices of the records matching `query`, in dataset order.
///
/// Fails with `MalformedQuery` when a condition has more than one unquoted
/// `:`; nothing is matched in that case.
pub fn search(records: &[Record], query: &str, schema: Option<&Schema>) -> Result<Vec<usize>> {
    Ok(Query::parse(query, schema)?.filter_indices(records))
}

/// Like [`search`], returning each matching record with its index.
pub fn find_records<'a>(records: &'a [Record], query: &str, schema: Option<&Schema>) -> Result<Vec<(usize, &'a Record)>> {
    let query = Query::parse(query, schema)?;
    Ok(records.iter().enumerate().filter(|(_, rec)| query.matches(rec)).collect())
}
