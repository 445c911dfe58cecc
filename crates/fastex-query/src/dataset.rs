use std::path::Path;

use fastex_core::dataset::load_jsonl;
use fastex_core::error::Result;
use fastex_core::schema::Schema;
use fastex_core::traits::RecordSearch;
use fastex_core::types::Record;

use crate::query::search;

/// An immutable record snapshot with the schema its queries resolve against.
///
/// Share it behind an `Arc` (or a read lock, if the host swaps snapshots)
/// to serve concurrent searches.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    schema: Option<Schema>,
}

impl Dataset {
    pub fn new(records: Vec<Record>, schema: Option<Schema>) -> Self {
        Self { records, schema }
    }

    pub fn open(path: &Path, schema: Option<Schema>) -> Result<Self> {
        Ok(Self::new(load_jsonl(path)?, schema))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }
}

impl RecordSearch for Dataset {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    fn search(&self, query: &str) -> Result<Vec<usize>> {
        search(&self.records, query, self.schema.as_ref())
    }
}
