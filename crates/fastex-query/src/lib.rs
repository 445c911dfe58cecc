//! fastex-query
//!
//! The record filter language: `alice label:positive !archived:* "a phrase"`.
//! Whitespace separates conditions, all of which must hold. `field:value`
//! compares a dotted path exactly, a bare term searches the schema's text
//! fields by substring, `*` tests presence and `!` negates. Double quotes
//! protect spaces and colons.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod condition;
pub mod dataset;
pub mod matcher;
pub mod query;
pub mod tokenize;

pub use condition::Condition;
pub use dataset::Dataset;
pub use matcher::Predicate;
pub use query::{find_records, search, Query};
