//! fastex-core
//!
//! Record data model, annotation schema, configuration and dataset loading
//! shared by the query engine and the `fex` binary.

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod labels;
pub mod schema;
pub mod traits;
pub mod types;

pub use error::{Diagnostic, Error, Result};
pub use schema::Schema;
pub use types::{Record, Scalar, Value};
