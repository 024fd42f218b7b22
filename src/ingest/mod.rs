// Ingest module: raw CSV reading, schema normalization and dataset sources.

pub mod forecast;
pub mod reader;
pub mod schema;
pub mod source;

pub use source::{CsvFileSource, VisitSource};
