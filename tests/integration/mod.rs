//! Integration tests for pgscript.

pub mod pipeline_test;
pub mod query_test;
