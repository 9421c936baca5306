//! pgscript - run a SQL script against PostgreSQL and print query results.
//!
//! This library exposes the core modules for use in integration tests.

pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod query;
pub mod render;
pub mod script;
