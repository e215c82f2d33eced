//! Store adapters for the task module.
//!
//! # Available Adapters
//!
//! - [`memory::InMemoryTaskStore`]: Thread-safe in-memory storage for tests
//!   and single-process use
//! - [`postgres::PostgresTaskStore`]: `PostgreSQL` persistence using Diesel

pub mod memory;
pub mod postgres;
