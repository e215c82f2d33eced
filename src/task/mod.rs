//! Task tracking for Tasklane.
//!
//! Tasks live in one of three lanes (todo, in progress, completed) and carry
//! a dense, zero-based position inside their lane. Moving a task recomputes
//! the lane/position of every affected task, commits the result atomically,
//! and appends a transition entry to the task's activity log. The module
//! follows hexagonal architecture:
//!
//! - Domain types and the pure reorder engine in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
