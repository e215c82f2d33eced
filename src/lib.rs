//! Tasklane: personal task tracking across three fixed lanes.
//!
//! This crate provides the lane and position reconciliation engine behind a
//! list/kanban task tracker, together with the persistence and activity-log
//! plumbing that commits its results.
//!
//! # Architecture
//!
//! Tasklane follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`task`]: Task model, reorder engine, store port, and services

pub mod task;
