//! Step definitions for task reordering scenarios.

mod then;
mod when;
