//! Holdfast containment engine library.
//!
//! Items nest inside container items; this crate validates and applies every
//! change to that nesting.
//!
//! ## Structure
//!
//! - `use_cases/` - Containment operations, queries and the invariant audit
//! - `infrastructure/` - Ports and their in-memory adapters, clock and config
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

/// Test fixtures module for building containment worlds.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
