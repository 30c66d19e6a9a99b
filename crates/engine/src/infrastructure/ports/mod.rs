//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Item storage (in-memory today, any transactional store tomorrow)
//! - The template catalog
//! - Clock (for testing)

mod error;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{ChangeSet, ItemStore, TemplateCatalog, VersionedItem};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockItemStore, MockTemplateCatalog};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::RepoError;
