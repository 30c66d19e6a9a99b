//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::config::ContainmentConfig;
use crate::infrastructure::memory::WorldSnapshot;
use crate::infrastructure::ports::{ClockPort, ItemStore, RepoError, TemplateCatalog};
use crate::use_cases::containment::{ContainmentOps, ContainmentPorts};

/// Main application state.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Port traits the use cases run against.
pub struct Repositories {
    pub items: Arc<dyn ItemStore>,
    pub catalog: Arc<dyn TemplateCatalog>,
}

/// Container for all use cases.
pub struct UseCases {
    pub containment: Arc<ContainmentOps>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        items: Arc<dyn ItemStore>,
        catalog: Arc<dyn TemplateCatalog>,
        config: ContainmentConfig,
    ) -> Self {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

        let containment = Arc::new(ContainmentOps::new(ContainmentPorts {
            items: items.clone(),
            catalog: catalog.clone(),
            clock,
            config,
        }));

        Self {
            repositories: Repositories { items, catalog },
            use_cases: UseCases { containment },
        }
    }

    /// Wire the app over in-memory adapters seeded from a snapshot.
    pub fn from_snapshot(snapshot: WorldSnapshot, config: ContainmentConfig) -> Result<Self, RepoError> {
        let (items, catalog) = snapshot.into_adapters()?;
        Ok(Self::new(Arc::new(items), Arc::new(catalog), config))
    }
}
