use std::sync::Arc;

use crate::connection::{ConnectionManager, DeferredConnectionManager};

/// Collaborators shared by every tracker of a presentation.
#[derive(Clone)]
pub struct SharedResources {
    connection_manager: Arc<dyn ConnectionManager>,
}

impl SharedResources {
    pub fn new(connection_manager: Arc<dyn ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    pub fn connection_manager(&self) -> Arc<dyn ConnectionManager> {
        Arc::clone(&self.connection_manager)
    }
}

impl Default for SharedResources {
    fn default() -> Self {
        Self::new(Arc::new(DeferredConnectionManager::new()))
    }
}

impl std::fmt::Debug for SharedResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedResources").finish_non_exhaustive()
    }
}
