use crate::store::CoordinateStore;
use std::sync::Arc;

/// Shared application state
///
/// Holds the process-scoped store handle created once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CoordinateStore>,
}
