//! Shared API state

use reactorsync_engine::CycleScheduler;
use std::sync::Arc;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// The running generation loop; handlers reach the anomaly tracker and
    /// statistics through it.
    pub scheduler: Arc<CycleScheduler>,
}

impl AppState {
    pub fn new(scheduler: Arc<CycleScheduler>) -> Self {
        Self { scheduler }
    }
}
