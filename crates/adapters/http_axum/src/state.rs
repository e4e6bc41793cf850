//! Shared application state for axum handlers.

use std::sync::Arc;

use meterhub_app::ports::{BaselineRepository, GroupRepository};
use meterhub_app::services::baseline_service::BaselineService;
use meterhub_app::services::group_service::GroupService;

/// Application state shared across all axum handlers.
///
/// Generic over the repository types to avoid dynamic dispatch. `Clone` is
/// implemented manually so the repositories themselves do not need to be
/// `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<GR, BR> {
    /// Group hierarchy service.
    pub group_service: Arc<GroupService<GR>>,
    /// Baseline service.
    pub baseline_service: Arc<BaselineService<BR>>,
}

impl<GR, BR> Clone for AppState<GR, BR> {
    fn clone(&self) -> Self {
        Self {
            group_service: Arc::clone(&self.group_service),
            baseline_service: Arc::clone(&self.baseline_service),
        }
    }
}

impl<GR, BR> AppState<GR, BR>
where
    GR: GroupRepository + Send + Sync + 'static,
    BR: BaselineRepository + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(group_service: GroupService<GR>, baseline_service: BaselineService<BR>) -> Self {
        Self {
            group_service: Arc::new(group_service),
            baseline_service: Arc::new(baseline_service),
        }
    }
}
