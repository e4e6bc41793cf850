//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod baselines;
#[allow(clippy::missing_errors_doc)]
pub mod groups;

use std::str::FromStr;

use axum::Router;
use axum::routing::{get, post};

use meterhub_app::ports::{BaselineRepository, GroupRepository};
use meterhub_domain::error::ValidationError;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<GR, BR>() -> Router<AppState<GR, BR>>
where
    GR: GroupRepository + Send + Sync + 'static,
    BR: BaselineRepository + Send + Sync + 'static,
{
    Router::new()
        // Groups
        .route(
            "/groups",
            get(groups::list::<GR, BR>).post(groups::create::<GR, BR>),
        )
        .route("/groups/", get(groups::list::<GR, BR>))
        .route(
            "/groups/children/{group_id}",
            get(groups::children::<GR, BR>),
        )
        .route("/groups/{group_id}", get(groups::get::<GR, BR>))
        .route(
            "/groups/{group_id}/children",
            post(groups::add_child::<GR, BR>),
        )
        // Baselines
        .route(
            "/baselines",
            get(baselines::list::<GR, BR>).post(baselines::create::<GR, BR>),
        )
        .route(
            "/baselines/meter/{meter_id}",
            get(baselines::list_for_meter::<GR, BR>),
        )
}

/// Parse a path segment into a typed identifier.
fn parse_id<T: FromStr>(raw: &str, kind: &'static str) -> Result<T, ApiError> {
    T::from_str(raw).map_err(|_| {
        ApiError::from(ValidationError::InvalidIdentifier {
            kind,
            value: raw.to_string(),
        })
    })
}
