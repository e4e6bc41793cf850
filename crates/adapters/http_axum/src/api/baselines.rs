//! JSON REST handlers for baselines.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use meterhub_app::ports::{BaselineRepository, GroupRepository};
use meterhub_domain::baseline::Baseline;
use meterhub_domain::id::MeterId;
use meterhub_domain::interval::TimeInterval;
use meterhub_domain::time::Timestamp;

use super::parse_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for computing a baseline.
///
/// There is no value field: the value is always computed by the store.
#[derive(Deserialize)]
pub struct CreateBaselineRequest {
    pub meter_id: MeterId,
    pub apply_start: Timestamp,
    pub apply_end: Timestamp,
    pub calc_start: Timestamp,
    pub calc_end: Timestamp,
    pub note: Option<String>,
}

impl CreateBaselineRequest {
    fn into_baseline(self) -> Result<Baseline, ApiError> {
        let apply = TimeInterval::new(self.apply_start, self.apply_end)?;
        let calc = TimeInterval::new(self.calc_start, self.calc_end)?;
        let baseline = Baseline::new(self.meter_id, apply, calc);
        Ok(match self.note {
            Some(note) => baseline.with_note(note),
            None => baseline,
        })
    }
}

/// Possible responses from the list endpoints.
pub enum ListResponse {
    Ok(Json<Vec<Baseline>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Baseline>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/baselines`
pub async fn list<GR, BR>(
    State(state): State<AppState<GR, BR>>,
) -> Result<ListResponse, ApiError>
where
    GR: GroupRepository + Send + Sync + 'static,
    BR: BaselineRepository + Send + Sync + 'static,
{
    let baselines = state.baseline_service.list_baselines().await?;
    Ok(ListResponse::Ok(Json(baselines)))
}

/// `GET /api/baselines/meter/:meter_id`
pub async fn list_for_meter<GR, BR>(
    State(state): State<AppState<GR, BR>>,
    Path(meter_id): Path<String>,
) -> Result<ListResponse, ApiError>
where
    GR: GroupRepository + Send + Sync + 'static,
    BR: BaselineRepository + Send + Sync + 'static,
{
    let meter_id: MeterId = parse_id(&meter_id, "meter")?;
    let baselines = state.baseline_service.baselines_for_meter(meter_id).await?;
    Ok(ListResponse::Ok(Json(baselines)))
}

/// `POST /api/baselines`
pub async fn create<GR, BR>(
    State(state): State<AppState<GR, BR>>,
    payload: Result<Json<CreateBaselineRequest>, JsonRejection>,
) -> Result<CreateResponse, ApiError>
where
    GR: GroupRepository + Send + Sync + 'static,
    BR: BaselineRepository + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let baseline = req.into_baseline()?;
    let stored = state.baseline_service.create_baseline(baseline).await?;
    Ok(CreateResponse::Created(Json(stored)))
}
