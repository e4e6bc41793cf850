//! JSON REST handlers for the group hierarchy.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use meterhub_app::ports::{BaselineRepository, GroupRepository};
use meterhub_domain::group::{Group, GroupChildren};
use meterhub_domain::id::GroupId;

use super::parse_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating a group.
#[derive(Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    /// Links the new group under this parent in the same transaction.
    pub parent_id: Option<GroupId>,
}

/// Request body for linking an existing group under another one.
#[derive(Deserialize)]
pub struct AddChildRequest {
    pub child_id: GroupId,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Group>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Group>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the children endpoint.
pub enum ChildrenResponse {
    Ok(Json<GroupChildren>),
}

impl IntoResponse for ChildrenResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Group>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the add-child endpoint.
pub enum AddChildResponse {
    NoContent,
}

impl IntoResponse for AddChildResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/groups`
pub async fn list<GR, BR>(
    State(state): State<AppState<GR, BR>>,
) -> Result<ListResponse, ApiError>
where
    GR: GroupRepository + Send + Sync + 'static,
    BR: BaselineRepository + Send + Sync + 'static,
{
    let groups = state.group_service.list_groups().await?;
    Ok(ListResponse::Ok(Json(groups)))
}

/// `GET /api/groups/:group_id`
pub async fn get<GR, BR>(
    State(state): State<AppState<GR, BR>>,
    Path(group_id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    GR: GroupRepository + Send + Sync + 'static,
    BR: BaselineRepository + Send + Sync + 'static,
{
    let group_id: GroupId = parse_id(&group_id, "group")?;
    let group = state.group_service.get_group(group_id).await?;
    Ok(GetResponse::Ok(Json(group)))
}

/// `GET /api/groups/children/:group_id`
pub async fn children<GR, BR>(
    State(state): State<AppState<GR, BR>>,
    Path(group_id): Path<String>,
) -> Result<ChildrenResponse, ApiError>
where
    GR: GroupRepository + Send + Sync + 'static,
    BR: BaselineRepository + Send + Sync + 'static,
{
    let group_id: GroupId = parse_id(&group_id, "group")?;
    let children = state.group_service.immediate_children(group_id).await?;
    Ok(ChildrenResponse::Ok(Json(children)))
}

/// `POST /api/groups`
pub async fn create<GR, BR>(
    State(state): State<AppState<GR, BR>>,
    payload: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> Result<CreateResponse, ApiError>
where
    GR: GroupRepository + Send + Sync + 'static,
    BR: BaselineRepository + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let group = Group::builder().name(req.name).build()?;
    let created = match req.parent_id {
        Some(parent_id) => {
            state
                .group_service
                .create_child_group(parent_id, group)
                .await?
        }
        None => state.group_service.create_group(group).await?,
    };
    Ok(CreateResponse::Created(Json(created)))
}

/// `POST /api/groups/:group_id/children`
pub async fn add_child<GR, BR>(
    State(state): State<AppState<GR, BR>>,
    Path(group_id): Path<String>,
    payload: Result<Json<AddChildRequest>, JsonRejection>,
) -> Result<AddChildResponse, ApiError>
where
    GR: GroupRepository + Send + Sync + 'static,
    BR: BaselineRepository + Send + Sync + 'static,
{
    let Json(req) = payload?;
    let parent_id: GroupId = parse_id(&group_id, "group")?;
    state
        .group_service
        .add_child_group(parent_id, req.child_id)
        .await?;
    Ok(AddChildResponse::NoContent)
}
