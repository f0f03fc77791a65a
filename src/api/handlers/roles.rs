//! Role management endpoints. All of them require the user_manager role.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::{
        pagination::Pagination,
        roles::{RoleCreate, RoleResponse, RoleUpdate},
        users::CurrentUser,
    },
    auth::role_gate,
    db::{
        handlers::{Repository, roles::RoleFilter, roles::Roles},
        models::roles::{RoleCreateDBRequest, RoleUpdateDBRequest},
    },
    errors::Error,
    types::RoleId,
};

// GET /roles - List roles
#[utoipa::path(
    get,
    path = "/roles",
    tag = "roles",
    summary = "List roles",
    params(Pagination),
    responses(
        (status = 200, description = "List of roles", body = [RoleResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn list_roles(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    current_user: CurrentUser,
) -> Result<Json<Vec<RoleResponse>>, Error> {
    role_gate::USER_ADMIN.check(&current_user)?;

    let pagination = pagination.clamped();
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Roles::new(&mut conn);

    let roles = repo.list(&RoleFilter::new(pagination.skip, pagination.limit)).await?;

    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

// POST /roles - Create role
#[utoipa::path(
    post,
    path = "/roles",
    tag = "roles",
    summary = "Create role",
    responses(
        (status = 201, description = "Role created", body = RoleResponse),
        (status = 400, description = "Invalid role data"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Role name already exists"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn create_role(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(role_data): Json<RoleCreate>,
) -> Result<(StatusCode, Json<RoleResponse>), Error> {
    role_gate::USER_ADMIN.check(&current_user)?;
    role_data.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Roles::new(&mut conn);

    let role = repo.create(&RoleCreateDBRequest::from(role_data)).await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

// GET /roles/{role_id} - Get a role
#[utoipa::path(
    get,
    path = "/roles/{role_id}",
    tag = "roles",
    summary = "Get role",
    params(("role_id" = i32, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role information", body = RoleResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn get_role(
    State(state): State<AppState>,
    Path(role_id): Path<RoleId>,
    current_user: CurrentUser,
) -> Result<Json<RoleResponse>, Error> {
    role_gate::USER_ADMIN.check(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Roles::new(&mut conn);

    let role = repo.get_by_id(role_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Role".to_string(),
        id: role_id.to_string(),
    })?;

    Ok(Json(RoleResponse::from(role)))
}

// PATCH /roles/{role_id} - Update a role
#[utoipa::path(
    patch,
    path = "/roles/{role_id}",
    tag = "roles",
    summary = "Update role",
    params(("role_id" = i32, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role updated", body = RoleResponse),
        (status = 400, description = "Invalid role data"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role name already exists"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn update_role(
    State(state): State<AppState>,
    Path(role_id): Path<RoleId>,
    current_user: CurrentUser,
    Json(role_data): Json<RoleUpdate>,
) -> Result<Json<RoleResponse>, Error> {
    role_gate::USER_ADMIN.check(&current_user)?;
    role_data.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Roles::new(&mut conn);

    let role = repo.update(role_id, &RoleUpdateDBRequest::from(role_data)).await?;

    Ok(Json(RoleResponse::from(role)))
}
