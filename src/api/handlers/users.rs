//! User management endpoints.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::{
    AppState,
    api::models::{
        auth::PasswordChange,
        pagination::Pagination,
        users::{CurrentUser, UserCreate, UserResponse, UserUpdate},
    },
    auth::{self, password, role_gate},
    db::{
        handlers::{Repository, users::UserFilter, users::Users},
        models::users::UserUpdateDBRequest,
    },
    errors::Error,
    types::UserId,
};

/// Pass when the caller is the target user, otherwise require the user
/// administration role.
fn require_self_or_admin(current_user: &CurrentUser, target: UserId) -> Result<(), Error> {
    if current_user.id == target {
        return Ok(());
    }
    role_gate::USER_ADMIN.check(current_user)
}

// GET /users - List users (user_manager only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "List users",
    params(Pagination),
    responses(
        (status = 200, description = "List of users", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    current_user: CurrentUser,
) -> Result<Json<Vec<UserResponse>>, Error> {
    role_gate::USER_ADMIN.check(&current_user)?;

    let pagination = pagination.clamped();
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let users = repo.list(&UserFilter::new(pagination.skip, pagination.limit)).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

// POST /users - Create user (user_manager only)
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    summary = "Create user",
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid user data"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Username already taken"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(user_data): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    role_gate::USER_ADMIN.check(&current_user)?;
    user_data.validate()?;

    let password = user_data.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("run password hashing: {e}"),
        })??;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let user = repo.create(&user_data.into_db_request(password_hash)).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

// GET /users/{user_id} - Get a user (self or user_manager)
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "users",
    summary = "Get user",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User information", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    current_user: CurrentUser,
) -> Result<Json<UserResponse>, Error> {
    require_self_or_admin(&current_user, user_id)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let user = repo.get_by_id(user_id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: user_id.to_string(),
    })?;

    Ok(Json(UserResponse::from(user)))
}

// PATCH /users/{user_id} - Update a user (self or user_manager)
#[utoipa::path(
    patch,
    path = "/users/{user_id}",
    tag = "users",
    summary = "Update user",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid user data"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username already taken"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    current_user: CurrentUser,
    Json(user_data): Json<UserUpdate>,
) -> Result<Json<UserResponse>, Error> {
    require_self_or_admin(&current_user, user_id)?;
    user_data.validate()?;

    // Role assignments and activation are administrative even on your own
    // account; otherwise anyone could grant themselves user_manager
    if user_data.touches_admin_fields() {
        role_gate::USER_ADMIN.check(&current_user)?;
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let user = repo.update(user_id, &UserUpdateDBRequest::from(user_data)).await?;

    Ok(Json(UserResponse::from(user)))
}

// PATCH /users/{user_id}/password - Change password (self or user_manager)
#[utoipa::path(
    patch,
    path = "/users/{user_id}/password",
    tag = "users",
    summary = "Change password",
    description = "Change a user's password. The current password must be supplied and correct.",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid password data"),
        (status = 401, description = "Current password incorrect"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn change_password(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    current_user: CurrentUser,
    Json(request): Json<PasswordChange>,
) -> Result<StatusCode, Error> {
    require_self_or_admin(&current_user, user_id)?;

    if request.new_password.is_empty() || request.new_password.chars().count() > 256 {
        return Err(Error::BadRequest {
            message: "new_password must be between 1 and 256 characters".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let user = repo.get_by_id(user_id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: user_id.to_string(),
    })?;
    let username = user.username.clone();

    // The old password must be re-proven even mid-session
    auth::authenticate(&mut conn, &username, &request.old_password).await?;

    let new_password = request.new_password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&new_password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("run password hashing: {e}"),
        })??;

    let mut repo = Users::new(&mut conn);
    repo.update_password(user_id, &password_hash).await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /users/{user_id}/image - Upload a profile image (self or user_manager)
#[utoipa::path(
    post,
    path = "/users/{user_id}/image",
    tag = "users",
    summary = "Upload profile image",
    description = "Upload a profile image as multipart form data under the `file` field",
    params(("user_id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Image stored", body = UserResponse),
        (status = 400, description = "Missing or unsupported image"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 413, description = "Image too large"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn upload_user_image(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    current_user: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<UserResponse>, Error> {
    require_self_or_admin(&current_user, user_id)?;

    let mut stored_path = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| Error::BadRequest {
        message: format!("Invalid multipart payload: {e}"),
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let extension = match field.content_type() {
            Some("image/png") => "png",
            Some("image/jpeg") => "jpg",
            Some("image/gif") => "gif",
            Some("image/webp") => "webp",
            other => {
                return Err(Error::BadRequest {
                    message: format!("Unsupported image content type: {}", other.unwrap_or("none")),
                });
            }
        };

        let data = field.bytes().await.map_err(|e| Error::BadRequest {
            message: format!("Failed to read image data: {e}"),
        })?;
        if data.is_empty() {
            return Err(Error::BadRequest {
                message: "Uploaded image is empty".to_string(),
            });
        }

        stored_path = Some(save_image(&state.config.uploads.dir, user_id, extension, &data).await?);
        break;
    }

    let image_path = stored_path.ok_or_else(|| Error::BadRequest {
        message: "Multipart field 'file' is required".to_string(),
    })?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let update = UserUpdateDBRequest {
        image_path: Some(image_path),
        ..Default::default()
    };
    let user = repo.update(user_id, &update).await?;

    Ok(Json(UserResponse::from(user)))
}

/// Write image bytes under a fresh random filename and return the filename.
///
/// Filenames are server-generated, so client input never reaches the
/// filesystem path.
async fn save_image(dir: &str, user_id: UserId, extension: &str, data: &[u8]) -> Result<String, Error> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| Error::Internal {
        operation: format!("create upload directory: {e}"),
    })?;

    let filename = format!("user-{user_id}-{}.{extension}", Uuid::new_v4());
    let path = std::path::Path::new(dir).join(&filename);

    tokio::fs::write(&path, data).await.map_err(|e| Error::Internal {
        operation: format!("store uploaded image: {e}"),
    })?;

    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::current_user_fixture;

    #[test]
    fn test_self_or_admin_check() {
        let plain = current_user_fixture(1, "alice", &[]);
        assert!(require_self_or_admin(&plain, 1).is_ok());
        assert!(matches!(require_self_or_admin(&plain, 2), Err(Error::Forbidden)));

        let admin = current_user_fixture(3, "root", &["user_manager"]);
        assert!(require_self_or_admin(&admin, 2).is_ok());
    }

    #[test_log::test(tokio::test)]
    async fn test_save_image_generates_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = dir.path().to_str().unwrap();

        let first = save_image(dir_path, 7, "png", b"fake png bytes").await.unwrap();
        let second = save_image(dir_path, 7, "png", b"fake png bytes").await.unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("user-7-"));
        assert!(first.ends_with(".png"));

        let stored = tokio::fs::read(dir.path().join(&first)).await.unwrap();
        assert_eq!(stored, b"fake png bytes");
    }

    #[test_log::test(tokio::test)]
    async fn test_save_image_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("not").join("yet");
        let nested_path = nested.to_str().unwrap();

        let filename = save_image(nested_path, 1, "jpg", b"data").await.unwrap();
        assert!(nested.join(filename).exists());
    }
}
