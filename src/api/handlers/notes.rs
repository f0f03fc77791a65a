//! Note endpoints.
//!
//! Two distinct access rules apply here and they are deliberately not
//! unified: reading a note additionally honors its public flag, while
//! editing or deleting one never does.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::models::{
        notes::{NoteCreate, NoteResponse, NoteUpdate},
        pagination::Pagination,
        users::CurrentUser,
    },
    auth::role_gate,
    db::{
        handlers::{Repository, notes::Notes},
        models::notes::{NoteDBResponse, NoteFilter, NoteUpdateDBRequest},
    },
    errors::Error,
    types::NoteId,
};

/// A note can be read by its owner, by anyone if it is public, or by a
/// note_manager.
fn can_read_note(current_user: &CurrentUser, note: &NoteDBResponse) -> Result<(), Error> {
    if note.is_public || note.user_id == current_user.id {
        return Ok(());
    }
    role_gate::NOTE_ADMIN.check(current_user)
}

/// A note can be modified or deleted only by its owner or a note_manager.
/// Public visibility grants no write access.
fn can_modify_note(current_user: &CurrentUser, note: &NoteDBResponse) -> Result<(), Error> {
    if note.user_id == current_user.id {
        return Ok(());
    }
    role_gate::NOTE_ADMIN.check(current_user)
}

// GET /notes - List visible notes
#[utoipa::path(
    get,
    path = "/notes",
    tag = "notes",
    summary = "List notes",
    description = "List unarchived notes. Regular users see their own notes plus public ones; note managers see everything.",
    params(Pagination),
    responses(
        (status = 200, description = "List of notes", body = [NoteResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn list_notes(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    current_user: CurrentUser,
) -> Result<Json<Vec<NoteResponse>>, Error> {
    let pagination = pagination.clamped();

    let visible_to = if role_gate::NOTE_ADMIN.check(&current_user).is_ok() {
        None
    } else {
        Some(current_user.id)
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Notes::new(&mut conn);

    let notes = repo
        .list(&NoteFilter {
            visible_to,
            skip: pagination.skip,
            limit: pagination.limit,
        })
        .await?;

    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

// POST /notes - Create a note owned by the caller
#[utoipa::path(
    post,
    path = "/notes",
    tag = "notes",
    summary = "Create note",
    responses(
        (status = 201, description = "Note created", body = NoteResponse),
        (status = 400, description = "Invalid note data"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn create_note(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(note_data): Json<NoteCreate>,
) -> Result<(StatusCode, Json<NoteResponse>), Error> {
    note_data.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Notes::new(&mut conn);

    let note = repo.create(&note_data.into_db_request(current_user.id)).await?;

    Ok((StatusCode::CREATED, Json(NoteResponse::from(note))))
}

// GET /notes/{note_id} - Get a note
#[utoipa::path(
    get,
    path = "/notes/{note_id}",
    tag = "notes",
    summary = "Get note",
    params(("note_id" = i32, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note information", body = NoteResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn get_note(
    State(state): State<AppState>,
    Path(note_id): Path<NoteId>,
    current_user: CurrentUser,
) -> Result<Json<NoteResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Notes::new(&mut conn);

    let note = repo.get_by_id(note_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Note".to_string(),
        id: note_id.to_string(),
    })?;

    can_read_note(&current_user, &note)?;

    Ok(Json(NoteResponse::from(note)))
}

// PATCH /notes/{note_id} - Update a note (owner or note_manager)
#[utoipa::path(
    patch,
    path = "/notes/{note_id}",
    tag = "notes",
    summary = "Update note",
    params(("note_id" = i32, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note updated", body = NoteResponse),
        (status = 400, description = "Invalid note data"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn update_note(
    State(state): State<AppState>,
    Path(note_id): Path<NoteId>,
    current_user: CurrentUser,
    Json(note_data): Json<NoteUpdate>,
) -> Result<Json<NoteResponse>, Error> {
    note_data.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Notes::new(&mut conn);

    let note = repo.get_by_id(note_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Note".to_string(),
        id: note_id.to_string(),
    })?;

    can_modify_note(&current_user, &note)?;

    let note = repo.update(note_id, &NoteUpdateDBRequest::from(note_data)).await?;

    Ok(Json(NoteResponse::from(note)))
}

// DELETE /notes/{note_id} - Delete a note (owner or note_manager)
#[utoipa::path(
    delete,
    path = "/notes/{note_id}",
    tag = "notes",
    summary = "Delete note",
    params(("note_id" = i32, Path, description = "Note ID")),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_note(
    State(state): State<AppState>,
    Path(note_id): Path<NoteId>,
    current_user: CurrentUser,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Notes::new(&mut conn);

    let note = repo.get_by_id(note_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Note".to_string(),
        id: note_id.to_string(),
    })?;

    can_modify_note(&current_user, &note)?;

    repo.delete(note_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{current_user_fixture, note_fixture};

    #[test]
    fn test_owner_reads_own_private_note() {
        let owner = current_user_fixture(1, "alice", &[]);
        let note = note_fixture(10, 1, false);

        assert!(can_read_note(&owner, &note).is_ok());
    }

    #[test]
    fn test_public_note_readable_by_anyone() {
        let stranger = current_user_fixture(2, "bob", &[]);
        let note = note_fixture(10, 1, true);

        assert!(can_read_note(&stranger, &note).is_ok());
    }

    #[test]
    fn test_private_note_hidden_from_strangers() {
        let stranger = current_user_fixture(2, "bob", &[]);
        let note = note_fixture(10, 1, false);

        assert!(matches!(can_read_note(&stranger, &note), Err(Error::Forbidden)));
    }

    #[test]
    fn test_note_manager_reads_everything() {
        let manager = current_user_fixture(3, "carol", &["note_manager"]);
        let note = note_fixture(10, 1, false);

        assert!(can_read_note(&manager, &note).is_ok());
    }

    #[test]
    fn test_public_flag_grants_no_write_access() {
        // The read rule honors is_public, the write rule must not
        let stranger = current_user_fixture(2, "bob", &[]);
        let note = note_fixture(10, 1, true);

        assert!(can_read_note(&stranger, &note).is_ok());
        assert!(matches!(can_modify_note(&stranger, &note), Err(Error::Forbidden)));
    }

    #[test]
    fn test_owner_and_manager_can_modify() {
        let owner = current_user_fixture(1, "alice", &[]);
        let manager = current_user_fixture(3, "carol", &["note_manager"]);
        let note = note_fixture(10, 1, false);

        assert!(can_modify_note(&owner, &note).is_ok());
        assert!(can_modify_note(&manager, &note).is_ok());
    }
}
