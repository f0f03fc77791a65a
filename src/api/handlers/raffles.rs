//! Raffle endpoints.
//!
//! Any authenticated user can browse raffles and enter open ones. Managing a
//! raffle, including drawing its winner, is reserved for the raffle's owner
//! or a raffle_manager.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use rand::Rng;

use crate::{
    AppState,
    api::models::{
        pagination::Pagination,
        raffles::{RaffleCreate, RaffleEntryResponse, RaffleResponse, RaffleUpdate},
        users::CurrentUser,
    },
    auth::role_gate,
    db::{
        handlers::{Repository, raffles::RaffleFilter, raffles::Raffles},
        models::raffles::{RaffleDBResponse, RaffleEntryDBResponse, RaffleUpdateDBRequest},
    },
    errors::Error,
    types::RaffleId,
};

/// A raffle can be managed only by its owner or a raffle_manager.
fn can_manage_raffle(current_user: &CurrentUser, raffle: &RaffleDBResponse) -> Result<(), Error> {
    if raffle.user_id == current_user.id {
        return Ok(());
    }
    role_gate::RAFFLE_ADMIN.check(current_user)
}

/// Pick a winning entry uniformly at random.
fn pick_winner(entries: &[RaffleEntryDBResponse]) -> Option<&RaffleEntryDBResponse> {
    if entries.is_empty() {
        return None;
    }
    let index = rand::rng().random_range(0..entries.len());
    entries.get(index)
}

/// Map the guarded entry insert's outcome. Zero rows means the raffle closed
/// between the existence check and the insert.
fn entry_accepted(entered: bool) -> Result<(), Error> {
    if entered {
        Ok(())
    } else {
        Err(Error::BadRequest {
            message: "Raffle is closed".to_string(),
        })
    }
}

/// Map the guarded winner update's outcome. `None` means another draw closed
/// the raffle first; its recorded winner stands.
fn winner_recorded(raffle: Option<RaffleDBResponse>) -> Result<RaffleDBResponse, Error> {
    raffle.ok_or_else(|| Error::BadRequest {
        message: "Raffle is already closed".to_string(),
    })
}

// GET /raffles - List raffles
#[utoipa::path(
    get,
    path = "/raffles",
    tag = "raffles",
    summary = "List raffles",
    params(Pagination),
    responses(
        (status = 200, description = "List of raffles", body = [RaffleResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn list_raffles(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
    _current_user: CurrentUser,
) -> Result<Json<Vec<RaffleResponse>>, Error> {
    let pagination = pagination.clamped();
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Raffles::new(&mut conn);

    let raffles = repo.list(&RaffleFilter::new(pagination.skip, pagination.limit)).await?;

    Ok(Json(raffles.into_iter().map(RaffleResponse::from).collect()))
}

// POST /raffles - Create a raffle owned by the caller
#[utoipa::path(
    post,
    path = "/raffles",
    tag = "raffles",
    summary = "Create raffle",
    responses(
        (status = 201, description = "Raffle created", body = RaffleResponse),
        (status = 400, description = "Invalid raffle data"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn create_raffle(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(raffle_data): Json<RaffleCreate>,
) -> Result<(StatusCode, Json<RaffleResponse>), Error> {
    raffle_data.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Raffles::new(&mut conn);

    let raffle = repo.create(&raffle_data.into_db_request(current_user.id)).await?;

    Ok((StatusCode::CREATED, Json(RaffleResponse::from(raffle))))
}

// GET /raffles/{raffle_id} - Get a raffle
#[utoipa::path(
    get,
    path = "/raffles/{raffle_id}",
    tag = "raffles",
    summary = "Get raffle",
    params(("raffle_id" = i32, Path, description = "Raffle ID")),
    responses(
        (status = 200, description = "Raffle information", body = RaffleResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Raffle not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn get_raffle(
    State(state): State<AppState>,
    Path(raffle_id): Path<RaffleId>,
    _current_user: CurrentUser,
) -> Result<Json<RaffleResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Raffles::new(&mut conn);

    let raffle = repo.get_by_id(raffle_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Raffle".to_string(),
        id: raffle_id.to_string(),
    })?;

    Ok(Json(RaffleResponse::from(raffle)))
}

// PATCH /raffles/{raffle_id} - Update a raffle (owner or raffle_manager)
#[utoipa::path(
    patch,
    path = "/raffles/{raffle_id}",
    tag = "raffles",
    summary = "Update raffle",
    params(("raffle_id" = i32, Path, description = "Raffle ID")),
    responses(
        (status = 200, description = "Raffle updated", body = RaffleResponse),
        (status = 400, description = "Invalid raffle data"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Raffle not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn update_raffle(
    State(state): State<AppState>,
    Path(raffle_id): Path<RaffleId>,
    current_user: CurrentUser,
    Json(raffle_data): Json<RaffleUpdate>,
) -> Result<Json<RaffleResponse>, Error> {
    raffle_data.validate()?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Raffles::new(&mut conn);

    let raffle = repo.get_by_id(raffle_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Raffle".to_string(),
        id: raffle_id.to_string(),
    })?;

    can_manage_raffle(&current_user, &raffle)?;

    let raffle = repo.update(raffle_id, &RaffleUpdateDBRequest::from(raffle_data)).await?;

    Ok(Json(RaffleResponse::from(raffle)))
}

// DELETE /raffles/{raffle_id} - Delete a raffle (owner or raffle_manager)
#[utoipa::path(
    delete,
    path = "/raffles/{raffle_id}",
    tag = "raffles",
    summary = "Delete raffle",
    params(("raffle_id" = i32, Path, description = "Raffle ID")),
    responses(
        (status = 204, description = "Raffle deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Raffle not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn delete_raffle(
    State(state): State<AppState>,
    Path(raffle_id): Path<RaffleId>,
    current_user: CurrentUser,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Raffles::new(&mut conn);

    let raffle = repo.get_by_id(raffle_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Raffle".to_string(),
        id: raffle_id.to_string(),
    })?;

    can_manage_raffle(&current_user, &raffle)?;

    repo.delete(raffle_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /raffles/{raffle_id}/entries - Enter the raffle as the caller
#[utoipa::path(
    post,
    path = "/raffles/{raffle_id}/entries",
    tag = "raffles",
    summary = "Enter raffle",
    params(("raffle_id" = i32, Path, description = "Raffle ID")),
    responses(
        (status = 201, description = "Entered"),
        (status = 400, description = "Raffle is closed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Raffle not found"),
        (status = 409, description = "Already entered"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn enter_raffle(
    State(state): State<AppState>,
    Path(raffle_id): Path<RaffleId>,
    current_user: CurrentUser,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Raffles::new(&mut conn);

    repo.get_by_id(raffle_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Raffle".to_string(),
        id: raffle_id.to_string(),
    })?;

    let entered = repo.add_entry(raffle_id, current_user.id).await?;
    entry_accepted(entered)?;

    Ok(StatusCode::CREATED)
}

// GET /raffles/{raffle_id}/entries - List raffle entries
#[utoipa::path(
    get,
    path = "/raffles/{raffle_id}/entries",
    tag = "raffles",
    summary = "List raffle entries",
    params(("raffle_id" = i32, Path, description = "Raffle ID")),
    responses(
        (status = 200, description = "Entries", body = [RaffleEntryResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Raffle not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn list_raffle_entries(
    State(state): State<AppState>,
    Path(raffle_id): Path<RaffleId>,
    _current_user: CurrentUser,
) -> Result<Json<Vec<RaffleEntryResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Raffles::new(&mut conn);

    repo.get_by_id(raffle_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Raffle".to_string(),
        id: raffle_id.to_string(),
    })?;

    let entries = repo.list_entries(raffle_id).await?;

    Ok(Json(entries.into_iter().map(RaffleEntryResponse::from).collect()))
}

// POST /raffles/{raffle_id}/draw - Draw a winner and close the raffle
#[utoipa::path(
    post,
    path = "/raffles/{raffle_id}/draw",
    tag = "raffles",
    summary = "Draw raffle winner",
    description = "Pick a winner uniformly at random among the entries and close the raffle",
    params(("raffle_id" = i32, Path, description = "Raffle ID")),
    responses(
        (status = 200, description = "Winner drawn", body = RaffleResponse),
        (status = 400, description = "Raffle closed or has no entries"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Raffle not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_token" = []))
)]
pub async fn draw_raffle(
    State(state): State<AppState>,
    Path(raffle_id): Path<RaffleId>,
    current_user: CurrentUser,
) -> Result<Json<RaffleResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Raffles::new(&mut conn);

    let raffle = repo.get_by_id(raffle_id).await?.ok_or_else(|| Error::NotFound {
        resource: "Raffle".to_string(),
        id: raffle_id.to_string(),
    })?;

    can_manage_raffle(&current_user, &raffle)?;

    if !raffle.is_open {
        return Err(Error::BadRequest {
            message: "Raffle is already closed".to_string(),
        });
    }

    let entries = repo.list_entries(raffle_id).await?;
    let winner = pick_winner(&entries).ok_or_else(|| Error::BadRequest {
        message: "Raffle has no entries".to_string(),
    })?;

    // A concurrent draw may have closed the raffle since the check above;
    // the guarded update loses cleanly instead of replacing its winner
    let raffle = winner_recorded(repo.set_winner(raffle_id, winner.user_id).await?)?;

    Ok(Json(RaffleResponse::from(raffle)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{current_user_fixture, raffle_entry_fixture, raffle_fixture};

    #[test]
    fn test_owner_and_manager_can_manage() {
        let raffle = raffle_fixture(5, 1, true);

        let owner = current_user_fixture(1, "alice", &[]);
        assert!(can_manage_raffle(&owner, &raffle).is_ok());

        let manager = current_user_fixture(2, "bob", &["raffle_manager"]);
        assert!(can_manage_raffle(&manager, &raffle).is_ok());

        let stranger = current_user_fixture(3, "carol", &["note_manager"]);
        assert!(matches!(can_manage_raffle(&stranger, &raffle), Err(Error::Forbidden)));
    }

    #[test]
    fn test_pick_winner_empty_entries() {
        assert!(pick_winner(&[]).is_none());
    }

    #[test]
    fn test_pick_winner_single_entry() {
        let entries = vec![raffle_entry_fixture(5, 9, "dan")];
        assert_eq!(pick_winner(&entries).unwrap().user_id, 9);
    }

    #[test]
    fn test_pick_winner_stays_in_bounds() {
        let entries: Vec<_> = (1..=10).map(|id| raffle_entry_fixture(5, id, "user")).collect();

        for _ in 0..100 {
            let winner = pick_winner(&entries).unwrap();
            assert!((1..=10).contains(&winner.user_id));
        }
    }

    #[test]
    fn test_losing_a_concurrent_draw_is_a_client_error() {
        // The draw that finds the raffle already closed must surface a 400,
        // not overwrite the winner and not pretend the raffle is missing
        let err = winner_recorded(None).unwrap_err();
        assert!(matches!(err, Error::BadRequest { ref message } if message == "Raffle is already closed"));

        let raffle = raffle_fixture(5, 1, false);
        assert_eq!(winner_recorded(Some(raffle)).unwrap().id, 5);
    }

    #[test]
    fn test_entry_into_closed_raffle_rejected() {
        let err = entry_accepted(false).unwrap_err();
        assert!(matches!(err, Error::BadRequest { ref message } if message == "Raffle is closed"));

        assert!(entry_accepted(true).is_ok());
    }
}
