//! Login endpoint.

use axum::{extract::State, response::Json};

use crate::{
    AppState, auth,
    api::models::auth::{LoginRequest, TokenResponse},
    errors::Error,
};

// POST /token - Exchange credentials for a bearer token
#[utoipa::path(
    post,
    path = "/token",
    tag = "auth",
    summary = "Log in",
    description = "Exchange a username and password for a bearer token",
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Incorrect username or password"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<TokenResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let user = auth::authenticate(&mut conn, &request.username, &request.password).await?;
    let token = state.tokens.issue(&user.username)?;

    Ok(Json(TokenResponse::bearer(token)))
}
