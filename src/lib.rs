//! # corkboard: notes and raffles behind token authentication
//!
//! `corkboard` is a small REST service for keeping notes and running raffles.
//! It manages users and roles, authenticates requests with stateless bearer
//! tokens, and applies role-based authorization with ownership overrides where
//! a resource has a natural owner.
//!
//! ## Overview
//!
//! Every request except login and the health check carries an
//! `Authorization: Bearer <token>` header. Tokens are HS256 JWTs issued by
//! `POST /token` in exchange for a username and password; passwords are stored
//! as Argon2id hashes and never leave the database layer in plaintext.
//!
//! Authorization combines two mechanisms. Role gates ([`auth::role_gate`])
//! guard administrative surfaces: `user_manager` for user and role
//! management, `note_manager` and `raffle_manager` for cross-user access to
//! notes and raffles. Ownership checks let regular users act on their own
//! resources without any role, and the two compose per route: owning a
//! resource bypasses the gate, holding the role bypasses ownership.
//!
//! The **API layer** ([`api`]) exposes RESTful CRUD over users, roles, notes,
//! and raffles, plus raffle entries and a draw operation that picks a winner
//! uniformly at random. Interactive documentation is served at `/docs` and
//! uploaded profile images at `/images`.
//!
//! The **database layer** ([`db`]) uses the repository pattern over
//! PostgreSQL. Each entity has a repository handling queries and mutations,
//! with persistence models kept separate from the wire models.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use corkboard::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = corkboard::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     corkboard::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options. A database URL and a
//! token signing secret are required; everything else has defaults.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{delete, get, patch, post},
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    auth::token::TokenService,
    db::handlers::{Repository, users::Users},
    db::models::users::UserCreateDBRequest,
    errors::Error,
    openapi::ApiDoc,
};

pub use config::Config;
pub use types::{NoteId, RaffleId, RoleId, UserId};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub tokens: Arc<TokenService>,
}

/// Get the corkboard database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: creates the account with every seeded role on first startup,
/// or re-keys its password on subsequent ones. Called during startup when an
/// `admin` section is configured.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(username: &str, password: &str, fullname: &str, db: &PgPool) -> Result<UserId, Error> {
    let password_hash = auth::password::hash_password(password)?;

    let mut tx = db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let role_ids: Vec<RoleId> = sqlx::query_scalar("SELECT id FROM roles ORDER BY id")
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.into()))?;

    let mut users = Users::new(&mut tx);

    if let Some(existing) = users.get_user_by_username(username).await? {
        users.update_password(existing.id, &password_hash).await?;
        tx.commit().await.map_err(|e| Error::Database(e.into()))?;
        return Ok(existing.id);
    }

    let created = users
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            fullname: fullname.to_string(),
            age: None,
            password_hash: Some(password_hash),
            role_ids,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    Ok(created.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let wildcard = config.cors.allowed_origins.iter().any(|origin| origin == "*");

    // tower-http panics on this combination at request time; fail at startup
    // instead, like a missing signing secret does
    if wildcard && config.cors.allow_credentials {
        anyhow::bail!("cors.allowed_origins \"*\" cannot be combined with cors.allow_credentials");
    }

    let allow_origin = if wildcard {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            origins.push(origin.parse::<HeaderValue>()?);
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(config.cors.allow_credentials);

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let max_image_size = state.config.uploads.max_image_size as usize;
    let uploads_dir = state.config.uploads.dir.clone();

    let api_routes = Router::new()
        .route("/token", post(api::handlers::auth::login))
        // User management
        .route("/users", get(api::handlers::users::list_users))
        .route("/users", post(api::handlers::users::create_user))
        .route("/users/{user_id}", get(api::handlers::users::get_user))
        .route("/users/{user_id}", patch(api::handlers::users::update_user))
        .route("/users/{user_id}/password", patch(api::handlers::users::change_password))
        .route(
            "/users/{user_id}/image",
            post(api::handlers::users::upload_user_image).layer(DefaultBodyLimit::max(max_image_size)),
        )
        // Role management
        .route("/roles", get(api::handlers::roles::list_roles))
        .route("/roles", post(api::handlers::roles::create_role))
        .route("/roles/{role_id}", get(api::handlers::roles::get_role))
        .route("/roles/{role_id}", patch(api::handlers::roles::update_role))
        // Notes
        .route("/notes", get(api::handlers::notes::list_notes))
        .route("/notes", post(api::handlers::notes::create_note))
        .route("/notes/{note_id}", get(api::handlers::notes::get_note))
        .route("/notes/{note_id}", patch(api::handlers::notes::update_note))
        .route("/notes/{note_id}", delete(api::handlers::notes::delete_note))
        // Raffles
        .route("/raffles", get(api::handlers::raffles::list_raffles))
        .route("/raffles", post(api::handlers::raffles::create_raffle))
        .route("/raffles/{raffle_id}", get(api::handlers::raffles::get_raffle))
        .route("/raffles/{raffle_id}", patch(api::handlers::raffles::update_raffle))
        .route("/raffles/{raffle_id}", delete(api::handlers::raffles::delete_raffle))
        .route("/raffles/{raffle_id}/entries", post(api::handlers::raffles::enter_raffle))
        .route("/raffles/{raffle_id}/entries", get(api::handlers::raffles::list_raffle_entries))
        .route("/raffles/{raffle_id}/draw", post(api::handlers::raffles::draw_raffle))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(api_routes)
        // Uploaded profile images are served as static files
        .nest_service("/images", ServeDir::new(uploads_dir))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, and bootstraps the admin account
/// 2. **Serve**: [`Application::serve`] binds the TCP port and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting corkboard with configuration: {:#?}", config);

        let database_url = config.require_database_url()?.to_string();
        let pool = PgPoolOptions::new().max_connections(10).connect(&database_url).await?;
        migrator().run(&pool).await?;

        tokio::fs::create_dir_all(&config.uploads.dir).await?;

        if let Some(admin) = &config.admin {
            create_initial_admin_user(&admin.username, &admin.password, &admin.fullname, &pool).await?;
        }

        let tokens = Arc::new(TokenService::from_config(&config)?);
        let state = AppState {
            db: pool.clone(),
            config: config.clone(),
            tokens,
        };

        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("corkboard listening on http://{bind_addr}");

        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_accepts_wildcard_and_explicit_origins() {
        let wildcard = Config::default();
        assert!(create_cors_layer(&wildcard).is_ok());

        let mut explicit = Config::default();
        explicit.cors.allowed_origins = vec!["https://app.example.com".to_string(), "http://localhost:3000".to_string()];
        assert!(create_cors_layer(&explicit).is_ok());

        let mut broken = Config::default();
        broken.cors.allowed_origins = vec!["not a header\nvalue".to_string()];
        assert!(create_cors_layer(&broken).is_err());
    }

    #[test]
    fn test_wildcard_origin_with_credentials_rejected_at_startup() {
        let mut config = Config::default();
        config.cors.allow_credentials = true;
        assert!(create_cors_layer(&config).is_err());

        // Credentialed requests are fine with explicit origins
        config.cors.allowed_origins = vec!["https://app.example.com".to_string()];
        assert!(create_cors_layer(&config).is_ok());
    }
}
