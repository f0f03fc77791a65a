//! OpenAPI documentation for the API, served at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

/// Registers the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearer_token".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Bearer token authentication. Obtain a token from `POST /token` and \
                             include it in the `Authorization` header:\n\n\
                             ```\nAuthorization: Bearer YOUR_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::login,
        api::handlers::users::list_users,
        api::handlers::users::create_user,
        api::handlers::users::get_user,
        api::handlers::users::update_user,
        api::handlers::users::change_password,
        api::handlers::users::upload_user_image,
        api::handlers::roles::list_roles,
        api::handlers::roles::create_role,
        api::handlers::roles::get_role,
        api::handlers::roles::update_role,
        api::handlers::notes::list_notes,
        api::handlers::notes::create_note,
        api::handlers::notes::get_note,
        api::handlers::notes::update_note,
        api::handlers::notes::delete_note,
        api::handlers::raffles::list_raffles,
        api::handlers::raffles::create_raffle,
        api::handlers::raffles::get_raffle,
        api::handlers::raffles::update_raffle,
        api::handlers::raffles::delete_raffle,
        api::handlers::raffles::enter_raffle,
        api::handlers::raffles::list_raffle_entries,
        api::handlers::raffles::draw_raffle,
    ),
    components(schemas(
        api::models::auth::LoginRequest,
        api::models::auth::TokenResponse,
        api::models::auth::PasswordChange,
        api::models::users::UserCreate,
        api::models::users::UserUpdate,
        api::models::users::UserResponse,
        api::models::roles::RoleCreate,
        api::models::roles::RoleUpdate,
        api::models::roles::RoleResponse,
        api::models::notes::NoteCreate,
        api::models::notes::NoteUpdate,
        api::models::notes::NoteResponse,
        api::models::raffles::RaffleCreate,
        api::models::raffles::RaffleUpdate,
        api::models::raffles::RaffleResponse,
        api::models::raffles::RaffleEntryResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "users", description = "User management"),
        (name = "roles", description = "Role management"),
        (name = "notes", description = "Notes"),
        (name = "raffles", description = "Raffles"),
    ),
    info(
        title = "corkboard",
        description = "Notes and raffles service with token authentication and role-based access control"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();

        let paths: Vec<_> = spec.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/token".to_string()));
        assert!(paths.contains(&"/users/{user_id}/password".to_string()));
        assert!(paths.contains(&"/raffles/{raffle_id}/draw".to_string()));

        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_token"));
    }
}
