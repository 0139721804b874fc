//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API: every
//! HTTP endpoint from the inbound layer, the shared error schema, and the
//! session cookie security scheme. Swagger UI serves the document in debug
//! builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Ticket sales backend API",
        description = "Session-authenticated match browsing, cart, and race-free checkout."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::matches::list_matches,
        crate::inbound::http::cart::view_cart,
        crate::inbound::http::cart::add_to_cart,
        crate::inbound::http::cart::remove_from_cart,
        crate::inbound::http::checkout::checkout,
        crate::inbound::http::tickets::list_tickets,
        crate::inbound::http::tickets::cancel_ticket,
        crate::inbound::http::tickets::validate_ticket,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::inbound::http::users::CredentialsRequest,
        crate::inbound::http::matches::MatchSummary,
        crate::inbound::http::cart::CartLineView,
        crate::inbound::http::cart::CartView,
        crate::inbound::http::checkout::CheckoutResponse,
        crate::inbound::http::tickets::TicketView,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use utoipa::OpenApi as _;

    use super::*;

    #[test]
    fn document_builds_and_lists_the_checkout_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/checkout"));
        assert!(doc.paths.paths.contains_key("/api/v1/matches"));
    }
}
