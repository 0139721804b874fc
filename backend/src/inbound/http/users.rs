//! Account API handlers.
//!
//! ```text
//! POST /api/v1/register {"username":"alice","password":"correct horse"}
//! POST /api/v1/login    {"username":"alice","password":"correct horse"}
//! POST /api/v1/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    ApiResult, CredentialValidationError, Error, LoginCredentials, RegistrationCredentials,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::AppState;

/// Credential request body shared by registration and login.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    /// Login name.
    pub username: String,
    /// Plaintext password; never stored.
    pub password: String,
}

fn map_credential_validation_error(err: CredentialValidationError) -> Error {
    let (field, code) = match &err {
        CredentialValidationError::Username(_) => ("username", "invalid_username"),
        CredentialValidationError::EmptyPassword => ("password", "empty_password"),
        CredentialValidationError::PasswordTooShort => ("password", "password_too_short"),
    };
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": field, "code": code }))
}

/// Create a new account.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        RegistrationCredentials::try_from_parts(&payload.username, &payload.password)
            .map_err(map_credential_validation_error)?;
    let user_id = state.onboarding.register(&credentials).await?;
    Ok(HttpResponse::Created().json(json!({ "id": user_id.to_string() })))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from_parts(&payload.username, &payload.password)
        .map_err(map_credential_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Drop the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tags = ["accounts"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.purge();
    Ok(HttpResponse::NoContent().finish())
}
