use axum::extract::State;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::database::models::User;
use crate::error::ApiError;
use crate::AppState;

/// OAuth2 password form. The `username` field carries the account email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// POST /auth/login - authenticate with email + password (form-encoded)
///
/// A wrong email and a wrong password produce the same response, so the
/// endpoint does not reveal which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = User::find_by_correo(&state.pool, &form.username)
        .await?
        .ok_or_else(|| ApiError::bad_request("credenciales incorrectas"))?;

    if !auth::verify_password(&form.password, &user.password_hash) {
        return Err(ApiError::bad_request("credenciales incorrectas"));
    }

    let (access_token, refresh_token) = auth::issue_tokens(&state.config.security, &user)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        refresh_token,
    }))
}

/// POST /auth/refresh - mint a new access token from a valid refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let claims = auth::validate_token(&state.config.security, &req.refresh_token)?;
    let access_token = auth::reissue_access_token(&state.config.security, &claims)?;

    Ok(Json(AccessTokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
