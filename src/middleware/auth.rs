use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use sqlx::PgPool;

use crate::auth::{self, Claims};
use crate::database::models::{Rol, User};
use crate::error::ApiError;
use crate::AppState;

/// Authenticated caller context extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub username: String,
    pub correo: String,
    pub rol: Rol,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            correo: claims.email,
            rol: claims.rol,
        }
    }
}

impl AuthUser {
    /// Resolve the caller's account row from the identity claim. The account
    /// may have been deleted after the token was issued.
    pub async fn account(&self, pool: &PgPool) -> Result<User, ApiError> {
        User::find_by_username(pool, &self.username)
            .await?
            .ok_or_else(|| ApiError::unauthorized("La cuenta del token ya no existe"))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(&parts.headers)?;
        let claims = auth::validate_token(&state.config.security, &token)?;
        Ok(AuthUser::from(claims))
    }
}

/// Role gate: the handler body runs only for administrators.
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.rol != Rol::Admin {
            return Err(ApiError::forbidden(
                "Usuario no tiene permisos de administrador",
            ));
        }
        Ok(AdminUser(user))
    }
}

/// Role gate: the handler body runs only for normal users.
pub struct NormalUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for NormalUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.rol != Rol::Normal {
            return Err(ApiError::forbidden(
                "Operación disponible solo para usuarios normales",
            ));
        }
        Ok(NormalUser(user))
    }
}

/// Extract the bearer token from the Authorization header
fn extract_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Falta la cabecera Authorization"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Cabecera Authorization inválida"))?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err(ApiError::unauthorized("Token vacío"));
        }
        Ok(token.to_string())
    } else {
        Err(ApiError::unauthorized(
            "La cabecera Authorization debe usar el esquema Bearer",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn rejects_missing_header() {
        let headers = HeaderMap::new();
        let err = extract_bearer(&headers).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer(&headers).is_err());
    }

    #[test]
    fn rejects_empty_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_bearer(&headers).is_err());
    }

    #[test]
    fn accepts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer(&headers).unwrap(), "abc.def.ghi");
    }
}
