use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;
use crate::database::models::{Rol, User};
use crate::error::ApiError;

/// Claims carried by both access and refresh tokens. The role is the closed
/// `Rol` type, decoded once here and never re-parsed by handlers.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the account.
    pub sub: String,
    pub email: String,
    pub rol: Rol,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    fn new(sub: String, email: String, rol: Rol, lifetime_secs: u64) -> Self {
        let now = Utc::now();
        Self {
            sub,
            email,
            rol,
            exp: (now + Duration::seconds(lifetime_secs as i64)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

fn sign(security: &SecurityConfig, claims: &Claims) -> Result<String, ApiError> {
    let key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), claims, &key).map_err(|e| {
        tracing::error!("token signing failed: {}", e);
        ApiError::internal_server_error("No se pudo emitir el token")
    })
}

/// Issue the access/refresh pair for a freshly authenticated account.
pub fn issue_tokens(security: &SecurityConfig, user: &User) -> Result<(String, String), ApiError> {
    let access = sign(
        security,
        &Claims::new(
            user.username.clone(),
            user.correo.clone(),
            user.rol,
            security.access_token_secs,
        ),
    )?;
    let refresh = sign(
        security,
        &Claims::new(
            user.username.clone(),
            user.correo.clone(),
            user.rol,
            security.refresh_token_secs,
        ),
    )?;
    Ok((access, refresh))
}

/// Mint a new access token from the claims of a validated refresh token,
/// preserving identity and role.
pub fn reissue_access_token(security: &SecurityConfig, claims: &Claims) -> Result<String, ApiError> {
    sign(
        security,
        &Claims::new(
            claims.sub.clone(),
            claims.email.clone(),
            claims.rol,
            security.access_token_secs,
        ),
    )
}

/// Validate signature and expiry, returning the decoded claims.
/// Zero leeway: an expired token is rejected immediately.
pub fn validate_token(security: &SecurityConfig, token: &str) -> Result<Claims, ApiError> {
    let key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ApiError::unauthorized("Token expirado")
            }
            _ => ApiError::unauthorized("Token inválido"),
        })
}

/// Hash a password with a per-hash random salt. Only the PHC string is
/// stored; the plaintext never reaches the database.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("password hashing failed: {}", e);
            ApiError::internal_server_error("No se pudo procesar la contraseña")
        })
}

/// Constant-time verification against the stored PHC string. A malformed
/// stored hash counts as a failed verification.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
