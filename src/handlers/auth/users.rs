use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::database::models::{Rol, User};
use crate::error::{self, ApiError};
use crate::handlers::Pagination;
use crate::middleware::AdminUser;
use crate::AppState;

const DUPLICATE_USER: &str =
    "Ya existe un usuario con ese nombre de usuario o correo electrónico";

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub correo: String,
    pub username: String,
    pub password: String,
    pub rol: Rol,
    pub estatus: Option<String>,
}

/// Partial update: only fields present in the body overwrite stored values.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub correo: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub rol: Option<Rol>,
    pub estatus: Option<String>,
}

/// POST /auth/create_user - create an account (administrators only)
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if User::exists_with_username_or_correo(&state.pool, &req.username, &req.correo).await? {
        return Err(ApiError::conflict(DUPLICATE_USER));
    }

    let password_hash = auth::hash_password(&req.password)?;
    let estatus = req.estatus.unwrap_or_else(|| "activo".to_string());

    let result = sqlx::query(
        "INSERT INTO users (correo, username, password_hash, rol, estatus)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&req.correo)
    .bind(&req.username)
    .bind(&password_hash)
    .bind(req.rol)
    .bind(&estatus)
    .execute(&state.pool)
    .await;

    match result {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(json!({ "message": "Usuario creado correctamente" })),
        )),
        // Backstop for the race between the pre-check and the insert.
        Err(e) if error::is_unique_violation(&e) => Err(ApiError::conflict(DUPLICATE_USER)),
        Err(e) => Err(e.into()),
    }
}

/// GET /auth/users - paginated listing (administrators only)
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = User::list(&state.pool, page.skip, page.limit).await?;
    Ok(Json(users))
}

/// GET /auth/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(user_id): Path<i32>,
) -> Result<Json<User>, ApiError> {
    let user = User::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Usuario no encontrado"))?;
    Ok(Json(user))
}

/// PUT /auth/users/:id - partial update
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(user_id): Path<i32>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let mut user = User::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Usuario no encontrado"))?;

    if let Some(correo) = req.correo {
        user.correo = correo;
    }
    if let Some(username) = req.username {
        user.username = username;
    }
    if let Some(rol) = req.rol {
        user.rol = rol;
    }
    if let Some(estatus) = req.estatus {
        user.estatus = estatus;
    }
    if let Some(password) = req.password {
        user.password_hash = auth::hash_password(&password)?;
    }

    let result = sqlx::query_as::<_, User>(
        "UPDATE users SET correo = $1, username = $2, password_hash = $3, rol = $4, estatus = $5
         WHERE id = $6 RETURNING *",
    )
    .bind(&user.correo)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(user.rol)
    .bind(&user.estatus)
    .bind(user_id)
    .fetch_one(&state.pool)
    .await;

    match result {
        Ok(updated) => Ok(Json(updated)),
        Err(e) if error::is_unique_violation(&e) => Err(ApiError::conflict(DUPLICATE_USER)),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /auth/users/:id - hard delete
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(user_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&state.pool)
        .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => {
            Err(ApiError::not_found("Usuario no encontrado"))
        }
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        Err(e) if error::is_foreign_key_violation(&e) => Err(ApiError::conflict(
            "No se puede eliminar el usuario porque tiene tickets o mensajes asociados",
        )),
        Err(e) => Err(e.into()),
    }
}
