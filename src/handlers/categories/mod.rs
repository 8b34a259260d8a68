use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::database::models::Category;
use crate::error::{self, ApiError};
use crate::handlers::Pagination;
use crate::middleware::AdminUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub nombre: String,
    pub descripcion: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
}

fn duplicate_category(nombre: &str) -> ApiError {
    ApiError::conflict(format!("La categoría con el nombre '{}' ya existe", nombre))
}

/// POST /categories - create a category (administrators only)
pub async fn create_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let result = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (nombre, descripcion) VALUES ($1, $2) RETURNING *",
    )
    .bind(&req.nombre)
    .bind(&req.descripcion)
    .fetch_one(&state.pool)
    .await;

    match result {
        Ok(category) => Ok((StatusCode::CREATED, Json(category))),
        Err(e) if error::is_unique_violation(&e) => Err(duplicate_category(&req.nombre)),
        Err(e) => Err(e.into()),
    }
}

/// GET /categories - public paginated listing
pub async fn list_categories(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = Category::list(&state.pool, page.skip, page.limit).await?;
    Ok(Json(categories))
}

/// GET /categories/:id - public fetch
pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<i32>,
) -> Result<Json<Category>, ApiError> {
    let category = Category::find_by_id(&state.pool, category_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Categoría no encontrada"))?;
    Ok(Json(category))
}

/// PUT /categories/:id - partial update (administrators only)
pub async fn update_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(category_id): Path<i32>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let mut category = Category::find_by_id(&state.pool, category_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Categoría no encontrada"))?;

    if let Some(nombre) = req.nombre {
        category.nombre = nombre;
    }
    if let Some(descripcion) = req.descripcion {
        category.descripcion = Some(descripcion);
    }

    let result = sqlx::query_as::<_, Category>(
        "UPDATE categories SET nombre = $1, descripcion = $2 WHERE id = $3 RETURNING *",
    )
    .bind(&category.nombre)
    .bind(&category.descripcion)
    .bind(category_id)
    .fetch_one(&state.pool)
    .await;

    match result {
        Ok(updated) => Ok(Json(updated)),
        Err(e) if error::is_unique_violation(&e) => Err(duplicate_category(&category.nombre)),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /categories/:id - blocked while tickets still reference the category
pub async fn delete_category(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(category_id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    let dependientes = Category::dependent_tickets(&state.pool, category_id).await?;
    if dependientes > 0 {
        return Err(ApiError::conflict(
            "No se puede eliminar la categoría porque tiene tickets asociados",
        ));
    }

    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(category_id)
        .execute(&state.pool)
        .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => {
            Err(ApiError::not_found("Categoría no encontrada"))
        }
        Ok(_) => Ok(StatusCode::NO_CONTENT),
        // Backstop: a ticket may reference the category between the check
        // and the delete.
        Err(e) if error::is_foreign_key_violation(&e) => Err(ApiError::conflict(
            "No se puede eliminar la categoría porque tiene tickets asociados",
        )),
        Err(e) => Err(e.into()),
    }
}
