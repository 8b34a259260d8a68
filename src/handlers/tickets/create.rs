use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::database::models::{Category, Prioridad, Ticket, Urgencia};
use crate::error::ApiError;
use crate::middleware::NormalUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub asunto: String,
    pub descripcion: String,
    pub categoria_id: i32,
    pub urgencia: Urgencia,
    pub prioridad: Prioridad,
}

/// POST /tickets/create_ticket - open a ticket owned by the caller
///
/// Restricted to normal users: administrators attend tickets, they do not
/// open them. The owner comes from the identity claim, never from the body.
pub async fn create_ticket(
    State(state): State<AppState>,
    NormalUser(user): NormalUser,
    Json(req): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let owner = user.account(&state.pool).await?;

    if Category::find_by_id(&state.pool, req.categoria_id).await?.is_none() {
        return Err(ApiError::bad_request("La categoría indicada no existe"));
    }

    let ticket = sqlx::query_as::<_, Ticket>(
        "INSERT INTO tickets (asunto, descripcion, categoria_id, urgencia, prioridad, usuario_id)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(&req.asunto)
    .bind(&req.descripcion)
    .bind(req.categoria_id)
    .bind(req.urgencia)
    .bind(req.prioridad)
    .bind(owner.id)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}
