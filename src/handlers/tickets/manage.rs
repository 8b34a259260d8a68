use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use super::ticket_or_404;
use crate::database::models::{Estado, Rol, Ticket, User};
use crate::error::ApiError;
use crate::middleware::{AdminUser, AuthUser};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AsignarConsultorRequest {
    pub consultor_id: i32,
}

/// PUT /tickets/:id/asignar_consultor - assign a consultant (administrators only)
///
/// The target consultant comes from the request body. Assigning an open
/// ticket moves it to en_proceso; later reassignments keep the state.
pub async fn asignar_consultor(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(ticket_id): Path<i32>,
    Json(req): Json<AsignarConsultorRequest>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = ticket_or_404(&state.pool, ticket_id).await?;

    if User::find_by_id(&state.pool, req.consultor_id).await?.is_none() {
        return Err(ApiError::bad_request("El consultor indicado no existe"));
    }

    let estado = match ticket.estado {
        Estado::Abierto => Estado::EnProceso,
        otro => otro,
    };

    let actualizado = sqlx::query_as::<_, Ticket>(
        "UPDATE tickets SET consultor_id = $1, estado = $2 WHERE id = $3 RETURNING *",
    )
    .bind(req.consultor_id)
    .bind(estado)
    .bind(ticket.id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(actualizado))
}

/// PUT /tickets/:id/cerrar_ticket - close a ticket
///
/// Allowed for the assigned consultant and for any administrator.
pub async fn cerrar_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(ticket_id): Path<i32>,
) -> Result<Json<Ticket>, ApiError> {
    let caller = user.account(&state.pool).await?;
    let ticket = ticket_or_404(&state.pool, ticket_id).await?;

    let es_consultor = ticket.consultor_id == Some(caller.id);
    if !es_consultor && user.rol != Rol::Admin {
        return Err(ApiError::forbidden(
            "No tienes permisos para cerrar este ticket",
        ));
    }

    let cerrado = sqlx::query_as::<_, Ticket>(
        "UPDATE tickets SET estado = $1, fecha_cierre = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(Estado::Cerrado)
    .bind(ticket.id)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(cerrado))
}
