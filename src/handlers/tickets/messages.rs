use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ticket_or_404;
use crate::database::models::{MensajeDetalle, Rol, TicketChat};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageQuery {
    pub id_ticket: i32,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub mensaje: String,
}

/// POST /tickets/send_message?id_ticket= - append a message to a ticket
///
/// Only the ticket owner or an administrator may write to the thread.
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SendMessageQuery>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<TicketChat>), ApiError> {
    let autor = user.account(&state.pool).await?;
    let ticket = ticket_or_404(&state.pool, query.id_ticket).await?;

    if ticket.usuario_id != autor.id && user.rol != Rol::Admin {
        return Err(ApiError::forbidden(
            "No tienes permisos para enviar mensajes a este ticket",
        ));
    }

    let chat = sqlx::query_as::<_, TicketChat>(
        "INSERT INTO ticket_chats (ticket_id, autor_id, mensaje) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(ticket.id)
    .bind(autor.id)
    .bind(&req.mensaje)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(chat)))
}

/// GET /tickets/:id/mensajes - thread of a ticket in stored order
pub async fn list_messages(
    State(state): State<AppState>,
    user: AuthUser,
    Path(ticket_id): Path<i32>,
) -> Result<Json<Vec<MensajeDetalle>>, ApiError> {
    let caller = user.account(&state.pool).await?;
    let ticket = ticket_or_404(&state.pool, ticket_id).await?;

    if ticket.usuario_id != caller.id && user.rol != Rol::Admin {
        return Err(ApiError::forbidden(
            "No tienes permisos para ver los mensajes de este ticket",
        ));
    }

    let mensajes = TicketChat::list_detalles(&state.pool, ticket.id).await?;
    Ok(Json(mensajes))
}
