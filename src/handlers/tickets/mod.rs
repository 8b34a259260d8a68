pub mod create;
pub mod listing;
pub mod manage;
pub mod messages;

use sqlx::PgPool;

use crate::database::models::Ticket;
use crate::error::ApiError;

pub(crate) async fn ticket_or_404(pool: &PgPool, ticket_id: i32) -> Result<Ticket, ApiError> {
    Ticket::find_by_id(pool, ticket_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ticket no encontrado"))
}
