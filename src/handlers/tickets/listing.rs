use axum::extract::State;
use axum::Json;

use crate::database::models::{Rol, Ticket, TicketDetalle, TicketScope};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::AppState;

/// GET /tickets/mis_tickets - role-scoped listing with relations
///
/// Administrators see every ticket; a normal user only the tickets they own.
/// Each ticket carries its owner, category, assigned consultant and the full
/// message thread.
pub async fn mis_tickets(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<TicketDetalle>>, ApiError> {
    let scope = match user.rol {
        Rol::Admin => TicketScope::Todos,
        Rol::Normal => {
            let cuenta = user.account(&state.pool).await?;
            TicketScope::DeUsuario(cuenta.id)
        }
    };

    let detalles = Ticket::load_detalles(&state.pool, scope).await?;
    Ok(Json(detalles))
}
