use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use super::category::Category;
use super::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Urgencia {
    Baja,
    Media,
    Alta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Prioridad {
    Baja,
    Media,
    Alta,
}

/// Ticket lifecycle state. Transitions are one-directional:
/// abierto -> en_proceso -> cerrado, with no reopen path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Estado {
    Abierto,
    EnProceso,
    Cerrado,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Ticket {
    pub id: i32,
    pub asunto: String,
    pub descripcion: String,
    pub categoria_id: i32,
    pub urgencia: Urgencia,
    pub prioridad: Prioridad,
    pub estado: Estado,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_cierre: Option<DateTime<Utc>>,
    pub usuario_id: i32,
    pub consultor_id: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TicketChat {
    pub id: i32,
    pub ticket_id: i32,
    pub autor_id: i32,
    pub mensaje: String,
    pub fecha_envio: DateTime<Utc>,
}

/// Ticket with its relations eagerly loaded for listing responses.
#[derive(Debug, Serialize)]
pub struct TicketDetalle {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub usuario_owner: User,
    pub categoria: Category,
    pub consultor_asignado: Option<User>,
    pub mensajes: Vec<MensajeDetalle>,
}

#[derive(Debug, Serialize)]
pub struct MensajeDetalle {
    pub id: i32,
    pub mensaje: String,
    pub fecha_envio: DateTime<Utc>,
    pub autor: User,
}

/// Listing scope: administrators see every ticket, normal users only their own.
#[derive(Debug, Clone, Copy)]
pub enum TicketScope {
    Todos,
    DeUsuario(i32),
}

impl Ticket {
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Ticket>, sqlx::Error> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load tickets in scope together with owner, category, consultant and
    /// the full ordered message list. Three batched queries instead of a
    /// per-ticket fan-out.
    pub async fn load_detalles(
        pool: &PgPool,
        scope: TicketScope,
    ) -> Result<Vec<TicketDetalle>, sqlx::Error> {
        let tickets: Vec<Ticket> = match scope {
            TicketScope::Todos => {
                sqlx::query_as("SELECT * FROM tickets ORDER BY id")
                    .fetch_all(pool)
                    .await?
            }
            TicketScope::DeUsuario(usuario_id) => {
                sqlx::query_as("SELECT * FROM tickets WHERE usuario_id = $1 ORDER BY id")
                    .bind(usuario_id)
                    .fetch_all(pool)
                    .await?
            }
        };

        if tickets.is_empty() {
            return Ok(vec![]);
        }

        let ticket_ids: Vec<i32> = tickets.iter().map(|t| t.id).collect();
        let mensajes: Vec<TicketChat> = sqlx::query_as(
            "SELECT * FROM ticket_chats WHERE ticket_id = ANY($1) ORDER BY id",
        )
        .bind(&ticket_ids)
        .fetch_all(pool)
        .await?;

        let mut user_ids: Vec<i32> = tickets
            .iter()
            .map(|t| t.usuario_id)
            .chain(tickets.iter().filter_map(|t| t.consultor_id))
            .chain(mensajes.iter().map(|m| m.autor_id))
            .collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        let usuarios: HashMap<i32, User> = User::select_by_ids(pool, &user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let mut categoria_ids: Vec<i32> = tickets.iter().map(|t| t.categoria_id).collect();
        categoria_ids.sort_unstable();
        categoria_ids.dedup();
        let categorias: HashMap<i32, Category> = Category::select_by_ids(pool, &categoria_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut mensajes_por_ticket: HashMap<i32, Vec<MensajeDetalle>> = HashMap::new();
        for chat in mensajes {
            // The FK on autor_id guarantees the author row exists.
            let autor = usuarios
                .get(&chat.autor_id)
                .cloned()
                .ok_or(sqlx::Error::RowNotFound)?;
            mensajes_por_ticket
                .entry(chat.ticket_id)
                .or_default()
                .push(MensajeDetalle {
                    id: chat.id,
                    mensaje: chat.mensaje,
                    fecha_envio: chat.fecha_envio,
                    autor,
                });
        }

        let mut detalles = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            let usuario_owner = usuarios
                .get(&ticket.usuario_id)
                .cloned()
                .ok_or(sqlx::Error::RowNotFound)?;
            let categoria = categorias
                .get(&ticket.categoria_id)
                .cloned()
                .ok_or(sqlx::Error::RowNotFound)?;
            let consultor_asignado = ticket
                .consultor_id
                .and_then(|id| usuarios.get(&id).cloned());
            let mensajes = mensajes_por_ticket.remove(&ticket.id).unwrap_or_default();

            detalles.push(TicketDetalle {
                ticket,
                usuario_owner,
                categoria,
                consultor_asignado,
                mensajes,
            });
        }

        Ok(detalles)
    }
}

impl TicketChat {
    /// Messages of one ticket in stored order, each with its author.
    pub async fn list_detalles(
        pool: &PgPool,
        ticket_id: i32,
    ) -> Result<Vec<MensajeDetalle>, sqlx::Error> {
        let chats: Vec<TicketChat> =
            sqlx::query_as("SELECT * FROM ticket_chats WHERE ticket_id = $1 ORDER BY id")
                .bind(ticket_id)
                .fetch_all(pool)
                .await?;

        let mut autor_ids: Vec<i32> = chats.iter().map(|c| c.autor_id).collect();
        autor_ids.sort_unstable();
        autor_ids.dedup();
        let autores: HashMap<i32, User> = User::select_by_ids(pool, &autor_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        chats
            .into_iter()
            .map(|chat| {
                let autor = autores
                    .get(&chat.autor_id)
                    .cloned()
                    .ok_or(sqlx::Error::RowNotFound)?;
                Ok(MensajeDetalle {
                    id: chat.id,
                    mensaje: chat.mensaje,
                    fecha_envio: chat.fecha_envio,
                    autor,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estado_uses_snake_case_wire_names() {
        assert_eq!(serde_json::to_value(Estado::Abierto).unwrap(), "abierto");
        assert_eq!(serde_json::to_value(Estado::EnProceso).unwrap(), "en_proceso");
        assert_eq!(serde_json::to_value(Estado::Cerrado).unwrap(), "cerrado");
    }

    #[test]
    fn urgencia_y_prioridad_wire_names() {
        assert_eq!(serde_json::to_value(Urgencia::Alta).unwrap(), "alta");
        assert_eq!(serde_json::to_value(Prioridad::Baja).unwrap(), "baja");
        let parsed: Urgencia = serde_json::from_str("\"media\"").unwrap();
        assert_eq!(parsed, Urgencia::Media);
    }

    #[test]
    fn ticket_detalle_flattens_ticket_fields() {
        let ticket = Ticket {
            id: 7,
            asunto: "Impresora sin tóner".into(),
            descripcion: "La impresora del piso 2 no imprime".into(),
            categoria_id: 1,
            urgencia: Urgencia::Media,
            prioridad: Prioridad::Alta,
            estado: Estado::Abierto,
            fecha_creacion: Utc::now(),
            fecha_cierre: None,
            usuario_id: 3,
            consultor_id: None,
        };
        let detalle = TicketDetalle {
            ticket,
            usuario_owner: User {
                id: 3,
                correo: "ana@example.com".into(),
                username: "ana".into(),
                password_hash: "hash".into(),
                rol: super::super::user::Rol::Normal,
                estatus: "activo".into(),
            },
            categoria: Category {
                id: 1,
                nombre: "Hardware".into(),
                descripcion: None,
            },
            consultor_asignado: None,
            mensajes: vec![],
        };
        let value = serde_json::to_value(&detalle).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["estado"], "abierto");
        assert_eq!(value["usuario_owner"]["username"], "ana");
        assert!(value["usuario_owner"].get("password_hash").is_none());
    }
}
