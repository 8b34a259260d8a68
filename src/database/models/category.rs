use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
}

impl Category {
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY id OFFSET $1 LIMIT $2")
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn select_by_ids(pool: &PgPool, ids: &[i32]) -> Result<Vec<Category>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Number of tickets still pointing at this category. Used by the
    /// delete endpoint, which blocks instead of cascading.
    pub async fn dependent_tickets(pool: &PgPool, id: i32) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE categoria_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
