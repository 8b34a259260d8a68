use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Closed role set. Decoded once at the authentication boundary; handlers
/// never compare raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Rol {
    Admin,
    Normal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub correo: String,
    pub username: String,
    /// Argon2 PHC string. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub rol: Rol,
    pub estatus: String,
}

impl User {
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_correo(pool: &PgPool, correo: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE correo = $1")
            .bind(correo)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id OFFSET $1 LIMIT $2")
            .bind(skip)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Uniqueness pre-check for account creation.
    pub async fn exists_with_username_or_correo(
        pool: &PgPool,
        username: &str,
        correo: &str,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE username = $1 OR correo = $2",
        )
        .bind(username)
        .bind(correo)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }

    pub async fn select_by_ids(pool: &PgPool, ids: &[i32]) -> Result<Vec<User>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rol_uses_lowercase_wire_names() {
        assert_eq!(serde_json::to_value(Rol::Admin).unwrap(), "admin");
        assert_eq!(serde_json::to_value(Rol::Normal).unwrap(), "normal");
        let parsed: Rol = serde_json::from_str("\"normal\"").unwrap();
        assert_eq!(parsed, Rol::Normal);
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            correo: "ana@example.com".into(),
            username: "ana".into(),
            password_hash: "$argon2id$v=19$...".into(),
            rol: Rol::Normal,
            estatus: "activo".into(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["username"], "ana");
        assert_eq!(value["rol"], "normal");
    }
}
