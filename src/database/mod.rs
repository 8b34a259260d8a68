use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

pub mod models;

/// Build the shared connection pool. `connect_lazy` so the process can come
/// up (and report a degraded `/health`) while the database is still starting.
pub fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect_lazy(&config.url)
}

/// Statements executed at startup. Schema/migration tooling is out of scope,
/// so the tables are bootstrapped the same way the store expects to find
/// them, idempotently.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        correo VARCHAR(100) NOT NULL UNIQUE,
        username VARCHAR(25) NOT NULL UNIQUE,
        password_hash VARCHAR(1000) NOT NULL,
        rol TEXT NOT NULL CHECK (rol IN ('admin', 'normal')),
        estatus VARCHAR(20) NOT NULL DEFAULT 'activo'
    )",
    "CREATE TABLE IF NOT EXISTS categories (
        id SERIAL PRIMARY KEY,
        nombre VARCHAR(100) NOT NULL UNIQUE,
        descripcion TEXT
    )",
    "CREATE TABLE IF NOT EXISTS tickets (
        id SERIAL PRIMARY KEY,
        asunto VARCHAR(200) NOT NULL,
        descripcion TEXT NOT NULL,
        categoria_id INTEGER NOT NULL REFERENCES categories(id),
        urgencia TEXT NOT NULL CHECK (urgencia IN ('baja', 'media', 'alta')),
        prioridad TEXT NOT NULL CHECK (prioridad IN ('baja', 'media', 'alta')),
        estado TEXT NOT NULL DEFAULT 'abierto'
            CHECK (estado IN ('abierto', 'en_proceso', 'cerrado')),
        fecha_creacion TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        fecha_cierre TIMESTAMPTZ,
        usuario_id INTEGER NOT NULL REFERENCES users(id),
        consultor_id INTEGER REFERENCES users(id)
    )",
    "CREATE TABLE IF NOT EXISTS ticket_chats (
        id SERIAL PRIMARY KEY,
        ticket_id INTEGER NOT NULL REFERENCES tickets(id) ON DELETE CASCADE,
        autor_id INTEGER NOT NULL REFERENCES users(id),
        mensaje TEXT NOT NULL,
        fecha_envio TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
];

pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("database schema bootstrapped");
    Ok(())
}
