pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use sqlx::PgPool;

use config::AppConfig;

/// Process-wide immutable context, built once at startup and handed to every
/// handler through axum state. The signing secret and the pool live here;
/// nothing is a language-level global.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
}
