use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use ticketera::config::AppConfig;
use ticketera::{database, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up SECRET_KEY and DATABASE_URL.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // A missing SECRET_KEY or DATABASE_URL is a fatal startup condition.
    let config = AppConfig::from_env().unwrap_or_else(|e| panic!("{}", e));

    let pool = database::connect_pool(&config.database)
        .unwrap_or_else(|e| panic!("failed to build database pool: {}", e));

    // The pool connects lazily, so a database that is still coming up only
    // degrades /health instead of aborting startup.
    if let Err(e) = database::init_schema(&pool).await {
        tracing::error!("schema bootstrap failed: {}", e);
    }

    let port = config.server.port;
    let state = AppState {
        pool,
        config: Arc::new(config),
    };
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("ticketera listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // API routes
        .merge(auth_routes())
        .merge(category_routes())
        .merge(ticket_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use ticketera::handlers::auth::{session, users};

    Router::new()
        // Session management
        .route("/auth/login", post(session::login))
        .route("/auth/refresh", post(session::refresh))
        // Account directory (administrators only)
        .route("/auth/create_user", post(users::create_user))
        .route("/auth/users", get(users::list_users))
        .route(
            "/auth/users/:user_id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}

fn category_routes() -> Router<AppState> {
    use ticketera::handlers::categories;

    Router::new()
        .route(
            "/categories",
            post(categories::create_category).get(categories::list_categories),
        )
        .route(
            "/categories/:category_id",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
}

fn ticket_routes() -> Router<AppState> {
    use ticketera::handlers::tickets::{create, listing, manage, messages};

    Router::new()
        .route("/tickets/create_ticket", post(create::create_ticket))
        .route("/tickets/send_message", post(messages::send_message))
        .route("/tickets/mis_tickets", get(listing::mis_tickets))
        .route("/tickets/:ticket_id/mensajes", get(messages::list_messages))
        .route(
            "/tickets/:ticket_id/asignar_consultor",
            put(manage::asignar_consultor),
        )
        .route(
            "/tickets/:ticket_id/cerrar_ticket",
            put(manage::cerrar_ticket),
        )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Ticketera API",
        "version": version,
        "endpoints": {
            "auth": "/auth/login, /auth/refresh (public), /auth/users (admin)",
            "categories": "/categories (public read, admin write)",
            "tickets": "/tickets/* (authenticated)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
