use axum::{
    extract::State,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;

/// Process-wide resources, injected into handlers via axum state.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = crate::config::config();
    tracing::info!("Starting Task API in {:?} mode", config.environment);

    // The pool connects lazily; a missing store degrades /health instead of
    // blocking startup.
    let pool = database::connect_pool(&config.database)
        .unwrap_or_else(|e| panic!("failed to create database pool: {}", e));

    if let Err(e) = database::ensure_schema(&pool).await {
        tracing::warn!("Schema bootstrap skipped: {}", e);
    }

    let app = app(AppState { pool });

    // Allow tests or deployments to override port via env
    let port = std::env::var("TASK_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(5000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Task API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // API routes
        .merge(auth_routes())
        .merge(task_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    let public = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected = Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route_layer(from_fn(middleware::jwt_auth_middleware));

    public.merge(protected)
}

fn task_routes() -> Router<AppState> {
    use handlers::tasks;

    // Listing is intentionally public; everything else requires a bearer token
    let public = Router::new().route("/api/tasks", get(tasks::list));

    let protected = Router::new()
        .route("/api/tasks", post(tasks::create))
        .route(
            "/api/tasks/:id",
            get(tasks::read)
                .put(tasks::update)
                .patch(tasks::patch)
                .delete(tasks::remove),
        )
        .route_layer(from_fn(middleware::jwt_auth_middleware));

    public.merge(protected)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Task API (Rust)",
        "version": version,
        "description": "JWT-authenticated CRUD over personal task records",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "auth": "/api/auth/register, /api/auth/login (public), /api/auth/whoami (protected)",
            "tasks": "/api/tasks?page=&limit= (public list), /api/tasks[/:id] (protected)",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
