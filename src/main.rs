use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use campus_api::handlers::pages;
use campus_api::middleware::access_guard;
use campus_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SESSION_SECRET, APP_ENV, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = campus_api::config::config();
    tracing::info!("Starting Campus API in {:?} mode", config.environment);

    let state = AppState::new();
    state.ensure_default_admin().await;

    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("CAMPUS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    println!("🚀 Campus API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public pages
        .route("/", get(pages::landing))
        .route("/health", get(health))
        .route("/signin", get(pages::signin_page))
        .route("/signup", get(pages::signup_page))
        .route("/unauthorized", get(pages::unauthorized_page))
        // Public auth/registration API
        .merge(auth_api_routes())
        // Role-scoped dashboards
        .merge(dashboard_routes())
        // Global middleware
        .layer(middleware::from_fn_with_state(state.clone(), access_guard))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_api_routes() -> Router<AppState> {
    use campus_api::handlers::public::auth;

    Router::new()
        .route("/api/auth/signin", post(auth::signin))
        .route("/api/auth/signout", post(auth::signout))
        .route(
            "/api/auth/session",
            get(auth::session_get).put(auth::session_update),
        )
        .route("/api/register", post(auth::register))
}

fn dashboard_routes() -> Router<AppState> {
    use campus_api::handlers::pages::dashboards;

    Router::new()
        .route("/admin/dashboard", get(dashboards::admin))
        .route("/instructor/dashboard", get(dashboards::instructor))
        .route("/student/dashboard", get(dashboards::student))
        .route("/developer/dashboard", get(dashboards::developer))
        .route("/manager/dashboard", get(dashboards::manager))
        .route("/user/dashboard", get(dashboards::user))
}

async fn health() -> axum::response::Json<Value> {
    let now = chrono::Utc::now();

    axum::response::Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": now
        }
    }))
}
