use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use chirper_api::database::manager::DatabaseManager;
use chirper_api::middleware::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = chirper_api::config::config();
    tracing::info!("Starting Chirper API in {:?} mode", config.environment);

    // Bring the chirps table up on first run; a down database only degrades
    // /health rather than aborting startup.
    if let Err(e) = DatabaseManager::ensure_schema().await {
        tracing::warn!("schema bootstrap failed: {}", e);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("CHIRPER_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Chirper API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Chirp resource
        .merge(chirp_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn chirp_routes() -> Router {
    use axum::routing::post;
    use chirper_api::handlers::chirps;

    // Mutations and the edit view require a bearer token; the listing is public.
    let protected = Router::new()
        .route("/chirps", post(chirps::create))
        .route(
            "/chirps/:id",
            get(chirps::show).put(chirps::update).delete(chirps::delete),
        )
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware));

    Router::new()
        .route("/chirps", get(chirps::list))
        .merge(protected)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Chirper API",
            "version": version,
            "description": "JSON API for posting, listing, and managing chirps",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "listing": "GET /chirps (public)",
                "create": "POST /chirps (bearer token)",
                "show": "GET /chirps/:id (bearer token, owner only)",
                "update": "PUT /chirps/:id (bearer token, owner only)",
                "delete": "DELETE /chirps/:id (bearer token, owner only)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
