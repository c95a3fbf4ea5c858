use axum::{
    routing::{get, post},
    Router,
};
use rolematch_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let integration_api = Router::new()
        .route("/api/integration/roles/:id", get(routes::roles::get_role))
        .route(
            "/api/integration/roles/:id/candidates",
            get(routes::roles::list_role_candidates),
        )
        .route(
            "/api/integration/roles/:id/match",
            post(routes::matching::match_role),
        )
        .route(
            "/api/integration/roles/:id/match/stream",
            post(routes::matching::stream_match_role),
        )
        .layer(axum::middleware::from_fn_with_state(
            rolematch_backend::middleware::rate_limit::new_rps_state(config.integration_rps),
            rolematch_backend::middleware::rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(integration_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
