use axum::{extract::DefaultBodyLimit, routing::get, Router};
use question_import_backend::{
    admin_routes,
    config::{get_config, init_config, LogFormat},
    database::pool::create_pool,
    middleware::auth::require_admin,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let admin_api = admin_routes().layer(axum::middleware::from_fn(require_admin));

    let app = base_routes
        .merge(admin_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(
            config.import_settings().request_body_limit(),
        ));

    let addr: SocketAddr = config.server_address.parse()?;
    info!(
        max_upload_bytes = config.import_max_upload_bytes,
        "Server listening on {}", addr
    );
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
