use axum::{Router, middleware, routing::get};
use lms_api::{config::ApiConfig, state::ApiState};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    lms_api::tracing::init_tracing(config.env);
    let metrics_handle = lms_api::metrics::init_metrics()?;

    let pool = lms_db::create_pool(&config.database_url, config.db_max_connections).await?;
    lms_db::ensure_db_and_migrate(&config.database_url, &pool).await?;

    let state = ApiState::new(&config, pool).await?;

    let cors = lms_api::middleware::cors::create_cors_layer(&config.allowed_origins());

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let metrics_app = Router::new()
        .route("/metrics", get(lms_api::metrics::metrics_handler))
        .with_state(metrics_handle);

    let app = lms_api::router::router()
        .with_state(state)
        .merge(metrics_app)
        .layer(cors)
        .layer(trace_layer)
        .layer(middleware::from_fn(lms_api::metrics::track_metrics))
        .layer(middleware::from_fn(
            lms_api::middleware::request_id::request_id_middleware,
        ));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, env = ?config.env, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
