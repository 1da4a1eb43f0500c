pub mod api;
pub mod domain;
pub mod shared;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use axum::middleware::{self, Next};
    use axum::response::Response;
    use axum::{
        routing::{get, post},
        Router,
    };
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Создаем директорию для логов
    let log_dir = std::path::Path::new("target").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file_path = log_dir.join("backend.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                // Отключаем логи SQL запросов, но оставляем логи приложения
                "info,sqlx=warn,sea_orm=warn".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    // Простой middleware для логирования запросов
    async fn request_logger(req: Request<Body>, next: Next) -> Response {
        let start = std::time::Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();

        let response = next.run(req).await;

        let status = response.status().as_u16();
        let duration = start.elapsed();
        if status < 400 {
            tracing::info!("{} {} -> {} in {}ms", method, uri.path(), status, duration.as_millis());
        } else {
            tracing::warn!("{} {} -> {} in {}ms", method, uri.path(), status, duration.as_millis());
        }
        response
    }

    let config = shared::config::load_config()?;
    let db_path = shared::config::get_database_path(&config)?;

    shared::data::db::initialize_database(db_path.to_str())
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    shared::product_client::initialize_product_client(&config.product_service)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        // Project handlers
        .route(
            "/api/project",
            get(api::handlers::a001_project::list_all).post(api::handlers::a001_project::upsert),
        )
        .route(
            "/api/project/:id",
            get(api::handlers::a001_project::get_by_id),
        )
        // Product association handlers
        .route(
            "/api/association",
            post(api::handlers::a002_product_association::upsert),
        )
        .route(
            "/api/association/:id",
            get(api::handlers::a002_product_association::get_by_id),
        )
        .route(
            "/api/association/by-project/:id",
            get(api::handlers::a002_product_association::list_by_project),
        )
        // Projection handlers
        .route("/api/projection", post(api::handlers::a003_projection::create))
        .route(
            "/api/projection/:id",
            get(api::handlers::a003_projection::get_by_id)
                .put(api::handlers::a003_projection::update)
                .delete(api::handlers::a003_projection::delete),
        )
        .route(
            "/api/projection/:id/weeks",
            get(api::handlers::a004_projection_week::list_for_projection),
        )
        .route(
            "/api/projection/by-association/:id",
            get(api::handlers::a003_projection::list_by_association),
        )
        .route(
            "/api/projection/by-project/:id",
            get(api::handlers::a003_projection::list_by_project),
        )
        .layer(middleware::from_fn(request_logger))
        .layer(cors);

    let addr: SocketAddr = ([0, 0, 0, 0], 3000).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port 3000 is already in use. Please ensure no other process is using this port."
                );
            } else {
                tracing::error!("Failed to bind to port 3000. Error: {}", e);
            }
            // Propagate the error to stop the application
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
