use std::sync::Arc;

use reserva::{api, config, Engine};

#[tokio::main]
async fn main() {
    reserva::init_tracing();
    tracing::info!("Reserva starting v{}", config::APP_VERSION);

    let keys = match config::keys_from_env() {
        Ok(keys) => keys,
        Err(err) => {
            tracing::error!(%err, "cannot load key material");
            std::process::exit(1);
        }
    };

    let db_path = std::env::var(config::DATABASE_PATH_ENV)
        .unwrap_or_else(|_| "reserva.db".to_string());
    let engine = match Engine::new(&db_path, keys, config::EngineConfig::default()) {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!(%err, db_path, "cannot open reservation store");
            std::process::exit(1);
        }
    };

    let addr = std::env::var(config::LISTEN_ADDR_ENV)
        .unwrap_or_else(|_| config::DEFAULT_LISTEN_ADDR.to_string());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%err, addr, "cannot bind listen address");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "booking API listening");
    if let Err(err) = axum::serve(listener, api::api_router(Arc::new(engine))).await {
        tracing::error!(%err, "server exited with error");
        std::process::exit(1);
    }
}
