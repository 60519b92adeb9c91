use std::{net::SocketAddr, sync::Arc};

use tokio::signal;
use tracing::{error, info};

use checkout_api as api;
use api::services::commerce::{CartStore, InMemoryCartStore, RedisCartStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    // Init DB
    let db_pool = api::db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }
    let db_arc = Arc::new(db_pool);

    // Cart store backend (Redis client construction only; connection checked in health)
    let (cart_store, redis_client): (Arc<dyn CartStore>, Option<Arc<redis::Client>>) =
        match cfg.cart_store_backend.to_ascii_lowercase().as_str() {
            "redis" => {
                let client = Arc::new(redis::Client::open(cfg.redis_url.clone())?);
                info!("Using Redis cart store");
                (
                    Arc::new(RedisCartStore::new(client.clone(), cfg.cart_ttl())),
                    Some(client),
                )
            }
            _ => {
                info!("Using in-memory cart store");
                (Arc::new(InMemoryCartStore::new()), None)
            }
        };

    let provider = Arc::new(api::payments::StripeClient::new(&cfg.payments)?);
    let services = api::handlers::AppServices::new(db_arc.clone(), cart_store, provider, &cfg);

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port).parse()?;

    let app_state = api::AppState {
        db: db_arc,
        config: Arc::new(cfg),
        services,
        redis: redis_client,
    };

    let app = api::build_router(app_state);

    info!("checkout-api listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
