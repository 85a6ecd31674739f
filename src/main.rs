use std::net::SocketAddr;
use std::sync::Arc;

use job_board_backend::{
    config::{get_config, init_config},
    database::{
        pool::{create_pool, run_migrations},
        JobBoardStore, MemoryStore, PgStore,
    },
    routes, AppState,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();
    init_config()?;
    let config = get_config();

    let store: Arc<dyn JobBoardStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            info!("Using Postgres store");
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    match &config.ml_service_url {
        Some(url) => info!("ML recommender enabled at {}", url),
        None => info!("ML recommender disabled, ranking by skill overlap"),
    }

    let app_state = AppState::new(store)?;
    let app = routes::build_router(app_state, config);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
