use anyhow::Result;
use common::database::{self, DatabaseConfig, init_pool};
use common::logging::init_tracing;
use common::mail::{MailConfig, MailDispatcher, build_transport};
use common::repositories::{ApplicationRepository, UserRepository};
use tracing::info;

mod error;
mod middleware;
mod models;
mod routes;
mod state;

use crate::{
    middleware::{JwtConfig, TokenVerifier},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }
    database::run_migrations(&pool).await?;

    let token_verifier = TokenVerifier::new(&JwtConfig::from_env()?)?;

    // Outbound mail runs on a background worker
    let mail_config = MailConfig::from_env()?;
    let (mail_dispatcher, _mail_worker) =
        MailDispatcher::spawn(build_transport(&mail_config)?, mail_config.queue_capacity);

    let app_state = AppState {
        application_repository: ApplicationRepository::new(pool.clone()),
        user_repository: UserRepository::new(pool),
        token_verifier,
        mail_dispatcher,
    };

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr = std::env::var("API_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("API service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
