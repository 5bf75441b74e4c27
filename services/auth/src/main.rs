use anyhow::Result;
use common::cache::{RedisConfig, RedisPool};
use common::database::{self, DatabaseConfig, init_pool};
use common::logging::init_tracing;
use common::mail::{MailConfig, MailDispatcher, build_transport};
use common::repositories::UserRepository;
use tracing::info;

mod jwt;
mod middleware;
mod rate_limiter;
mod routes;
mod session;
mod validation;

use crate::{
    jwt::{JwtConfig, JwtService},
    rate_limiter::{RateLimiter, RateLimiterConfig},
    session::SessionManager,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub redis_pool: RedisPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub rate_limiter: RateLimiter,
    pub session_manager: SessionManager,
    pub mail_dispatcher: MailDispatcher,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("Starting authentication service");

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

    // Initialize JWT service
    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    // Initialize Redis connection pool
    let redis_pool = RedisPool::new(&RedisConfig::from_env()?).await?;

    // Outbound mail runs on a background worker
    let mail_config = MailConfig::from_env()?;
    let (mail_dispatcher, _mail_worker) =
        MailDispatcher::spawn(build_transport(&mail_config)?, mail_config.queue_capacity);

    let app_state = AppState {
        session_manager: SessionManager::new(
            redis_pool.clone(),
            jwt_service.refresh_token_expiry(),
        ),
        redis_pool,
        jwt_service,
        user_repository: UserRepository::new(pool),
        rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
        mail_dispatcher,
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr = std::env::var("AUTH_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Authentication service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
