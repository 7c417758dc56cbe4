use std::sync::Arc;

use anyhow::Result;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use data::repositories::postgres::group_repository::PostgresGroupRepository;
use data::repositories::postgres::post_repository::PostgresPostRepository;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::settings::Settings;
use presentation::AppState;
use server::run_http;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let state = AppState::new(
        Arc::new(PostgresPostRepository::new(pool.clone())),
        Arc::new(PostgresGroupRepository::new(pool.clone())),
        Arc::new(PostgresUserRepository::new(pool)),
        JwtService::new(&settings.jwt_secret, settings.jwt_ttl_seconds),
        settings.staff_usernames.clone(),
        settings.secure_cookies,
    );

    run_http(&settings, state).await
}
