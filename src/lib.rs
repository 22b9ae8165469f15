use std::net::SocketAddr;
use std::str::FromStr;

use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::net::TcpListener;

pub mod clients;
pub mod config;
pub mod controller;
pub mod errors;
pub mod forms;
pub mod migrations;
pub mod models;
pub mod repos;
pub mod services;
pub mod types;

use crate::config::Config;
use crate::controller::routing::make_router;
use crate::controller::AppState;
use crate::types::DbPool;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub async fn create_pool(dsn: &str) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(dsn)?
        .create_if_missing(true)
        .foreign_keys(true);
    SqlitePoolOptions::new().connect_with(options).await
}

pub async fn start_server(config: Config) -> Result<(), BoxError> {
    let db_pool = create_pool(&config.db.dsn).await?;
    migrations::run(&db_pool).await?;

    let app = make_router(AppState::new(db_pool));
    let addr = SocketAddr::from((config.listen.host, config.listen.port));
    let listener = TcpListener::bind(addr).await?;
    info!("storefront listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
