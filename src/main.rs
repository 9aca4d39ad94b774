use std::sync::Arc;

use axum::Router;
use clap::Parser;
use diesel::Connection;
use diesel_async::{
    AsyncPgConnection,
    async_connection_wrapper::AsyncConnectionWrapper,
    pooled_connection::{
        AsyncDieselConnectionManager,
        deadpool::{Object, Pool},
    },
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::info;
use tokio::{net::TcpListener, task};
use tower_http::cors::CorsLayer;

mod api;
mod config;
mod error;
mod events;
mod objects;
mod schema;
mod utils;

use config::{Config, ConfigBuilder};
use error::Error;
use events::{LogNotifier, Notifier};

pub type Conn = Object<AsyncPgConnection>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = String::from("/etc/enhanced-backend/config.toml"))]
    config: String,
}

pub struct AppState {
    pub pool: Pool<AsyncPgConnection>,
    pub config: Config,
    pub notifier: Box<dyn Notifier>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = ConfigBuilder::load(args.config).await?.build();

    let database_url = config.database.url();

    let migration_url = database_url.clone();
    task::spawn_blocking(move || -> Result<(), Error> {
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&migration_url)?;

        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| Error::MigrationError(e.to_string()))?;

        Ok(())
    })
    .await??;

    let pool_config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder(pool_config).build()?;

    let app_state = Arc::new(AppState {
        pool,
        config,
        notifier: Box::new(LogNotifier),
    });

    let app = Router::new()
        .nest("/_synapse/client/enhanced", api::router(app_state.clone()))
        .layer(CorsLayer::permissive())
        .with_state(app_state.clone());

    let web = app_state.config.web.clone();
    let listener = TcpListener::bind((web.url, web.port)).await?;

    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
