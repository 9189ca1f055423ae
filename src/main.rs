mod models;
mod service;
mod config;
mod dtos;
mod error;
mod db;
mod utils;
mod middleware;
mod handler;
mod routes;

use std::sync::Arc;

use axum::http::{header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE}, HeaderValue, Method};
use config::Config;
use crate::db::db::DBClient;
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use service::{
    bid_service::BidService,
    feed::ChangeFeed,
    identity::{IdentityProvider, RevocationStore, TokenIdentityProvider},
    session_verifier::SessionVerifier,
};

#[derive(Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    /// `None` when no service-account key is configured.
    pub identity: Option<Arc<dyn IdentityProvider>>,
    pub session_verifier: SessionVerifier,
    pub feed: ChangeFeed,
    pub bid_service: Arc<BidService>,
}

impl AppState {
    pub fn new(
        config: Config,
        db_client: DBClient,
        identity: Option<Arc<dyn IdentityProvider>>,
    ) -> Self {
        let db_client_arc = Arc::new(db_client);
        let feed = ChangeFeed::default();

        let bid_service = Arc::new(BidService::new(db_client_arc.clone(), feed.clone()));
        let session_verifier = SessionVerifier::new(identity.clone());

        Self {
            env: config,
            db_client: db_client_arc,
            identity,
            session_verifier,
            feed,
            bid_service,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
    {
        Ok(pool) => {
            tracing::info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            tracing::error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("Failed to run migrations: {:?}", err);
        std::process::exit(1);
    }

    let db_client = DBClient::new(pool);

    let identity: Option<Arc<dyn IdentityProvider>> = config.service_account.as_ref().map(|account| {
        let store: Arc<dyn RevocationStore> = Arc::new(db_client.clone());
        tracing::info!("Identity provider configured for project {}", account.project_id);
        Arc::new(TokenIdentityProvider::from_service_account(account, store)) as Arc<dyn IdentityProvider>
    });

    let mut allowed_origins = vec![HeaderValue::from_static("http://localhost:3000")];
    match config.app_url.parse::<HeaderValue>() {
        Ok(origin) if !allowed_origins.contains(&origin) => allowed_origins.push(origin),
        Ok(_) => {}
        Err(e) => tracing::warn!("APP_URL {} is not a valid origin: {}", config.app_url, e),
    }

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    let app_state = Arc::new(AppState::new(config.clone(), db_client, identity));

    let app = create_router(app_state).layer(cors);

    tracing::info!("Server is running on http://localhost:{}", config.port);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind port {}: {:?}", config.port, err);
            std::process::exit(1);
        }
    };

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {:?}", err);
    }
}
