/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server:
 * choosing storage and image backends from the configuration, building the
 * services and configuring the router.
 *
 * # Initialization Process
 *
 * 1. Connect to PostgreSQL and migrate, or fall back to in-memory storage
 * 2. Configure Cloudinary, or disable image uploads
 * 3. Build the token maker and password hasher
 * 4. Create `AppState` and the router
 * 5. Apply the CORS layer
 */
use axum::http::HeaderValue;
use axum::Router;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::backend::auth::{
    CodeStore, MemoryCodeStore, PasswordHasher, PgCodeStore, TokenError, TokenMaker,
};
use crate::backend::images::{CloudinaryHost, DisabledImageHost, ImageError, ImageHost};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ConfigError, ServerConfig};
use crate::backend::server::state::{AppState, Dependencies};
use crate::backend::storage::{MemoryStore, PgStore, Store};

/// Startup failures
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("token key rejected: {0}")]
    Token(#[from] TokenError),

    #[error("image host misconfigured: {0}")]
    Image(#[from] ImageError),

    #[error("invalid CORS origin {0:?}")]
    InvalidOrigin(String),
}

/// Create and configure the Axum application
///
/// # Arguments
///
/// * `config` - Parsed server configuration
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
///
/// # Errors
///
/// Any `InitError`; the server does not start half-configured.
pub async fn create_app(config: &ServerConfig) -> Result<Router<()>, InitError> {
    tracing::info!("Initializing kamou-shop backend server");

    let (store, codes): (Arc<dyn Store>, Arc<dyn CodeStore>) = match &config.database_url {
        Some(url) => {
            let pool = load_database(url).await?;
            (
                Arc::new(PgStore::new(pool.clone())),
                Arc::new(PgCodeStore::new(pool)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set. Using in-memory storage; data is lost on restart.");
            (Arc::new(MemoryStore::new()), Arc::new(MemoryCodeStore::new()))
        }
    };

    let images: Arc<dyn ImageHost> = match &config.cloudinary_url {
        Some(url) => {
            let host = CloudinaryHost::from_url(url)?;
            tracing::info!("Image uploads go to Cloudinary cloud {}", host.cloud_name());
            Arc::new(host)
        }
        None => {
            tracing::warn!("CLOUDINARY_URL not set. Image uploads are disabled.");
            Arc::new(DisabledImageHost)
        }
    };

    let app_state = AppState::new(Dependencies {
        store,
        codes,
        images,
        token_maker: TokenMaker::new(&config.token_key)?,
        hasher: PasswordHasher::new(config.bcrypt_cost),
        policy: config.policy,
    });

    let app = create_router(app_state).layer(cors_layer(&config.cors_origins)?);
    tracing::info!("Router configured");
    Ok(app)
}

/// CORS for the configured origins; any origin when none are configured
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, InitError> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| InitError::InvalidOrigin(origin.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}
