/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use flowgate_api::{app::{build_router, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::connect(config).await?;
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::config::{Config, StorageBackend};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use flowgate_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, PoolConfig},
    },
    identity::IdentityService,
    persistence::{FormInstanceEntityManager, MemoryStore, PgStore},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

/// Backend the state was built over; health checks ping it
#[derive(Clone)]
pub enum Storage {
    Postgres(PgPool),
    Memory,
}

impl Storage {
    /// Releases backend resources once the server has stopped
    pub async fn close(self) {
        match self {
            Storage::Postgres(pool) => close_pool(pool).await,
            Storage::Memory => {}
        }
    }
}

/// Shared application state
///
/// Cloned per request by Axum's `State` extractor; every field is a cheap
/// handle.
#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityService,

    pub form_instances: FormInstanceEntityManager,

    pub storage: Storage,

    pub config: Arc<Config>,
}

impl AppState {
    /// State over a Postgres pool
    pub fn with_postgres(pool: PgPool, config: Config) -> Self {
        let store = Arc::new(PgStore::new(pool.clone()));
        Self {
            identity: IdentityService::from_store(store.clone()),
            form_instances: FormInstanceEntityManager::new(store),
            storage: Storage::Postgres(pool),
            config: Arc::new(config),
        }
    }

    /// State over an existing in-memory store (tests seed it directly)
    pub fn with_memory_store(store: Arc<MemoryStore>, config: Config) -> Self {
        Self {
            identity: IdentityService::from_store(store.clone()),
            form_instances: FormInstanceEntityManager::new(store),
            storage: Storage::Memory,
            config: Arc::new(config),
        }
    }

    /// Builds state for the configured backend, connecting and migrating
    /// Postgres when selected
    pub async fn connect(config: Config) -> anyhow::Result<Self> {
        match config.storage.backend {
            StorageBackend::Postgres => {
                let url = config
                    .storage
                    .database_url
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres backend"))?;

                let pool = create_pool(PoolConfig {
                    url,
                    max_connections: config.storage.max_connections,
                    ..Default::default()
                })
                .await?;

                if config.storage.run_migrations {
                    run_migrations(&pool).await?;
                }

                Ok(Self::with_postgres(pool, config))
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage; data is lost on restart");
                Ok(Self::with_memory_store(Arc::new(MemoryStore::new()), config))
            }
        }
    }
}

/// Builds the Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health
/// ├── /identity/users
/// │   ├── GET    /        # List users (filters + paging)
/// │   ├── POST   /        # Create user
/// │   ├── GET    /:id
/// │   ├── PUT    /:id
/// │   └── DELETE /:id
/// └── /form/form-instances
///     ├── GET    /        # List form instances (filters + paging)
///     └── GET    /:id
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/identity/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route(
            "/identity/users/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route(
            "/form/form-instances",
            get(routes::form_instances::list_form_instances),
        )
        .route(
            "/form/form-instances/:id",
            get(routes::form_instances::get_form_instance),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
