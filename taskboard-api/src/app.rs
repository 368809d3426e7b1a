/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config};
/// use taskboard_shared::{db::TxCoordinator, events::EventFanout, ops::BoardOps};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let ops = BoardOps::new(TxCoordinator::new(pool.clone()), EventFanout::new());
/// let state = AppState::new(pool, config, ops);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::auth::jwt;
use taskboard_shared::ops::BoardOps;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

/// The authenticated caller, injected into request extensions by the JWT
/// middleware
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; the service
/// and config are reference-counted internally.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, for direct reads (health checks, auth)
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Board operations service
    pub ops: BoardOps,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, ops: BoardOps) -> Self {
        Self {
            db,
            config: Arc::new(config),
            ops,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── /health                                    # Health check (public)
/// └── /v1/
///     ├── /auth/                                 # Public
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /refresh
///     └── /boards/                               # JWT-authenticated
///         ├── POST   /                           # Create board
///         ├── GET    /                           # List boards (paginated)
///         ├── GET    /:board_id                  # Board with columns
///         ├── PUT    /:board_id                  # Update board
///         ├── DELETE /:board_id                  # Delete board
///         ├── POST   /:board_id/columns
///         ├── GET    /:board_id/columns/:column_id
///         ├── PUT    /:board_id/columns/:column_id
///         ├── DELETE /:board_id/columns/:column_id
///         ├── POST   /:board_id/columns/:column_id/tasks
///         ├── GET    /:board_id/tasks/:task_id
///         ├── PUT    /:board_id/tasks/:task_id
///         ├── DELETE /:board_id/tasks/:task_id
///         ├── PATCH  /:board_id/tasks/:task_id/move
///         ├── GET    /:board_id/members
///         ├── POST   /:board_id/members
///         ├── PUT    /:board_id/members
///         ├── DELETE /:board_id/members
///         └── GET    /:board_id/events/stream    # NDJSON live events
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Board routes (require JWT authentication)
    let board_routes = Router::new()
        .route("/", post(routes::boards::create_board))
        .route("/", get(routes::boards::list_boards))
        .route("/:board_id", get(routes::boards::get_board))
        .route("/:board_id", put(routes::boards::update_board))
        .route("/:board_id", delete(routes::boards::delete_board))
        .route("/:board_id/columns", post(routes::columns::create_column))
        .route(
            "/:board_id/columns/:column_id",
            get(routes::columns::get_column),
        )
        .route(
            "/:board_id/columns/:column_id",
            put(routes::columns::update_column),
        )
        .route(
            "/:board_id/columns/:column_id",
            delete(routes::columns::delete_column),
        )
        .route(
            "/:board_id/columns/:column_id/tasks",
            post(routes::tasks::create_task),
        )
        .route("/:board_id/tasks/:task_id", get(routes::tasks::get_task))
        .route("/:board_id/tasks/:task_id", put(routes::tasks::update_task))
        .route(
            "/:board_id/tasks/:task_id",
            delete(routes::tasks::delete_task),
        )
        .route(
            "/:board_id/tasks/:task_id/move",
            patch(routes::tasks::move_task),
        )
        .route("/:board_id/members", get(routes::members::list_members))
        .route("/:board_id/members", post(routes::members::add_member))
        .route("/:board_id/members", put(routes::members::update_member))
        .route("/:board_id/members", delete(routes::members::remove_member))
        .route(
            "/:board_id/events/stream",
            get(routes::stream::stream_board_events),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/boards", board_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
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
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization header,
/// then injects [`CurrentUser`] into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(CurrentUser(claims.sub));

    Ok(next.run(req).await)
}
