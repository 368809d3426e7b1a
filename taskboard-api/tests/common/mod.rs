/// Common test utilities for integration tests
///
/// Provides a test context with a migrated database, a seeded user, a valid
/// access token, and the full router.

use sqlx::PgPool;
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::auth::jwt::{create_token, Claims, TokenType};
use taskboard_shared::db::TxCoordinator;
use taskboard_shared::events::EventFanout;
use taskboard_shared::models::{CreateUser, User};
use taskboard_shared::ops::BoardOps;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context against the configured database
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Migrations live in the shared crate (path relative to Cargo.toml).
        sqlx::migrate!("../taskboard-shared/migrations").run(&db).await?;

        let user = User::create(
            &db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                name: "Test User".to_string(),
                password_hash: "$argon2id$test-only".to_string(),
            },
        )
        .await?;

        let claims = Claims::new(user.id, TokenType::Access);
        let jwt_token = create_token(&claims, &config.jwt.secret)?;

        let ops = BoardOps::new(TxCoordinator::new(db.clone()), EventFanout::new());
        let state = AppState::new(db.clone(), config.clone(), ops);
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Registers a second user and returns it with a token
    pub async fn other_user(&self) -> anyhow::Result<(User, String)> {
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("other-{}@example.com", Uuid::new_v4()),
                name: "Other User".to_string(),
                password_hash: "$argon2id$test-only".to_string(),
            },
        )
        .await?;
        let claims = Claims::new(user.id, TokenType::Access);
        let token = create_token(&claims, &self.config.jwt.secret)?;
        Ok((user, token))
    }

    /// Cleans up test data created by this context's user
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM boards WHERE owner_id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(self.user.id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
