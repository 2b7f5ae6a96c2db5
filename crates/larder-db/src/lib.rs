//! # larder-db
//!
//! PostgreSQL storage for the larder recipe catalog.
//!
//! Provides connection pool management and [`PgRecipeRepository`], the
//! durable implementation of [`RecipeRepository`]. Migrations live in the
//! workspace `migrations/` directory and run through [`Database::migrate`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use larder_db::{Database, RecipeDraft, RecipeRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/larder").await?;
//!
//!     let recipe = db
//!         .recipes
//!         .create(RecipeDraft::new("Pancakes").with_ingredient("Flour", Some(2.0), Some("cup")))
//!         .await?;
//!
//!     println!("Created recipe: {}", recipe.id);
//!     Ok(())
//! }
//! ```

pub mod pool;
pub mod recipes;

// Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use larder_core::*;

pub use pool::{
    create_pool, create_pool_with_config, log_pool_metrics, PoolConfig,
    DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS,
};
pub use recipes::PgRecipeRepository;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Database context: the pool plus the repositories built on it.
#[derive(Clone)]
pub struct Database {
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub recipes: PgRecipeRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            recipes: PgRecipeRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
