use crate::log_info;
use crate::shared::errors::{EngineError, EngineResult};
use diesel::pg::PgConnection;
use diesel::r2d2::{self, ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    pub fn new(database_url: &str) -> EngineResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);

        let pool = r2d2::Pool::builder()
            // Sequential batch runs hold one connection at a time; the rest
            // covers migrations and overlapping report writes.
            .max_size(10)
            .min_idle(Some(2))
            // Connection timeouts
            .connection_timeout(Duration::from_secs(10))
            .idle_timeout(Some(Duration::from_secs(300)))
            .max_lifetime(Some(Duration::from_secs(1800)))
            // Connection health checks
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                EngineError::Configuration(format!("Failed to create connection pool: {}", e))
            })?;

        log_info!(
            "Database connection pool initialized with max_size: {}",
            pool.max_size()
        );

        Ok(Self { pool })
    }

    pub fn get_connection(&self) -> EngineResult<DbConnection> {
        self.pool.get().map_err(EngineError::from)
    }

    /// Apply pending embedded migrations. Called once at startup before any
    /// batch work begins.
    pub fn run_migrations(&self) -> EngineResult<()> {
        let mut conn = self.get_connection()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| EngineError::Database(format!("Failed to run migrations: {}", e)))?;
        log_info!("Database migrations up to date");
        Ok(())
    }
}
