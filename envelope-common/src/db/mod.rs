use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use std::fmt;
use std::time::Duration;

use crate::store::{Store, StoreHealth};

pub mod account;
pub mod allocation;
pub mod budget;
pub mod category;
pub mod envelope;
pub mod ledger;
pub mod transaction;

pub type DbThreadPool = diesel::r2d2::Pool<ConnectionManager<PgConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<PgConnection>>;

pub fn create_db_thread_pool(
    database_uri: &str,
    max_db_connections: u32,
    idle_timeout: Duration,
) -> Result<DbThreadPool, r2d2::Error> {
    r2d2::Pool::builder()
        .max_size(max_db_connections)
        .idle_timeout(Some(idle_timeout))
        .build(ConnectionManager::<PgConnection>::new(database_uri))
}

#[derive(Debug)]
pub enum DaoError {
    DbThreadPoolFailure(r2d2::Error),
    QueryFailure(diesel::result::Error),
    CannotRunQuery(&'static str),
}

impl std::error::Error for DaoError {}

impl fmt::Display for DaoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaoError::DbThreadPoolFailure(e) => {
                write!(f, "DaoError: Failed to obtain DB connection: {e}")
            }
            DaoError::QueryFailure(e) => {
                write!(f, "DaoError: Query failed: {e}")
            }
            DaoError::CannotRunQuery(msg) => {
                write!(f, "DaoError: Cannot run query: {msg}")
            }
        }
    }
}

impl From<r2d2::Error> for DaoError {
    fn from(error: r2d2::Error) -> Self {
        DaoError::DbThreadPoolFailure(error)
    }
}

impl From<diesel::result::Error> for DaoError {
    fn from(error: diesel::result::Error) -> Self {
        DaoError::QueryFailure(error)
    }
}

impl DaoError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DaoError::QueryFailure(diesel::result::Error::NotFound)
        )
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            DaoError::QueryFailure(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ))
        )
    }
}

/// The PostgreSQL implementation of [`Store`]. The trait impls are split across this module's
/// children by resource.
#[derive(Clone)]
pub struct Dao {
    db_thread_pool: DbThreadPool,
}

impl Dao {
    pub fn new(db_thread_pool: &DbThreadPool) -> Self {
        Self {
            db_thread_pool: db_thread_pool.clone(),
        }
    }

    fn conn(&self) -> Result<DbConnection, DaoError> {
        Ok(self.db_thread_pool.get()?)
    }
}

impl Store for Dao {
    fn health(&self) -> StoreHealth {
        let state = self.db_thread_pool.state();

        StoreHealth {
            connections: state.connections,
            idle_connections: state.idle_connections,
        }
    }
}

#[cfg(test)]
pub mod test_pool {
    use once_cell::sync::Lazy;
    use std::time::Duration;

    use super::{create_db_thread_pool, Dao, DbThreadPool};

    fn db_var(key: &str, default: &str) -> String {
        std::env::var(format!("ENVELOPE_DB_{key}")).unwrap_or_else(|_| String::from(default))
    }

    pub static DB_THREAD_POOL: Lazy<DbThreadPool> = Lazy::new(|| {
        let uri = format!(
            "postgres://{}:{}@{}:{}/{}",
            db_var("USERNAME", "postgres"),
            db_var("PASSWORD", "postgres"),
            db_var("HOSTNAME", "localhost"),
            db_var("PORT", "5432"),
            db_var("NAME", "envelope_test"),
        );

        create_db_thread_pool(&uri, 8, Duration::from_secs(30))
            .expect("Failed to connect to the test database")
    });

    pub fn dao() -> Dao {
        Dao::new(&DB_THREAD_POOL)
    }
}
