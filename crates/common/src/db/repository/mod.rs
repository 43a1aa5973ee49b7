//! Repository pattern for catalog operations
//!
//! Every mutating operation takes the acting user explicitly. Edits and
//! favorite/reply/delete flows run inside a transaction that first takes an
//! exclusive row lock (`SELECT ... FOR UPDATE`) on the row they change, so
//! concurrent writers of the same row serialize. Reads take no lock.
//!
//! Duplicate detection is advisory: lookups return `Option`/counts and the
//! caller decides, nothing here rejects a duplicate.

mod comments;
mod contributions;
mod links;
mod reports;
mod sessions;
mod taxonomy;
mod users;
mod versions;

pub use comments::{CommentNode, CommentThread};
pub use contributions::VersionContributions;
pub use taxonomy::{FrameworkRanking, LanguageRanking};
pub use users::NewUser;

use crate::db::DbPool;
use crate::errors::{AppError, Result};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, PrimaryKeyTrait,
    QuerySelect,
};
use uuid::Uuid;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }
}

/// Fetch a row by id, failing fast when it does not exist
async fn fetch_by_id<E, C>(conn: &C, id: Uuid, resource: &str) -> Result<E::Model>
where
    E: EntityTrait,
    C: ConnectionTrait,
    Uuid: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    E::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found(resource, id))
}

/// Fetch a row by id under an exclusive lock held until `txn` ends
async fn lock_by_id<E>(txn: &DatabaseTransaction, id: Uuid, resource: &str) -> Result<E::Model>
where
    E: EntityTrait,
    Uuid: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    E::find_by_id(id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::not_found(resource, id))
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small catalog builders shared by the repository tests

    use super::*;
    use crate::db::models::*;
    use rust_decimal::Decimal;

    pub async fn user(repo: &Repository, first_name: &str) -> User {
        let slug = format!("{}-{}", first_name.to_lowercase(), Uuid::new_v4().simple());
        repo.create_user(NewUser {
            email: Some(format!("{}@example.com", slug)),
            first_name: Some(first_name.to_string()),
            last_name: Some("Tester".to_string()),
            national_id: Some(slug),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    pub async fn framework(repo: &Repository, owner: &User, name: &str) -> Framework {
        let language = repo.add_language("Rust", owner.id).await.unwrap();
        repo.add_framework(name, language.id, owner.id).await.unwrap()
    }

    pub async fn version(repo: &Repository, owner: &User, framework: &Framework) -> Version {
        repo.add_version(Decimal::new(1, 0), framework.id, owner.id)
            .await
            .unwrap()
    }
}
