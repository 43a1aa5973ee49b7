//! Login sessions

use super::Repository;
use crate::db::models::*;
use crate::errors::Result;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

impl Repository {
    /// Open a session for `user_id` lasting `ttl`
    pub async fn create_session(&self, user_id: Uuid, ttl: Duration) -> Result<Session> {
        let now = chrono::Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero());

        let session = SessionActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            created_at: Set(now.into()),
            expires_at: Set((now + ttl).into()),
        }
        .insert(self.write_conn())
        .await?;

        info!(session_id = %session.id, user_id = %user_id, "Session created");
        Ok(session)
    }

    /// Session by id, unless it has expired
    pub async fn find_active_session(&self, id: Uuid) -> Result<Option<Session>> {
        let session = SessionEntity::find_by_id(id).one(self.read_conn()).await?;

        Ok(session.filter(|s| {
            let active = !s.is_expired();
            if !active {
                debug!(session_id = %s.id, "Session expired");
            }
            active
        }))
    }

    /// End a session. Ending one that no longer exists is a no-op.
    pub async fn delete_session(&self, id: Uuid) -> Result<()> {
        SessionEntity::delete_by_id(id).exec(self.write_conn()).await?;
        info!(session_id = %id, "Session deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::test_support::test_repo;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let (repo, _dir) = test_repo().await;
        let user = fixtures::user(&repo, "Sessioned").await;

        let session = repo
            .create_session(user.id, Duration::from_secs(3600))
            .await
            .unwrap();
        let found = repo.find_active_session(session.id).await.unwrap().unwrap();
        assert_eq!(found.user_id, user.id);

        repo.delete_session(session.id).await.unwrap();
        assert!(repo.find_active_session(session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_not_active() {
        let (repo, _dir) = test_repo().await;
        let user = fixtures::user(&repo, "Sessioned").await;

        let session = repo.create_session(user.id, Duration::ZERO).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(repo.find_active_session(session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sessions_go_with_their_user() {
        let (repo, _dir) = test_repo().await;
        let user = fixtures::user(&repo, "Leaving").await;
        let session = repo
            .create_session(user.id, Duration::from_secs(60))
            .await
            .unwrap();

        repo.delete_user(user.id).await.unwrap();
        assert!(repo.find_active_session(session.id).await.unwrap().is_none());
    }
}
