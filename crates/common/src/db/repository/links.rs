//! External links and their upvotes

use super::{lock_by_id, Repository};
use crate::db::models::*;
use crate::errors::Result;
use crate::metrics;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

impl Repository {
    pub async fn add_link(&self, path: &str, user_id: Uuid, framework_id: Uuid) -> Result<Link> {
        let link = LinkActiveModel {
            id: Set(Uuid::new_v4()),
            path: Set(path.to_string()),
            framework_id: Set(framework_id),
            user_id: Set(user_id),
        }
        .insert(self.write_conn())
        .await?;

        metrics::record_contribution("link");
        info!(link_id = %link.id, framework_id = %framework_id, "Link added");

        Ok(link)
    }

    /// Point a link somewhere else. Votes cast for the old target are
    /// dropped in the same transaction.
    pub async fn edit_link(&self, id: Uuid, path: &str, user_id: Uuid) -> Result<Link> {
        let txn = self.write_conn().begin().await?;

        let mut link: LinkActiveModel = lock_by_id::<LinkEntity>(&txn, id, "link").await?.into();

        let cleared = VoteEntity::delete_many()
            .filter(VoteColumn::LinkId.eq(id))
            .exec(&txn)
            .await?
            .rows_affected;

        link.path = Set(path.to_string());
        link.user_id = Set(user_id);
        let link = link.update(&txn).await?;

        txn.commit().await?;

        info!(link_id = %id, user_id = %user_id, votes_cleared = cleared, "Link edited");
        Ok(link)
    }

    /// Links of a framework
    pub async fn list_framework_links(&self, framework_id: Uuid) -> Result<Vec<Link>> {
        LinkEntity::find()
            .filter(LinkColumn::FrameworkId.eq(framework_id))
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Votes
    // ========================================================================

    /// Existing vote of `user_id` on a link, if any
    pub async fn find_vote(&self, link_id: Uuid, user_id: Uuid) -> Result<Option<Vote>> {
        VoteEntity::find()
            .filter(VoteColumn::LinkId.eq(link_id))
            .filter(VoteColumn::UserId.eq(user_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Record an upvote. Callers check `find_vote` first.
    pub async fn add_vote(&self, link_id: Uuid, user_id: Uuid) -> Result<Vote> {
        let vote = VoteActiveModel {
            id: Set(Uuid::new_v4()),
            link_id: Set(link_id),
            user_id: Set(user_id),
        }
        .insert(self.write_conn())
        .await?;

        metrics::record_vote();
        info!(link_id = %link_id, user_id = %user_id, "Vote cast");

        Ok(vote)
    }

    pub async fn count_votes(&self, link_id: Uuid) -> Result<u64> {
        VoteEntity::find()
            .filter(VoteColumn::LinkId.eq(link_id))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::test_support::test_repo;

    #[tokio::test]
    async fn test_vote_lookup() {
        let (repo, _dir) = test_repo().await;
        let user = fixtures::user(&repo, "Voter").await;
        let framework = fixtures::framework(&repo, &user, "Bevy").await;
        let link = repo
            .add_link("https://bevyengine.org", user.id, framework.id)
            .await
            .unwrap();

        assert!(repo.find_vote(link.id, user.id).await.unwrap().is_none());
        let vote = repo.add_vote(link.id, user.id).await.unwrap();
        assert_eq!(repo.find_vote(link.id, user.id).await.unwrap().unwrap().id, vote.id);
        assert_eq!(repo.count_votes(link.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_edit_link_clears_votes() {
        let (repo, _dir) = test_repo().await;
        let owner = fixtures::user(&repo, "Owner").await;
        let editor = fixtures::user(&repo, "Editor").await;
        let framework = fixtures::framework(&repo, &owner, "Bevy").await;
        let link = repo
            .add_link("https://old.example", owner.id, framework.id)
            .await
            .unwrap();
        repo.add_vote(link.id, owner.id).await.unwrap();
        repo.add_vote(link.id, editor.id).await.unwrap();

        let edited = repo
            .edit_link(link.id, "https://new.example", editor.id)
            .await
            .unwrap();

        assert_eq!(edited.path, "https://new.example");
        assert_eq!(edited.user_id, editor.id);
        assert_eq!(repo.count_votes(link.id).await.unwrap(), 0);
        assert!(repo.find_vote(link.id, owner.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_links_listed_per_framework() {
        let (repo, _dir) = test_repo().await;
        let user = fixtures::user(&repo, "Linker").await;
        let bevy = fixtures::framework(&repo, &user, "Bevy").await;
        let macroquad = fixtures::framework(&repo, &user, "Macroquad").await;

        repo.add_link("https://a.example", user.id, bevy.id).await.unwrap();
        repo.add_link("https://b.example", user.id, bevy.id).await.unwrap();
        repo.add_link("https://c.example", user.id, macroquad.id).await.unwrap();

        assert_eq!(repo.list_framework_links(bevy.id).await.unwrap().len(), 2);
        assert_eq!(repo.list_framework_links(macroquad.id).await.unwrap().len(), 1);
    }
}
