//! Hello worlds, features and opinions attached to a version

use super::{fetch_by_id, lock_by_id, Repository};
use crate::db::models::*;
use crate::errors::Result;
use crate::metrics;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Everything contributed to a single version
#[derive(Debug, Clone, Default, Serialize)]
pub struct VersionContributions {
    pub hello_worlds: Vec<HelloWorld>,
    pub features: Vec<Feature>,
    pub opinions: Vec<Opinion>,
}

impl Repository {
    // ========================================================================
    // Hello worlds
    // ========================================================================

    pub async fn add_hello_world(
        &self,
        description: &str,
        example_code: &str,
        user_id: Uuid,
        version_id: Uuid,
    ) -> Result<HelloWorld> {
        let hello_world = HelloWorldActiveModel {
            id: Set(Uuid::new_v4()),
            description: Set(description.to_string()),
            example_code: Set(example_code.to_string()),
            user_id: Set(user_id),
            version_id: Set(version_id),
        }
        .insert(self.write_conn())
        .await?;

        metrics::record_contribution("hello_world");
        info!(hello_world_id = %hello_world.id, version_id = %version_id, "Hello world added");

        Ok(hello_world)
    }

    // ========================================================================
    // Features
    // ========================================================================

    pub async fn add_feature(
        &self,
        description: &str,
        user_id: Uuid,
        version_id: Uuid,
    ) -> Result<Feature> {
        let feature = FeatureActiveModel {
            id: Set(Uuid::new_v4()),
            description: Set(description.to_string()),
            user_id: Set(user_id),
            version_id: Set(version_id),
        }
        .insert(self.write_conn())
        .await?;

        metrics::record_contribution("feature");
        info!(feature_id = %feature.id, version_id = %version_id, "Feature added");

        Ok(feature)
    }

    /// Rewrite a feature description; the editor becomes its owner
    pub async fn edit_feature(
        &self,
        id: Uuid,
        description: &str,
        user_id: Uuid,
    ) -> Result<Feature> {
        let txn = self.write_conn().begin().await?;

        let mut feature: FeatureActiveModel =
            lock_by_id::<FeatureEntity>(&txn, id, "feature").await?.into();
        feature.description = Set(description.to_string());
        feature.user_id = Set(user_id);
        let feature = feature.update(&txn).await?;

        txn.commit().await?;

        info!(feature_id = %id, user_id = %user_id, "Feature edited");
        Ok(feature)
    }

    // ========================================================================
    // Opinions
    // ========================================================================

    pub async fn add_opinion(
        &self,
        text: &str,
        is_favorable: bool,
        user_id: Uuid,
        version_id: Uuid,
    ) -> Result<Opinion> {
        let opinion = OpinionActiveModel {
            id: Set(Uuid::new_v4()),
            text: Set(text.to_string()),
            is_favorable: Set(is_favorable),
            user_id: Set(user_id),
            version_id: Set(version_id),
        }
        .insert(self.write_conn())
        .await?;

        metrics::record_contribution("opinion");
        info!(opinion_id = %opinion.id, version_id = %version_id, is_favorable, "Opinion added");

        Ok(opinion)
    }

    /// Rewrite an opinion's text. The favorable flag is left as it was.
    pub async fn edit_opinion(&self, id: Uuid, text: &str, user_id: Uuid) -> Result<Opinion> {
        let txn = self.write_conn().begin().await?;

        let mut opinion: OpinionActiveModel =
            lock_by_id::<OpinionEntity>(&txn, id, "opinion").await?.into();
        opinion.text = Set(text.to_string());
        opinion.user_id = Set(user_id);
        let opinion = opinion.update(&txn).await?;

        txn.commit().await?;

        info!(opinion_id = %id, user_id = %user_id, "Opinion edited");
        Ok(opinion)
    }

    /// Text of an opinion, as shown next to a report
    pub async fn opinion_text(&self, id: Uuid) -> Result<String> {
        Ok(fetch_by_id::<OpinionEntity, _>(self.read_conn(), id, "opinion")
            .await?
            .text)
    }

    /// Hello worlds, features and opinions of a version
    pub async fn version_contributions(&self, version_id: Uuid) -> Result<VersionContributions> {
        let conn = self.read_conn();
        fetch_by_id::<VersionEntity, _>(conn, version_id, "version").await?;

        let hello_worlds = HelloWorldEntity::find()
            .filter(HelloWorldColumn::VersionId.eq(version_id))
            .all(conn)
            .await?;
        let features = FeatureEntity::find()
            .filter(FeatureColumn::VersionId.eq(version_id))
            .all(conn)
            .await?;
        let opinions = OpinionEntity::find()
            .filter(OpinionColumn::VersionId.eq(version_id))
            .all(conn)
            .await?;

        Ok(VersionContributions {
            hello_worlds,
            features,
            opinions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::test_support::test_repo;
    use crate::errors::AppError;

    #[tokio::test]
    async fn test_version_contributions_are_grouped() {
        let (repo, _dir) = test_repo().await;
        let user = fixtures::user(&repo, "Anders").await;
        let framework = fixtures::framework(&repo, &user, "Blazor").await;
        let version = fixtures::version(&repo, &user, &framework).await;

        repo.add_hello_world("Counter", "<Counter />", user.id, version.id)
            .await
            .unwrap();
        repo.add_feature("Components", user.id, version.id).await.unwrap();
        repo.add_feature("WASM", user.id, version.id).await.unwrap();
        repo.add_opinion("Solid", false, user.id, version.id).await.unwrap();

        let contributions = repo.version_contributions(version.id).await.unwrap();
        assert_eq!(contributions.hello_worlds.len(), 1);
        assert_eq!(contributions.hello_worlds[0].example_code, "<Counter />");
        assert_eq!(contributions.features.len(), 2);
        assert_eq!(contributions.opinions.len(), 1);
        assert!(!contributions.opinions[0].is_favorable);
    }

    #[tokio::test]
    async fn test_edit_feature_transfers_ownership() {
        let (repo, _dir) = test_repo().await;
        let owner = fixtures::user(&repo, "Owner").await;
        let editor = fixtures::user(&repo, "Editor").await;
        let framework = fixtures::framework(&repo, &owner, "Yew").await;
        let version = fixtures::version(&repo, &owner, &framework).await;
        let feature = repo.add_feature("Hooks", owner.id, version.id).await.unwrap();

        let edited = repo
            .edit_feature(feature.id, "Function components", editor.id)
            .await
            .unwrap();
        assert_eq!(edited.description, "Function components");
        assert_eq!(edited.user_id, editor.id);
    }

    #[tokio::test]
    async fn test_edit_opinion_keeps_favorable_flag() {
        let (repo, _dir) = test_repo().await;
        let owner = fixtures::user(&repo, "Owner").await;
        let editor = fixtures::user(&repo, "Editor").await;
        let framework = fixtures::framework(&repo, &owner, "Leptos").await;
        let version = fixtures::version(&repo, &owner, &framework).await;
        let opinion = repo
            .add_opinion("Too young", false, owner.id, version.id)
            .await
            .unwrap();

        let edited = repo
            .edit_opinion(opinion.id, "Maturing fast", editor.id)
            .await
            .unwrap();
        assert_eq!(edited.text, "Maturing fast");
        assert_eq!(edited.user_id, editor.id);
        assert!(!edited.is_favorable);

        assert_eq!(repo.opinion_text(opinion.id).await.unwrap(), "Maturing fast");
    }

    #[tokio::test]
    async fn test_edit_missing_contribution() {
        let (repo, _dir) = test_repo().await;
        let user = fixtures::user(&repo, "Editor").await;

        assert!(matches!(
            repo.edit_feature(Uuid::new_v4(), "x", user.id).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            repo.edit_opinion(Uuid::new_v4(), "x", user.id).await,
            Err(AppError::NotFound { .. })
        ));
    }
}
