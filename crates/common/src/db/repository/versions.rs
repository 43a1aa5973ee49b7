//! Framework versions

use super::{fetch_by_id, lock_by_id, Repository};
use crate::db::models::*;
use crate::errors::Result;
use crate::metrics;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

/// Version numbers are stored with three decimal places
const VERSION_SCALE: u32 = 3;

fn normalize_number(number: Decimal) -> Decimal {
    number.round_dp(VERSION_SCALE)
}

impl Repository {
    pub async fn get_version(&self, id: Uuid) -> Result<Version> {
        fetch_by_id::<VersionEntity, _>(self.read_conn(), id, "version").await
    }

    /// Duplicate check for a version number within a framework
    pub async fn find_version(
        &self,
        number: Decimal,
        framework_id: Uuid,
    ) -> Result<Option<Version>> {
        VersionEntity::find()
            .filter(VersionColumn::Number.eq(normalize_number(number)))
            .filter(VersionColumn::FrameworkId.eq(framework_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub async fn add_version(
        &self,
        number: Decimal,
        framework_id: Uuid,
        user_id: Uuid,
    ) -> Result<Version> {
        let version = VersionActiveModel {
            id: Set(Uuid::new_v4()),
            number: Set(normalize_number(number)),
            framework_id: Set(framework_id),
            user_id: Set(user_id),
        }
        .insert(self.write_conn())
        .await?;

        metrics::record_contribution("version");
        info!(
            version_id = %version.id,
            framework_id = %framework_id,
            number = %version.number,
            "Version added"
        );

        Ok(version)
    }

    /// Replace the number and hand ownership to the editor
    pub async fn edit_version(&self, id: Uuid, number: Decimal, user_id: Uuid) -> Result<Version> {
        let txn = self.write_conn().begin().await?;

        let mut version: VersionActiveModel =
            lock_by_id::<VersionEntity>(&txn, id, "version").await?.into();
        version.number = Set(normalize_number(number));
        version.user_id = Set(user_id);
        let version = version.update(&txn).await?;

        txn.commit().await?;

        info!(version_id = %id, user_id = %user_id, number = %version.number, "Version edited");
        Ok(version)
    }

    /// Versions of a framework, lowest number first
    pub async fn list_framework_versions(&self, framework_id: Uuid) -> Result<Vec<Version>> {
        VersionEntity::find()
            .filter(VersionColumn::FrameworkId.eq(framework_id))
            .order_by_asc(VersionColumn::Number)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::test_support::test_repo;
    use crate::errors::AppError;

    #[test]
    fn test_numbers_round_to_three_places() {
        assert_eq!(
            normalize_number(Decimal::new(12_3456, 4)),
            Decimal::new(12_346, 3)
        );
    }

    #[tokio::test]
    async fn test_add_and_find_version() {
        let (repo, _dir) = test_repo().await;
        let user = fixtures::user(&repo, "Graydon").await;
        let framework = fixtures::framework(&repo, &user, "Actix").await;

        let number = Decimal::new(15, 1);
        let version = repo.add_version(number, framework.id, user.id).await.unwrap();

        let found = repo.find_version(number, framework.id).await.unwrap().unwrap();
        assert_eq!(found.id, version.id);
        assert_eq!(found.number.round_dp(3), number);

        let other = fixtures::framework(&repo, &user, "Warp").await;
        assert!(repo.find_version(number, other.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_edit_version_replaces_number_and_owner() {
        let (repo, _dir) = test_repo().await;
        let owner = fixtures::user(&repo, "Owner").await;
        let editor = fixtures::user(&repo, "Editor").await;
        let framework = fixtures::framework(&repo, &owner, "Actix").await;
        let version = fixtures::version(&repo, &owner, &framework).await;

        repo.edit_version(version.id, Decimal::new(225, 2), editor.id)
            .await
            .unwrap();

        let stored = repo.get_version(version.id).await.unwrap();
        assert_eq!(stored.number.round_dp(3), Decimal::new(225, 2));
        assert_eq!(stored.user_id, editor.id);
    }

    #[tokio::test]
    async fn test_edit_missing_version() {
        let (repo, _dir) = test_repo().await;
        let user = fixtures::user(&repo, "Editor").await;

        let err = repo
            .edit_version(Uuid::new_v4(), Decimal::ONE, user.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_versions_listed_in_number_order() {
        let (repo, _dir) = test_repo().await;
        let user = fixtures::user(&repo, "Lister").await;
        let framework = fixtures::framework(&repo, &user, "Rocket").await;

        for n in [Decimal::new(5, 1), Decimal::new(2, 0), Decimal::new(125, 2)] {
            repo.add_version(n, framework.id, user.id).await.unwrap();
        }

        let numbers: Vec<Decimal> = repo
            .list_framework_versions(framework.id)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.number.round_dp(3))
            .collect();
        assert_eq!(
            numbers,
            vec![Decimal::new(5, 1), Decimal::new(125, 2), Decimal::new(2, 0)]
        );
    }
}
