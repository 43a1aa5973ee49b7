//! Moderation reports

use super::{fetch_by_id, Repository};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use crate::metrics;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;

impl Repository {
    /// File a report against a piece of content. Callers check
    /// `find_report` first; nothing here rejects a repeat.
    pub async fn report(
        &self,
        target: ReportTarget,
        reason: &str,
        user_id: Uuid,
    ) -> Result<Report> {
        let report = ReportActiveModel {
            id: Set(Uuid::new_v4()),
            created_at: Set(chrono::Utc::now().into()),
            reason: Set(reason.to_string()),
            resolved: Set(false),
            reporter_id: Set(user_id),
            target_kind: Set(target.kind()),
            target_id: Set(target.id()),
        }
        .insert(self.write_conn())
        .await?;

        metrics::record_report(target.kind());
        info!(
            report_id = %report.id,
            target_kind = ?target.kind(),
            target_id = %target.id(),
            reporter_id = %user_id,
            "Report filed"
        );

        Ok(report)
    }

    pub async fn report_comment(
        &self,
        reason: &str,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<Report> {
        self.report(ReportTarget::Comment(comment_id), reason, user_id).await
    }

    pub async fn report_opinion(
        &self,
        reason: &str,
        opinion_id: Uuid,
        user_id: Uuid,
    ) -> Result<Report> {
        self.report(ReportTarget::Opinion(opinion_id), reason, user_id).await
    }

    /// Report already filed by `user_id` against `target`, if any
    pub async fn find_report(&self, target: ReportTarget, user_id: Uuid) -> Result<Option<Report>> {
        ReportEntity::find()
            .filter(ReportColumn::TargetKind.eq(target.kind()))
            .filter(ReportColumn::TargetId.eq(target.id()))
            .filter(ReportColumn::ReporterId.eq(user_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Name or text of the reported content, `None` once it is gone
    pub async fn report_target_label(&self, target: ReportTarget) -> Result<Option<String>> {
        let label = match target {
            ReportTarget::Language(id) => self.language_name(id).await,
            ReportTarget::Framework(id) => self.framework_name(id).await,
            ReportTarget::Opinion(id) => self.opinion_text(id).await,
            ReportTarget::Comment(id) => self.comment_text(id).await,
        };

        match label {
            Ok(label) => Ok(Some(label)),
            Err(AppError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Open reports, oldest first
    pub async fn list_unresolved_reports(&self) -> Result<Vec<Report>> {
        ReportEntity::find()
            .filter(ReportColumn::Resolved.eq(false))
            .order_by_asc(ReportColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub async fn resolve_report(&self, id: Uuid) -> Result<Report> {
        let mut report: ReportActiveModel =
            fetch_by_id::<ReportEntity, _>(self.write_conn(), id, "report")
                .await?
                .into();
        report.resolved = Set(true);
        let report = report.update(self.write_conn()).await?;

        info!(report_id = %id, "Report resolved");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::test_support::test_repo;

    #[tokio::test]
    async fn test_report_lookup_is_per_user_and_target() {
        let (repo, _dir) = test_repo().await;
        let author = fixtures::user(&repo, "Author").await;
        let critic = fixtures::user(&repo, "Critic").await;
        let framework = fixtures::framework(&repo, &author, "Gin").await;
        let comment = repo.add_comment("Spam", framework.id, author.id).await.unwrap();

        let target = ReportTarget::Comment(comment.id);
        assert!(repo.find_report(target, critic.id).await.unwrap().is_none());

        let report = repo.report_comment("Spam", comment.id, critic.id).await.unwrap();
        assert!(!report.resolved);
        assert_eq!(report.target(), target);

        let found = repo.find_report(target, critic.id).await.unwrap().unwrap();
        assert_eq!(found.id, report.id);
        assert!(repo.find_report(target, author.id).await.unwrap().is_none());
        assert!(repo
            .find_report(ReportTarget::Opinion(comment.id), critic.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_target_labels() {
        let (repo, _dir) = test_repo().await;
        let user = fixtures::user(&repo, "Mod").await;
        let framework = fixtures::framework(&repo, &user, "Echo").await;
        let version = fixtures::version(&repo, &user, &framework).await;
        let opinion = repo.add_opinion("Meh", true, user.id, version.id).await.unwrap();
        let comment = repo.add_comment("Rude", framework.id, user.id).await.unwrap();

        assert_eq!(
            repo.report_target_label(ReportTarget::Language(framework.language_id)).await.unwrap(),
            Some("Rust".to_string())
        );
        assert_eq!(
            repo.report_target_label(ReportTarget::Framework(framework.id)).await.unwrap(),
            Some("Echo".to_string())
        );
        assert_eq!(
            repo.report_target_label(ReportTarget::Opinion(opinion.id)).await.unwrap(),
            Some("Meh".to_string())
        );
        assert_eq!(
            repo.report_target_label(ReportTarget::Comment(comment.id)).await.unwrap(),
            Some("Rude".to_string())
        );
    }

    #[tokio::test]
    async fn test_report_survives_deleted_target() {
        let (repo, _dir) = test_repo().await;
        let author = fixtures::user(&repo, "Author").await;
        let critic = fixtures::user(&repo, "Critic").await;
        let framework = fixtures::framework(&repo, &author, "Fiber").await;
        let comment = repo.add_comment("Gone soon", framework.id, author.id).await.unwrap();

        let report = repo.report_comment("Offensive", comment.id, critic.id).await.unwrap();
        repo.delete_comment(comment.id).await.unwrap();

        let open = repo.list_unresolved_reports().await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, report.id);
        assert_eq!(repo.report_target_label(report.target()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolve_report() {
        let (repo, _dir) = test_repo().await;
        let user = fixtures::user(&repo, "Mod").await;
        let framework = fixtures::framework(&repo, &user, "Chi").await;
        let version = fixtures::version(&repo, &user, &framework).await;
        let opinion = repo.add_opinion("Fine", true, user.id, version.id).await.unwrap();

        let report = repo.report_opinion("Off-topic", opinion.id, user.id).await.unwrap();
        let resolved = repo.resolve_report(report.id).await.unwrap();
        assert!(resolved.resolved);
        assert!(repo.list_unresolved_reports().await.unwrap().is_empty());

        assert!(matches!(
            repo.resolve_report(Uuid::new_v4()).await,
            Err(AppError::NotFound { .. })
        ));
    }
}
