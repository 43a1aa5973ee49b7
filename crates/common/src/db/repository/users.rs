//! User directory operations

use super::{fetch_by_id, Repository};
use crate::auth::{hash_password, verify_password};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use crate::mail::{MailMessage, Mailer};
use crate::metrics;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

/// Account creation input. Email, names and national ID are required;
/// they are optional here so that absence surfaces as `MissingField`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub national_id: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    pub education: Option<String>,
    pub profession: Option<String>,
}

/// A racing insert that lost on the email or national ID index
fn unique_violation(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::Duplicate {
            message: format!("Account already registered: {detail}"),
        },
        _ => err.into(),
    }
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::MissingField {
            field: field.to_string(),
        }),
    }
}

/// Lower-case the domain part, keep the local part as typed
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

impl Repository {
    /// Create a regular account
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.insert_user(new_user, false).await
    }

    /// Create an account with the admin flag set
    pub async fn create_superuser(&self, new_user: NewUser) -> Result<User> {
        self.insert_user(new_user, true).await
    }

    async fn insert_user(&self, new_user: NewUser, is_admin: bool) -> Result<User> {
        let email = normalize_email(&required("email", new_user.email)?);
        let first_name = required("first_name", new_user.first_name)?;
        let last_name = required("last_name", new_user.last_name)?;
        let national_id = required("national_id", new_user.national_id)?;

        let password_hash = match new_user.password.as_deref() {
            Some(password) if !password.is_empty() => Some(hash_password(password)?),
            _ => None,
        };

        let user = UserActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            national_id: Set(national_id),
            first_name: Set(first_name),
            last_name: Set(last_name),
            password_hash: Set(password_hash),
            is_active: Set(true),
            is_admin: Set(is_admin),
            is_public: Set(new_user.is_public),
            education: Set(new_user.education),
            profession: Set(new_user.profession),
            registered_at: Set(chrono::Utc::now().into()),
        };

        let user = user.insert(self.write_conn()).await.map_err(unique_violation)?;

        metrics::record_account_created(is_admin);
        info!(user_id = %user.id, is_admin, "Account created");

        Ok(user)
    }

    /// Find user by ID
    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        fetch_by_id::<UserEntity, _>(self.read_conn(), id, "user").await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::Email.eq(normalize_email(email)))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Accounts holding `email` under a different first name.
    ///
    /// Same-named accounts are not counted, so a user re-submitting their own
    /// email is not flagged.
    pub async fn count_email_conflicts(&self, email: &str, first_name: &str) -> Result<u64> {
        UserEntity::find()
            .filter(UserColumn::Email.eq(normalize_email(email)))
            .filter(UserColumn::FirstName.ne(first_name))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Accounts holding `national_id` under a different first name
    pub async fn count_national_id_conflicts(
        &self,
        national_id: &str,
        first_name: &str,
    ) -> Result<u64> {
        UserEntity::find()
            .filter(UserColumn::NationalId.eq(national_id))
            .filter(UserColumn::FirstName.ne(first_name))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Whether another account already uses `email`
    pub async fn email_taken(&self, email: &str, exclude_user: Option<Uuid>) -> Result<bool> {
        let mut query = UserEntity::find().filter(UserColumn::Email.eq(normalize_email(email)));
        if let Some(id) = exclude_user {
            query = query.filter(UserColumn::Id.ne(id));
        }
        Ok(query.count(self.read_conn()).await? > 0)
    }

    /// Whether another account already uses `national_id`
    pub async fn national_id_taken(
        &self,
        national_id: &str,
        exclude_user: Option<Uuid>,
    ) -> Result<bool> {
        let mut query = UserEntity::find().filter(UserColumn::NationalId.eq(national_id));
        if let Some(id) = exclude_user {
            query = query.filter(UserColumn::Id.ne(id));
        }
        Ok(query.count(self.read_conn()).await? > 0)
    }

    pub async fn deactivate_user(&self, id: Uuid) -> Result<User> {
        self.set_user_active(id, false).await
    }

    pub async fn activate_user(&self, id: Uuid) -> Result<User> {
        self.set_user_active(id, true).await
    }

    /// Deactivation also ends every open session of the account
    async fn set_user_active(&self, id: Uuid, active: bool) -> Result<User> {
        let txn = self.write_conn().begin().await?;

        let mut user: UserActiveModel = fetch_by_id::<UserEntity, _>(&txn, id, "user")
            .await?
            .into();
        user.is_active = Set(active);
        let user = user.update(&txn).await?;

        if !active {
            let ended = SessionEntity::delete_many()
                .filter(SessionColumn::UserId.eq(id))
                .exec(&txn)
                .await?
                .rows_affected;
            debug!(user_id = %id, ended, "Sessions ended");
        }

        txn.commit().await?;

        info!(user_id = %id, active, "Account activation changed");
        Ok(user)
    }

    /// Check an email/password pair. Inactive accounts are refused.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User> {
        let user = self
            .find_user_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, hash)? {
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AppError::Forbidden {
                message: "Account is not active".to_string(),
            });
        }

        Ok(user)
    }

    /// Send a message to the user's registered email
    pub async fn send_notification(
        &self,
        mailer: &dyn Mailer,
        user_id: Uuid,
        subject: &str,
        body: &str,
        from: Option<&str>,
    ) -> Result<()> {
        let user = self.get_user(user_id).await?;

        mailer
            .send(MailMessage {
                to: user.email,
                from: from.map(String::from),
                subject: subject.to_string(),
                body: body.to_string(),
            })
            .await
    }

    /// Delete an account; storage cascades to everything it owns
    pub async fn delete_user(&self, id: Uuid) -> Result<()> {
        let result = UserEntity::delete_by_id(id).exec(self.write_conn()).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("user", id));
        }

        info!(user_id = %id, "Account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::test_support::test_repo;
    use crate::mail::RecordingMailer;
    use std::time::Duration;

    fn ada() -> NewUser {
        NewUser {
            email: Some("ada@Example.COM".into()),
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            national_id: Some("111.222.333-44".into()),
            password: Some("analytical-engine".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email(" Ada@Example.COM "), "Ada@example.com");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[tokio::test]
    async fn test_create_user_requires_national_id() {
        let (repo, _dir) = test_repo().await;

        let err = repo
            .create_user(NewUser {
                national_id: None,
                ..ada()
            })
            .await
            .unwrap_err();

        match err {
            AppError::MissingField { field } => assert_eq!(field, "national_id"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_blank_first_name_is_missing() {
        let (repo, _dir) = test_repo().await;

        let err = repo
            .create_user(NewUser {
                first_name: Some("   ".into()),
                ..ada()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MissingField { ref field } if field == "first_name"));
    }

    #[tokio::test]
    async fn test_create_user_defaults() {
        let (repo, _dir) = test_repo().await;

        let user = repo.create_user(ada()).await.unwrap();
        assert_eq!(user.full_name(), "Ada Lovelace");
        assert_eq!(user.email, "ada@example.com");
        assert!(user.is_active);
        assert!(!user.is_admin);
        assert!(!user.is_public);
        assert_eq!(user.display_name(), ANONYMOUS_DISPLAY_NAME);

        let fetched = repo.get_user(user.id).await.unwrap();
        assert_eq!(fetched.id, user.id);
    }

    #[tokio::test]
    async fn test_public_user_displays_full_name() {
        let (repo, _dir) = test_repo().await;

        let user = repo
            .create_user(NewUser {
                is_public: true,
                ..ada()
            })
            .await
            .unwrap();
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_create_superuser_is_staff() {
        let (repo, _dir) = test_repo().await;

        let admin = repo.create_superuser(ada()).await.unwrap();
        assert!(admin.is_admin);
        assert!(admin.is_staff());
        assert!(admin.is_superuser());
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let (repo, _dir) = test_repo().await;

        let err = repo.get_user(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_conflict_counts_ignore_same_first_name() {
        let (repo, _dir) = test_repo().await;
        repo.create_user(ada()).await.unwrap();

        assert_eq!(
            repo.count_email_conflicts("ada@example.com", "Ada").await.unwrap(),
            0
        );
        assert_eq!(
            repo.count_email_conflicts("ada@example.com", "Grace").await.unwrap(),
            1
        );
        assert_eq!(
            repo.count_national_id_conflicts("111.222.333-44", "Grace")
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            repo.count_national_id_conflicts("999", "Grace").await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_taken_checks_exclude_by_id() {
        let (repo, _dir) = test_repo().await;
        let user = repo.create_user(ada()).await.unwrap();

        assert!(repo.email_taken("ada@example.com", None).await.unwrap());
        assert!(!repo.email_taken("ada@example.com", Some(user.id)).await.unwrap());
        assert!(repo.national_id_taken("111.222.333-44", None).await.unwrap());
        assert!(!repo
            .national_id_taken("111.222.333-44", Some(user.id))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_deactivate_and_reactivate() {
        let (repo, _dir) = test_repo().await;
        let user = repo.create_user(ada()).await.unwrap();

        assert!(!repo.deactivate_user(user.id).await.unwrap().is_active);
        assert!(repo.activate_user(user.id).await.unwrap().is_active);
    }

    #[tokio::test]
    async fn test_deactivation_ends_open_sessions() {
        let (repo, _dir) = test_repo().await;
        let user = repo.create_user(ada()).await.unwrap();
        let other = fixtures::user(&repo, "Other").await;

        let session = repo
            .create_session(user.id, Duration::from_secs(3600))
            .await
            .unwrap();
        let untouched = repo
            .create_session(other.id, Duration::from_secs(3600))
            .await
            .unwrap();

        repo.deactivate_user(user.id).await.unwrap();

        assert!(repo.find_active_session(session.id).await.unwrap().is_none());
        assert!(repo.find_active_session(untouched.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_a_conflict() {
        let (repo, _dir) = test_repo().await;
        repo.create_user(ada()).await.unwrap();

        // skips the email_taken pre-check, as a racing request would
        let same_email = repo
            .create_user(NewUser {
                national_id: Some("555".into()),
                ..ada()
            })
            .await;
        assert!(matches!(same_email, Err(AppError::Duplicate { .. })));

        let same_national_id = repo
            .create_user(NewUser {
                email: Some("other@example.com".into()),
                ..ada()
            })
            .await;
        assert!(matches!(same_national_id, Err(AppError::Duplicate { .. })));
    }

    #[tokio::test]
    async fn test_verify_credentials() {
        let (repo, _dir) = test_repo().await;
        let user = repo.create_user(ada()).await.unwrap();

        let ok = repo
            .verify_credentials("ada@example.com", "analytical-engine")
            .await
            .unwrap();
        assert_eq!(ok.id, user.id);

        let wrong = repo.verify_credentials("ada@example.com", "babbage").await;
        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));

        repo.deactivate_user(user.id).await.unwrap();
        let inactive = repo
            .verify_credentials("ada@example.com", "analytical-engine")
            .await;
        assert!(matches!(inactive, Err(AppError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_send_notification_targets_registered_email() {
        let (repo, _dir) = test_repo().await;
        let user = repo.create_user(ada()).await.unwrap();
        let mailer = RecordingMailer::default();

        repo.send_notification(&mailer, user.id, "Welcome", "Hello Ada", None)
            .await
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ada@example.com");
        assert_eq!(sent[0].subject, "Welcome");
        assert_eq!(sent[0].from, None);
    }

    #[tokio::test]
    async fn test_delete_user_cascades_to_owned_rows() {
        let (repo, _dir) = test_repo().await;
        let owner = fixtures::user(&repo, "Owner").await;
        let framework = fixtures::framework(&repo, &owner, "Rocket").await;
        let version = fixtures::version(&repo, &owner, &framework).await;
        repo.add_feature("Typed routes", owner.id, version.id).await.unwrap();

        repo.delete_user(owner.id).await.unwrap();

        assert!(matches!(
            repo.get_framework(framework.id).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            repo.get_version(version.id).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            repo.delete_user(owner.id).await,
            Err(AppError::NotFound { .. })
        ));
    }
}
