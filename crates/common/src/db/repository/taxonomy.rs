//! Languages, frameworks and favorites

use super::{fetch_by_id, lock_by_id, Repository};
use crate::db::models::*;
use crate::errors::Result;
use crate::metrics;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Set, Statement, TransactionTrait,
};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

/// Language with the number of frameworks filed under it
#[derive(Debug, Clone, FromQueryResult, Serialize)]
pub struct LanguageRanking {
    pub id: Uuid,
    pub name: String,
    pub framework_count: i64,
}

/// Framework with the number of distinct contributions reachable from it
#[derive(Debug, Clone, FromQueryResult, Serialize)]
pub struct FrameworkRanking {
    pub id: Uuid,
    pub name: String,
    pub total_contributions: i64,
}

const TOP_LANGUAGES_SQL: &str = r#"
SELECT
    l.id,
    l.name,
    COUNT(f.id) AS framework_count
FROM languages l
LEFT JOIN frameworks f ON f.language_id = l.id
GROUP BY l.id, l.name
ORDER BY framework_count DESC
LIMIT 10
"#;

const TOP_FRAMEWORKS_SQL: &str = r#"
SELECT
    fw.id,
    fw.name,
    (COUNT(DISTINCT v.id) + COUNT(DISTINCT fe.id) + COUNT(DISTINCT h.id)
        + COUNT(DISTINCT o.id) + COUNT(DISTINCT li.id) + COUNT(DISTINCT c.id)
        + COUNT(DISTINCT vo.id)) AS total_contributions
FROM frameworks fw
LEFT JOIN versions v ON v.framework_id = fw.id
LEFT JOIN features fe ON fe.version_id = v.id
LEFT JOIN hello_worlds h ON h.version_id = v.id
LEFT JOIN opinions o ON o.version_id = v.id
LEFT JOIN links li ON li.framework_id = fw.id
LEFT JOIN comments c ON c.framework_id = fw.id
LEFT JOIN votes vo ON vo.link_id = li.id
GROUP BY fw.id, fw.name
ORDER BY total_contributions DESC
LIMIT 10
"#;

impl Repository {
    // ========================================================================
    // Languages
    // ========================================================================

    /// All languages, alphabetical
    pub async fn list_languages(&self) -> Result<Vec<Language>> {
        LanguageEntity::find()
            .order_by_asc(LanguageColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Languages that have at least one framework, alphabetical
    pub async fn list_languages_with_frameworks(&self) -> Result<Vec<Language>> {
        LanguageEntity::find()
            .inner_join(FrameworkEntity)
            .distinct()
            .order_by_asc(LanguageColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub async fn get_language(&self, id: Uuid) -> Result<Language> {
        fetch_by_id::<LanguageEntity, _>(self.read_conn(), id, "language").await
    }

    /// Exact-name lookup used as a duplicate check before adding
    pub async fn find_language_by_name(&self, name: &str) -> Result<Option<Language>> {
        LanguageEntity::find()
            .filter(LanguageColumn::Name.eq(name))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Ten languages with the most frameworks
    pub async fn top_languages_by_framework_count(&self) -> Result<Vec<LanguageRanking>> {
        let conn = self.read_conn();
        LanguageRanking::find_by_statement(Statement::from_string(
            conn.get_database_backend(),
            TOP_LANGUAGES_SQL,
        ))
        .all(conn)
        .await
        .map_err(Into::into)
    }

    pub async fn add_language(&self, name: &str, user_id: Uuid) -> Result<Language> {
        let language = LanguageActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            user_id: Set(user_id),
        }
        .insert(self.write_conn())
        .await?;

        metrics::record_contribution("language");
        info!(language_id = %language.id, user_id = %user_id, "Language added");

        Ok(language)
    }

    /// Frameworks of a language, alphabetical
    pub async fn list_language_frameworks(&self, language_id: Uuid) -> Result<Vec<Framework>> {
        self.get_language(language_id).await?;

        FrameworkEntity::find()
            .filter(FrameworkColumn::LanguageId.eq(language_id))
            .order_by_asc(FrameworkColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Name of a language, as shown next to a report
    pub async fn language_name(&self, id: Uuid) -> Result<String> {
        Ok(self.get_language(id).await?.name)
    }

    // ========================================================================
    // Frameworks
    // ========================================================================

    pub async fn get_framework(&self, id: Uuid) -> Result<Framework> {
        fetch_by_id::<FrameworkEntity, _>(self.read_conn(), id, "framework").await
    }

    /// Exact-name lookup used as a duplicate check before adding
    pub async fn find_framework_by_name(&self, name: &str) -> Result<Option<Framework>> {
        FrameworkEntity::find()
            .filter(FrameworkColumn::Name.eq(name))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Case-insensitive exact-name search
    pub async fn search_framework_by_name(&self, name: &str) -> Result<Option<Framework>> {
        FrameworkEntity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col((
                    FrameworkEntity,
                    FrameworkColumn::Name,
                ))))
                .eq(name.to_lowercase()),
            )
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Ten frameworks with the most versions, features, hello worlds,
    /// opinions, links, comments and votes combined
    pub async fn top_frameworks_by_contributions(&self) -> Result<Vec<FrameworkRanking>> {
        let conn = self.read_conn();
        FrameworkRanking::find_by_statement(Statement::from_string(
            conn.get_database_backend(),
            TOP_FRAMEWORKS_SQL,
        ))
        .all(conn)
        .await
        .map_err(Into::into)
    }

    pub async fn add_framework(
        &self,
        name: &str,
        language_id: Uuid,
        user_id: Uuid,
    ) -> Result<Framework> {
        let framework = FrameworkActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            language_id: Set(language_id),
            user_id: Set(user_id),
        }
        .insert(self.write_conn())
        .await?;

        metrics::record_contribution("framework");
        info!(
            framework_id = %framework.id,
            language_id = %language_id,
            user_id = %user_id,
            "Framework added"
        );

        Ok(framework)
    }

    /// Name of a framework, as shown next to a report
    pub async fn framework_name(&self, id: Uuid) -> Result<String> {
        Ok(self.get_framework(id).await?.name)
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    /// Bookmark a framework for a user. Adding twice is a no-op.
    pub async fn add_favorite(&self, framework_id: Uuid, user_id: Uuid) -> Result<()> {
        let txn = self.write_conn().begin().await?;

        lock_by_id::<FrameworkEntity>(&txn, framework_id, "framework").await?;
        fetch_by_id::<UserEntity, _>(&txn, user_id, "user").await?;

        let existing = FrameworkFavoriteEntity::find_by_id((framework_id, user_id))
            .one(&txn)
            .await?;

        if existing.is_none() {
            FrameworkFavoriteActiveModel {
                framework_id: Set(framework_id),
                user_id: Set(user_id),
            }
            .insert(&txn)
            .await?;
        } else {
            debug!(framework_id = %framework_id, user_id = %user_id, "Already a favorite");
        }

        txn.commit().await?;

        metrics::record_favorite(true);
        info!(framework_id = %framework_id, user_id = %user_id, "Favorite added");

        Ok(())
    }

    /// Remove a bookmark. Removing one that does not exist is a no-op.
    pub async fn remove_favorite(&self, framework_id: Uuid, user_id: Uuid) -> Result<()> {
        let txn = self.write_conn().begin().await?;

        lock_by_id::<FrameworkEntity>(&txn, framework_id, "framework").await?;
        fetch_by_id::<UserEntity, _>(&txn, user_id, "user").await?;

        FrameworkFavoriteEntity::delete_by_id((framework_id, user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        metrics::record_favorite(false);
        info!(framework_id = %framework_id, user_id = %user_id, "Favorite removed");

        Ok(())
    }

    /// Users who bookmarked a framework
    pub async fn favorited_by(&self, framework_id: Uuid) -> Result<Vec<User>> {
        let user_ids: Vec<Uuid> = FrameworkFavoriteEntity::find()
            .filter(FrameworkFavoriteColumn::FrameworkId.eq(framework_id))
            .all(self.read_conn())
            .await?
            .into_iter()
            .map(|fav| fav.user_id)
            .collect();

        UserEntity::find()
            .filter(UserColumn::Id.is_in(user_ids))
            .order_by_asc(UserColumn::FirstName)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Frameworks a user bookmarked, alphabetical
    pub async fn user_favorites(&self, user_id: Uuid) -> Result<Vec<Framework>> {
        FrameworkEntity::find()
            .inner_join(FrameworkFavoriteEntity)
            .filter(FrameworkFavoriteColumn::UserId.eq(user_id))
            .order_by_asc(FrameworkColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }
}
