//! Home page data

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use wof_common::{
    db::models::{Framework, Language},
    db::{FrameworkRanking, LanguageRanking},
    errors::Result,
};

/// A language listed on the home page with its frameworks
#[derive(Serialize)]
pub struct LanguageEntry {
    #[serde(flatten)]
    pub language: Language,
    pub frameworks: Vec<Framework>,
}

#[derive(Serialize)]
pub struct HomeResponse {
    pub top_languages: Vec<LanguageRanking>,
    pub top_frameworks: Vec<FrameworkRanking>,
    pub languages: Vec<LanguageEntry>,
}

/// Rankings plus every language that has at least one framework
pub async fn home(State(state): State<AppState>) -> Result<Json<HomeResponse>> {
    let top_languages = state.repo.top_languages_by_framework_count().await?;
    let top_frameworks = state.repo.top_frameworks_by_contributions().await?;

    let mut languages = Vec::new();
    for language in state.repo.list_languages_with_frameworks().await? {
        let frameworks = state.repo.list_language_frameworks(language.id).await?;
        languages.push(LanguageEntry {
            language,
            frameworks,
        });
    }

    Ok(Json(HomeResponse {
        top_languages,
        top_frameworks,
        languages,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use wof_common::db::NewUser;

    #[tokio::test]
    async fn test_home_lists_languages_and_rankings() {
        let (state, _dir) = test_state().await;
        let repo = &state.repo;

        let user = repo
            .create_user(NewUser {
                email: Some("home@example.com".into()),
                first_name: Some("Home".into()),
                last_name: Some("Page".into()),
                national_id: Some("home-1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let rust = repo.add_language("Rust", user.id).await.unwrap();
        repo.add_language("Empty", user.id).await.unwrap();
        repo.add_framework("Axum", rust.id, user.id).await.unwrap();

        let Json(response) = home(State(state.clone())).await.unwrap();

        assert_eq!(response.top_languages.len(), 2);
        assert_eq!(response.top_languages[0].name, "Rust");
        assert_eq!(response.top_frameworks.len(), 1);
        assert_eq!(response.languages.len(), 1);
        assert_eq!(response.languages[0].frameworks[0].name, "Axum");
    }
}
