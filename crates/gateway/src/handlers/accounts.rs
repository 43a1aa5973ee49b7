//! Registration, login and logout

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::AppState;
use wof_common::{
    auth::AuthContext,
    db::NewUser,
    errors::{AppError, Result},
};

/// Registration form
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 60))]
    pub first_name: String,

    #[validate(length(min = 1, max = 60))]
    pub last_name: String,

    #[validate(length(min = 1, max = 20))]
    pub national_id: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[serde(default)]
    pub is_public: bool,

    pub education: Option<String>,

    pub profession: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: String,
}

fn validation_error(errors: ValidationErrors) -> AppError {
    let field = errors.field_errors().keys().next().map(|f| f.to_string());
    AppError::Validation {
        message: errors.to_string(),
        field,
    }
}

/// Create an account and send a welcome notification
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountResponse>)> {
    request.validate().map_err(validation_error)?;

    if state.repo.email_taken(&request.email, None).await? {
        return Err(AppError::Duplicate {
            message: "Email already registered".to_string(),
        });
    }
    if state.repo.national_id_taken(&request.national_id, None).await? {
        return Err(AppError::Duplicate {
            message: "National ID already registered".to_string(),
        });
    }

    let user = state
        .repo
        .create_user(NewUser {
            email: Some(request.email),
            first_name: Some(request.first_name),
            last_name: Some(request.last_name),
            national_id: Some(request.national_id),
            password: Some(request.password),
            is_public: request.is_public,
            education: request.education,
            profession: request.profession,
        })
        .await?;

    if let Err(e) = state
        .repo
        .send_notification(
            state.mailer.as_ref(),
            user.id,
            "Welcome to WOF",
            &format!("Hello {}, your account is ready.", user.first_name),
            None,
        )
        .await
    {
        tracing::warn!(user_id = %user.id, error = %e, "Welcome mail failed");
    }

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            id: user.id,
            display_name: user.display_name(),
            email: user.email,
        }),
    ))
}

/// Check credentials and open a session
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    request.validate().map_err(validation_error)?;

    let user = state
        .repo
        .verify_credentials(&request.email, &request.password)
        .await?;
    let session = state
        .repo
        .create_session(user.id, state.config.session_ttl())
        .await?;
    let token = state.jwt.generate_token(user.id, session.id)?;

    tracing::info!(user_id = %user.id, session_id = %session.id, "Logged in");

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        expires_at: session.expires_at.to_rfc3339(),
    }))
}

/// End the caller's session
pub async fn logout(State(state): State<AppState>, auth: AuthContext) -> Result<StatusCode> {
    state.repo.delete_session(auth.session_id).await?;

    tracing::info!(
        user_id = %auth.user_id,
        session_id = %auth.session_id,
        request_id = %auth.request_id,
        "Logged out"
    );

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::test_support::{test_router, test_state};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn registration() -> Value {
        json!({
            "email": "grace@example.com",
            "first_name": "Grace",
            "last_name": "Hopper",
            "national_id": "123.456.789-00",
            "password": "compilers-rock",
            "is_public": true
        })
    }

    #[tokio::test]
    async fn test_register_login_logout() {
        let (state, _dir) = test_state().await;
        let app = test_router(state);

        let (status, body) = call(&app, post_json("/register", registration())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["display_name"], "Grace Hopper");

        let (status, body) = call(
            &app,
            post_json(
                "/login",
                json!({"email": "grace@example.com", "password": "compilers-rock"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let logout = || {
            Request::post("/logout")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap()
        };

        let (status, _) = call(&app, logout()).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        // the session is gone, so the same token no longer works
        let (status, _) = call(&app, logout()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let (state, _dir) = test_state().await;
        let app = test_router(state);

        let (status, _) = call(&app, post_json("/register", registration())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = call(&app, post_json("/register", registration())).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let mut same_id = registration();
        same_id["email"] = json!("other@example.com");
        let (status, _) = call(&app, post_json("/register", same_id)).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_register_validates_payload() {
        let (state, _dir) = test_state().await;
        let app = test_router(state);

        let mut bad = registration();
        bad["email"] = json!("not-an-email");
        let (status, body) = call(&app, post_json("/register", bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["field"], "email");
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let (state, _dir) = test_state().await;
        let app = test_router(state);

        call(&app, post_json("/register", registration())).await;
        let (status, _) = call(
            &app,
            post_json(
                "/login",
                json!({"email": "grace@example.com", "password": "wrong-password"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_requires_token() {
        let (state, _dir) = test_state().await;
        let app = test_router(state);

        let request = Request::post("/logout").body(Body::empty()).unwrap();
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
