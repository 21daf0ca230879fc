//! Session auth: exchanges a verified Google OAuth access token for an opaque
//! bearer session token, and resolves that token on every interview route.
//!
//! The identity provider owns verification; this module only consumes its
//! userinfo endpoint, finds-or-creates the user by email, and tracks sessions
//! in Postgres with a fixed expiry.

use axum::{
    extract::{FromRef, FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;

const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const SESSION_TTL_DAYS: i64 = 30;
const USERINFO_TIMEOUT_SECS: u64 = 10;

/// The authenticated caller, resolved from the `Authorization: Bearer` header.
/// Any route taking this extractor rejects unauthenticated requests with 401
/// before the handler body runs.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    /// The session token that authenticated this request (needed for logout).
    pub token: Uuid,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_bearer)
            .ok_or(AppError::Unauthorized)?;

        let row: Option<(Uuid, String, String)> = sqlx::query_as(
            "SELECT u.id, u.name, u.email
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = $1 AND s.expires_at > now()",
        )
        .bind(token)
        .fetch_optional(&state.db)
        .await?;

        row.map(|(user_id, name, email)| AuthedUser {
            user_id,
            name,
            email,
            token,
        })
        .ok_or(AppError::Unauthorized)
    }
}

/// Parses `Bearer <uuid>` out of an Authorization header value.
fn parse_bearer(header: &str) -> Option<Uuid> {
    header.strip_prefix("Bearer ")?.trim().parse().ok()
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: Uuid,
    pub expires_at: DateTime<Utc>,
    pub user: UserRow,
}

/// Profile shape returned by the Google userinfo endpoint.
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

/// POST /api/v1/auth/session
///
/// Verifies the access token against the identity provider, upserts the user
/// by email, and issues a bearer session token.
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    if request.access_token.trim().is_empty() {
        return Err(AppError::Validation("access_token is required".to_string()));
    }

    let profile = fetch_userinfo(&request.access_token).await?;

    let user: UserRow = sqlx::query_as(
        r#"
        INSERT INTO users (id, name, email, image)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE
            SET name = EXCLUDED.name, image = EXCLUDED.image
        RETURNING id, name, email, image, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(profile.name.unwrap_or_else(|| profile.email.clone()))
    .bind(&profile.email)
    .bind(profile.picture)
    .fetch_one(&state.db)
    .await?;

    let token = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);

    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(token)
        .bind(user.id)
        .bind(expires_at)
        .execute(&state.db)
        .await?;

    info!("Issued session for user {}", user.id);

    Ok(Json(SessionResponse {
        token,
        expires_at,
        user,
    }))
}

/// DELETE /api/v1/auth/session
pub async fn handle_delete_session(
    State(state): State<AppState>,
    user: AuthedUser,
) -> Result<StatusCode, AppError> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(user.token)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Resolves the access token to a profile via the provider's userinfo
/// endpoint. A non-success status means the token is invalid or expired.
async fn fetch_userinfo(access_token: &str) -> Result<GoogleUserInfo, AppError> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(USERINFO_TIMEOUT_SECS))
        .build()
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    let response = client
        .get(GOOGLE_USERINFO_URL)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    if !response.status().is_success() {
        return Err(AppError::Unauthorized);
    }

    response
        .json::<GoogleUserInfo>()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer_accepts_valid_token() {
        let token = Uuid::new_v4();
        let header = format!("Bearer {token}");
        assert_eq!(parse_bearer(&header), Some(token));
    }

    #[test]
    fn test_parse_bearer_rejects_malformed_headers() {
        assert_eq!(parse_bearer("Bearer not-a-uuid"), None);
        assert_eq!(parse_bearer("Basic dXNlcjpwYXNz"), None);
        assert_eq!(parse_bearer(""), None);
        assert_eq!(parse_bearer(&Uuid::new_v4().to_string()), None);
    }

    #[test]
    fn test_userinfo_deserializes_partial_profile() {
        let profile: GoogleUserInfo =
            serde_json::from_str(r#"{"email": "a@example.com"}"#).unwrap();
        assert_eq!(profile.email, "a@example.com");
        assert!(profile.name.is_none());
        assert!(profile.picture.is_none());
    }
}
