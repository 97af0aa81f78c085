//! Customer account endpoints: register, login, token refresh, profile.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitrine_core::auth::{validate_registration, AuthError};
use vitrine_core::{authenticate, pick_login_candidate, Argon2Hasher, CredentialHasher};

use crate::middleware::{extract_bearer_token, RequestId};
use crate::session::{TokenKind, TokenPair};

use super::{map_db_error, map_write_error, ApiError, AppState};

const INVALID_CREDENTIALS: &str = "no active account found with the given credentials";

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginRequest {
    #[serde(alias = "username", alias = "identifier")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RefreshRequest {
    pub refresh: String,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct RegisterResponse {
    id: i64,
    email: String,
    #[serde(flatten)]
    tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub(super) struct AccessResponse {
    access: String,
}

#[derive(Debug, Serialize)]
pub(super) struct ProfileResponse {
    id: i64,
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    date_joined: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn unauthorized(request_id: &str, message: &str) -> ApiError {
    ApiError::new(request_id, "unauthorized", message)
}

fn internal(request_id: &str, what: &str, error: &dyn std::fmt::Display) -> ApiError {
    tracing::error!(error = %error, "{what} failed");
    ApiError::new(request_id, "internal_error", format!("{what} failed"))
}

fn issue_pair(
    state: &AppState,
    rid: &str,
    user_id: i64,
    email: &str,
) -> Result<TokenPair, ApiError> {
    state
        .sessions
        .issue_pair(user_id, email)
        .map_err(|e| internal(rid, "token signing", &e))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register: create an account and sign it in.
pub(super) async fn register(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let rid = &req_id.0;
    let email = validate_registration(&body.email, &body.password).map_err(|e| match e {
        AuthError::Hash(_) => internal(rid, "password hashing", &e),
        other => ApiError::new(rid, "validation_error", other.to_string()),
    })?;

    let password = body.password;
    let password_hash = tokio::task::spawn_blocking(move || Argon2Hasher.hash(&password))
        .await
        .map_err(|e| internal(rid, "password hashing", &e))?
        .map_err(|e| internal(rid, "password hashing", &e))?;

    let user = vitrine_db::create_user(
        &state.pool,
        &vitrine_db::NewUser {
            email,
            username: body.username.trim().to_owned(),
            password_hash,
            first_name: body.first_name.trim().to_owned(),
            last_name: body.last_name.trim().to_owned(),
        },
    )
    .await
    .map_err(|e| map_write_error(rid, &e, "an account with that email already exists"))?;

    tracing::info!(user_id = user.id, "account registered");
    let tokens = issue_pair(&state, rid, user.id, &user.email)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            email: user.email,
            tokens,
        }),
    ))
}

/// POST /api/v1/auth/login: exchange email-or-username and password for tokens.
pub(super) async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let rid = &req_id.0;
    let identifier = body.email.trim().to_owned();

    let candidates = if identifier.is_empty() {
        Vec::new()
    } else {
        vitrine_db::find_login_candidates(&state.pool, &identifier)
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?
    };
    let candidate = pick_login_candidate(candidates, &identifier);

    let password = body.password;
    let (user_id, candidate) = tokio::task::spawn_blocking(move || {
        let user_id = authenticate(&Argon2Hasher, candidate.as_ref(), &password);
        (user_id, candidate)
    })
    .await
    .map_err(|e| internal(rid, "credential check", &e))?;

    let (Some(user_id), Some(candidate)) = (user_id, candidate) else {
        tracing::info!("login rejected");
        return Err(unauthorized(rid, INVALID_CREDENTIALS));
    };

    vitrine_db::record_login(&state.pool, user_id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    tracing::info!(user_id, "login succeeded");

    Ok(Json(issue_pair(&state, rid, user_id, &candidate.email)?))
}

/// POST /api/v1/auth/token/refresh: mint a new access token.
pub(super) async fn refresh(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<AccessResponse>, ApiError> {
    let rid = &req_id.0;
    let claims = state
        .sessions
        .verify(&body.refresh, TokenKind::Refresh)
        .ok_or_else(|| unauthorized(rid, "refresh token is invalid or expired"))?;
    let user = active_user(&state, rid, claims.user_id()).await?;

    let access = state
        .sessions
        .issue(TokenKind::Access, user.id, &user.email)
        .map_err(|e| internal(rid, "token signing", &e))?;
    Ok(Json(AccessResponse { access }))
}

/// GET /api/v1/auth/profile: the signed-in account.
pub(super) async fn profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<Json<ProfileResponse>, ApiError> {
    let rid = &req_id.0;
    let claims = extract_bearer_token(headers.get(AUTHORIZATION))
        .and_then(|token| state.sessions.verify(token, TokenKind::Access))
        .ok_or_else(|| {
            unauthorized(
                rid,
                "authentication credentials were not provided or are invalid",
            )
        })?;
    let user = active_user(&state, rid, claims.user_id()).await?;

    Ok(Json(ProfileResponse {
        id: user.id,
        email: user.email,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        date_joined: user.date_joined,
    }))
}

async fn active_user(
    state: &AppState,
    rid: &str,
    user_id: Option<i64>,
) -> Result<vitrine_db::UserRow, ApiError> {
    let Some(user_id) = user_id else {
        return Err(unauthorized(rid, "token subject is invalid"));
    };
    vitrine_db::get_user(&state.pool, user_id)
        .await
        .map_err(|e| map_db_error(rid.to_owned(), &e))?
        .filter(|u| u.is_active)
        .ok_or_else(|| unauthorized(rid, "account is unavailable"))
}
