//! Axum HTTP handlers for the engine's exposed surface.
//!
//! The service contracts are transport-agnostic; this module maps them
//! onto HTTP endpoints:
//!
//! - `POST /auth/login` - password step
//! - `POST /auth/2fa/verify` - one-time-code step-up
//! - `POST /auth/2fa/recovery` - recovery-code step-up
//! - `POST /auth/refresh` - refresh-token exchange
//! - `POST /auth/logout` - access-token revocation
//! - `POST /oauth/token` - embedded OAuth token endpoint (form-encoded)
//! - `GET /oauth/userinfo` - scope-gated claims

use std::sync::Arc;

use axum::extract::{Form, Json, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AuthError;
use crate::login::{Credentials, LoginOutcome, LoginService};
use crate::mfa::TwoFactorService;
use crate::oauth::{OAuthService, TokenRequest, TokenResponse, UserInfoResponse};
use crate::oauth::userinfo::extract_bearer;
use crate::token::{TokenPair, TokenService};

// =============================================================================
// State and router
// =============================================================================

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    /// Login orchestration.
    pub login: Arc<LoginService>,
    /// Session token service.
    pub tokens: Arc<TokenService>,
    /// Two-factor service.
    pub two_factor: Arc<TwoFactorService>,
    /// Embedded OAuth server.
    pub oauth: Arc<OAuthService>,
}

/// Builds the router for the engine's HTTP surface.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(login_handler))
        .route("/auth/2fa/verify", post(two_factor_verify_handler))
        .route("/auth/2fa/recovery", post(two_factor_recovery_handler))
        .route("/auth/refresh", post(refresh_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/oauth/token", post(oauth_token_handler))
        .route("/oauth/userinfo", get(userinfo_handler))
        .with_state(state)
}

// =============================================================================
// Request/response types
// =============================================================================

/// Body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Body of a successful `POST /auth/login`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LoginResponse {
    /// Login finished; tokens are ready.
    Tokens(TokenPair),
    /// A second factor is required.
    TwoFactor {
        /// Always `true`; lets clients branch without probing fields.
        require_two_factor: bool,
        /// Single-use token for the verify/recovery endpoints.
        temp_token: String,
    },
}

/// Body of the two-factor step-up endpoints.
#[derive(Debug, Deserialize)]
pub struct TwoFactorRequest {
    /// Temporary token from the login step.
    pub temp_token: String,
    /// One-time code or recovery code.
    pub code: String,
}

/// Body of `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// The refresh token to exchange.
    pub refresh_token: String,
}

// =============================================================================
// Handlers
// =============================================================================

async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let outcome = state
        .login
        .login(&Credentials {
            username: request.username,
            password: request.password,
        })
        .await?;

    Ok(Json(match outcome {
        LoginOutcome::Complete(pair) => LoginResponse::Tokens(pair),
        LoginOutcome::TwoFactorRequired { temp_token } => LoginResponse::TwoFactor {
            require_two_factor: true,
            temp_token,
        },
    }))
}

async fn two_factor_verify_handler(
    State(state): State<AppState>,
    Json(request): Json<TwoFactorRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let pending = state
        .two_factor
        .validate_pending_login(&request.temp_token)
        .await?
        .ok_or(AuthError::InvalidOrExpiredSession)?;

    if !state.two_factor.verify(&pending.user_id, &request.code).await? {
        return Err(AuthError::InvalidCode);
    }

    let pair = state
        .login
        .complete_two_factor_login(&request.temp_token)
        .await?;
    Ok(Json(pair))
}

async fn two_factor_recovery_handler(
    State(state): State<AppState>,
    Json(request): Json<TwoFactorRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let pending = state
        .two_factor
        .validate_pending_login(&request.temp_token)
        .await?
        .ok_or(AuthError::InvalidOrExpiredSession)?;

    state
        .two_factor
        .verify_recovery_code(&pending.user_id, &request.code)
        .await?;

    let pair = state
        .login
        .complete_two_factor_login(&request.temp_token)
        .await?;
    Ok(Json(pair))
}

async fn refresh_handler(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, AuthError> {
    let pair = state.tokens.refresh(&request.refresh_token).await?;
    Ok(Json(pair))
}

async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AuthError> {
    let token = bearer_from_headers(&headers)?.to_string();
    let user = state.tokens.validate_access(&token).await?;
    state.login.logout(&user.id, &token).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn oauth_token_handler(
    State(state): State<AppState>,
    Form(request): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let response = state.oauth.token(&request).await?;
    Ok(Json(response))
}

async fn userinfo_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserInfoResponse>, AuthError> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let claims = state.oauth.userinfo(authorization).await?;
    Ok(Json(claims))
}

fn bearer_from_headers(headers: &HeaderMap) -> Result<&str, AuthError> {
    extract_bearer(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok()),
    )
}

// =============================================================================
// Error mapping
// =============================================================================

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidCredentials
            | Self::Revoked
            | Self::InvalidToken { .. }
            | Self::InvalidOrExpiredToken
            | Self::InvalidOrExpiredSession
            | Self::InvalidCode
            | Self::InvalidRecoveryCode
            | Self::InvalidPassword
            | Self::MissingToken
            | Self::UserNotFound
            | Self::AccountDisabled
            | Self::InvalidClient { .. } => StatusCode::UNAUTHORIZED,
            Self::NoUserContext => StatusCode::FORBIDDEN,
            Self::AlreadyEnabled | Self::NotEnabled | Self::ConcurrentModification => {
                StatusCode::CONFLICT
            }
            Self::InvalidOrExpiredCode
            | Self::InvalidRedirectUri
            | Self::ClientMismatch
            | Self::RedirectUriMismatch
            | Self::UnsupportedGrantType { .. }
            | Self::MissingCode => StatusCode::BAD_REQUEST,
            Self::Storage { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({
            "error": self.oauth_error_code(),
            "error_description": self.to_string(),
        }));

        (status, body).into_response()
    }
}
