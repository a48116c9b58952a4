//! HTTP Handlers

use axum::Json;
use axum::extract::{FromRef, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use kernel::response::ApiResponse;
use platform::jwt::JwtCodec;
use platform::rate_limit::{InMemoryRateLimiter, RateLimitConfig, RateLimitStore};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    ChangePasswordInput, ChangePasswordUseCase, ForgotPasswordUseCase, GetProfileUseCase,
    LoginInput, LoginUseCase, RegisterInput, RegisterUseCase, ResetPasswordInput,
    ResetPasswordUseCase, VerifyResetTokenUseCase,
};
use crate::domain::mailer::Mailer;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ChangePasswordRequest, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest,
    LoginResponse, RegisterRequest, ResetPasswordRequest, UserResponse, VerifyTokenQuery,
    VerifyTokenResponse,
};
use crate::presentation::middleware::{ClientIp, CurrentUser, TrustProxy};

/// Same answer for known and unknown addresses
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent";

/// Shared state for auth handlers
pub struct AuthAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub config: Arc<AuthConfig>,
    pub jwt: Arc<JwtCodec>,
    pub limiter: Arc<InMemoryRateLimiter>,
}

impl<R, M> Clone for AuthAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            config: self.config.clone(),
            jwt: self.jwt.clone(),
            limiter: self.limiter.clone(),
        }
    }
}

impl<R, M> FromRef<AuthAppState<R, M>> for TrustProxy
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    fn from_ref(state: &AuthAppState<R, M>) -> Self {
        TrustProxy(state.config.trust_proxy)
    }
}

async fn enforce_rate_limit(
    limiter: &InMemoryRateLimiter,
    key: &str,
    config: &RateLimitConfig,
) -> AuthResult<()> {
    let result = limiter
        .check_and_increment(key, config)
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    if !result.allowed {
        return Err(AuthError::RateLimited {
            retry_after_secs: result.retry_after_secs(Utc::now().timestamp_millis()),
        });
    }
    Ok(())
}

// ============================================================================
// Register / Login / Logout
// ============================================================================

/// POST /api/auth/register
pub async fn register<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.mailer.clone());

    let user = use_case
        .execute(RegisterInput {
            username: req.username,
            email: req.email,
            password: req.password,
            display_name: req.display_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(UserResponse::from(&user)).with_message("User registered successfully"),
    ))
}

/// POST /api/auth/login
pub async fn login<R, M>(
    State(state): State<AuthAppState<R, M>>,
    client_ip: ClientIp,
    Json(req): Json<LoginRequest>,
) -> AuthResult<ApiResponse<LoginResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    enforce_rate_limit(
        &state.limiter,
        &client_ip.rate_limit_key("login"),
        &state.config.login_rate_limit,
    )
    .await?;

    let use_case = LoginUseCase::new(state.repo.clone(), state.jwt.clone());
    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(ApiResponse::ok(LoginResponse {
        token: output.token,
        user: UserResponse::from(&output.user),
    }))
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the client discards its copy.
pub async fn logout() -> ApiResponse<()> {
    ApiResponse::message("Logged out successfully")
}

// ============================================================================
// Current User
// ============================================================================

/// GET /api/me, GET /api/auth/me
pub async fn me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    current: CurrentUser,
) -> AuthResult<ApiResponse<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let user = GetProfileUseCase::new(state.repo.clone())
        .execute(current.user_id)
        .await?;

    Ok(ApiResponse::ok(UserResponse::from(&user)))
}

// ============================================================================
// Password
// ============================================================================

/// POST /api/password/change
pub async fn change_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    current: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> AuthResult<ApiResponse<()>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    ChangePasswordUseCase::new(state.repo.clone())
        .execute(
            current.user_id,
            ChangePasswordInput {
                current_password: req.current_password,
                new_password: req.new_password,
                confirm_password: req.confirm_password,
            },
        )
        .await?;

    Ok(ApiResponse::message("Password changed successfully"))
}

/// POST /api/password/forgot
pub async fn forgot_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    client_ip: ClientIp,
    Json(req): Json<ForgotPasswordRequest>,
) -> AuthResult<ApiResponse<ForgotPasswordResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    enforce_rate_limit(
        &state.limiter,
        &client_ip.rate_limit_key("forgot-password"),
        &state.config.forgot_password_rate_limit,
    )
    .await?;

    let use_case = ForgotPasswordUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );
    let output = use_case.execute(&req.email).await?;

    Ok(ApiResponse::ok(ForgotPasswordResponse {
        dev_reset_url: output.reset_url,
    })
    .with_message(FORGOT_PASSWORD_MESSAGE))
}

/// GET /api/password/verify-token?token=
pub async fn verify_reset_token<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Query(query): Query<VerifyTokenQuery>,
) -> Response
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let token = query.token.unwrap_or_default();
    let use_case = VerifyResetTokenUseCase::new(state.repo.clone());

    match use_case.execute(&token).await {
        Ok(expires_at) => ApiResponse::ok(VerifyTokenResponse {
            valid: true,
            expires_at: Some(expires_at),
        })
        .into_response(),
        Err(AuthError::InvalidResetToken) => {
            tracing::warn!("Invalid or expired password reset token presented");
            let body = serde_json::json!({
                "success": false,
                "error": "Bad Request",
                "message": AuthError::InvalidResetToken.to_string(),
                "action": null,
                "data": VerifyTokenResponse {
                    valid: false,
                    expires_at: None,
                },
            });
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /api/password/reset
pub async fn reset_password<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<ApiResponse<()>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    ResetPasswordUseCase::new(state.repo.clone())
        .execute(ResetPasswordInput {
            token: req.token,
            new_password: req.new_password,
            confirm_password: req.confirm_password,
        })
        .await?;

    Ok(ApiResponse::message("Password has been reset successfully"))
}
