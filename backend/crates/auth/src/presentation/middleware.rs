//! Auth Middleware
//!
//! Bearer token authentication for protected routes.
//!
//! ```text
//! require_auth  → CurrentUser in extensions, or 401
//! require_admin → 403 unless CurrentUser is an admin (after require_auth)
//! attach_user   → CurrentUser in extensions when a valid token is sent
//! ```
//!
//! Handlers read the result through the [`CurrentUser`] and [`MaybeUser`]
//! extractors.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, FromRef, FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use kernel::id::UserId;
use platform::client::{bearer_token, extract_client_ip};
use platform::jwt::{JwtCodec, JwtError};

use crate::application::config::AuthConfig;
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

/// Verifies bearer tokens; the state of the auth middleware
#[derive(Debug, Clone)]
pub struct AuthGuard {
    jwt: Arc<JwtCodec>,
}

impl AuthGuard {
    pub fn new(jwt: Arc<JwtCodec>) -> Self {
        Self { jwt }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(Arc::new(config.jwt_codec()))
    }

    pub fn codec(&self) -> Arc<JwtCodec> {
        self.jwt.clone()
    }

    /// Resolve the caller from the `Authorization` header
    pub fn authenticate(&self, headers: &HeaderMap) -> AuthResult<CurrentUser> {
        let token = bearer_token(headers)?;

        let claims = self.jwt.verify(token).map_err(|e| {
            match e {
                JwtError::Expired => tracing::debug!("Expired access token"),
                other => tracing::debug!(error = %other, "Rejected access token"),
            }
            AuthError::InvalidToken
        })?;

        let role = UserRole::from_code(&claims.role).ok_or(AuthError::InvalidToken)?;

        Ok(CurrentUser {
            user_id: UserId::new(claims.sub),
            email: claims.email,
            role,
        })
    }
}

/// Authenticated caller, taken from the verified JWT claims
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Middleware that requires a valid bearer token
pub async fn require_auth(
    State(guard): State<AuthGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = guard.authenticate(req.headers())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Middleware that requires an admin; must run after [`require_auth`]
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AuthError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AuthError::MissingAuthorization)?;

    if !user.is_admin() {
        tracing::debug!(user_id = %user.user_id, "Admin route refused");
        return Err(AuthError::Forbidden);
    }

    Ok(next.run(req).await)
}

/// Middleware that identifies the caller when it can, and never rejects
pub async fn attach_user(State(guard): State<AuthGuard>, mut req: Request, next: Next) -> Response {
    if let Ok(user) = guard.authenticate(req.headers()) {
        req.extensions_mut().insert(user);
    }
    next.run(req).await
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingAuthorization)
    }
}

/// Caller on a public route; `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl MaybeUser {
    pub fn is_admin(&self) -> bool {
        self.0.as_ref().is_some_and(CurrentUser::is_admin)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}

/// Whether the first `X-Forwarded-For` entry names the client
///
/// Enable only when every request passes through a reverse proxy that
/// overwrites the header; otherwise clients can pick their own rate limit
/// bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrustProxy(pub bool);

/// Client address for rate limiting: the socket peer when the server was
/// started with connect info, or the forwarded address under [`TrustProxy`]
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub Option<IpAddr>);

impl ClientIp {
    pub fn rate_limit_key(&self, scope: &str) -> String {
        match self.0 {
            Some(ip) => format!("{scope}:{ip}"),
            None => format!("{scope}:unknown"),
        }
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    TrustProxy: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TrustProxy(trusted) = TrustProxy::from_ref(state);
        let direct = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());
        Ok(ClientIp(extract_client_ip(&parts.headers, direct, trusted)))
    }
}
