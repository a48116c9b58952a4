//! Client identification utilities
//!
//! Request header parsing shared by the auth middleware and rate limiting.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

/// Why a bearer token could not be read from `Authorization`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("Authorization header required")]
    Missing,

    #[error("Invalid authorization header format")]
    Malformed,
}

/// Extract the token from `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively. Any other scheme, a missing
/// token or a header that is not valid ASCII is [`BearerError::Malformed`].
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::Malformed)?;

    let (scheme, token) = value.trim().split_once(' ').ok_or(BearerError::Malformed)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(BearerError::Malformed);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        return Err(BearerError::Malformed);
    }
    Ok(token)
}

/// Extract client IP address from headers
///
/// The first `X-Forwarded-For` entry is client controlled unless a reverse
/// proxy we run overwrites the header, so it is only honored with
/// `trust_forwarded_for`. Otherwise, and when the header is missing or
/// unparsable, the direct connection IP is used.
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trust_forwarded_for: bool,
) -> Option<IpAddr> {
    if !trust_forwarded_for {
        return direct_ip;
    }
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}
