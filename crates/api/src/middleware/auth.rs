//! Authentication extractor.
//!
//! Requests authenticate with an opaque bearer key: `Authorization: Token
//! <key>`. The extractor resolves the key to a [`User`] and hands it to the
//! handler; every core operation then receives the owner explicitly. There
//! is no ambient current-user state anywhere below this point.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Scheme expected in the `Authorization` header.
const SCHEME: &str = "Token";

/// Extractor that requires an authenticated user.
///
/// Rejects with 401 when the header is missing, malformed, or names an
/// unknown key.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

        let key = parse_token_header(header)
            .ok_or_else(|| AppError::Unauthorized("invalid authorization header".to_owned()))?;

        let user = UserRepository::new(state.pool())
            .get_by_token(key)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid token".to_owned()))?;

        Ok(Self(user))
    }
}

/// Extract the key from a `Token <key>` authorization header value.
fn parse_token_header(value: &str) -> Option<&str> {
    let (scheme, key) = value.split_once(' ')?;
    let key = key.trim();
    if scheme.eq_ignore_ascii_case(SCHEME) && !key.is_empty() {
        Some(key)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_header_valid() {
        assert_eq!(parse_token_header("Token abc123"), Some("abc123"));
        assert_eq!(parse_token_header("token abc123"), Some("abc123"));
        assert_eq!(parse_token_header("Token  abc123 "), Some("abc123"));
    }

    #[test]
    fn test_parse_token_header_invalid() {
        assert_eq!(parse_token_header("Bearer abc123"), None);
        assert_eq!(parse_token_header("Token"), None);
        assert_eq!(parse_token_header("Token "), None);
        assert_eq!(parse_token_header("abc123"), None);
        assert_eq!(parse_token_header(""), None);
    }
}
