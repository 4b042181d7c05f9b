use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use chrono::Utc;

use holdbook_core::SessionId;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::SessionContext;

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(&parts.headers).ok_or(ApiError::NoSession)?;
        let session_id: SessionId = token.parse().map_err(|_| ApiError::NoSession)?;

        let services = parts
            .extensions
            .get::<Arc<AppServices>>()
            .cloned()
            .ok_or(ApiError::Internal("application services are not installed"))?;
        if services.sessions.get(session_id, Utc::now()).is_none() {
            return Err(ApiError::SessionExpired);
        }

        Ok(SessionContext::new(session_id))
    }
}

pub(crate) fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc ")), Some("abc"));
    }

    #[test]
    fn malformed_authorization_is_ignored() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
        assert_eq!(extract_bearer(&headers("Basic abc")), None);
        assert_eq!(extract_bearer(&headers("Bearer   ")), None);
    }
}
