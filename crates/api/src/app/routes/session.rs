use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;

use holdbook_auth::{Credentials, Identity};

use crate::app::dto::{AccessResponse, LoginRequest, SessionResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::SessionContext;
use crate::cookies::CookieRememberStore;

fn access(services: &AppServices, identity: Option<Identity>) -> AccessResponse {
    let capabilities = identity
        .as_ref()
        .map(|id| services.capabilities.capabilities_for(id).granted())
        .unwrap_or_default();
    AccessResponse {
        granted: identity.is_some(),
        identity,
        capabilities,
    }
}

/// Start a session; a valid remember-me cookie resumes it immediately.
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let mut jar = CookieRememberStore::from_headers(&headers, now);
    let session_id = services.start_session(now);
    let check = services
        .sessions
        .with_session(session_id, now, |session| services.gate.check(session, &mut jar, now))
        .ok_or(ApiError::SessionExpired)?;

    let body = SessionResponse {
        session_id: session_id.to_string(),
        granted: check.granted,
        identity: check.identity,
    };
    Ok(jar.apply((StatusCode::CREATED, Json(body)).into_response()))
}

pub async fn current(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let mut jar = CookieRememberStore::from_headers(&headers, now);
    let check = services
        .sessions
        .with_session(session.session_id(), now, |s| services.gate.check(s, &mut jar, now))
        .ok_or(ApiError::SessionExpired)?;

    let body = access(&services, check.identity);
    Ok(jar.apply(Json(body).into_response()))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let mut jar = CookieRememberStore::from_headers(&headers, now);
    let remember = body.remember;
    let credentials = Credentials::new(body.username, body.password);

    let outcome = services
        .sessions
        .with_session(session.session_id(), now, |s| {
            services.gate.login(s, &credentials, remember, &mut jar, now)
        })
        .ok_or(ApiError::SessionExpired)?;
    let identity = outcome.into_result()?;

    let body = access(&services, Some(identity));
    Ok(jar.apply(Json(body).into_response()))
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let now = Utc::now();
    let mut jar = CookieRememberStore::from_headers(&headers, now);
    services
        .sessions
        .with_session(session.session_id(), now, |s| services.gate.logout(s, &mut jar))
        .ok_or(ApiError::SessionExpired)?;

    let body = access(&services, None);
    Ok(jar.apply(Json(body).into_response()))
}
