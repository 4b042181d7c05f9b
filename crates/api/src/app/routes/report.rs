use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    response::{IntoResponse, Response},
};
use serde_json::json;

use holdbook_auth::Capability;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::SessionContext;

/// External report metrics. A malformed or missing report degrades to a
/// `warning` field; it never fails the request.
pub async fn metrics(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
) -> Result<Response, ApiError> {
    authz::require(&services, &session, Capability::ViewReport)?;
    let body = match services.report.metrics().await {
        Ok(metrics) => json!({ "metrics": metrics }),
        Err(err) => json!({
            "metrics": null,
            "warning": format!("check the structure of the report sheet: {err}"),
        }),
    };
    Ok(Json(body).into_response())
}
