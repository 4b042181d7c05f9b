use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde_json::json;
use tracing::info;

use holdbook_accounting::{SimpleEntry, Transfer};
use holdbook_auth::Capability;
use holdbook_infra::ledger::DEFAULT_RECENT;

use crate::app::dto::{RecentQuery, RowsAppended, SimpleEntryRequest, TransferRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/entries", post(record_entry))
        .route("/transfers", post(record_transfer))
        .route("/recent", get(recent))
        .route("/summary", get(summary))
}

pub async fn record_entry(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    Json(body): Json<SimpleEntryRequest>,
) -> Result<Response, ApiError> {
    let principal = authz::require(&services, &session, Capability::WriteLedger)?;
    let entry = SimpleEntry::try_from(body)?;

    let posted = services
        .writer
        .record_simple(&entry, Utc::now().date_naive())
        .await?;
    info!(identity = %principal.principal().identity, "simple entry accepted");

    let body = RowsAppended {
        rows_appended: 1,
        entries: vec![posted],
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn record_transfer(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    Json(body): Json<TransferRequest>,
) -> Result<Response, ApiError> {
    let principal = authz::require(&services, &session, Capability::WriteLedger)?;
    let transfer = Transfer::try_from(body)?;

    let posted = services
        .writer
        .record_transfer(&transfer, Utc::now().date_naive())
        .await?;
    info!(identity = %principal.principal().identity, "transfer accepted");

    let body = RowsAppended {
        rows_appended: posted.len(),
        entries: posted.to_vec(),
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn recent(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
    Query(query): Query<RecentQuery>,
) -> Result<Response, ApiError> {
    authz::require(&services, &session, Capability::ViewReport)?;
    let limit = query.limit.unwrap_or(DEFAULT_RECENT);

    let snapshot = services.reader.entries().await?;
    Ok(Json(json!({
        "items": snapshot.recent(limit),
        "skipped_rows": snapshot.skipped,
    }))
    .into_response())
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
) -> Result<Response, ApiError> {
    authz::require(&services, &session, Capability::ViewReport)?;
    let summary = services.reader.summary().await?;
    Ok(Json(summary).into_response())
}
