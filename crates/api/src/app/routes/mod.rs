use axum::{
    Router,
    routing::{get, post},
};

pub mod ledger;
pub mod report;
pub mod session;
pub mod system;

/// Router for every session-scoped endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/session", post(session::create).get(session::current))
        .route("/session/login", post(session::login))
        .route("/session/logout", post(session::logout))
        .nest("/ledger", ledger::router())
        .route("/report", get(report::metrics))
}
