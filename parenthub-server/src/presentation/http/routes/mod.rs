use axum::{Router, routing::get};

use super::handlers::access::check_access;
use super::handlers::health::healthz;
use crate::presentation::AppState;

pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod interactions;
pub(crate) mod posts;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/access", get(check_access))
        .nest("/api/auth", auth::router())
        .nest("/api/columns", posts::columns())
        .nest("/api/community", posts::community())
        .nest("/api/likes", interactions::likes())
        .nest("/api/comments", interactions::comments())
        .nest("/api/uploads", interactions::uploads())
        .nest("/api/admin", admin::router())
}
