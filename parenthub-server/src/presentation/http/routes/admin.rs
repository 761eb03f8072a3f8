use axum::Router;
use axum::middleware;
use axum::routing::post;

use crate::domain::access::Requirement;
use crate::presentation::AppState;
use crate::presentation::http::handlers::admin::recount_post;
use crate::presentation::http::middleware::gate::require;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/{postType}/{id}/recount", post(recount_post))
        .route_layer(middleware::from_fn_with_state(Requirement::Admin, require))
}
