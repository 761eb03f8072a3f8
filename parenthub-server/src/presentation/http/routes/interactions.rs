use axum::Router;
use axum::middleware;
use axum::routing::{delete, get, post};

use crate::domain::access::Requirement;
use crate::presentation::AppState;
use crate::presentation::http::handlers::comments::{add_comment, delete_comment, list_comments};
use crate::presentation::http::handlers::likes::{like_status, toggle_like};
use crate::presentation::http::handlers::uploads::upload_image;
use crate::presentation::http::middleware::gate::require;

pub(crate) fn likes() -> Router<AppState> {
    Router::new()
        .route("/", post(toggle_like).get(like_status))
        .route_layer(middleware::from_fn_with_state(
            Requirement::Authenticated,
            require,
        ))
}

pub(crate) fn comments() -> Router<AppState> {
    let public = Router::new().route("/", get(list_comments));

    let members = Router::new()
        .route("/", post(add_comment))
        .route("/{id}", delete(delete_comment))
        .route_layer(middleware::from_fn_with_state(
            Requirement::Authenticated,
            require,
        ));

    public.merge(members)
}

pub(crate) fn uploads() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_image))
        .route_layer(middleware::from_fn_with_state(
            Requirement::Authenticated,
            require,
        ))
}
