use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::domain::access::Requirement;
use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    create_column, create_community_post, delete_column, delete_community_post, get_column,
    get_community_post, list_columns, list_community, update_column, update_community_post,
};
use crate::presentation::http::middleware::gate::require;

pub(crate) fn columns() -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_columns))
        .route("/{id}", get(get_column));

    let authors = Router::new()
        .route("/", post(create_column))
        .route_layer(middleware::from_fn_with_state(
            Requirement::ColumnAuthor,
            require,
        ));

    // ownership is checked by the service once the post is loaded
    let members = Router::new()
        .route("/{id}", put(update_column).delete(delete_column))
        .route_layer(middleware::from_fn_with_state(
            Requirement::Authenticated,
            require,
        ));

    public.merge(authors).merge(members)
}

pub(crate) fn community() -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_community))
        .route("/{id}", get(get_community_post));

    let members = Router::new()
        .route("/", post(create_community_post))
        .route(
            "/{id}",
            put(update_community_post).delete(delete_community_post),
        )
        .route_layer(middleware::from_fn_with_state(
            Requirement::Authenticated,
            require,
        ));

    public.merge(members)
}
