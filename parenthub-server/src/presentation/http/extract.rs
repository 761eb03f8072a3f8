use axum::extract::{FromRequest, FromRequestParts, Json, Path, Query};

use super::app_error::AppError;

/// `Json` whose rejection is rendered as an `{error}` body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub(crate) struct ApiJson<T>(pub(crate) T);

#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub(crate) struct ApiQuery<T>(pub(crate) T);

#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub(crate) struct ApiPath<T>(pub(crate) T);
