use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::domain::access::{Identity, Requirement, evaluate};
use crate::presentation::http::app_error::AppError;

/// Route layer enforcing a static [`Requirement`]:
/// `.route_layer(from_fn_with_state(Requirement::Admin, require))`.
pub(crate) async fn require(
    State(requirement): State<Requirement>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = request.extensions().get::<Identity>();
    let decision = evaluate(identity, requirement);
    if let Err(err) = decision.into_result() {
        debug!(
            path = %request.uri().path(),
            user = identity.map(|identity| identity.nickname.as_str()),
            ?requirement,
            ?decision,
            "access gate refused request"
        );
        return Err(err.into());
    }

    Ok(next.run(request).await)
}
