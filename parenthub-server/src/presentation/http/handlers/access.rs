use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::domain::access::{
    GateDecision, Identity, PageRoute, Requirement, classify_page, evaluate,
};
use crate::domain::error::DomainError;
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppError, AppResult};
use crate::presentation::http::extract::ApiQuery;
use crate::presentation::http::middleware::auth::MaybeUser;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct AccessQuery {
    /// Page path of the web front-end, e.g. `/column/write`.
    pub(crate) path: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccessResponseDto {
    /// allow, login or unauthorized
    pub(crate) decision: String,
    pub(crate) redirect_to: Option<String>,
}

impl AccessResponseDto {
    fn new(decision: GateDecision, path: &str) -> Self {
        let (decision, redirect_to) = match decision {
            GateDecision::Allow => ("allow", None),
            GateDecision::RedirectToLogin => (
                "login",
                Some(format!("/login?callbackUrl={}", urlencoding::encode(path))),
            ),
            GateDecision::RedirectToUnauthorized => ("unauthorized", Some("/unauthorized".to_string())),
        };
        Self {
            decision: decision.to_string(),
            redirect_to,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/access",
    tag = "access",
    params(AccessQuery),
    responses(
        (status = 200, description = "Gate decision for the page", body = AccessResponseDto),
        (status = 400, description = "Path must start with '/'"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn check_access(
    State(state): State<AppState>,
    MaybeUser(identity): MaybeUser,
    ApiQuery(query): ApiQuery<AccessQuery>,
) -> AppResult<Json<AccessResponseDto>> {
    if !query.path.starts_with('/') {
        return Err(AppError::BadRequest("path must start with '/'".to_string()));
    }

    let route = classify_page(&query.path);
    let requirement = page_requirement(&state, route, identity.as_ref()).await?;
    let decision = evaluate(identity.as_ref(), requirement);
    debug!(path = %query.path, ?route, ?decision, "page access evaluated");

    Ok(Json(AccessResponseDto::new(decision, &query.path)))
}

async fn page_requirement(
    state: &AppState,
    route: PageRoute,
    identity: Option<&Identity>,
) -> AppResult<Requirement> {
    if let Some(requirement) = route.requirement() {
        return Ok(requirement);
    }
    let PageRoute::Edit(target) = route else {
        return Ok(Requirement::Authenticated);
    };
    // anonymous visitors go to login before the owner is looked up
    if identity.is_none() {
        return Ok(Requirement::Authenticated);
    }

    match state.post_service.author_of(target).await {
        Ok(owner_id) => Ok(Requirement::OwnerOrAdmin { owner_id }),
        Err(DomainError::NotFound(_)) => Ok(Requirement::Authenticated),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::AccessResponseDto;
    use crate::domain::access::GateDecision;

    #[test]
    fn login_redirect_carries_encoded_callback() {
        let dto = AccessResponseDto::new(GateDecision::RedirectToLogin, "/column/write?draft=1");
        assert_eq!(dto.decision, "login");
        assert_eq!(
            dto.redirect_to.as_deref(),
            Some("/login?callbackUrl=%2Fcolumn%2Fwrite%3Fdraft%3D1")
        );
    }

    #[test]
    fn unauthorized_and_allow_shapes() {
        let dto = AccessResponseDto::new(GateDecision::RedirectToUnauthorized, "/admin");
        assert_eq!(dto.decision, "unauthorized");
        assert_eq!(dto.redirect_to.as_deref(), Some("/unauthorized"));

        let dto = AccessResponseDto::new(GateDecision::Allow, "/");
        assert_eq!(dto.decision, "allow");
        assert!(dto.redirect_to.is_none());
    }
}
