use std::time::Duration;

use anyhow::{Result, anyhow};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::infrastructure::settings::Settings;

/// Methods registered by the API routers; preflight answers stay in sync with them.
const API_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(600);

fn allowed_origins(origins: &[String]) -> Result<AllowOrigin> {
    if origins.iter().any(|origin| origin == "*") {
        return Ok(AllowOrigin::any());
    }

    let parsed = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim_end_matches('/'))
                .map_err(|err| anyhow!("invalid CORS origin {origin:?}: {err}"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(AllowOrigin::list(parsed))
}

pub(crate) fn build_cors_layer(settings: &Settings) -> Result<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_origin(allowed_origins(&settings.cors_origins)?)
        .allow_methods(API_METHODS)
        // bearer tokens and JSON or multipart bodies
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(PREFLIGHT_MAX_AGE))
}

pub(crate) fn apply_cors(router: Router, settings: &Settings) -> Result<Router> {
    let cors = build_cors_layer(settings)?;
    Ok(router.layer(cors))
}

#[cfg(test)]
mod tests {
    use super::allowed_origins;

    #[test]
    fn wildcard_and_explicit_origins_are_accepted() {
        assert!(allowed_origins(&["*".to_string()]).is_ok());
        assert!(
            allowed_origins(&[
                "http://localhost:3000/".to_string(),
                "https://parenthub.example".to_string()
            ])
            .is_ok()
        );
    }

    #[test]
    fn malformed_origin_is_a_startup_error() {
        let err = allowed_origins(&["http://bad\norigin".to_string()])
            .expect_err("newline is not a valid header value");
        assert!(err.to_string().contains("invalid CORS origin"));
    }
}
