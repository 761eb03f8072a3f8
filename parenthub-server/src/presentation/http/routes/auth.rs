use axum::{
    Router,
    routing::{get, post},
};

use crate::presentation::AppState;
use crate::presentation::http::handlers::auth::{
    check_nickname, login, logout, oauth_sign_in, register,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/check-nickname", get(check_nickname))
        .route("/oauth/{provider}", post(oauth_sign_in))
}
