//! Login / Logout Handlers

use super::{landing_page, required};
use crate::application::{Login, Logout};
use crate::infrastructure::http::dto::LoginDto;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::request::{parse_form, Request};
use crate::infrastructure::http::response::Response;
use crate::infrastructure::http::state::AppState;

const LOGGED_OUT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="UTF-8">
        <title>You are logged out</title>
    </head>
    <body>
        <h1>You are logged out</h1>
    </body>
</html>"#;

/// `POST /login` with `username` and `password`
///
/// Replies with the landing page when static files are served, otherwise
/// with the session summary. Either way the session cookie is set.
pub async fn login(state: &AppState, req: &Request) -> Result<Response, ApiError> {
    let params = parse_form(&req.body)?;
    let username = required(&params, "username", "missing required username")?;
    let password = required(&params, "password", "missing required password")?;

    let session = state
        .login_handler
        .handle(Login {
            username: username.to_string(),
            password: password.to_string(),
            replacing: state.session_cookie.token(&req.headers),
        })
        .await?;

    let response = match landing_page(state).await {
        Some(page) => page,
        None => Response::json(&LoginDto::from(&session))?,
    };
    Ok(response.with_header(
        "Set-Cookie",
        state.session_cookie.issue(&session.id, session.expiration),
    ))
}

/// `GET /logout`: always clears the cookie, whether or not a session matched.
pub async fn logout(state: &AppState, req: &Request) -> Result<Response, ApiError> {
    state.logout_handler.handle(Logout {
        token: state.session_cookie.token(&req.headers),
    });

    Ok(Response::html(LOGGED_OUT_PAGE).with_header("Set-Cookie", state.session_cookie.clear()))
}
