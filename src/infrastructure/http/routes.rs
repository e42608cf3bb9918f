//! HTTP Routes
//!
//! Endpoints:
//! - GET  /accountdetails?account_num=  auth  账户详情
//! - GET  /logout                             注销
//! - POST /createaccount                auth  开户 (banker)
//! - POST /deposit                      auth  存款
//! - POST /withdraw                     auth  取款
//! - POST /login                              登录
//! - GET  anything else                       静态页面

use http::Method;

use super::error::ApiError;
use super::handlers;
use super::middleware::{apply_cors, log_status};
use super::request::Request;
use super::response::Response;
use super::state::AppState;
use crate::domain::identity::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    AccountDetails,
    Logout,
    CreateAccount,
    Deposit,
    Withdraw,
    Login,
}

struct Route {
    method: Method,
    path: &'static str,
    /// Match on prefix instead of the exact path.
    prefix: bool,
    requires_auth: bool,
    endpoint: Endpoint,
}

impl Route {
    fn matches(&self, method: &Method, path: &str) -> bool {
        *method == self.method
            && if self.prefix {
                path.starts_with(self.path)
            } else {
                path == self.path
            }
    }
}

static ROUTES: [Route; 6] = [
    Route {
        method: Method::GET,
        path: "/accountdetails",
        prefix: true,
        requires_auth: true,
        endpoint: Endpoint::AccountDetails,
    },
    Route {
        method: Method::GET,
        path: "/logout",
        prefix: false,
        requires_auth: false,
        endpoint: Endpoint::Logout,
    },
    Route {
        method: Method::POST,
        path: "/createaccount",
        prefix: false,
        requires_auth: true,
        endpoint: Endpoint::CreateAccount,
    },
    Route {
        method: Method::POST,
        path: "/deposit",
        prefix: false,
        requires_auth: true,
        endpoint: Endpoint::Deposit,
    },
    Route {
        method: Method::POST,
        path: "/withdraw",
        prefix: false,
        requires_auth: true,
        endpoint: Endpoint::Withdraw,
    },
    Route {
        method: Method::POST,
        path: "/login",
        prefix: false,
        requires_auth: false,
        endpoint: Endpoint::Login,
    },
];

/// Runs one parsed request to completion. Never fails: every error becomes
/// its response here.
pub async fn dispatch(state: &AppState, req: &Request) -> Response {
    let response = match route(state, req).await {
        Ok(response) => response,
        Err(err) => error_response(state, err),
    };
    let response = apply_cors(response, &req.headers);
    log_status(&req.method, req.path(), response.status);
    response
}

/// Error response, clearing the session cookie when the session expired.
pub fn error_response(state: &AppState, err: ApiError) -> Response {
    let clear = err.clears_session();
    let response = err.into_response();
    if clear {
        response.with_header("Set-Cookie", state.session_cookie.clear())
    } else {
        response
    }
}

async fn route(state: &AppState, req: &Request) -> Result<Response, ApiError> {
    if req.method != Method::GET && req.method != Method::POST {
        return Err(ApiError::NotImplemented);
    }

    let path = req.path();
    let Some(route) = ROUTES.iter().find(|r| r.matches(&req.method, path)) else {
        return if req.method == Method::GET {
            handlers::serve_static(state, path).await
        } else {
            Err(ApiError::not_found())
        };
    };

    let actor = if route.requires_auth {
        Some(authenticate(state, req)?)
    } else {
        None
    };

    match (route.endpoint, actor) {
        (Endpoint::Login, _) => handlers::login(state, req).await,
        (Endpoint::Logout, _) => handlers::logout(state, req).await,
        (Endpoint::AccountDetails, Some(actor)) => handlers::get_account(state, req, actor).await,
        (Endpoint::CreateAccount, Some(actor)) => {
            handlers::create_account(state, req, actor).await
        }
        (Endpoint::Deposit, Some(actor)) => handlers::deposit(state, req, actor).await,
        (Endpoint::Withdraw, Some(actor)) => handlers::withdraw(state, req, actor).await,
        (_, None) => Err(ApiError::unauthorized()),
    }
}

/// Resolves the session cookie to its user.
fn authenticate(state: &AppState, req: &Request) -> Result<User, ApiError> {
    let token = state
        .session_cookie
        .token(&req.headers)
        .ok_or_else(ApiError::unauthorized)?;
    let actor = state.session_manager.authenticate(&token)?;
    tracing::debug!(username = %actor.username(), role = %actor.role(), "Authenticated");
    Ok(actor)
}
