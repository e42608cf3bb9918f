//! HTTP Layer
//!
//! Hand-rolled HTTP/1.x: raw bytes are parsed into a [`Request`], routed
//! through the static route table and answered with a [`Response`].

pub mod cookie;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use cookie::SessionCookie;
pub use error::{sanitize, ApiError};
pub use request::{parse_form, Request, RequestError};
pub use response::Response;
pub use routes::dispatch;
pub use server::{HttpServer, ServerConfig};
pub use state::{AppOptions, AppState};
