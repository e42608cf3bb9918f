//! HTTP Server
//!
//! One tokio task per accepted connection. Each connection carries exactly
//! one request: read, dispatch, write, close.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, Instrument};
use uuid::Uuid;

use super::error::ApiError;
use super::middleware::{apply_cors, log_status};
use super::request::{content_length, header_terminator, Request, RequestError};
use super::response::Response;
use super::routes::{dispatch, error_response};
use super::state::AppState;
use crate::application::SessionManagerPort;
use crate::infrastructure::memory::FixedWindowRateLimiter;

const READ_CHUNK: usize = 4096;
/// How long unread client bytes are drained after the response is sent.
const LINGER: Duration = Duration::from_millis(500);

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub read_timeout: Duration,
    pub max_request_bytes: usize,
    /// `(max_requests, window)`; `None` disables rate limiting.
    pub rate_limit: Option<(u32, Duration)>,
    /// How often expired sessions are swept.
    pub session_purge_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9999,
            read_timeout: Duration::from_secs(10),
            max_request_bytes: 64 * 1024,
            rate_limit: Some((10, Duration::from_secs(900))),
            session_purge_interval: Duration::from_secs(300),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    state: Arc<AppState>,
    limiter: Option<Arc<FixedWindowRateLimiter>>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        let limiter = config
            .rate_limit
            .map(|(max, window)| Arc::new(FixedWindowRateLimiter::new(max, window)));
        Self {
            config,
            state: Arc::new(state),
            limiter,
        }
    }

    /// 启动服务器（带优雅关闭）
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.addr()).await?;
        self.serve(listener, shutdown_signal).await
    }

    /// Accept loop on an already bound listener.
    pub async fn serve<F>(self, listener: TcpListener, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        info!(
            addr = %listener.local_addr()?,
            read_timeout_secs = self.config.read_timeout.as_secs(),
            max_request_bytes = self.config.max_request_bytes,
            rate_limited = self.limiter.is_some(),
            "HTTP server listening"
        );

        let purger = self.limiter.clone().map(|limiter| {
            let window = self.config.rate_limit.map_or(Duration::from_secs(900), |(_, w)| w);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(window);
                loop {
                    ticker.tick().await;
                    limiter.purge_expired();
                }
            })
        });

        let session_purger = {
            let sessions = self.state.session_manager.clone();
            let period = self.config.session_purge_interval;
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                loop {
                    ticker.tick().await;
                    sessions.purge_expired();
                }
            })
        };

        tokio::pin!(shutdown_signal);
        loop {
            tokio::select! {
                _ = &mut shutdown_signal => {
                    info!("Shutdown signal received, no longer accepting connections");
                    break;
                }
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    };
                    let connection = Connection {
                        state: self.state.clone(),
                        limiter: self.limiter.clone(),
                        read_timeout: self.config.read_timeout,
                        max_request_bytes: self.config.max_request_bytes,
                    };
                    let span = tracing::info_span!("request", request_id = %Uuid::new_v4(), peer = %peer);
                    tokio::spawn(connection.handle(stream, peer).instrument(span));
                }
            }
        }

        if let Some(purger) = purger {
            purger.abort();
        }
        session_purger.abort();
        Ok(())
    }
}

/// Everything a connection task needs.
struct Connection {
    state: Arc<AppState>,
    limiter: Option<Arc<FixedWindowRateLimiter>>,
    read_timeout: Duration,
    max_request_bytes: usize,
}

impl Connection {
    async fn handle(self, mut stream: TcpStream, peer: SocketAddr) {
        let raw = tokio::time::timeout(
            self.read_timeout,
            read_request(&mut stream, self.max_request_bytes),
        )
        .await;

        let parsed = match raw {
            Err(_) => {
                tracing::warn!("Timed out reading request");
                Err(ApiError::BadRequest("Request timed out.".to_string()))
            }
            Ok(Err(ReadError::Io(e))) => {
                tracing::debug!(error = %e, "Connection dropped while reading");
                return;
            }
            Ok(Err(ReadError::Request(e))) => Err(e.into()),
            Ok(Ok(text)) => Request::parse(&text).map_err(ApiError::from),
        };
        let response = self.respond(parsed, peer.ip()).await;

        if let Err(e) = stream.write_all(&response.to_bytes()).await {
            tracing::debug!(error = %e, "Failed to write response");
            return;
        }
        let _ = stream.shutdown().await;
        // Closing with unread input would reset the connection before the
        // client has read the response.
        let _ = tokio::time::timeout(LINGER, drain(&mut stream)).await;
    }

    /// Every request read off the socket counts against the client's budget,
    /// whether or not it parsed.
    async fn respond(&self, parsed: Result<Request, ApiError>, ip: IpAddr) -> Response {
        if let Some(limiter) = &self.limiter {
            if !limiter.check(ip) {
                let response = error_response(&self.state, ApiError::TooManyRequests);
                return match &parsed {
                    Ok(request) => {
                        let response = apply_cors(response, &request.headers);
                        log_status(&request.method, request.path(), response.status);
                        response
                    }
                    Err(_) => response,
                };
            }
        }

        match parsed {
            Ok(request) => dispatch(&self.state, &request).await,
            Err(err) => error_response(&self.state, err),
        }
    }
}

#[derive(Debug)]
enum ReadError {
    Io(std::io::Error),
    Request(RequestError),
}

async fn drain<R>(stream: &mut R)
where
    R: AsyncRead + Unpin,
{
    let mut sink = [0u8; READ_CHUNK];
    while let Ok(n) = stream.read(&mut sink).await {
        if n == 0 {
            break;
        }
    }
}

/// Reads one request: header block, then `Content-Length` body bytes.
async fn read_request<R>(stream: &mut R, max_bytes: usize) -> Result<String, ReadError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    // Header block
    let header_end = loop {
        if let Some(end) = header_terminator(&buf) {
            break Some(end);
        }
        if buf.len() > max_bytes {
            return Err(ReadError::Request(RequestError::TooLarge(max_bytes)));
        }
        let n = stream.read(&mut chunk).await.map_err(ReadError::Io)?;
        if n == 0 {
            // Peer finished early; let the parser judge what arrived.
            break None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    if let Some(end) = header_end {
        let head = String::from_utf8_lossy(&buf[..end]);
        let total = end
            .checked_add(content_length(&head).map_err(ReadError::Request)?)
            .filter(|total| *total <= max_bytes)
            .ok_or(ReadError::Request(RequestError::TooLarge(max_bytes)))?;

        while buf.len() < total {
            let n = stream.read(&mut chunk).await.map_err(ReadError::Io)?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        buf.truncate(total);
    }

    if buf.len() > max_bytes {
        return Err(ReadError::Request(RequestError::TooLarge(max_bytes)));
    }
    String::from_utf8(buf).map_err(|_| ReadError::Request(RequestError::InvalidEncoding))
}
