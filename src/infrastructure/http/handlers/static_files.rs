//! Static page passthrough
//!
//! `GET /` serves `menu.html`; `GET /<name>.{html,htm,css}` serves that file
//! from the configured directory. Nothing outside the directory is reachable.

use std::path::{Component, Path, PathBuf};

use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::response::{Response, CSS, HTML};
use crate::infrastructure::http::state::AppState;

const INDEX_PAGE: &str = "menu.html";

/// Serves a page for an unrouted `GET`.
pub async fn serve_static(state: &AppState, path: &str) -> Result<Response, ApiError> {
    let dir = state.static_dir.as_deref().ok_or_else(ApiError::not_found)?;
    let file = resolve(dir, path).ok_or_else(ApiError::not_found)?;

    match tokio::fs::read_to_string(&file).await {
        Ok(content) => {
            let content_type = if has_extension(&file, &["css"]) { CSS } else { HTML };
            Ok(Response::new(http::StatusCode::OK, content_type, content))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ApiError::not_found()),
        Err(e) => {
            tracing::warn!(path = %file.display(), error = %e, "Static file unreadable");
            Err(ApiError::not_found())
        }
    }
}

/// The index page, if static files are served and it exists.
pub async fn landing_page(state: &AppState) -> Option<Response> {
    serve_static(state, "/").await.ok()
}

/// Maps a request path to a servable file, or `None`.
fn resolve(dir: &Path, request_path: &str) -> Option<PathBuf> {
    let name = match request_path {
        "/" => INDEX_PAGE,
        other => other.strip_prefix('/')?,
    };
    let relative = Path::new(name);

    if name.is_empty()
        || !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        || !has_extension(relative, &["html", "htm", "css"])
    {
        return None;
    }
    // A bare ".html" has no stem.
    relative.file_stem()?;

    Some(dir.join(relative))
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| allowed.iter().any(|a| ext.eq_ignore_ascii_case(a)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_allows_pages_and_styles() {
        let dir = Path::new("/srv/html");
        assert_eq!(resolve(dir, "/"), Some(dir.join("menu.html")));
        assert_eq!(resolve(dir, "/login.html"), Some(dir.join("login.html")));
        assert_eq!(resolve(dir, "/style.CSS"), Some(dir.join("style.CSS")));
        assert_eq!(resolve(dir, "/docs/a.htm"), Some(dir.join("docs/a.htm")));
    }

    #[test]
    fn test_resolve_rejects_other_files_and_traversal() {
        let dir = Path::new("/srv/html");
        assert_eq!(resolve(dir, "/secret.txt"), None);
        assert_eq!(resolve(dir, "/../etc/passwd.html"), None);
        assert_eq!(resolve(dir, "//etc/x.html"), None);
        assert_eq!(resolve(dir, "/./menu.html"), None);
        assert_eq!(resolve(dir, "/.html"), None);
        assert_eq!(resolve(dir, "/html"), None);
        assert_eq!(resolve(dir, ""), None);
    }
}
