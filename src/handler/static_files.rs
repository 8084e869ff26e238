//! Static file serving module
//!
//! Resolves request paths against the document root and applies the SPA
//! fallback rule: an unmatched path without an extension is an application
//! route and gets the entry document; an unmatched path with an extension
//! is a genuinely missing asset and gets a 404.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, mime, range::RangeParseResult};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Where a request path landed after resolution against the document root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Existing regular file under the root
    File(PathBuf),
    /// No matching file, extensionless path: application route,
    /// answered with the fallback document
    Fallback(PathBuf),
    /// No matching file, path names an asset: 404
    NotFound,
}

/// Resolve a request path against the canonical document root
///
/// Traversal guard: `..` segments are rejected outright, and resolved files
/// are canonicalized and must remain under the root (symlinks may point
/// anywhere).
pub fn resolve(root: &Path, fallback: &str, request_path: &str) -> Resolution {
    if Path::new(request_path)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path}"
        ));
        return Resolution::NotFound;
    }

    let relative = request_path.trim_start_matches('/');
    let mut candidate = root.join(relative);

    // Directory requests, including "/", look up the fallback document inside
    if relative.is_empty() || relative.ends_with('/') || candidate.is_dir() {
        candidate = candidate.join(fallback);
    }

    if let Ok(canonical) = candidate.canonicalize() {
        if canonical.is_file() {
            if canonical.starts_with(root) {
                return Resolution::File(canonical);
            }
            logger::log_warning(&format!(
                "Path escape blocked: {request_path} -> {}",
                canonical.display()
            ));
            return Resolution::NotFound;
        }
    }

    // No such file. Asset-looking paths (final segment has a ".") are real
    // misses; everything else is client-side routing.
    let last_segment = request_path.rsplit('/').next().unwrap_or("");
    if last_segment.contains('.') {
        Resolution::NotFound
    } else {
        Resolution::Fallback(root.join(fallback))
    }
}

/// Serve a request against the document root
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    match resolve(&state.root, &state.config.site.fallback, ctx.path) {
        Resolution::File(path) | Resolution::Fallback(path) => {
            serve_resolved_file(ctx, &path).await
        }
        Resolution::NotFound => http::build_404_response(),
    }
}

/// Read a resolved file and build the response
///
/// Not-found here means the file vanished between resolution and read (or
/// the fallback document was removed at runtime); any other I/O error is a
/// 500 for this request only.
async fn serve_resolved_file(ctx: &RequestContext<'_>, path: &Path) -> Response<Full<Bytes>> {
    let content = match fs::read(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return http::build_404_response();
        }
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", path.display()));
            return http::build_500_response();
        }
    };

    let content_type = mime::content_type_for(path.extension().and_then(|e| e.to_str()));
    build_content_response(ctx, content, content_type)
}

/// Build the 200/206/416 response for loaded file content
fn build_content_response(
    ctx: &RequestContext<'_>,
    content: Vec<u8>,
    content_type: &str,
) -> Response<Full<Bytes>> {
    let total_size = content.len();

    match http::parse_range_header(ctx.range_header.as_deref(), total_size) {
        RangeParseResult::Valid(range) => {
            let start = range.start;
            let end = range.end_position(total_size);
            let body = Bytes::from(content[start..=end].to_vec());
            http::response::build_partial_response(
                body,
                content_type,
                start,
                end,
                total_size,
                ctx.is_head,
            )
        }
        RangeParseResult::NotSatisfiable => http::build_416_response(total_size),
        RangeParseResult::None => http::response::build_file_response(
            Bytes::from(content),
            content_type,
            ctx.is_head,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use std::fs as std_fs;
    use tempfile::TempDir;

    const INDEX_HTML: &[u8] = b"<!doctype html><title>app</title>";
    const APP_JS: &[u8] = b"console.log('app');";

    /// Document root with index.html, app.js and assets/logo.svg
    fn site_root() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std_fs::write(dir.path().join("index.html"), INDEX_HTML).unwrap();
        std_fs::write(dir.path().join("app.js"), APP_JS).unwrap();
        std_fs::create_dir(dir.path().join("assets")).unwrap();
        std_fs::write(dir.path().join("assets/logo.svg"), b"<svg/>").unwrap();
        dir
    }

    fn test_state(dir: &TempDir) -> AppState {
        let mut cfg = Config::load_from("no-such-config-file").unwrap();
        cfg.site.root = dir.path().to_string_lossy().into_owned();
        let root = cfg.validate_site().unwrap();
        AppState::new(cfg, root)
    }

    fn ctx(path: &str) -> RequestContext<'_> {
        RequestContext {
            path,
            is_head: false,
            range_header: None,
        }
    }

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_resolve_existing_asset() {
        let dir = site_root();
        let root = dir.path().canonicalize().unwrap();
        match resolve(&root, "index.html", "/app.js") {
            Resolution::File(p) => assert!(p.ends_with("app.js")),
            other => panic!("expected File, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_nested_asset() {
        let dir = site_root();
        let root = dir.path().canonicalize().unwrap();
        match resolve(&root, "index.html", "/assets/logo.svg") {
            Resolution::File(p) => assert!(p.ends_with("assets/logo.svg")),
            other => panic!("expected File, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_root_serves_index() {
        let dir = site_root();
        let root = dir.path().canonicalize().unwrap();
        match resolve(&root, "index.html", "/") {
            Resolution::File(p) => assert!(p.ends_with("index.html")),
            other => panic!("expected File, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_route_falls_back() {
        let dir = site_root();
        let root = dir.path().canonicalize().unwrap();
        match resolve(&root, "index.html", "/dashboard") {
            Resolution::Fallback(p) => assert!(p.ends_with("index.html")),
            other => panic!("expected Fallback, got {other:?}"),
        }
        // Nested routes fall back too
        assert!(matches!(
            resolve(&root, "index.html", "/settings/profile"),
            Resolution::Fallback(_)
        ));
    }

    #[test]
    fn test_resolve_missing_asset_is_not_found() {
        let dir = site_root();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(
            resolve(&root, "index.html", "/missing.png"),
            Resolution::NotFound
        );
        assert_eq!(
            resolve(&root, "index.html", "/assets/missing.css"),
            Resolution::NotFound
        );
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = site_root();
        let root = dir.path().join("assets").canonicalize().unwrap();
        // index.html sits one level above this root; ".." must not reach it
        assert_eq!(
            resolve(&root, "logo.svg", "/../index.html"),
            Resolution::NotFound
        );
        assert_eq!(
            resolve(&root, "logo.svg", "/../../../../etc/passwd"),
            Resolution::NotFound
        );
    }

    #[test]
    fn test_resolve_blocks_symlink_escape() {
        let dir = site_root();
        let root = dir.path().canonicalize().unwrap();
        let outside = tempfile::tempdir().unwrap();
        std_fs::write(outside.path().join("secret.txt"), b"secret").unwrap();
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(
                outside.path().join("secret.txt"),
                root.join("leak.txt"),
            )
            .unwrap();
            assert_eq!(
                resolve(&root, "index.html", "/leak.txt"),
                Resolution::NotFound
            );
        }
    }

    #[tokio::test]
    async fn test_serve_existing_file_exact_bytes() {
        let dir = site_root();
        let state = test_state(&dir);
        let resp = serve(&ctx("/app.js"), &state).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["Content-Type"], "application/javascript");
        assert_eq!(body_bytes(resp).await.as_ref(), APP_JS);
    }

    #[tokio::test]
    async fn test_serve_route_gets_index_bytes() {
        let dir = site_root();
        let state = test_state(&dir);
        let resp = serve(&ctx("/dashboard"), &state).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["Content-Type"],
            "text/html; charset=utf-8"
        );
        assert_eq!(body_bytes(resp).await.as_ref(), INDEX_HTML);
    }

    #[tokio::test]
    async fn test_serve_missing_asset_404() {
        let dir = site_root();
        let state = test_state(&dir);
        let resp = serve(&ctx("/missing.png"), &state).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn test_serve_root_gets_index() {
        let dir = site_root();
        let state = test_state(&dir);
        let resp = serve(&ctx("/"), &state).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(body_bytes(resp).await.as_ref(), INDEX_HTML);
    }

    #[tokio::test]
    async fn test_serve_is_idempotent() {
        let dir = site_root();
        let state = test_state(&dir);
        let first = body_bytes(serve(&ctx("/app.js"), &state).await).await;
        let second = body_bytes(serve(&ctx("/app.js"), &state).await).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_serve_head_empty_body_same_headers() {
        let dir = site_root();
        let state = test_state(&dir);
        let head_ctx = RequestContext {
            path: "/app.js",
            is_head: true,
            range_header: None,
        };
        let resp = serve(&head_ctx, &state).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers()["Content-Length"],
            APP_JS.len().to_string().as_str()
        );
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_serve_range_request() {
        let dir = site_root();
        let state = test_state(&dir);
        let range_ctx = RequestContext {
            path: "/app.js",
            is_head: false,
            range_header: Some("bytes=0-6".to_string()),
        };
        let resp = serve(&range_ctx, &state).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(
            resp.headers()["Content-Range"],
            format!("bytes 0-6/{}", APP_JS.len())
        );
        assert_eq!(body_bytes(resp).await.as_ref(), &APP_JS[0..=6]);
    }

    #[tokio::test]
    async fn test_serve_unsatisfiable_range() {
        let dir = site_root();
        let state = test_state(&dir);
        let range_ctx = RequestContext {
            path: "/app.js",
            is_head: false,
            range_header: Some("bytes=5000-".to_string()),
        };
        let resp = serve(&range_ctx, &state).await;
        assert_eq!(resp.status(), 416);
    }
}
