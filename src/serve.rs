//! Local preview server for `sen serve`.
//!
//! A plain static file server over the build output, built on `tiny_http`:
//!
//! - `/` and any directory path resolve to that directory's `index.html`
//! - Content types are inferred from the file extension
//! - Percent-encoded paths are decoded; query strings are ignored
//! - Paths that try to climb out of the output directory are refused
//!
//! Requests are handled one at a time on the calling thread. Ctrl+C
//! unblocks the accept loop and the server returns cleanly. Nothing is
//! rebuilt on request; run `sen` first.

use crate::config::SiteConfig;
use std::fs;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("output directory {0} does not exist; run a build first")]
    MissingOutput(PathBuf),
    #[error("invalid interface address '{0}'")]
    Interface(String),
    #[error("cannot bind {addr}: {message}")]
    Bind { addr: SocketAddr, message: String },
    #[error("cannot install Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// What a request path maps to inside the served directory.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolved {
    File(PathBuf),
    NotFound,
    Forbidden,
}

/// Serve `config.build.output_dir` on the configured interface and port
/// until interrupted.
pub fn serve_site(config: &SiteConfig) -> Result<(), ServeError> {
    let root = config.build.output_dir.clone();
    if !root.is_dir() {
        return Err(ServeError::MissingOutput(root));
    }

    let interface: IpAddr = config
        .serve
        .interface
        .parse()
        .map_err(|_| ServeError::Interface(config.serve.interface.clone()))?;
    let addr = SocketAddr::new(interface, config.serve.port);
    let server = Server::http(addr).map_err(|e| ServeError::Bind {
        addr,
        message: e.to_string(),
    })?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        println!("Shutting down...");
        server_for_signal.unblock();
    })?;

    println!("Serving {} at http://{}/ (Ctrl+C to stop)", root.display(), addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &root) {
            eprintln!("request error: {e}");
        }
    }

    println!("Server stopped");
    Ok(())
}

fn handle_request(request: Request, root: &Path) -> io::Result<()> {
    let url = request.url().to_string();
    let resolved = resolve_request(root, &url);

    let (status, response) = match resolved {
        Resolved::File(path) => match fs::read(&path) {
            Ok(content) => {
                let mut response = Response::from_data(content);
                if let Ok(header) = Header::from_bytes("Content-Type", guess_content_type(&path)) {
                    response.add_header(header);
                }
                (200, response)
            }
            Err(_) => (500, plain(500, "500 Internal Server Error")),
        },
        Resolved::NotFound => (404, plain(404, "404 Not Found")),
        Resolved::Forbidden => (403, plain(403, "403 Forbidden")),
    };

    println!("{} {} {}", request.method(), url, status);
    request.respond(response)
}

fn plain(status: u16, body: &str) -> Response<io::Cursor<Vec<u8>>> {
    let mut response = Response::from_string(body).with_status_code(StatusCode(status));
    if let Ok(header) = Header::from_bytes("Content-Type", "text/plain; charset=utf-8") {
        response.add_header(header);
    }
    response
}

/// Map a request URL onto a file under `root`.
///
/// Resolution order: exact file, then `index.html` inside a directory, then
/// not found. Any `..` segment is refused outright.
pub fn resolve_request(root: &Path, url: &str) -> Resolved {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let Ok(decoded) = urlencoding::decode(path) else {
        return Resolved::NotFound;
    };

    let mut local = root.to_path_buf();
    for segment in decoded.split('/') {
        match Path::new(segment).components().next() {
            None | Some(Component::CurDir) => {}
            Some(Component::Normal(_)) if !segment.contains('\\') => local.push(segment),
            _ => return Resolved::Forbidden,
        }
    }

    if local.is_file() {
        return Resolved::File(local);
    }
    let index = local.join("index.html");
    if local.is_dir() && index.is_file() {
        return Resolved::File(index);
    }
    Resolved::NotFound
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "json" => "application/json; charset=utf-8",
        "xml" => "application/xml; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",

        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "ico" => "image/x-icon",

        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
