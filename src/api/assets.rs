//! Embedded chat UI assets
//!
//! The UI is compiled into the binary; during development, files under
//! `ui/dist` on disk take precedence so edits show up without a rebuild.

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    response::IntoResponse,
};
use rust_embed::Embed;
use std::path::PathBuf;

#[derive(Embed)]
#[folder = "ui/dist"]
struct Assets;

/// Load an asset by relative path: filesystem first, embedded second.
fn load_asset(path: &str) -> Option<Vec<u8>> {
    let fs_path = PathBuf::from("ui/dist").join(path);
    if let Ok(content) = std::fs::read(&fs_path) {
        return Some(content);
    }
    Assets::get(path).map(|file| file.data.to_vec())
}

/// Serve a static UI asset
pub async fn serve_static(req: Request<Body>) -> impl IntoResponse {
    let path = req.uri().path().trim_start_matches('/');

    match load_asset(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime.as_ref())
                .body(Body::from(content))
                .unwrap()
        }
        None => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("Not found"))
            .unwrap(),
    }
}

/// The chat page itself
pub fn get_index_html() -> Option<String> {
    load_asset("index.html").and_then(|content| String::from_utf8(content).ok())
}
