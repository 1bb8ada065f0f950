use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;
use std::path::Path;

const INDEX: &str = "index.html";

#[derive(Embed)]
#[folder = "web"]
struct WebAssets;

/// Serve the embedded form page and its assets.
///
/// Paths without a file extension are page routes and get the form page;
/// unknown asset paths are 404.
pub async fn serve_static(uri: Uri) -> Response {
    let path = match uri.path().trim_start_matches('/') {
        "" => INDEX,
        path => path,
    };

    if let Some(response) = embedded(path) {
        return response;
    }

    if Path::new(path).extension().is_none() {
        if let Some(response) = embedded(INDEX) {
            return response;
        }
    }

    (StatusCode::NOT_FOUND, "not found").into_response()
}

fn embedded(path: &str) -> Option<Response> {
    let asset = WebAssets::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Some(
        (
            [(header::CONTENT_TYPE, mime.essence_str().to_string())],
            asset.data.into_owned(),
        )
            .into_response(),
    )
}
