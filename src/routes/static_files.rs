use std::path::PathBuf;

use crate::http::mime;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::routes::router::HandlerError;

/// Filesystem collaborator for static resources, rooted at a base
/// directory. Files are served byte-for-byte; no templating.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Loads the bytes of a resource, or `None` when it does not exist.
    /// Paths trying to escape the root are treated as missing.
    pub async fn load(&self, path: &str) -> Option<Vec<u8>> {
        if path.contains("..") {
            return None;
        }

        let full = self.root.join(path.trim_start_matches('/'));
        tokio::fs::read(full).await.ok()
    }

    /// Serves a static resource: 200 with the file bytes and a content
    /// type inferred from the extension. Unrecognized extensions fail
    /// closed before the filesystem is touched.
    pub async fn serve(&self, path: &str) -> Result<Response, HandlerError> {
        let content_type =
            mime::content_type_for(path).ok_or(HandlerError::UnsupportedMediaType)?;
        let bytes = self.load(path).await.ok_or(HandlerError::NotFound)?;

        Ok(ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", content_type)
            .body(bytes)
            .build())
    }
}
