use std::path::PathBuf;

use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::routes::session::SessionIds;
use crate::routes::static_files::StaticFiles;
use crate::routes::users::{self, UserStore};

/// Errors a handler can fail with; the connection driver maps them to
/// 404 / 415 responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerError {
    NotFound,
    UnsupportedMediaType,
}

/// Two-tier routing table.
///
/// Tier one is a fixed set of exact (method, path) matches for the
/// dynamic user endpoints; tier two treats every other path as a static
/// resource lookup, with `/` mapping to `/index.html`. Dispatch holds no
/// mutable state, so one Router is shared across all connection tasks.
pub struct Router {
    static_files: StaticFiles,
    users: UserStore,
    sessions: SessionIds,
}

impl Router {
    pub fn new(static_root: PathBuf) -> Self {
        Self {
            static_files: StaticFiles::new(static_root),
            users: UserStore::new(),
            sessions: SessionIds::new(),
        }
    }

    /// The shared user store, exposed for seeding and assertions.
    pub fn user_store(&self) -> &UserStore {
        &self.users
    }

    /// Selects and runs the handler for a request.
    pub async fn dispatch(&self, req: &Request) -> Result<Response, HandlerError> {
        match (req.method, req.path.as_str()) {
            // Create accepts both forms; parameters arrive merged either way
            (Method::GET | Method::POST, "/user/create") => {
                Ok(users::create_user(&self.users, req).await)
            }

            (Method::POST, "/user/login") => {
                Ok(users::login(&self.users, &self.sessions, req).await)
            }

            _ => {
                let path = if req.path == "/" {
                    "/index.html"
                } else {
                    req.path.as_str()
                };

                self.static_files.serve(path).await
            }
        }
    }
}
