//! User registration and login endpoints
//!
//! Both handlers read decoded form parameters, touch only the shared
//! user store, and answer with a 302 redirect. Sessions are issued on
//! successful login and never validated afterwards.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::routes::session::SessionIds;

/// A registered user, the payload contract with the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub password: String,
    pub name: String,
    pub email: String,
}

/// Shared user store.
///
/// The store is the only mutable state shared between connection tasks;
/// the RwLock keeps concurrent `add_user`/`find_user_by_id` calls safe.
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: User) {
        self.users.write().await.insert(user.user_id.clone(), user);
    }

    pub async fn find_user_by_id(&self, user_id: &str) -> Option<User> {
        self.users.read().await.get(user_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

/// Handles `GET|POST /user/create`.
///
/// Stores the submitted user and redirects to the index page. The GET
/// (query string) and POST (form body) variants behave identically since
/// parameters arrive pre-merged.
pub async fn create_user(store: &UserStore, req: &Request) -> Response {
    let user = User {
        user_id: param(req, "userId"),
        password: param(req, "password"),
        name: param(req, "name"),
        email: param(req, "email"),
    };

    tracing::debug!(user_id = %user.user_id, "Creating user");
    store.add_user(user).await;

    Response::redirect("/index.html")
}

/// Handles `POST /user/login`.
///
/// A credential match redirects to the index page with a fresh
/// `JSESSIONID` cookie; a miss or password mismatch redirects to the
/// login failure page with no cookie.
pub async fn login(store: &UserStore, sessions: &SessionIds, req: &Request) -> Response {
    let user_id = param(req, "userId");
    let password = param(req, "password");

    match store.find_user_by_id(&user_id).await {
        Some(user) if user.password == password => {
            tracing::debug!(user_id = %user_id, "Login succeeded");

            ResponseBuilder::new(StatusCode::Found)
                .header("Location", "/index.html")
                .header("Set-Cookie", format!("JSESSIONID={}", sessions.generate()))
                .build()
        }
        _ => {
            tracing::debug!(user_id = %user_id, "Login failed");
            Response::redirect("/user/login_failed.html")
        }
    }
}

// Absent form fields become empty strings rather than failing the request
fn param(req: &Request, key: &str) -> String {
    req.parameter(key).unwrap_or_default().to_string()
}
