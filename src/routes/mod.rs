//! Request routing and endpoint handlers
//!
//! This module maps parsed requests to handlers: a fixed table of exact
//! (method, path) matches for the dynamic user endpoints, with every other
//! path treated as a static resource lookup.

pub mod router;
pub mod session;
pub mod static_files;
pub mod users;

pub use router::{HandlerError, Router};
pub use session::SessionIds;
pub use static_files::StaticFiles;
pub use users::{User, UserStore};
