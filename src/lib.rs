//! Wicket - Minimal HTTP/1.1 Web Server
//!
//! Core library for HTTP parsing, routing and user registration/login.

pub mod config;
pub mod http;
pub mod routes;
pub mod server;
