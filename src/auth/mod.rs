pub mod client;
pub mod error;
pub mod http;
pub mod models;
pub mod token;

pub use client::AuthApi;
pub use error::AuthError;
pub use http::HttpAuthClient;
pub use models::{AuthChange, AuthEventKind, AuthUser, Session, TokenResponse};
