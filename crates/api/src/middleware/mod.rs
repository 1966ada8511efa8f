//! Request middleware and the extractors that read what it stores.

pub mod auth;

pub use auth::{Caller, auth_middleware};
