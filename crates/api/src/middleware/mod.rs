//! Request extractors and authorization checks.

pub mod api_key;
pub mod auth;
pub mod rbac;
