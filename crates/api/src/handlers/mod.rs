//! Request handlers.
//!
//! Each submodule provides async handler functions for a single resource.
//! Handlers validate input, enforce the permission matrix via
//! `middleware::rbac::require_permission`, delegate to the corresponding
//! repository in `veriguard_db`, audit every mutation, and map errors via
//! [`crate::error::AppError`].

pub mod api_keys;
pub mod assessments;
pub mod audit_trail;
pub mod auth;
pub mod contracts;
pub mod external;
pub mod issues;
pub mod monitoring;
pub mod organizations;
pub mod reports;
pub mod tasks;
pub mod users;
pub mod vendors;
pub mod workflows;
