//! Veriguard domain kernel.
//!
//! Pure business rules for the multi-tenant GRC platform: the permission
//! matrix, tenancy and seat accounting, vendor/assessment/issue lifecycles,
//! the approval workflow engine, continuous monitoring signal derivation,
//! risk scoring, and supporting utilities.
//!
//! This crate has zero internal dependencies so it can be used by the
//! repository layer, the API, and the worker alike. Everything here is
//! synchronous and side-effect free; persistence and orchestration live in
//! `veriguard-db` and `veriguard-api`.

pub mod api_keys;
pub mod assessment;
pub mod audit;
pub mod error;
pub mod hashing;
pub mod invitations;
pub mod issues;
pub mod monitoring;
pub mod permissions;
pub mod scoring;
pub mod tasks;
pub mod tenancy;
pub mod types;
pub mod vendor;
pub mod workflow;
