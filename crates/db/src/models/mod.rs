//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts (with `Validate` where fields
//!   need shape checks)
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod api_key;
pub mod assessment;
pub mod audit;
pub mod contract;
pub mod event;
pub mod invitation;
pub mod issue;
pub mod job;
pub mod monitoring;
pub mod organization;
pub mod report;
pub mod task;
pub mod user;
pub mod vendor;
pub mod workflow;
