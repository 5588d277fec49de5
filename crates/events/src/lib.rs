//! Veriguard event bus and delivery infrastructure.
//!
//! This crate provides the building blocks for the platform-wide event
//! system:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] — the canonical domain event envelope.
//! - [`EventPersistence`] — background service that durably writes every
//!   event to the `events` table.
//! - [`delivery`] — external delivery channels (webhook, email).

pub mod bus;
pub mod delivery;
pub mod persistence;

pub use bus::{event_types, EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::webhook::WebhookDelivery;
pub use persistence::EventPersistence;
