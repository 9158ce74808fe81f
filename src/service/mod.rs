//! Service layer: the webhook side-effect applier.
//!
//! [`SubscriptionService`] implements the
//! [`StatusSideEffect`](crate::ledger::StatusSideEffect) seam the
//! ingestion pipeline drives once per distinct event id.

pub mod subscription_service;

pub use subscription_service::{SubscriptionService, extract_external_id};
