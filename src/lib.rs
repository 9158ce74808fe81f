//! # spinfeed-gateway
//!
//! REST API and SSE gateway for live table feeds with idempotent
//! billing-webhook ingestion.
//!
//! Two cooperating cores form the service: the channel-keyed
//! [`Broadcaster`](domain::Broadcaster) fans published event frames out to
//! live SSE subscribers, and the webhook
//! [ledger](ledger) deduplicates inbound billing provider notifications
//! and drives one subscription-status transition per distinct event id.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, SSE)                Billing provider
//!     │                                  │
//!     ├── REST Handlers (api/)           ├── Webhook Intake (api/)
//!     ├── SSE Endpoint (sse/)            │
//!     │                                  ├── Ingestion Ledger (ledger/)
//!     ├── Broadcaster (domain/)          ├── SubscriptionService (service/)
//!     ├── Sealed Envelopes (sealed/)     │
//!     │                                  └── PostgreSQL
//!     └── In-memory channel registry
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod sealed;
pub mod service;
pub mod sse;
