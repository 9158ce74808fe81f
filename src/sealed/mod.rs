//! Sealed-envelope layer: payload authentication and client keys.
//!
//! The broadcaster core treats envelopes as an external codec reached
//! through [`EnvelopeCodec`]; this module provides the HMAC-SHA256
//! implementation and the short-lived client keys built on top of it.

pub mod client_key;
pub mod envelope;

pub use client_key::{ClientKeyClaims, ClientKeyIssuer};
pub use envelope::{EnvelopeCodec, EnvelopeError, PlainCodec, SealedCodec};
