//! Data Transfer Objects for REST request/response serialization.

pub mod stream_dto;
pub mod webhook_dto;

pub use stream_dto::*;
pub use webhook_dto::*;
