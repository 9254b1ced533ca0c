//! Outfit API
//!
//! HTTP boundary of the outfit generation service: multipart parsing, asset
//! classification, provider dispatch, and error conversion. The library
//! surface exists so integration tests can assemble the router with mock
//! providers.

pub mod api_doc;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
