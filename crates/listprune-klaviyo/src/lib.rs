//! Klaviyo client for listprune
//!
//! Implements the core crate's [`MembershipSource`](listprune_core::MembershipSource)
//! and [`ProfileEraser`](listprune_core::ProfileEraser) over the Klaviyo JSON:API.

pub mod client;
pub mod wire;

pub use client::{ClientConfig, ClientError, KlaviyoClient, DEFAULT_BASE_URL, DEFAULT_REVISION};
