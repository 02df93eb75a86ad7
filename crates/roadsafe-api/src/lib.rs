//! RoadSafe backend API client
//!
//! Thin `reqwest` wrapper over the backend REST API. Every failure mode
//! (transport, HTTP status, rejected acknowledgment, undecodable body) is
//! folded into a single [`ApiError`] at this boundary.

pub mod error;
pub mod types;
pub mod client;

pub use error::ApiError;
pub use types::{License, NewVehicle, Page, Reward, SettlementAck, SettlementRequest, Vehicle};
pub use client::ApiClient;
