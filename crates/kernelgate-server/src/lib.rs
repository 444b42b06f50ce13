//! # kernelgate-server
//!
//! Axum HTTP + `WebSocket` gateway in front of backend kernel sessions.
//!
//! - One websocket route per kernel: `/api/kernels/{kernel_id}/channels`
//! - Admission gate: authentication, authorization, kernel resolution
//! - Sub-protocol negotiation with legacy fallback
//! - Bidirectional frame relay with credential injection on
//!   `execute_request` messages
//! - `/health` and `/metrics` endpoints, graceful shutdown via
//!   `CancellationToken`

#![deny(unsafe_code)]

pub mod auth;
pub mod config;
pub mod errors;
pub mod health;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod ws;
