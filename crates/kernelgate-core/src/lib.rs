//! # kernelgate-core
//!
//! Foundation types for the kernelgate gateway.
//!
//! This crate provides the shared vocabulary the gateway crates depend on:
//!
//! - **Kernel IDs**: [`KernelId`], a validated newtype matching the fixed
//!   kernel identifier pattern
//! - **Frames**: [`Frame`], the unit of client traffic (text or binary)
//! - **Envelopes**: [`Envelope`], a typed view over the kernel message
//!   wire format with a fallible parse
//! - **Wire constants**: sub-protocol names, message types, header names

#![deny(unsafe_code)]

pub mod constants;
pub mod envelope;
pub mod frames;
pub mod ids;

pub use constants::*;
pub use envelope::{Envelope, ParseError};
pub use frames::Frame;
pub use ids::{InvalidKernelId, KernelId};
