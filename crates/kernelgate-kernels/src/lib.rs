//! # kernelgate-kernels
//!
//! Backend collaborator contracts for the gateway, plus in-process
//! implementations used by the binary and the test suite.
//!
//! - [`KernelManager`]: resolves an opaque kernel ID to a live kernel
//! - [`KernelConnection`]: the per-connection relay handle bridging one
//!   client to one kernel's native protocol
//! - [`ConnectionFactory`]: builds a relay handle for a resolved kernel
//! - [`InMemoryKernelManager`] / [`LoopbackKernelConnection`]: concrete
//!   in-process implementations

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod loopback;
pub mod manager;

pub use connection::{ConnectionFactory, KernelConnection, OutboundSender};
pub use errors::KernelsError;
pub use loopback::{LoopbackConnectionFactory, LoopbackKernelConnection};
pub use manager::{InMemoryKernelManager, Kernel, KernelManager};
