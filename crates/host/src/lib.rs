//! Host integration for [`adaptor_registry`].
//!
//! The registry core only knows how to register, unregister and resolve.
//! This crate supplies what a plugin host wraps around it:
//!
//! - [`AdapterHost`]: two-phase startup with a bounded FIFO of registrations
//!   bound before the host is activated
//! - [`LifecycleGate`]: readiness signal consulted on activation
//! - [`MarkerBoard`]: availability markers dependents can wait on
//! - [`TracingSink`]: event sink that logs registration changes
//! - [`HostConfig`]: TOML configuration

pub mod config;
pub mod gate;
pub mod host;
pub mod markers;
pub mod sink;

pub use config::{ConfigError, HostConfig};
pub use gate::{LifecycleGate, ManualGate};
pub use host::{AdapterHost, BindError, HostError};
pub use markers::MarkerBoard;
pub use sink::TracingSink;
