//! # handlepool Core
//!
//! Core library for handlepool, a concurrent registry of named client handles.
//!
//! The registry hands out long-lived clients (database drivers, RPC channels,
//! anything with an explicit close) by name, creating each one at most once
//! through a caller-supplied factory and closing it when it is removed.
//!
//! ## Crate Features
//!
//! - `async` - Enables [`AsyncRegistry`] for tokio-compatible async operations
//!
//! ## Core Types
//!
//! ### Pool
//!
//! - [`Registry`] - Name → handle map with get-or-create, remove and close-all
//! - [`HandleLookup`] / [`HandlePool`] - Read-only and full views of a pool
//! - [`AsyncRegistry`] - Async wrapper for tokio compatibility (requires `async` feature)
//!
//! ### Handles
//!
//! - [`Handle`] - Contract for anything the registry can own
//! - [`Guarded`] - Handle that wraps a [`Driver`] and rejects calls after close
//!
//! ### Construction
//!
//! - [`Factory`] - Builds handles from a configuration value
//! - [`Context`] - Deadline and cancellation threaded into a factory
//! - [`ClientConfig`] - Validated connection settings for driver-backed factories

pub mod config;
pub mod context;
pub mod error;
pub mod factory;
pub mod guard;
pub mod handle;
pub mod registry;

// Re-exports for convenient access
pub use config::{ClientConfig, ClientConfigBuilder};
pub use context::Context;
pub use error::{BoxError, CloseFailure, Error, Result};
pub use factory::{factory_fn, Factory, FnFactory};
pub use guard::{Driver, Guarded};
pub use handle::Handle;
#[cfg(feature = "async")]
pub use registry::AsyncRegistry;
pub use registry::{HandleLookup, HandlePool, Registry};

/// Re-export commonly used types for convenience.
///
/// # Example
///
/// ```rust
/// use handlepool_core::prelude::*;
///
/// struct Conn;
///
/// impl Handle for Conn {
///     fn close(&self) -> std::result::Result<(), BoxError> {
///         Ok(())
///     }
/// }
///
/// let registry = Registry::new(factory_fn(|_: &ClientConfig, _: &Context| Ok(Conn)));
/// registry.add("main", &ClientConfig::default()).unwrap();
/// assert!(registry.has("main"));
/// ```
pub mod prelude {
    pub use crate::{
        factory_fn, BoxError, ClientConfig, Context, Driver, Error, Factory, Guarded, Handle,
        HandleLookup, HandlePool, Registry, Result,
    };
}
