//! # handlepool
//!
//! **A concurrent registry of named client handles.**
//!
//! Applications that talk to an external service (a vector database, a
//! search cluster, an RPC backend) usually keep a handful of long-lived
//! clients: one per cluster, tenant or database. handlepool keeps them in one
//! place:
//!
//! - **Create once**: `must_get` builds a client on first use and returns the
//!   same one afterwards, even under concurrent callers
//! - **Tear down safely**: `remove` closes and evicts a client; `close` shuts
//!   every client down and reports each failure
//! - **Closed means closed**: [`Guarded`] turns any driver into a handle that
//!   rejects calls after shutdown instead of panicking
//! - **Backend-agnostic**: the registry only knows the [`Factory`] and
//!   [`Handle`] traits; the driver stays behind them
//!
//! ## Quick Start
//!
//! ```rust
//! use handlepool::prelude::*;
//!
//! struct VectorClient {
//!     address: String,
//! }
//!
//! impl Driver for VectorClient {
//!     fn shutdown(self) -> std::result::Result<(), BoxError> {
//!         Ok(())
//!     }
//! }
//!
//! let registry = Registry::new(factory_fn(|config: &ClientConfig, _ctx: &Context| {
//!     Ok(Guarded::new(VectorClient { address: config.address().to_string() }))
//! }));
//!
//! let config = ClientConfig::builder().address("127.0.0.1:19530").build().unwrap();
//! let client = registry.must_get("main_client", &config).unwrap();
//! assert_eq!(client.with(|d| d.address.clone()).unwrap(), "127.0.0.1:19530");
//!
//! registry.close().unwrap();
//! assert!(client.with(|d| d.address.clone()).unwrap_err().is_closed());
//! ```
//!
//! ### Bounding Creation
//!
//! The registry never times out a factory. Pass a [`Context`] and let the
//! factory honor it:
//!
//! ```rust
//! use std::time::Duration;
//! use handlepool::prelude::*;
//!
//! struct Conn;
//!
//! impl Handle for Conn {
//!     fn close(&self) -> std::result::Result<(), BoxError> {
//!         Ok(())
//!     }
//! }
//!
//! let registry = Registry::new(factory_fn(|_: &(), ctx: &Context| {
//!     ctx.check()?;
//!     Ok(Conn)
//! }));
//!
//! let ctx = Context::with_timeout(Duration::from_secs(5));
//! registry.add_with_context("bounded", &(), &ctx).unwrap();
//!
//! let cancelled = Context::background();
//! cancelled.cancel();
//! assert!(registry.add_with_context("never", &(), &cancelled).is_err());
//! assert!(!registry.has("never"));
//! ```
//!
//! ### Narrowed Views
//!
//! Code that only resolves clients can take a [`HandleLookup`] instead of the
//! registry itself, so it cannot create or close anything:
//!
//! ```rust
//! use handlepool::prelude::*;
//!
//! struct Conn;
//!
//! impl Handle for Conn {
//!     fn close(&self) -> std::result::Result<(), BoxError> {
//!         Ok(())
//!     }
//! }
//!
//! fn lookup_only(pool: &dyn HandleLookup<Handle = Conn>) -> bool {
//!     pool.get("main").is_ok()
//! }
//!
//! let registry = Registry::new(factory_fn(|_: &(), _: &Context| Ok(Conn)));
//! registry.add("main", &()).unwrap();
//! assert!(lookup_only(&registry));
//! ```
//!
//! ## Crate Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `async` | Enables `AsyncRegistry` for tokio compatibility |
//!
//! Enable features in `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! handlepool = { version = "0.1", features = ["async"] }
//! ```
//!
//! ## Architecture
//!
//! handlepool is organized into two crates:
//!
//! - **`handlepool-core`**: Core library with no async runtime dependency
//! - **`handlepool`**: Main crate that re-exports everything
//!
//! ### Core Components
//!
//! - [`Registry`] - Name → handle map with get-or-create semantics
//! - [`Handle`] - Contract for registrable resources
//! - [`Guarded`] - Closed-state guard around a [`Driver`]
//! - [`Factory`] - Handle constructor driven by configuration
//! - [`ClientConfig`] - Validated connection settings
//! - [`Context`] - Deadline and cancellation for factories
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`](crate::Result), which uses
//! the [`Error`] enum for error types. `NotFound` from `get` means the client
//! was never provisioned; `AlreadyExists` from a direct `add` means two
//! callers raced to create the same name.
//!
//! ## Thread Safety
//!
//! - [`Registry`] uses an internal `RwLock`; share it with `Arc`
//! - The lock covers membership only; concurrent use of one handle is the
//!   handle's concern ([`Guarded`] serializes through its own lock)
//! - `AsyncRegistry` is `Clone` and safe to share across tasks

// Re-export everything from core
pub use handlepool_core::*;
