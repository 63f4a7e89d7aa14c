//! Named-handle registry with get-or-create semantics.
//!
//! A `Registry` maps names to live handles produced by a caller-supplied
//! [`Factory`]. It owns membership only: handles are created under the
//! exclusive lock, closed when removed, and all closed together on
//! [`Registry::close`] or drop.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::context::Context;
use crate::error::{CloseFailure, Error, Result};
use crate::factory::Factory;
use crate::handle::Handle;

/// Read-only view of a handle pool.
///
/// Hand this to consumers that should resolve handles but never create or
/// tear them down.
pub trait HandleLookup: Send + Sync {
    /// Handle type stored in the pool.
    type Handle: Handle;

    /// Returns the handle registered under `name`.
    fn get(&self, name: &str) -> Result<Arc<Self::Handle>>;

    /// Returns true if `name` is registered.
    fn has(&self, name: &str) -> bool;

    /// Snapshot of registered names, in no particular order.
    fn list(&self) -> Vec<String>;
}

/// Full handle pool: lookup plus lifecycle operations.
pub trait HandlePool: HandleLookup {
    /// Configuration forwarded to the factory.
    type Config;

    /// Creates and registers a handle under a new name.
    fn add(&self, name: &str, config: &Self::Config) -> Result<()>;

    /// Returns the handle for `name`, creating it if absent.
    fn must_get(&self, name: &str, config: &Self::Config) -> Result<Arc<Self::Handle>>;

    /// Closes and unregisters the handle under `name`.
    fn remove(&self, name: &str) -> Result<()>;

    /// Closes and unregisters every handle.
    fn close(&self) -> Result<()>;
}

/// A concurrency-safe registry of named handles.
///
/// Reads (`get`, `has`, `list`) share the lock; `add`, `remove` and `close`
/// take it exclusively. The factory runs while the exclusive lock is held, so
/// creations are serialized across all names.
///
/// Handles are returned as `Arc`s. The registry only guards membership;
/// concurrent use of one handle is the handle's own concern.
///
/// # Example
///
/// ```
/// use handlepool_core::{factory_fn, BoxError, Context, Handle, Registry};
///
/// #[derive(Debug)]
/// struct Client {
///     address: String,
/// }
///
/// impl Handle for Client {
///     fn close(&self) -> Result<(), BoxError> {
///         Ok(())
///     }
/// }
///
/// let registry = Registry::new(factory_fn(|address: &String, _: &Context| {
///     Ok(Client { address: address.clone() })
/// }));
///
/// registry.add("primary", &"10.0.0.1:19530".to_string()).unwrap();
/// let client = registry.must_get("primary", &"ignored:1".to_string()).unwrap();
/// assert_eq!(client.address, "10.0.0.1:19530");
///
/// registry.remove("primary").unwrap();
/// assert!(registry.get("primary").unwrap_err().is_not_found());
/// ```
pub struct Registry<F: Factory> {
    factory: F,
    handles: RwLock<HashMap<String, Arc<F::Handle>>>,
}

impl<F: Factory> Registry<F> {
    /// Creates an empty registry that builds handles with `factory`.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the factory.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Creates a handle and registers it under `name`.
    ///
    /// Fails with `AlreadyExists` if the name is taken (the factory is not
    /// called) and with `CreationFailed` if the factory fails (nothing is
    /// registered).
    pub fn add(&self, name: &str, config: &F::Config) -> Result<()> {
        self.add_with_context(name, config, &Context::background())
    }

    /// Like [`add`](Self::add), threading `ctx` into the factory.
    pub fn add_with_context(&self, name: &str, config: &F::Config, ctx: &Context) -> Result<()> {
        self.insert(name, config, ctx).map(|_| ())
    }

    /// Returns the handle registered under `name`.
    ///
    /// The handle is returned as stored; it may have been closed outside the
    /// registry.
    pub fn get(&self, name: &str) -> Result<Arc<F::Handle>> {
        self.handles
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Returns the handle for `name`, creating it with `config` if absent.
    ///
    /// The lookup and the creation lock separately. When two callers race to
    /// create the same name, the loser's `AlreadyExists` is resolved by reading
    /// the winner's handle, so both succeed and the factory runs once.
    pub fn must_get(&self, name: &str, config: &F::Config) -> Result<Arc<F::Handle>> {
        self.must_get_with_context(name, config, &Context::background())
    }

    /// Like [`must_get`](Self::must_get), threading `ctx` into the factory.
    pub fn must_get_with_context(
        &self,
        name: &str,
        config: &F::Config,
        ctx: &Context,
    ) -> Result<Arc<F::Handle>> {
        match self.get(name) {
            Ok(handle) => return Ok(handle),
            Err(Error::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        match self.insert(name, config, ctx) {
            Ok(handle) => Ok(handle),
            Err(Error::AlreadyExists(_)) => {
                debug!(name, "lost creation race, using existing handle");
                self.get(name)
            }
            Err(e) => Err(e),
        }
    }

    /// Closes the handle under `name` and unregisters it.
    ///
    /// If the close fails the error is returned as `CloseFailed`, but the name
    /// is evicted regardless so a broken handle cannot block a later `add`.
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut handles = self.handles.write();
        let handle = handles
            .remove(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        match handle.close() {
            Ok(()) => {
                debug!(name, "removed handle");
                Ok(())
            }
            Err(source) => {
                warn!(name, error = %source, "handle failed to close on remove");
                Err(Error::CloseFailed {
                    name: name.to_string(),
                    source,
                })
            }
        }
    }

    /// Returns true if `name` is registered.
    pub fn has(&self, name: &str) -> bool {
        self.handles.read().contains_key(name)
    }

    /// Snapshot of registered names, in no particular order.
    pub fn list(&self) -> Vec<String> {
        self.handles.read().keys().cloned().collect()
    }

    /// Returns the number of registered handles.
    pub fn len(&self) -> usize {
        self.handles.read().len()
    }

    /// Returns true if no handles are registered.
    pub fn is_empty(&self) -> bool {
        self.handles.read().is_empty()
    }

    /// Closes every handle and empties the registry.
    ///
    /// Every handle is attempted even if some fail. The registry is empty
    /// afterwards either way; failures come back together as `CloseAll`.
    /// Closing an empty registry succeeds.
    pub fn close(&self) -> Result<()> {
        let mut handles = self.handles.write();
        let drained = std::mem::take(&mut *handles);
        let total = drained.len();

        let failures: Vec<CloseFailure> = drained
            .into_iter()
            .filter_map(|(name, handle)| match handle.close() {
                Ok(()) => None,
                Err(source) => {
                    warn!(name = %name, error = %source, "handle failed to close");
                    Some(CloseFailure { name, source })
                }
            })
            .collect();

        if total > 0 {
            info!(
                closed = total - failures.len(),
                failed = failures.len(),
                "closed registry"
            );
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::CloseAll(failures))
        }
    }

    // Checks the name, then runs the factory under the write lock.
    fn insert(&self, name: &str, config: &F::Config, ctx: &Context) -> Result<Arc<F::Handle>> {
        if name.is_empty() {
            return Err(Error::InvalidName(name.to_string()));
        }

        let mut handles = self.handles.write();
        if handles.contains_key(name) {
            return Err(Error::AlreadyExists(name.to_string()));
        }

        let handle = self
            .factory
            .create(config, ctx)
            .map(Arc::new)
            .map_err(|source| {
                warn!(name, error = %source, "factory failed to create handle");
                Error::CreationFailed {
                    name: name.to_string(),
                    source,
                }
            })?;

        handles.insert(name.to_string(), Arc::clone(&handle));
        debug!(name, "added handle");
        Ok(handle)
    }
}

impl<F: Factory> Drop for Registry<F> {
    fn drop(&mut self) {
        let handles = std::mem::take(self.handles.get_mut());
        for (name, handle) in handles {
            if let Err(e) = handle.close() {
                warn!(name = %name, error = %e, "handle failed to close on drop");
            }
        }
    }
}

impl<F: Factory> std::fmt::Debug for Registry<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.list())
            .finish_non_exhaustive()
    }
}

impl<F: Factory> HandleLookup for Registry<F> {
    type Handle = F::Handle;

    fn get(&self, name: &str) -> Result<Arc<F::Handle>> {
        Registry::get(self, name)
    }

    fn has(&self, name: &str) -> bool {
        Registry::has(self, name)
    }

    fn list(&self) -> Vec<String> {
        Registry::list(self)
    }
}

impl<F: Factory> HandlePool for Registry<F> {
    type Config = F::Config;

    fn add(&self, name: &str, config: &F::Config) -> Result<()> {
        Registry::add(self, name, config)
    }

    fn must_get(&self, name: &str, config: &F::Config) -> Result<Arc<F::Handle>> {
        Registry::must_get(self, name, config)
    }

    fn remove(&self, name: &str) -> Result<()> {
        Registry::remove(self, name)
    }

    fn close(&self) -> Result<()> {
        Registry::close(self)
    }
}

// Async API when tokio feature is enabled
#[cfg(feature = "async")]
mod async_api {
    use super::*;

    /// Async wrapper for Registry.
    ///
    /// Factories and closes may block on network I/O, so `add`, `must_get`,
    /// `remove` and `close` run on tokio's blocking pool. Lookups only touch
    /// the map and stay synchronous.
    ///
    /// # Example
    ///
    /// ```
    /// use handlepool_core::{factory_fn, AsyncRegistry, BoxError, Context, Handle, Registry};
    ///
    /// #[derive(Debug)]
    /// struct Channel(String);
    ///
    /// impl Handle for Channel {
    ///     fn close(&self) -> Result<(), BoxError> {
    ///         Ok(())
    ///     }
    /// }
    ///
    /// #[tokio::main]
    /// async fn main() {
    ///     let registry = AsyncRegistry::new(Registry::new(factory_fn(
    ///         |endpoint: &String, _: &Context| Ok(Channel(endpoint.clone())),
    ///     )));
    ///
    ///     let shared = registry.clone();
    ///     let client = tokio::spawn(async move {
    ///         shared.must_get("primary", "10.0.0.1:19530".to_string()).await
    ///     })
    ///     .await
    ///     .unwrap()
    ///     .unwrap();
    ///     assert_eq!(client.0, "10.0.0.1:19530");
    ///
    ///     registry.close().await.unwrap();
    ///     assert!(registry.is_empty());
    /// }
    /// ```
    pub struct AsyncRegistry<F: Factory> {
        inner: Arc<Registry<F>>,
    }

    impl<F: Factory> Clone for AsyncRegistry<F> {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<F> AsyncRegistry<F>
    where
        F: Factory,
        F::Config: 'static,
    {
        /// Wraps a registry.
        pub fn new(registry: Registry<F>) -> Self {
            Self {
                inner: Arc::new(registry),
            }
        }

        /// Wraps an already shared registry.
        pub fn from_shared(registry: Arc<Registry<F>>) -> Self {
            Self { inner: registry }
        }

        /// Creates and registers a handle asynchronously.
        pub async fn add(&self, name: impl Into<String>, config: F::Config) -> Result<()> {
            self.add_with_context(name, config, Context::background())
                .await
        }

        /// Like [`add`](Self::add), threading `ctx` into the factory.
        pub async fn add_with_context(
            &self,
            name: impl Into<String>,
            config: F::Config,
            ctx: Context,
        ) -> Result<()> {
            let inner = Arc::clone(&self.inner);
            let name = name.into();
            tokio::task::spawn_blocking(move || inner.add_with_context(&name, &config, &ctx))
                .await
                .map_err(|e| Error::TaskFailed(format!("spawn_blocking failed: {}", e)))?
        }

        /// Get-or-create asynchronously.
        pub async fn must_get(
            &self,
            name: impl Into<String>,
            config: F::Config,
        ) -> Result<Arc<F::Handle>> {
            self.must_get_with_context(name, config, Context::background())
                .await
        }

        /// Like [`must_get`](Self::must_get), threading `ctx` into the factory.
        pub async fn must_get_with_context(
            &self,
            name: impl Into<String>,
            config: F::Config,
            ctx: Context,
        ) -> Result<Arc<F::Handle>> {
            let name = name.into();
            // Skip the blocking pool when the handle already exists.
            if let Ok(handle) = self.inner.get(&name) {
                return Ok(handle);
            }
            let inner = Arc::clone(&self.inner);
            tokio::task::spawn_blocking(move || {
                inner.must_get_with_context(&name, &config, &ctx)
            })
            .await
            .map_err(|e| Error::TaskFailed(format!("spawn_blocking failed: {}", e)))?
        }

        /// Closes and unregisters a handle asynchronously.
        pub async fn remove(&self, name: impl Into<String>) -> Result<()> {
            let inner = Arc::clone(&self.inner);
            let name = name.into();
            tokio::task::spawn_blocking(move || inner.remove(&name))
                .await
                .map_err(|e| Error::TaskFailed(format!("spawn_blocking failed: {}", e)))?
        }

        /// Closes every handle asynchronously.
        pub async fn close(&self) -> Result<()> {
            let inner = Arc::clone(&self.inner);
            tokio::task::spawn_blocking(move || inner.close())
                .await
                .map_err(|e| Error::TaskFailed(format!("spawn_blocking failed: {}", e)))?
        }

        /// Returns the handle registered under `name`.
        pub fn get(&self, name: &str) -> Result<Arc<F::Handle>> {
            self.inner.get(name)
        }

        /// Returns true if `name` is registered.
        pub fn has(&self, name: &str) -> bool {
            self.inner.has(name)
        }

        /// Snapshot of registered names.
        pub fn list(&self) -> Vec<String> {
            self.inner.list()
        }

        /// Returns the number of registered handles.
        pub fn len(&self) -> usize {
            self.inner.len()
        }

        /// Returns true if empty.
        pub fn is_empty(&self) -> bool {
            self.inner.is_empty()
        }

        /// Returns reference to inner sync registry.
        pub fn inner(&self) -> &Registry<F> {
            &self.inner
        }
    }

}

#[cfg(feature = "async")]
pub use async_api::AsyncRegistry;
