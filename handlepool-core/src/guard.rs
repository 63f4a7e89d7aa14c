//! Closed-state guard around an external driver.
//!
//! A driver client is usually a large surface of pass-through calls. Rather
//! than repeating "lock, check closed, forward" in every method, [`Guarded`]
//! owns the driver behind a lock and hands out access through closures that
//! fail with [`Error::Closed`] once the handle has been shut down.

use parking_lot::RwLock;

use crate::error::{BoxError, Error, Result};
use crate::handle::Handle;

/// The external client a [`Guarded`] handle owns.
pub trait Driver: Send + Sync + 'static {
    /// Tears the client down. Called at most once.
    fn shutdown(self) -> std::result::Result<(), BoxError>;
}

/// A handle wrapping a driver with a permanent closed state.
///
/// Read-side calls share the lock; write-side calls and `close` take it
/// exclusively, so a close waits for in-flight calls to finish.
///
/// # Example
///
/// ```
/// use handlepool_core::{BoxError, Driver, Guarded, Handle};
///
/// struct Conn {
///     database: String,
/// }
///
/// impl Driver for Conn {
///     fn shutdown(self) -> Result<(), BoxError> {
///         Ok(())
///     }
/// }
///
/// let handle = Guarded::new(Conn { database: "default".into() });
/// assert_eq!(handle.with(|c| c.database.clone()).unwrap(), "default");
///
/// handle.close().unwrap();
/// assert!(handle.with(|c| c.database.clone()).unwrap_err().is_closed());
/// ```
pub struct Guarded<D: Driver> {
    inner: RwLock<Option<D>>,
}

impl<D: Driver> Guarded<D> {
    /// Wraps a live driver.
    pub fn new(driver: D) -> Self {
        Self {
            inner: RwLock::new(Some(driver)),
        }
    }

    /// Runs a read-side call against the driver.
    pub fn with<R>(&self, f: impl FnOnce(&D) -> R) -> Result<R> {
        let guard = self.inner.read();
        guard.as_ref().map(f).ok_or(Error::Closed)
    }

    /// Runs a write-side call against the driver.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut D) -> R) -> Result<R> {
        let mut guard = self.inner.write();
        guard.as_mut().map(f).ok_or(Error::Closed)
    }

    /// Runs a fallible read-side call, wrapping a driver failure in
    /// [`Error::Driver`].
    pub fn try_with<R>(
        &self,
        f: impl FnOnce(&D) -> std::result::Result<R, BoxError>,
    ) -> Result<R> {
        self.with(f)?.map_err(Error::Driver)
    }

    /// Runs a fallible write-side call, wrapping a driver failure in
    /// [`Error::Driver`].
    pub fn try_with_mut<R>(
        &self,
        f: impl FnOnce(&mut D) -> std::result::Result<R, BoxError>,
    ) -> Result<R> {
        self.with_mut(f)?.map_err(Error::Driver)
    }
}

impl<D: Driver> Handle for Guarded<D> {
    fn close(&self) -> std::result::Result<(), BoxError> {
        // Take under the lock, shut down outside it.
        let driver = self.inner.write().take();
        match driver {
            Some(driver) => driver.shutdown(),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.inner.read().is_none()
    }
}

impl<D: Driver> std::fmt::Debug for Guarded<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guarded")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingDriver {
        shutdowns: Arc<AtomicUsize>,
        queries: usize,
        fail_shutdown: bool,
    }

    impl CountingDriver {
        fn new(shutdowns: Arc<AtomicUsize>) -> Self {
            Self {
                shutdowns,
                queries: 0,
                fail_shutdown: false,
            }
        }
    }

    impl Driver for CountingDriver {
        fn shutdown(self) -> std::result::Result<(), BoxError> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            if self.fail_shutdown {
                return Err("socket already torn down".into());
            }
            Ok(())
        }
    }

    #[test]
    fn test_calls_forward_while_open() {
        let handle = Guarded::new(CountingDriver::new(Arc::default()));

        handle.with_mut(|d| d.queries += 1).unwrap();
        handle.with_mut(|d| d.queries += 1).unwrap();
        assert_eq!(handle.with(|d| d.queries).unwrap(), 2);
        assert!(!handle.is_closed());
    }

    #[test]
    fn test_closed_handle_rejects_calls() {
        let handle = Guarded::new(CountingDriver::new(Arc::default()));
        handle.close().unwrap();

        assert!(handle.is_closed());
        assert!(matches!(handle.with(|d| d.queries), Err(Error::Closed)));
        assert!(matches!(handle.with_mut(|d| d.queries), Err(Error::Closed)));
        assert!(matches!(
            handle.try_with(|d| Ok(d.queries)),
            Err(Error::Closed)
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let handle = Guarded::new(CountingDriver::new(Arc::clone(&shutdowns)));

        handle.close().unwrap();
        handle.close().unwrap();
        handle.close().unwrap();

        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_shutdown_still_closes() {
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let mut driver = CountingDriver::new(Arc::clone(&shutdowns));
        driver.fail_shutdown = true;
        let handle = Guarded::new(driver);

        assert!(handle.close().is_err());
        assert!(handle.is_closed());
        // Second close sees no driver and succeeds.
        assert!(handle.close().is_ok());
        assert_eq!(shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_driver_error_is_wrapped() {
        let handle = Guarded::new(CountingDriver::new(Arc::default()));

        let err = handle
            .try_with(|_| -> std::result::Result<(), BoxError> {
                Err("collection not loaded".into())
            })
            .unwrap_err();
        assert!(matches!(err, Error::Driver(_)));
        assert_eq!(err.to_string(), "driver error: collection not loaded");
    }
}
