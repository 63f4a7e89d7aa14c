//! The handle contract consumed by the registry.
//!
//! A handle owns exactly one live resource (typically a network client) and
//! has a single-use lifecycle: once closed it stays closed. The registry never
//! looks inside a handle; it only calls [`Handle::close`] when the handle is
//! removed or the registry shuts down.

use std::sync::Arc;

use crate::error::BoxError;

/// A live resource that can be registered in a [`Registry`](crate::Registry).
///
/// Implementations must make `close` idempotent: the first call releases the
/// resource, later calls return `Ok(())`. Every other operation on a closed
/// handle should fail with [`Error::Closed`](crate::Error::Closed) rather than
/// panic or hang.
pub trait Handle: Send + Sync + 'static {
    /// Releases the underlying resource.
    fn close(&self) -> Result<(), BoxError>;

    /// Returns true once the handle has been closed.
    fn is_closed(&self) -> bool {
        false
    }
}

impl<H: Handle + ?Sized> Handle for Arc<H> {
    fn close(&self) -> Result<(), BoxError> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

impl<H: Handle + ?Sized> Handle for Box<H> {
    fn close(&self) -> Result<(), BoxError> {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Flag(AtomicBool);

    impl Handle for Flag {
        fn close(&self) -> Result<(), BoxError> {
            self.0.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn is_closed(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_arc_forwards_close() {
        let handle = Arc::new(Flag(AtomicBool::new(false)));
        let shared = Arc::clone(&handle);

        assert!(!Handle::is_closed(&shared));
        Handle::close(&shared).unwrap();
        assert!(handle.is_closed());
    }

    #[test]
    fn test_boxed_trait_object() {
        let handle: Box<dyn Handle> = Box::new(Flag(AtomicBool::new(false)));
        handle.close().unwrap();
        assert!(handle.is_closed());
    }
}
