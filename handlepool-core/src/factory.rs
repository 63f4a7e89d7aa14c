//! Caller-supplied handle constructors.

use std::fmt;

use crate::context::Context;
use crate::error::BoxError;
use crate::handle::Handle;

/// Builds new handles from an opaque configuration value.
///
/// The registry forwards `config` and `ctx` verbatim and wraps any error in
/// [`Error::CreationFailed`](crate::Error::CreationFailed). Implementations
/// that dial remote services should bound the dial by `ctx`.
pub trait Factory: Send + Sync + 'static {
    /// Configuration consumed by `create`.
    type Config: Send + Sync;
    /// Handle type produced.
    type Handle: Handle;

    /// Creates a new live handle.
    fn create(&self, config: &Self::Config, ctx: &Context) -> Result<Self::Handle, BoxError>;
}

type CreateFn<C, H> = dyn Fn(&C, &Context) -> Result<H, BoxError> + Send + Sync;

/// A [`Factory`] backed by a closure. Built with [`factory_fn`].
///
/// The closure is boxed so its type does not leak into the registry's type.
/// Futures that capture an `AsyncRegistry<FnFactory<..>>` stay `Send + 'static`
/// and can be handed to `tokio::spawn`.
pub struct FnFactory<C, H> {
    f: Box<CreateFn<C, H>>,
}

/// Adapts a closure into a [`Factory`].
///
/// # Example
///
/// ```
/// use handlepool_core::{factory_fn, BoxError, Context, Factory, Handle};
///
/// struct Session(String);
///
/// impl Handle for Session {
///     fn close(&self) -> Result<(), BoxError> {
///         Ok(())
///     }
/// }
///
/// let factory = factory_fn(|addr: &String, _ctx: &Context| Ok(Session(addr.clone())));
/// let session = factory.create(&"localhost:19530".to_string(), &Context::background()).unwrap();
/// assert_eq!(session.0, "localhost:19530");
/// ```
pub fn factory_fn<C, H, F>(f: F) -> FnFactory<C, H>
where
    F: Fn(&C, &Context) -> Result<H, BoxError> + Send + Sync + 'static,
{
    FnFactory { f: Box::new(f) }
}

impl<C, H> Factory for FnFactory<C, H>
where
    C: Send + Sync + 'static,
    H: Handle,
{
    type Config = C;
    type Handle = H;

    fn create(&self, config: &C, ctx: &Context) -> Result<H, BoxError> {
        (self.f)(config, ctx)
    }
}

impl<C, H> fmt::Debug for FnFactory<C, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFactory").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Handle for Noop {
        fn close(&self) -> Result<(), BoxError> {
            Ok(())
        }
    }

    #[test]
    fn test_closure_factory_sees_config_and_context() {
        let factory = factory_fn(|attempts: &u32, ctx: &Context| {
            ctx.check()?;
            if *attempts == 0 {
                return Err("no attempts configured".into());
            }
            Ok(Noop)
        });

        assert!(factory.create(&1, &Context::background()).is_ok());
        assert!(factory.create(&0, &Context::background()).is_err());

        let ctx = Context::background();
        ctx.cancel();
        let err = factory.create(&1, &ctx).err().unwrap();
        assert_eq!(err.to_string(), "operation cancelled");
    }
}
