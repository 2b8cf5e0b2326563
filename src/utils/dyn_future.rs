use std::future::Future;
use std::pin::Pin;

/// Boxed future as returned by the driver trait methods.
pub type DynFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
