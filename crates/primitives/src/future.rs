use std::future::Future;
use std::pin::Pin;

/// A pinned, boxed future that is not required to be Send.
///
/// Dispatch runs on the host's UI thread, so pending command results use this
/// alias rather than a `Send` future.
pub type BoxFutureLocal<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;
