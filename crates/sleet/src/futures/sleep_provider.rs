use core::{future::Future, time::Duration};

/// A trait that abstracts over how to wait for a given [`Duration`] in async
/// contexts.
///
/// Lets async generation back off cooperatively instead of spinning while the
/// current millisecond is exhausted.
pub trait SleepProvider {
    /// Returns a future that completes after roughly `dur`.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}
