//! Runtime-agnostic spawning of background work.

use std::future::Future;

/// Abstraction for spawning a detached future on some runtime.
///
/// The sweep driver uses this so it does not depend on a particular executor.
pub trait Spawn {
    /// Spawn a future that runs to completion in the background.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
