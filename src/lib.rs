//! Utility hooks for watch-channel reactive UIs: an async loading-state
//! tracker and a route-query watcher, both layered on observable
//! [`state::State`] values.

use std::pin::Pin;

pub mod hooks;
pub mod notify;
pub mod router;
pub mod scope;
pub mod state;

/// Type-erased "something changed" signal, the seam between observable state
/// and whoever waits on it.
pub trait ChangeDetector: Sync + Send + 'static {
    fn wait_for_change(&self) -> Pin<Box<dyn Future<Output = Option<()>> + Send + 'static>>;
}
