use std::fmt;
use std::sync::{Arc, RwLock};

/// Presentation side of success/error notifications. The host application
/// implements this against its own toast or alert UI.
pub trait Notify: Send + Sync + 'static {
    fn success(&self, text: &str);
    fn error(&self, text: &str);
}

/// Placeholder used until the host installs a real implementation.
struct NoopNotify;

impl Notify for NoopNotify {
    fn success(&self, text: &str) {
        tracing::debug!(text, "success notification dropped, no notifier installed");
    }

    fn error(&self, text: &str) {
        tracing::debug!(text, "error notification dropped, no notifier installed");
    }
}

/// Cloneable handle to the installed [`Notify`] implementation. Every clone
/// observes an [`install`](Notifier::install) made through any of them, so
/// the host wires presentation in once at composition time and trackers
/// created earlier pick it up.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<RwLock<Arc<dyn Notify>>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(NoopNotify)
    }
}

impl Notifier {
    pub fn new(notify: impl Notify) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(notify) as Arc<dyn Notify>)),
        }
    }

    /// Replace the notification behavior for every holder of this handle.
    pub fn install(&self, notify: impl Notify) {
        *self.inner.write().unwrap() = Arc::new(notify);
    }

    pub fn success(&self, text: &str) {
        self.current().success(text);
    }

    pub fn error(&self, text: &str) {
        self.current().error(text);
    }

    fn current(&self) -> Arc<dyn Notify> {
        self.inner.read().unwrap().clone()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier").finish_non_exhaustive()
    }
}
