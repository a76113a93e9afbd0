use std::sync::Mutex;
use tokio::task::{AbortHandle, JoinSet};

/// Owns the background tasks spawned by hooks. Dropping the scope aborts
/// every task still running, which is what ends a subscription.
#[derive(Default, Debug)]
pub struct Scope {
    join_set: Mutex<JoinSet<()>>,
}

/// Handle to a single spawned task, for aborting one subscription without
/// tearing down the whole scope.
#[derive(Clone)]
pub struct TaskHandle {
    handle: AbortHandle,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            join_set: Default::default(),
        }
    }

    pub fn spawn(&self, task: impl Future<Output = ()> + Send + 'static) -> TaskHandle {
        TaskHandle {
            handle: self.join_set.lock().unwrap().spawn(task),
        }
    }
}

impl TaskHandle {
    pub fn abort(&self) {
        self.handle.abort()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
