use crate::ChangeDetector;
use std::pin::Pin;
use tokio::sync::watch;

/// Observable value backed by a watch channel. Clones share the channel, so
/// every clone sees writes made through any other clone.
pub struct State<S> {
    tx: watch::Sender<S>,
}

impl<S: Default + Clone + Send + Sync + 'static> Default for State<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> Clone for State<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S: Clone + Send + Sync + 'static> State<S> {
    pub fn new(value: S) -> Self {
        let (tx, _rx) = watch::channel(value);
        Self { tx }
    }

    pub fn get(&self) -> S {
        self.tx.borrow().clone()
    }

    pub fn set(&self, value: S) {
        self.tx.send_replace(value);
    }

    pub fn update(&self, f: impl FnOnce(&mut S)) {
        self.tx.send_modify(f);
    }

    /// Receiver positioned at the current value; `changed().await` resolves
    /// on the next write.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    pub fn change_detector(&self) -> StateChangeDetector<S> {
        StateChangeDetector {
            rx: self.tx.subscribe(),
        }
    }
}

pub struct StateChangeDetector<S> {
    rx: watch::Receiver<S>,
}

impl<S> Clone for StateChangeDetector<S> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<S: 'static + Send + Sync> ChangeDetector for StateChangeDetector<S> {
    fn wait_for_change(&self) -> Pin<Box<dyn Future<Output = Option<()>> + Send + 'static>> {
        let mut this = self.clone();
        Box::pin(async move { this.rx.changed().await.ok() })
    }
}
