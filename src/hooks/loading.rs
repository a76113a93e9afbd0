use crate::notify::Notifier;
use crate::state::State;
use anyhow::{Result, anyhow};
use futures::future::{BoxFuture, FutureExt, ready};
use std::sync::Arc;

/// Notification text: fixed, or derived from the operation's outcome.
pub enum Message<V> {
    Literal(String),
    Derived(Arc<dyn Fn(&V) -> String + Send + Sync>),
}

impl<V> Message<V> {
    pub fn derived(f: impl Fn(&V) -> String + Send + Sync + 'static) -> Self {
        Self::Derived(Arc::new(f))
    }

    fn resolve(&self, value: &V) -> String {
        match self {
            Self::Literal(text) => text.clone(),
            Self::Derived(f) => f(value),
        }
    }
}

impl<V> Clone for Message<V> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(text) => Self::Literal(text.clone()),
            Self::Derived(f) => Self::Derived(f.clone()),
        }
    }
}

impl<V> From<&str> for Message<V> {
    fn from(text: &str) -> Self {
        Self::Literal(text.to_owned())
    }
}

impl<V> From<String> for Message<V> {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

/// Notification settings, set once as tracker defaults and again per call.
/// Unset fields fall through to the other layer when merged; flags default
/// to off.
pub struct LoadingOptions<T> {
    pub with_success_msg: Option<bool>,
    pub with_error_msg: Option<bool>,
    pub success_msg: Option<Message<T>>,
    pub error_msg: Option<Message<anyhow::Error>>,
}

impl<T> Default for LoadingOptions<T> {
    fn default() -> Self {
        Self {
            with_success_msg: None,
            with_error_msg: None,
            success_msg: None,
            error_msg: None,
        }
    }
}

impl<T> Clone for LoadingOptions<T> {
    fn clone(&self) -> Self {
        Self {
            with_success_msg: self.with_success_msg,
            with_error_msg: self.with_error_msg,
            success_msg: self.success_msg.clone(),
            error_msg: self.error_msg.clone(),
        }
    }
}

impl<T> LoadingOptions<T> {
    /// Field-by-field layering; `later` wins where it is set.
    fn merged_with(&self, later: &Self) -> Self {
        Self {
            with_success_msg: later.with_success_msg.or(self.with_success_msg),
            with_error_msg: later.with_error_msg.or(self.with_error_msg),
            success_msg: later.success_msg.clone().or_else(|| self.success_msg.clone()),
            error_msg: later.error_msg.clone().or_else(|| self.error_msg.clone()),
        }
    }
}

/// What a tracker is initialized with: a starting flag value, or the
/// tracker-level option defaults (flag starts false).
pub enum LoadingInit<T> {
    Flag(bool),
    Defaults(LoadingOptions<T>),
}

impl<T> From<bool> for LoadingInit<T> {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl<T> From<LoadingOptions<T>> for LoadingInit<T> {
    fn from(options: LoadingOptions<T>) -> Self {
        Self::Defaults(options)
    }
}

/// Tracks the pending/settled state of one asynchronous operation through an
/// observable flag and optionally reports its outcome through the injected
/// [`Notifier`].
pub struct Loading<T> {
    flag: State<bool>,
    defaults: LoadingOptions<T>,
    notifier: Notifier,
}

impl<T: Send + 'static> Loading<T> {
    pub fn new(init: impl Into<LoadingInit<T>>) -> Self {
        Self::with_notifier(init, Notifier::default())
    }

    pub fn with_notifier(init: impl Into<LoadingInit<T>>, notifier: Notifier) -> Self {
        let (flag, defaults) = match init.into() {
            LoadingInit::Flag(value) => (value, LoadingOptions::default()),
            LoadingInit::Defaults(options) => (false, options),
        };
        Self {
            flag: State::new(flag),
            defaults,
            notifier,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.flag.get()
    }

    /// Shared observable flag, true while an operation is in flight.
    pub fn flag(&self) -> State<bool> {
        self.flag.clone()
    }

    pub fn run<F>(&self, operation: F) -> BoxFuture<'static, Result<T>>
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        self.run_with(operation, LoadingOptions::default())
    }

    /// Runs `operation` with per-call `options` layered over the tracker
    /// defaults. The flag flips true before this returns and false when the
    /// returned future settles; the outcome passes through unchanged.
    ///
    /// Overlapping calls share the one flag, so the last settlement wins and
    /// the flag can read false while an earlier operation is still in
    /// flight.
    pub fn run_with<F>(
        &self,
        operation: F,
        options: LoadingOptions<T>,
    ) -> BoxFuture<'static, Result<T>>
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        self.dispatch(Some(operation.boxed()), options)
    }

    /// Like [`run_with`](Loading::run_with) for callers holding an operation
    /// that may never have been built. `None` is misuse: it is logged,
    /// rejected with a generic error, and the flag stays untouched.
    pub fn run_opt<F>(
        &self,
        operation: Option<F>,
        options: LoadingOptions<T>,
    ) -> BoxFuture<'static, Result<T>>
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        self.dispatch(operation.map(FutureExt::boxed), options)
    }

    fn dispatch(
        &self,
        operation: Option<BoxFuture<'static, Result<T>>>,
        options: LoadingOptions<T>,
    ) -> BoxFuture<'static, Result<T>> {
        let options = self.defaults.merged_with(&options);
        let Some(operation) = operation else {
            tracing::error!("run called without a pending operation");
            return ready(Err(anyhow!("Unknown error"))).boxed();
        };

        let flag = self.flag.clone();
        let notifier = self.notifier.clone();
        flag.set(true);

        async move {
            match operation.await {
                Ok(value) => {
                    flag.set(false);
                    if options.with_success_msg.unwrap_or(false) {
                        let text = match &options.success_msg {
                            Some(message) => message.resolve(&value),
                            None => "Success".to_owned(),
                        };
                        notifier.success(&text);
                    }
                    Ok(value)
                }
                Err(error) => {
                    flag.set(false);
                    if options.with_error_msg.unwrap_or(false) {
                        let text = match &options.error_msg {
                            Some(message) => message.resolve(&error),
                            None => {
                                let rendered = error.to_string();
                                if rendered.is_empty() {
                                    "Error".to_owned()
                                } else {
                                    rendered
                                }
                            }
                        };
                        notifier.error(&text);
                    }
                    Err(error)
                }
            }
        }
        .boxed()
    }
}

/// Creates a tracker and returns its observable flag alongside it, for
/// callers that hand the flag to a view and keep the tracker in the model.
pub fn use_loading<T: Send + 'static>(
    init: impl Into<LoadingInit<T>>,
    notifier: Notifier,
) -> (State<bool>, Loading<T>) {
    let loading = Loading::with_notifier(init, notifier);
    (loading.flag(), loading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChangeDetector;
    use crate::notify::Notify;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        success: Mutex<Vec<String>>,
        error: Mutex<Vec<String>>,
    }

    impl Notify for Arc<Recorder> {
        fn success(&self, text: &str) {
            self.success.lock().unwrap().push(text.to_owned());
        }

        fn error(&self, text: &str) {
            self.error.lock().unwrap().push(text.to_owned());
        }
    }

    fn recording() -> (Arc<Recorder>, Notifier) {
        let recorder = Arc::new(Recorder::default());
        let notifier = Notifier::new(recorder.clone());
        (recorder, notifier)
    }

    #[test]
    fn boolean_initializer_sets_the_flag() {
        assert!(Loading::<()>::new(true).is_loading());
        assert!(!Loading::<()>::new(false).is_loading());
    }

    #[tokio::test]
    async fn flag_tracks_a_successful_operation() {
        let loading = Loading::<u32>::new(false);
        assert!(!loading.is_loading());

        let pending = loading.run(async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok(7)
        });
        assert!(loading.is_loading());

        assert_eq!(pending.await.unwrap(), 7);
        assert!(!loading.is_loading());
    }

    #[tokio::test]
    async fn failure_resets_the_flag_and_passes_the_error_through() {
        let loading = Loading::<()>::new(false);

        let pending = loading.run(async { Err(anyhow!("boom")) });
        assert!(loading.is_loading());

        let error = pending.await.unwrap_err();
        assert_eq!(error.to_string(), "boom");
        assert!(!loading.is_loading());
    }

    #[tokio::test]
    async fn the_original_error_type_survives() {
        let loading = Loading::<()>::new(false);

        let error = loading
            .run(async { Err(anyhow::Error::new(std::io::Error::other("disk full"))) })
            .await
            .unwrap_err();

        assert!(error.downcast_ref::<std::io::Error>().is_some());
        assert_eq!(error.to_string(), "disk full");
    }

    #[tokio::test]
    async fn success_message_defaults_to_success_and_skips_failures() {
        let (recorder, notifier) = recording();
        let loading = Loading::<()>::with_notifier(
            LoadingOptions {
                with_success_msg: Some(true),
                ..Default::default()
            },
            notifier,
        );

        let _ = loading.run(async { Err(anyhow!("boom")) }).await;
        assert!(recorder.success.lock().unwrap().is_empty());

        loading.run(async { Ok(()) }).await.unwrap();
        assert_eq!(*recorder.success.lock().unwrap(), vec!["Success".to_owned()]);
    }

    #[tokio::test]
    async fn derived_success_message_sees_the_success_value() {
        let (recorder, notifier) = recording();
        let loading = Loading::<String>::with_notifier(
            LoadingOptions {
                with_success_msg: Some(true),
                success_msg: Some(Message::derived(|value: &String| format!("saved {value}"))),
                ..Default::default()
            },
            notifier,
        );

        loading.run(async { Ok("draft".to_owned()) }).await.unwrap();
        assert_eq!(
            *recorder.success.lock().unwrap(),
            vec!["saved draft".to_owned()]
        );
    }

    #[tokio::test]
    async fn error_message_uses_the_failure_text_or_the_fallback() {
        let (recorder, notifier) = recording();
        let loading = Loading::<()>::with_notifier(
            LoadingOptions {
                with_error_msg: Some(true),
                ..Default::default()
            },
            notifier,
        );

        let _ = loading.run(async { Ok(()) }).await;
        assert!(recorder.error.lock().unwrap().is_empty());

        let _ = loading.run(async { Err(anyhow!("bad gateway")) }).await;
        let _ = loading.run(async { Err(anyhow!("")) }).await;
        assert_eq!(
            *recorder.error.lock().unwrap(),
            vec!["bad gateway".to_owned(), "Error".to_owned()]
        );
    }

    #[tokio::test]
    async fn derived_error_message_sees_the_error() {
        let (recorder, notifier) = recording();
        let loading = Loading::<()>::with_notifier(
            LoadingOptions {
                with_error_msg: Some(true),
                error_msg: Some(Message::derived(|error: &anyhow::Error| {
                    format!("request failed: {error}")
                })),
                ..Default::default()
            },
            notifier,
        );

        let _ = loading.run(async { Err(anyhow!("timeout")) }).await;
        assert_eq!(
            *recorder.error.lock().unwrap(),
            vec!["request failed: timeout".to_owned()]
        );
    }

    #[tokio::test]
    async fn per_call_options_win_over_tracker_defaults() {
        let (recorder, notifier) = recording();
        let loading = Loading::<()>::with_notifier(
            LoadingOptions {
                with_success_msg: Some(true),
                success_msg: Some("from defaults".into()),
                ..Default::default()
            },
            notifier,
        );

        loading.run(async { Ok(()) }).await.unwrap();
        loading
            .run_with(
                async { Ok(()) },
                LoadingOptions {
                    success_msg: Some("per call".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            *recorder.success.lock().unwrap(),
            vec!["from defaults".to_owned(), "per call".to_owned()]
        );
    }

    #[tokio::test]
    async fn a_missing_operation_rejects_without_touching_the_flag() {
        let loading = Loading::<()>::new(false);

        let pending = loading.run_opt(
            None::<std::future::Ready<Result<()>>>,
            LoadingOptions::default(),
        );
        assert!(!loading.is_loading());

        let error = pending.await.unwrap_err();
        assert_eq!(error.to_string(), "Unknown error");
    }

    #[tokio::test]
    async fn repeated_runs_do_not_accumulate_state() {
        let (recorder, notifier) = recording();
        let loading = Loading::<u32>::with_notifier(
            LoadingOptions {
                with_success_msg: Some(true),
                ..Default::default()
            },
            notifier,
        );

        for _ in 0..2 {
            let pending = loading.run(async { Ok(1) });
            assert!(loading.is_loading());
            pending.await.unwrap();
            assert!(!loading.is_loading());
        }

        assert_eq!(
            *recorder.success.lock().unwrap(),
            vec!["Success".to_owned(), "Success".to_owned()]
        );
    }

    #[tokio::test]
    async fn a_notifier_installed_later_reaches_existing_trackers() {
        let notifier = Notifier::default();
        let loading = Loading::<()>::with_notifier(
            LoadingOptions {
                with_success_msg: Some(true),
                ..Default::default()
            },
            notifier.clone(),
        );

        loading.run(async { Ok(()) }).await.unwrap();

        let recorder = Arc::new(Recorder::default());
        notifier.install(recorder.clone());
        loading.run(async { Ok(()) }).await.unwrap();

        assert_eq!(*recorder.success.lock().unwrap(), vec!["Success".to_owned()]);
    }

    #[tokio::test]
    async fn the_flag_is_observable_while_the_operation_runs() {
        let loading = Loading::<()>::new(false);
        let detector = loading.flag().change_detector();

        let became_true = detector.wait_for_change();
        let pending = loading.run(async { Ok(()) });
        assert_eq!(became_true.await, Some(()));

        pending.await.unwrap();
        assert!(!loading.is_loading());
    }

    #[test]
    fn use_loading_returns_the_flag_and_the_tracker() {
        let (flag, loading): (_, Loading<()>) = use_loading(true, Notifier::default());
        assert!(flag.get());
        assert!(loading.is_loading());
    }
}
