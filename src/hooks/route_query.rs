use crate::router::{Query, Router, query_eq};
use crate::scope::{Scope, TaskHandle};

/// Options for [`on_route_query_change`].
#[derive(Clone, Debug, Default)]
pub struct QueryWatchOptions {
    /// Invoke the callback with the current query right away, before any
    /// change is observed.
    pub immediate: bool,
    /// Restrict change detection to these keys. `Some(vec![])` disables the
    /// callback entirely; `None` watches every key.
    pub dependencies: Option<Vec<String>>,
}

/// Watches the router's query parameters and invokes `callback` whenever
/// they change while the path is still what it was at subscription time. A
/// navigation to a different path is ignored outright: no callback, and the
/// stored snapshot stays where it was, so returning to the path with a
/// differing query still fires.
///
/// The subscription lives until `scope` is dropped or the returned handle is
/// aborted. Rapid successive route updates may coalesce into a single
/// observation carrying the latest query.
pub fn on_route_query_change(
    router: &Router,
    scope: &Scope,
    mut callback: impl FnMut(&Query) + Send + 'static,
    options: QueryWatchOptions,
) -> TaskHandle {
    let path = router.path();
    let mut last_query = router.query();
    let dependencies = options.dependencies;

    if options.immediate {
        callback(&last_query);
    }

    let mut routes = router.subscribe();
    scope.spawn(async move {
        while routes.changed().await.is_ok() {
            let route = routes.borrow_and_update().clone();
            if route.path != path {
                continue;
            }
            if query_eq(&last_query, &route.query, dependencies.as_deref()) {
                continue;
            }
            last_query = route.query;
            callback(&last_query);
        }
    })
}
