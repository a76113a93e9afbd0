use crate::state::{State, StateChangeDetector};
use std::collections::BTreeMap;
use tokio::sync::watch;

/// A single query parameter: one value, or the repeated form
/// (`?tag=a&tag=b`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryValue {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

/// Query mapping as the router exposes it: parameter name to value(s).
pub type Query = BTreeMap<String, QueryValue>;

/// Builds a [`Query`] from `(key, value)` pairs.
pub fn query<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Query
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Compares two query mappings. With `dependencies`, only the named keys are
/// considered: a key that differs in value or in presence counts as a
/// difference and everything else is ignored, so an empty list makes any two
/// mappings equal. Without `dependencies` this is full structural equality,
/// repeated-parameter lists included.
pub fn query_eq(a: &Query, b: &Query, dependencies: Option<&[String]>) -> bool {
    match dependencies {
        Some(keys) => keys.iter().all(|key| a.get(key) == b.get(key)),
        None => a == b,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub path: String,
    pub query: Query,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Query::new(),
        }
    }

    pub fn with_query(path: impl Into<String>, query: Query) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }
}

/// Minimal reactive stand-in for the host router. The current route is
/// observable; watchers never mutate it, they only subscribe. Path and query
/// live in one channel so an observer always sees a consistent snapshot.
#[derive(Clone)]
pub struct Router {
    current: State<Route>,
}

impl Router {
    pub fn new(initial: Route) -> Self {
        Self {
            current: State::new(initial),
        }
    }

    pub fn route(&self) -> Route {
        self.current.get()
    }

    pub fn path(&self) -> String {
        self.current.get().path
    }

    pub fn query(&self) -> Query {
        self.current.get().query
    }

    /// Navigate to a new path, dropping the query.
    pub fn push(&self, path: impl Into<String>) {
        self.current.set(Route::new(path));
    }

    pub fn push_with_query(&self, path: impl Into<String>, query: Query) {
        self.current.set(Route::with_query(path, query));
    }

    /// Replace the query on the current path.
    pub fn set_query(&self, query: Query) {
        self.current.update(|route| route.query = query);
    }

    /// Edit the current query in place.
    pub fn update_query(&self, f: impl FnOnce(&mut Query)) {
        self.current.update(|route| f(&mut route.query));
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }

    pub fn change_detector(&self) -> StateChangeDetector<Route> {
        self.current.change_detector()
    }
}
