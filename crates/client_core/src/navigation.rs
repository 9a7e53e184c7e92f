//! Route parameter snapshots and the stream that carries them to views.

use std::collections::HashMap;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

pub const KEYWORD_PARAM: &str = "keyword";
pub const ID_PARAM: &str = "id";
pub const NAME_PARAM: &str = "name";

/// Immutable key/value view of the route parameters at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamSnapshot {
    params: HashMap<String, String>,
}

impl ParamSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(keyword: impl Into<String>) -> Self {
        Self::new().with(KEYWORD_PARAM, keyword)
    }

    pub fn category(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new().with(ID_PARAM, id).with(NAME_PARAM, name)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn has(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for ParamSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Router side of the navigation stream.
pub struct NavigationSource {
    tx: watch::Sender<ParamSnapshot>,
}

impl NavigationSource {
    pub fn new(initial: ParamSnapshot) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn navigate(&self, snapshot: ParamSnapshot) {
        tracing::debug!(?snapshot, "navigation");
        self.tx.send_replace(snapshot);
    }

    pub fn handle(&self) -> NavigationHandle {
        NavigationHandle {
            rx: self.tx.subscribe(),
        }
    }
}

/// View side of the navigation stream.
#[derive(Clone)]
pub struct NavigationHandle {
    rx: watch::Receiver<ParamSnapshot>,
}

impl NavigationHandle {
    pub fn snapshot(&self) -> ParamSnapshot {
        self.rx.borrow().clone()
    }

    /// Yields the current snapshot first, then every later one. Snapshots
    /// published faster than they are consumed collapse into the newest.
    pub fn stream(&self) -> WatchStream<ParamSnapshot> {
        WatchStream::new(self.rx.clone())
    }
}
