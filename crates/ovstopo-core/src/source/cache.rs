use super::{FetchFuture, NeutronSource, TopologySource};
use crate::config::CacheOptions;
use crate::error::{Error, Result};
use futures::future::{self, BoxFuture, FutureExt, Shared};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

type SharedFetch =
    Shared<BoxFuture<'static, (std::result::Result<Value, Arc<Error>>, Instant)>>;

/// Deduplicating fetch cache keyed by logical name.
///
/// Callers asking for a key while its fetch is in flight share that fetch. A settled value is
/// served until the freshness window elapses; failed fetches and empty documents are fetched
/// again on the next access.
#[derive(Default)]
pub struct FetchCache {
    opts: CacheOptions,
    entries: Mutex<FxHashMap<String, SharedFetch>>,
}

impl std::fmt::Debug for FetchCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchCache")
            .field("opts", &self.opts)
            .field("keys", &self.lock().keys().cloned().collect::<Vec<_>>())
            .finish()
    }
}

impl FetchCache {
    pub fn new(opts: CacheOptions) -> Self {
        Self {
            opts,
            entries: Mutex::default(),
        }
    }

    pub fn options(&self) -> &CacheOptions {
        &self.opts
    }

    pub fn obtain<F>(&self, key: &str, fetch: F) -> BoxFuture<'static, Result<Value>>
    where
        F: FnOnce() -> BoxFuture<'static, Result<Value>>,
    {
        let mut entries = self.lock();
        if let Some(shared) = entries.get(key) {
            match shared.peek() {
                None => return settle(shared.clone()),
                Some((Ok(value), fetched_at))
                    if fetched_at.elapsed() < self.opts.freshness && !is_empty(value) =>
                {
                    return future::ready(Ok(value.clone())).boxed();
                }
                Some(_) => {}
            }
        }

        tracing::debug!(key, "fetching");
        let shared = fetch()
            .map(|res| (res.map_err(Arc::new), Instant::now()))
            .boxed()
            .shared();
        entries.insert(key.to_string(), shared.clone());
        settle(shared)
    }

    pub fn invalidate(&self, key: &str) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, FxHashMap<String, SharedFetch>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn settle(shared: SharedFetch) -> BoxFuture<'static, Result<Value>> {
    shared.map(|(res, _)| res.map_err(Error::Shared)).boxed()
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Any source behind a [`FetchCache`].
#[derive(Debug)]
pub struct CachedSource<S> {
    inner: Arc<S>,
    cache: FetchCache,
}

impl<S> CachedSource<S> {
    pub fn new(inner: S, opts: CacheOptions) -> Self {
        Self {
            inner: Arc::new(inner),
            cache: FetchCache::new(opts),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }
}

impl<S: Send + Sync + 'static> CachedSource<S> {
    fn fetch_via(&self, key: &str, f: for<'s> fn(&'s S) -> FetchFuture<'s>) -> FetchFuture<'_> {
        let inner = Arc::clone(&self.inner);
        self.cache
            .obtain(key, move || async move { f(&*inner).await }.boxed())
    }
}

impl<S: TopologySource + 'static> TopologySource for CachedSource<S> {
    fn inventory_nodes(&self) -> FetchFuture<'_> {
        self.fetch_via("inventory", S::inventory_nodes)
    }

    fn network_topology(&self) -> FetchFuture<'_> {
        self.fetch_via("network-topology", S::network_topology)
    }
}

impl<S: NeutronSource + 'static> NeutronSource for CachedSource<S> {
    fn networks(&self) -> FetchFuture<'_> {
        self.fetch_via("networks", S::networks)
    }

    fn subnets(&self) -> FetchFuture<'_> {
        self.fetch_via("subnets", S::subnets)
    }

    fn routers(&self) -> FetchFuture<'_> {
        self.fetch_via("routers", S::routers)
    }

    fn ports(&self) -> FetchFuture<'_> {
        self.fetch_via("ports", S::ports)
    }

    fn floating_ips(&self) -> FetchFuture<'_> {
        self.fetch_via("floatingips", S::floating_ips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        value: Value,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<Value>> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            future::ready(Ok(value)).boxed()
        }
    }

    #[test]
    fn concurrent_callers_share_one_fetch() {
        let cache = FetchCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let a = cache.obtain("ports", counting_fetch(&calls, json!({ "ports": [1] })));
        let b = cache.obtain("ports", counting_fetch(&calls, json!({ "ports": [2] })));
        let (a, b) = block_on(future::join(a, b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.expect("a"), b.expect("b"));
    }

    #[test]
    fn fresh_value_is_served_from_cache() {
        let cache = FetchCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        block_on(cache.obtain("k", counting_fetch(&calls, json!([1])))).expect("first");
        let second = block_on(cache.obtain("k", counting_fetch(&calls, json!([2])))).expect("second");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(second, json!([1]));
    }

    #[test]
    fn stale_and_empty_values_are_refetched() {
        let cache = FetchCache::new(CacheOptions {
            freshness: Duration::ZERO,
        });
        let calls = Arc::new(AtomicUsize::new(0));
        block_on(cache.obtain("k", counting_fetch(&calls, json!([1])))).expect("first");
        block_on(cache.obtain("k", counting_fetch(&calls, json!([2])))).expect("second");
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let fresh = FetchCache::default();
        block_on(fresh.obtain("e", counting_fetch(&calls, json!({})))).expect("empty");
        block_on(fresh.obtain("e", counting_fetch(&calls, json!({ "a": 1 })))).expect("full");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn failures_are_shared_and_not_cached() {
        let cache = FetchCache::default();
        let err = block_on(cache.obtain("k", || {
            future::ready(Err(Error::InvalidPayload {
                context: "test".into(),
                message: "boom".into(),
            }))
            .boxed()
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Shared(_)));

        let calls = Arc::new(AtomicUsize::new(0));
        block_on(cache.obtain("k", counting_fetch(&calls, json!([1])))).expect("retry");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
