use chrono::{DateTime, Duration, Utc};
use futures::{
    future::{LocalBoxFuture, Shared},
    FutureExt,
};
use std::{cell::RefCell, future::Future};

use super::types::ApiError;

type SharedFetch<T> = Shared<LocalBoxFuture<'static, Result<T, ApiError>>>;

struct Entry<T: Clone> {
    started_at: DateTime<Utc>,
    fetch: SharedFetch<T>,
}

/// Collapses repeated calls inside a time window onto one in-flight request.
/// A failed request is forgotten at once so the next caller retries.
pub struct InflightCache<T: Clone> {
    window: Duration,
    slot: RefCell<Option<Entry<T>>>,
}

impl<T: Clone + 'static> InflightCache<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slot: RefCell::new(None),
        }
    }

    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> Result<T, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + 'static,
    {
        let shared = self.current_or_start(Utc::now(), fetch);
        let result = shared.clone().await;
        if result.is_err() {
            self.forget(&shared);
        }
        result
    }

    pub fn invalidate(&self) {
        self.slot.borrow_mut().take();
    }

    fn current_or_start<F, Fut>(&self, now: DateTime<Utc>, fetch: F) -> SharedFetch<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + 'static,
    {
        let mut slot = self.slot.borrow_mut();
        if let Some(entry) = slot.as_ref() {
            if now - entry.started_at < self.window {
                return entry.fetch.clone();
            }
        }
        let started = fetch().boxed_local().shared();
        *slot = Some(Entry {
            started_at: now,
            fetch: started.clone(),
        });
        started
    }

    fn forget(&self, failed: &SharedFetch<T>) {
        let mut slot = self.slot.borrow_mut();
        if slot
            .as_ref()
            .is_some_and(|entry| entry.fetch.ptr_eq(failed))
        {
            slot.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::{cell::Cell, rc::Rc};

    fn counting_fetch(
        calls: &Rc<Cell<u32>>,
        result: Result<u32, ApiError>,
    ) -> impl FnOnce() -> futures::future::Ready<Result<u32, ApiError>> {
        let calls = calls.clone();
        move || {
            calls.set(calls.get() + 1);
            futures::future::ready(result)
        }
    }

    #[test]
    fn calls_within_window_share_one_fetch() {
        let cache = InflightCache::new(Duration::seconds(5));
        let calls = Rc::new(Cell::new(0));

        let first = block_on(cache.get_or_fetch(counting_fetch(&calls, Ok(1))));
        let second = block_on(cache.get_or_fetch(counting_fetch(&calls, Ok(2))));

        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(1));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = InflightCache::new(Duration::seconds(5));
        let calls = Rc::new(Cell::new(0));

        let failed = block_on(cache.get_or_fetch(counting_fetch(
            &calls,
            Err(ApiError::request_failed("offline")),
        )));
        let recovered = block_on(cache.get_or_fetch(counting_fetch(&calls, Ok(3))));

        assert!(failed.is_err());
        assert_eq!(recovered, Ok(3));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn expired_window_starts_a_new_fetch() {
        let cache = InflightCache::new(Duration::zero());
        let calls = Rc::new(Cell::new(0));

        block_on(cache.get_or_fetch(counting_fetch(&calls, Ok(1)))).unwrap();
        let second = block_on(cache.get_or_fetch(counting_fetch(&calls, Ok(2))));

        assert_eq!(second, Ok(2));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn invalidate_drops_cached_result() {
        let cache = InflightCache::new(Duration::seconds(5));
        let calls = Rc::new(Cell::new(0));

        block_on(cache.get_or_fetch(counting_fetch(&calls, Ok(1)))).unwrap();
        cache.invalidate();
        let second = block_on(cache.get_or_fetch(counting_fetch(&calls, Ok(2))));

        assert_eq!(second, Ok(2));
        assert_eq!(calls.get(), 2);
    }
}
