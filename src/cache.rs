use log::debug;
use std::time::{Duration, Instant};

/// Default lifetime of the cached full-table read.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Single-slot memo with a time-to-live.
///
/// Holds one value plus the instant it was produced. Reads older than
/// `ttl` are thrown away and reloaded on the next access; `invalidate`
/// forces the same thing immediately.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    entry: Option<(Instant, T)>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn loaded_at(&self) -> Option<Instant> {
        self.entry.as_ref().map(|(at, _)| *at)
    }

    pub fn is_fresh_at(&self, now: Instant) -> bool {
        match &self.entry {
            Some((at, _)) => now.saturating_duration_since(*at) < self.ttl,
            None => false,
        }
    }

    pub fn get_or_try_load<E, F>(&mut self, load: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.get_or_try_load_at(Instant::now(), load)
    }

    /// Like `get_or_try_load`, against an explicit clock reading.
    pub fn get_or_try_load_at<E, F>(&mut self, now: Instant, load: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if !self.is_fresh_at(now) {
            self.entry = None;
        }
        let entry = match self.entry.take() {
            Some(entry) => entry,
            None => {
                debug!("cache miss; reloading");
                (now, load()?)
            }
        };
        Ok(&self.entry.insert(entry).1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting_loader(calls: &Cell<u32>) -> impl FnOnce() -> Result<u32, ()> + '_ {
        move || {
            calls.set(calls.get() + 1);
            Ok(calls.get())
        }
    }

    #[test]
    fn reuses_value_within_ttl() {
        let calls = Cell::new(0);
        let mut cache = TtlCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        assert_eq!(*cache.get_or_try_load_at(t0, counting_loader(&calls)).unwrap(), 1);
        let later = t0 + Duration::from_secs(299);
        assert_eq!(*cache.get_or_try_load_at(later, counting_loader(&calls)).unwrap(), 1);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn reloads_after_expiry() {
        let calls = Cell::new(0);
        let mut cache = TtlCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.get_or_try_load_at(t0, counting_loader(&calls)).unwrap();
        let expired = t0 + Duration::from_secs(300);
        assert_eq!(*cache.get_or_try_load_at(expired, counting_loader(&calls)).unwrap(), 2);
        assert_eq!(cache.loaded_at(), Some(expired));
    }

    #[test]
    fn invalidate_forces_reload() {
        let calls = Cell::new(0);
        let mut cache = TtlCache::new(Duration::from_secs(300));
        let t0 = Instant::now();
        cache.get_or_try_load_at(t0, counting_loader(&calls)).unwrap();
        cache.invalidate();
        assert!(!cache.is_fresh_at(t0));
        assert_eq!(*cache.get_or_try_load_at(t0, counting_loader(&calls)).unwrap(), 2);
    }

    #[test]
    fn failed_load_leaves_cache_empty() {
        let mut cache: TtlCache<u32> = TtlCache::new(DEFAULT_TTL);
        let res: Result<&u32, &str> = cache.get_or_try_load(|| Err("boom"));
        assert_eq!(res.unwrap_err(), "boom");
        assert!(cache.loaded_at().is_none());
    }
}
