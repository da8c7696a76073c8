//! Mock token store for testing.

use crate::error::{AuthError, Result};
use crate::providers::{Clock, SystemClock, TokenKey, TokenStore};
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Entries {
    values: HashMap<String, (String, DateTime<Utc>)>,
    sets: HashMap<String, (HashSet<String>, DateTime<Utc>)>,
}

/// Mock token store.
///
/// In-memory store that enforces TTLs against a [`Clock`], so expiry can be
/// exercised by advancing a [`super::ManualClock`]. Every operation holds
/// one mutex for its whole duration, which makes `take` and `index_drain`
/// atomic.
#[derive(Clone)]
pub struct MockTokenStore {
    entries: Arc<Mutex<Entries>>,
    clock: Arc<dyn Clock>,
    unavailable: Arc<AtomicBool>,
    failing_puts: Arc<AtomicUsize>,
    failing_deletes: Arc<AtomicUsize>,
}

impl MockTokenStore {
    /// Create a new mock token store on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a new mock token store that reads time from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Entries::default())),
            clock,
            unavailable: Arc::new(AtomicBool::new(false)),
            failing_puts: Arc::new(AtomicUsize::new(0)),
            failing_deletes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every subsequent operation fail with `TokenStoreError`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Fail the next `count` calls to `put`; other operations keep working.
    pub fn fail_next_puts(&self, count: usize) {
        self.failing_puts.store(count, Ordering::SeqCst);
    }

    /// Fail the next `count` calls to `delete`; other operations keep working.
    pub fn fail_next_deletes(&self, count: usize) {
        self.failing_deletes.store(count, Ordering::SeqCst);
    }

    /// Live keys, sorted (for testing).
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let now = self.clock.now();
        let entries = self.lock();
        let mut keys: Vec<String> = entries
            .values
            .iter()
            .filter(|(_, (_, expires_at))| *expires_at > now)
            .map(|(k, _)| k.clone())
            .chain(
                entries
                    .sets
                    .iter()
                    .filter(|(_, (_, expires_at))| *expires_at > now)
                    .map(|(k, _)| k.clone()),
            )
            .collect();
        keys.sort();
        keys
    }

    /// Live keys in one namespace, e.g. `"refresh_token"` (for testing).
    #[must_use]
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let prefix = format!("{prefix}:");
        self.keys()
            .into_iter()
            .filter(|k| k.starts_with(&prefix))
            .collect()
    }

    /// Clear all entries (for testing).
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.values.clear();
        entries.sets.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(AuthError::TokenStoreError(
                "mock token store unavailable".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn check_budget(counter: &AtomicUsize, op: &str) -> Result<()> {
        let consumed = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if consumed {
            Err(AuthError::TokenStoreError(format!("mock token store {op} failed")))
        } else {
            Ok(())
        }
    }

    /// Lock and drop any expired entries before the caller looks.
    fn live_entries(&self) -> MutexGuard<'_, Entries> {
        let now = self.clock.now();
        let mut entries = self.lock();
        entries.values.retain(|_, (_, expires_at)| *expires_at > now);
        entries.sets.retain(|_, (_, expires_at)| *expires_at > now);
        entries
    }
}

impl Default for MockTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTokenStore")
            .field("entries", &self.lock())
            .finish_non_exhaustive()
    }
}

impl TokenStore for MockTokenStore {
    async fn put(&self, key: &TokenKey, value: &str, ttl: Duration) -> Result<()> {
        self.check_available()?;
        Self::check_budget(&self.failing_puts, "put")?;
        let expires_at = self.clock.now() + ttl;
        self.live_entries()
            .values
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn get(&self, key: &TokenKey) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self
            .live_entries()
            .values
            .get(&key.to_string())
            .map(|(value, _)| value.clone()))
    }

    async fn take(&self, key: &TokenKey) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self
            .live_entries()
            .values
            .remove(&key.to_string())
            .map(|(value, _)| value))
    }

    async fn delete(&self, key: &TokenKey) -> Result<()> {
        self.check_available()?;
        Self::check_budget(&self.failing_deletes, "delete")?;
        let key = key.to_string();
        let mut entries = self.live_entries();
        entries.values.remove(&key);
        entries.sets.remove(&key);
        Ok(())
    }

    async fn index_add(&self, index: &TokenKey, member: &str, ttl: Duration) -> Result<()> {
        self.check_available()?;
        let expires_at = self.clock.now() + ttl;
        let mut entries = self.live_entries();
        let (set, set_expires_at) = entries
            .sets
            .entry(index.to_string())
            .or_insert_with(|| (HashSet::new(), expires_at));
        set.insert(member.to_string());
        *set_expires_at = expires_at;
        Ok(())
    }

    async fn index_remove(&self, index: &TokenKey, member: &str) -> Result<()> {
        self.check_available()?;
        let key = index.to_string();
        let mut entries = self.live_entries();
        let now_empty = match entries.sets.get_mut(&key) {
            Some((set, _)) => {
                set.remove(member);
                set.is_empty()
            }
            None => false,
        };
        if now_empty {
            entries.sets.remove(&key);
        }
        Ok(())
    }

    async fn index_drain(&self, index: &TokenKey) -> Result<Vec<String>> {
        self.check_available()?;
        Ok(self
            .live_entries()
            .sets
            .remove(&index.to_string())
            .map(|(set, _)| set.into_iter().collect())
            .unwrap_or_default())
    }
}
