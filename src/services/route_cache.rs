//! In-memory cache of directions results.
//!
//! Endpoints are snapped to a 1e-4 degree grid (about 10 meters) so repeated
//! lookups for the same pair of stops hit the cache even when geocoding jitters.
//! Entries expire after a fixed TTL. Expired entries are evicted when read, by
//! a sweep that runs on insert at most once per [`SWEEP_INTERVAL_SECS`], and by
//! [`RouteCache::purge_expired`].

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::models::coordinate::Coordinate;
use crate::models::route::{RouteSegment, TravelMode};

pub const DEFAULT_TTL_SECS: u64 = 86400; // 24 hours

/// Minimum spacing between the expiry sweeps triggered by inserts.
pub const SWEEP_INTERVAL_SECS: i64 = 300;

const COORD_TOLERANCE: f64 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    mode: TravelMode,
    origin: (i64, i64),
    destination: (i64, i64),
}

impl CacheKey {
    fn new(mode: TravelMode, origin: &Coordinate, destination: &Coordinate) -> Self {
        Self {
            mode,
            origin: snap(origin),
            destination: snap(destination),
        }
    }
}

fn snap(coord: &Coordinate) -> (i64, i64) {
    (
        (coord.lat / COORD_TOLERANCE).round() as i64,
        (coord.lon / COORD_TOLERANCE).round() as i64,
    )
}

#[derive(Debug, Clone)]
struct CachedRoute {
    segment: RouteSegment,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
struct CacheState {
    entries: HashMap<CacheKey, CachedRoute>,
    next_sweep: DateTime<Utc>,
}

impl CacheState {
    fn purge(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, cached| cached.expires_at > now);
        before - self.entries.len()
    }
}

#[derive(Debug)]
pub struct RouteCache {
    state: Mutex<CacheState>,
    ttl: Duration,
}

/// `now + delta`, saturating at chrono's representable range.
fn saturating_add(now: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECS)
    }
}

impl RouteCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                next_sweep: DateTime::<Utc>::MIN_UTC,
            }),
            ttl: Duration::seconds(ttl_secs.min(i64::MAX as u64 / 1000) as i64),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(
        &self,
        mode: TravelMode,
        from: &Coordinate,
        to: &Coordinate,
    ) -> Option<RouteSegment> {
        self.get_at(mode, from, to, Utc::now())
    }

    pub fn get_at(
        &self,
        mode: TravelMode,
        from: &Coordinate,
        to: &Coordinate,
        now: DateTime<Utc>,
    ) -> Option<RouteSegment> {
        let key = CacheKey::new(mode, from, to);
        let mut state = self.state();

        match state.entries.get(&key) {
            Some(cached) if cached.expires_at > now => Some(cached.segment.clone()),
            Some(_) => {
                state.entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn insert(
        &self,
        mode: TravelMode,
        from: &Coordinate,
        to: &Coordinate,
        segment: RouteSegment,
    ) {
        self.insert_at(mode, from, to, segment, Utc::now());
    }

    pub fn insert_at(
        &self,
        mode: TravelMode,
        from: &Coordinate,
        to: &Coordinate,
        segment: RouteSegment,
        now: DateTime<Utc>,
    ) {
        let key = CacheKey::new(mode, from, to);
        let mut state = self.state();

        if now >= state.next_sweep {
            let removed = state.purge(now);
            if removed > 0 {
                log::debug!("Swept {} expired route cache entries", removed);
            }
            state.next_sweep = saturating_add(now, Duration::seconds(SWEEP_INTERVAL_SECS));
        }

        state.entries.insert(
            key,
            CachedRoute {
                segment,
                expires_at: saturating_add(now, self.ttl),
            },
        );
    }

    /// Drop expired entries, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    pub fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let removed = self.state().purge(now);
        if removed > 0 {
            log::debug!("Purged {} expired route cache entries", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
