// Staleness evaluation: active/inactive classification and eviction
//
// All comparisons are between `DateTime<Utc>` values; the caller supplies `now`.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::store::{PositionEntry, PositionStore};

/// Derived activity state of an entry. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Active,
    Inactive,
}

/// Inactivity and removal ages. `None` disables the corresponding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub inactive_after: Option<Duration>,
    /// With `None`, entries are never evicted and the store only grows.
    pub remove_after: Option<Duration>,
}

impl Thresholds {
    /// Build from minute counts; a negative count disables that threshold.
    ///
    /// A count too large for `Duration` can never be reached and is treated
    /// as disabled.
    pub fn from_minutes(inactive: i64, removed: i64) -> Self {
        let minutes = |m: i64| (m >= 0).then(|| Duration::try_minutes(m)).flatten();
        Thresholds {
            inactive_after: minutes(inactive),
            remove_after: minutes(removed),
        }
    }

    pub fn classify(&self, entry: &PositionEntry, now: DateTime<Utc>) -> Activity {
        classify(entry, now, self.inactive_after)
    }

    pub fn evict(&self, store: &mut PositionStore, now: DateTime<Utc>) -> usize {
        evict(store, now, self.remove_after)
    }
}

/// `Inactive` once `timestamp + inactive_after` is strictly before `now`.
pub fn classify(entry: &PositionEntry, now: DateTime<Utc>, inactive_after: Option<Duration>) -> Activity {
    match inactive_after {
        Some(age) if expired(entry, now, age) => Activity::Inactive,
        _ => Activity::Active,
    }
}

/// Remove every entry whose `timestamp + remove_after` is strictly before `now`.
/// Returns the number of entries removed; always zero when removal is disabled.
pub fn evict(store: &mut PositionStore, now: DateTime<Utc>, remove_after: Option<Duration>) -> usize {
    let Some(age) = remove_after else {
        return 0;
    };
    store.retain(|entry| {
        let stale = expired(entry, now, age);
        if stale {
            debug!("Evicting {} (last heard {})", entry.source, entry.isotime);
        }
        !stale
    })
}

fn expired(entry: &PositionEntry, now: DateTime<Utc>, age: Duration) -> bool {
    // Overflow only happens for absurd timestamps; treat those as not expired.
    entry
        .timestamp
        .checked_add_signed(age)
        .map_or(false, |deadline| deadline < now)
}
