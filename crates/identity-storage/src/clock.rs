//! Timestamp source for stores.

use std::sync::Mutex;

use chrono::{DateTime, Duration, SubsecRound, Utc};

/// Stores keep timestamps to the microsecond. Anything finer is dropped.
pub fn to_stored_precision(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

/// Hands out strictly increasing microsecond-precision timestamps.
///
/// Stores stamp `created_at` from this so contacts created in sequence by one
/// process never share a timestamp. Cross-process ties are still possible and
/// are settled by id.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> DateTime<Utc> {
        let wall = to_stored_precision(Utc::now());
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = match *last {
            Some(prev) if wall <= prev => prev + Duration::microseconds(1),
            _ => wall,
        };
        *last = Some(next);
        next
    }
}
