//! Age- and count-based retention.
//!
//! [`RetentionPolicy::prune`] is a pure function of the entries, the policy
//! bounds, and the caller's notion of "now". The store applies it before
//! every write.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::Entry;

/// Retention rules for a log store. Both bounds default to unbounded, and
/// a zero bound also means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPolicy {
    /// Entries older than this are dropped.
    #[serde(
        default,
        with = "duration_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_age: Option<Duration>,
    /// At most this many of the newest entries are kept.
    #[serde(
        default,
        deserialize_with = "zero_as_unbounded",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_entries: Option<usize>,
}

impl RetentionPolicy {
    /// A policy that keeps everything.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_age: None,
            max_entries: None,
        }
    }

    /// A policy bounded only by age.
    #[must_use]
    pub const fn with_max_age(max_age: Duration) -> Self {
        Self::unbounded().max_age(max_age)
    }

    /// A policy bounded only by count.
    #[must_use]
    pub const fn with_max_entries(max_entries: usize) -> Self {
        Self::unbounded().max_entries(max_entries)
    }

    /// Sets the age bound. Zero removes it.
    #[must_use]
    pub const fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self.normalized()
    }

    /// Sets the count bound. Zero removes it.
    #[must_use]
    pub const fn max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self.normalized()
    }

    /// Replaces zero bounds with no bound.
    #[must_use]
    pub const fn normalized(self) -> Self {
        Self {
            max_age: match self.max_age {
                Some(max_age) if max_age.is_zero() => None,
                other => other,
            },
            max_entries: match self.max_entries {
                Some(0) => None,
                other => other,
            },
        }
    }

    /// Returns true if an entry dated `date` is older than `max_age` at `now`.
    ///
    /// An entry whose age equals `max_age` exactly is not expired.
    #[must_use]
    pub fn is_expired(&self, date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let Some(max_age) = self.normalized().max_age else {
            return false;
        };
        // An age bound too large for chrono never expires anything.
        let Ok(max_age) = chrono::Duration::from_std(max_age) else {
            return false;
        };
        now.signed_duration_since(date) > max_age
    }

    /// Applies the age filter, then the count filter, keeping relative order.
    #[must_use]
    pub fn prune(&self, mut entries: Vec<Entry>, now: DateTime<Utc>) -> Vec<Entry> {
        let policy = self.normalized();
        if policy.max_age.is_some() {
            entries.retain(|entry| !policy.is_expired(entry.date(), now));
        }

        if let Some(max_entries) = policy.max_entries {
            if entries.len() > max_entries {
                entries = entries.split_off(entries.len() - max_entries);
            }
        }

        entries
    }
}

fn zero_as_unbounded<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    Ok(Option::<usize>::deserialize(deserializer)?.filter(|n| *n > 0))
}

/// Serializes `Option<Duration>` as whole milliseconds; zero reads as no
/// bound.
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis))
    }
}
