//! Core types for log entries.
//!
//! This module provides:
//! - [`EntryType`] — The closed set of entry kinds
//! - [`Entry`] — One logged record (date, type, message, payload)
//! - [`EntryKey`] — Opaque per-entry disambiguator used for file names

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::LogbookError;

/// Kind of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    /// General information
    Info,
    /// A completed operation
    Success,
    /// Something worth attention
    Warning,
    /// A failure
    Error,
}

impl EntryType {
    /// All entry types, in declaration order.
    pub const ALL: [Self; 4] = [Self::Info, Self::Success, Self::Warning, Self::Error];

    /// Returns the stored representation of this type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = LogbookError;

    /// Parses a type name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                LogbookError::Validation(format!(
                    "unknown entry type '{s}' (expected one of INFO, SUCCESS, WARNING, ERROR)"
                ))
            })
    }
}

/// Opaque key that keeps per-entry file names unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey(String);

impl EntryKey {
    /// Generates a fresh random key.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wraps an existing key, rejecting anything that is not a non-empty
    /// ASCII alphanumeric string.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        (!raw.is_empty() && raw.bytes().all(|b| b.is_ascii_alphanumeric()))
            .then(|| Self(raw.to_string()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single log record.
///
/// Absent `message` and `payload` are never serialized, and fields the
/// store does not know about are carried through untouched in `extra`.
/// The [`EntryKey`] is a storage artifact: it is not part of the record
/// body and is ignored by equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    date: DateTime<Utc>,
    #[serde(rename = "type")]
    entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
    #[serde(skip, default = "EntryKey::generate")]
    key: EntryKey,
}

impl Entry {
    /// Creates a new entry with a fresh key.
    #[must_use]
    pub fn new(
        entry_type: EntryType,
        message: Option<Value>,
        payload: Option<Value>,
        date: DateTime<Utc>,
    ) -> Self {
        let mut entry = Self {
            date,
            entry_type,
            message,
            payload,
            extra: Map::new(),
            key: EntryKey::generate(),
        };
        entry.normalize();
        entry
    }

    /// Creates a new entry from a type name.
    ///
    /// # Errors
    ///
    /// Returns [`LogbookError::Validation`] if `type_name` is not one of the
    /// known entry types.
    pub fn with_type_name(
        type_name: &str,
        message: Option<Value>,
        payload: Option<Value>,
        date: DateTime<Utc>,
    ) -> Result<Self, LogbookError> {
        let entry_type = type_name.parse()?;
        Ok(Self::new(entry_type, message, payload, date))
    }

    /// When the entry was created.
    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// The entry's kind.
    #[must_use]
    pub const fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    /// The message, if one was given.
    #[must_use]
    pub const fn message(&self) -> Option<&Value> {
        self.message.as_ref()
    }

    /// The payload, if one was given.
    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Fields present in the stored record that the store does not model.
    #[must_use]
    pub const fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// The opaque per-entry key.
    #[must_use]
    pub const fn key(&self) -> &EntryKey {
        &self.key
    }

    pub(crate) fn set_key(&mut self, key: EntryKey) {
        self.key = key;
    }

    /// Strips every absent-valued field so that none is ever serialized.
    pub fn normalize(&mut self) {
        if self.message.as_ref().is_some_and(Value::is_null) {
            self.message = None;
        }
        if self.payload.as_ref().is_some_and(Value::is_null) {
            self.payload = None;
        }
        self.extra.retain(|_, v| !v.is_null());
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.date == other.date
            && self.entry_type == other.entry_type
            && self.message == other.message
            && self.payload == other.payload
            && self.extra == other.extra
    }
}
