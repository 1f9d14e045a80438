//! Per-store named-channel publish/subscribe.
//!
//! Every [`LogStore`](crate::LogStore) owns one [`EventBus`]. Callbacks run
//! synchronously, in registration order, on the caller's thread. The first
//! callback that returns an error stops delivery and its error propagates
//! to whoever emitted the event.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::error::{LogbookError, Result, SubscriberError};
use crate::types::EntryType;

/// Named lifecycle channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// History was read from storage.
    Load,
    /// History was written to storage.
    Save,
    /// An INFO entry is being appended.
    Info,
    /// A SUCCESS entry is being appended.
    Success,
    /// A WARNING entry is being appended.
    Warning,
    /// An ERROR entry is being appended.
    Error,
    /// Stored history was unreadable and replaced by an empty one.
    Recovered,
}

impl Channel {
    /// Returns the channel's name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Save => "save",
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Recovered => "recovered",
        }
    }
}

impl From<EntryType> for Channel {
    fn from(entry_type: EntryType) -> Self {
        match entry_type {
            EntryType::Info => Self::Info,
            EntryType::Success => Self::Success,
            EntryType::Warning => Self::Warning,
            EntryType::Error => Self::Error,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    /// History was loaded.
    Loaded {
        /// Number of entries now in memory.
        count: usize,
    },
    /// History was saved.
    Saved {
        /// Number of entries written after retention.
        count: usize,
    },
    /// An entry is being appended.
    Appended {
        /// The entry's type; selects the channel.
        entry_type: EntryType,
        /// The entry's message.
        message: Option<Value>,
        /// The entry's payload.
        payload: Option<Value>,
    },
    /// A read was abandoned and treated as empty history.
    Recovered {
        /// Why the read failed.
        reason: String,
    },
}

impl LogEvent {
    /// The channel this event is published on.
    #[must_use]
    pub fn channel(&self) -> Channel {
        match self {
            Self::Loaded { .. } => Channel::Load,
            Self::Saved { .. } => Channel::Save,
            Self::Appended { entry_type, .. } => Channel::from(*entry_type),
            Self::Recovered { .. } => Channel::Recovered,
        }
    }
}

/// Handle identifying one registered callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscriber callback.
pub type Callback = Box<dyn FnMut(&LogEvent) -> std::result::Result<(), SubscriberError> + Send>;

/// Mapping from channel to its ordered callbacks.
#[derive(Default)]
pub struct EventBus {
    channels: HashMap<Channel, Vec<(SubscriptionId, Callback)>>,
    next_id: u64,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` on `channel`.
    pub fn on<F>(&mut self, channel: Channel, callback: F) -> SubscriptionId
    where
        F: FnMut(&LogEvent) -> std::result::Result<(), SubscriberError> + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.channels
            .entry(channel)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Removes a callback. Returns false if it was not registered on
    /// `channel`.
    pub fn off(&mut self, channel: Channel, id: SubscriptionId) -> bool {
        let Some(callbacks) = self.channels.get_mut(&channel) else {
            return false;
        };
        let Some(index) = callbacks.iter().position(|(sub, _)| *sub == id) else {
            return false;
        };
        callbacks.remove(index);
        true
    }

    /// Delivers `event` to every callback on its channel.
    ///
    /// # Errors
    ///
    /// Returns [`LogbookError::Subscriber`] from the first failing callback;
    /// later callbacks are not run.
    pub fn emit(&mut self, event: &LogEvent) -> Result<()> {
        let channel = event.channel();
        let Some(callbacks) = self.channels.get_mut(&channel) else {
            return Ok(());
        };

        for (_, callback) in callbacks.iter_mut() {
            callback(event).map_err(|source| LogbookError::Subscriber {
                channel: channel.as_str(),
                source,
            })?;
        }
        Ok(())
    }

    /// Number of callbacks registered on `channel`.
    #[must_use]
    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.channels.get(&channel).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .channels
            .iter()
            .map(|(channel, callbacks)| (channel.as_str(), callbacks.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("subscribers", &counts)
            .finish_non_exhaustive()
    }
}
