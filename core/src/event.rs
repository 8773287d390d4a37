//! `Event` — The record that flows through a routing graph
//!
//! An event has four optional facets: severity, message, origin and
//! timestamp. An absent facet is a normal state, not an error; predicates
//! decide what absence means through their missing-result policy.
//!
//! The facets are capability traits ([`Severity`], [`Message`], [`Origin`]),
//! so callers can bring their own level scheme or message type. Stock
//! implementations live in [`crate::facets`].

use crate::Structure;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Padding applied when rendering a severity name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Deserialize), serde(rename_all = "snake_case"))]
pub enum Adjustment {
    /// No padding.
    #[default]
    None,
    /// Pad on the right (text is left-aligned).
    Left,
    /// Pad on the left (text is right-aligned).
    Right,
}

/// Severity facet capability.
pub trait Severity: Send + Sync + Debug {
    /// Numeric rank; larger is more severe.
    fn rank(&self) -> i32;

    /// Human-readable name, padded per `adjustment`.
    fn render(&self, adjustment: Adjustment) -> Cow<'static, str>;

    /// `true` for routine severities, `false` for abnormal ones.
    ///
    /// Text sinks use this to pick between their nominal and abnormal stream.
    fn is_nominal(&self) -> bool;
}

/// Message facet capability.
pub trait Message: Send + Sync + Debug {
    /// The text lines of this message. May be empty.
    fn lines(&self) -> Vec<String>;

    /// Optional structured payload attached to the message.
    fn details(&self) -> Option<&dyn Structure> {
        None
    }
}

/// Origin facet capability.
pub trait Origin: Send + Sync + Debug {
    /// Display string of the origin (e.g. `net.Conn.read`).
    fn describe(&self) -> Cow<'_, str>;
}

/// A log event.
///
/// Facets are reference-counted so an event can be cloned cheaply when a
/// front-end fills in defaults.
#[derive(Clone, Default)]
pub struct Event {
    severity: Option<Arc<dyn Severity>>,
    message: Option<Arc<dyn Message>>,
    origin: Option<Arc<dyn Origin>>,
    timestamp: Option<DateTime<Utc>>,
}

impl Event {
    /// An event with every facet absent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the severity facet (builder pattern).
    #[must_use]
    pub fn with_severity(mut self, severity: impl Severity + 'static) -> Self {
        self.severity = Some(Arc::new(severity));
        self
    }

    /// Set the message facet (builder pattern).
    #[must_use]
    pub fn with_message(mut self, message: impl Message + 'static) -> Self {
        self.message = Some(Arc::new(message));
        self
    }

    /// Set the origin facet (builder pattern).
    #[must_use]
    pub fn with_origin(mut self, origin: impl Origin + 'static) -> Self {
        self.origin = Some(Arc::new(origin));
        self
    }

    /// Set an already shared origin facet (builder pattern).
    #[must_use]
    pub fn with_shared_origin(mut self, origin: Arc<dyn Origin>) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Set the timestamp facet (builder pattern).
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// The severity facet, if present.
    #[must_use]
    pub fn severity(&self) -> Option<&(dyn Severity + 'static)> {
        self.severity.as_deref()
    }

    /// The message facet, if present.
    #[must_use]
    pub fn message(&self) -> Option<&(dyn Message + 'static)> {
        self.message.as_deref()
    }

    /// The origin facet, if present.
    #[must_use]
    pub fn origin(&self) -> Option<&(dyn Origin + 'static)> {
        self.origin.as_deref()
    }

    /// The timestamp facet, if present.
    #[must_use]
    pub fn timestamp(&self) -> Option<&DateTime<Utc>> {
        self.timestamp.as_ref()
    }

    /// Fill in the timestamp with the current time if it is unset.
    pub fn stamp(&mut self) {
        if self.timestamp.is_none() {
            self.timestamp = Some(Utc::now());
        }
    }

    /// Fill in the origin if it is unset.
    pub fn default_origin(&mut self, origin: &Arc<dyn Origin>) {
        if self.origin.is_none() {
            self.origin = Some(Arc::clone(origin));
        }
    }
}

impl Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("severity", &self.severity)
            .field("message", &self.message)
            .field("origin", &self.origin)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CodeOrigin, Level, TextMessage};
    use chrono::TimeZone;

    #[test]
    fn facets_absent_by_default() {
        let event = Event::new();
        assert!(event.severity().is_none());
        assert!(event.message().is_none());
        assert!(event.origin().is_none());
        assert!(event.timestamp().is_none());
    }

    #[test]
    fn builder_sets_facets() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let event = Event::new()
            .with_severity(Level::Error)
            .with_message(TextMessage::new("disk full"))
            .with_origin(CodeOrigin::new("store", "", "flush"))
            .with_timestamp(at);

        assert_eq!(event.severity().map(|s| s.rank()), Some(4));
        assert_eq!(event.message().unwrap().lines(), vec!["disk full".to_string()]);
        assert_eq!(event.origin().unwrap().describe(), "store.flush");
        assert_eq!(event.timestamp(), Some(&at));
    }

    #[test]
    fn stamp_keeps_existing_timestamp() {
        let at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut event = Event::new().with_timestamp(at);
        event.stamp();
        assert_eq!(event.timestamp(), Some(&at));

        let mut fresh = Event::new();
        let before = Utc::now();
        fresh.stamp();
        assert!(*fresh.timestamp().unwrap() >= before);
    }

    #[test]
    fn shared_origin_is_not_copied() {
        let origin: Arc<dyn Origin> = Arc::new(CodeOrigin::new("store", "", "flush"));
        let first = Event::new().with_shared_origin(Arc::clone(&origin));
        let second = Event::new().with_shared_origin(Arc::clone(&origin));

        assert_eq!(first.origin().unwrap().describe(), "store.flush");
        assert_eq!(Arc::strong_count(&origin), 3);
        drop((first, second));
        assert_eq!(Arc::strong_count(&origin), 1);
    }

    #[test]
    fn default_origin_only_fills_gaps() {
        let bound: Arc<dyn Origin> = Arc::new(CodeOrigin::new("bound", "", ""));
        let mut own = Event::new().with_origin(CodeOrigin::new("own", "", ""));
        own.default_origin(&bound);
        assert_eq!(own.origin().unwrap().describe(), "own");

        let mut bare = Event::new();
        bare.default_origin(&bound);
        assert_eq!(bare.origin().unwrap().describe(), "bound");
    }

    #[test]
    fn event_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Event>();
    }
}
