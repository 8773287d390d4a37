//! logroute-test: Recording sinks and conformance fixtures
//!
//! [`RecordingSink`] writes its name into a shared [`Journal`] for every
//! event it receives, so a test can assert which sinks an event reached and
//! in what order. With the `fixtures` feature, [`fixture`] runs YAML
//! route definitions against such sinks.
//!
//! # Example
//!
//! ```
//! use logroute::{Event, Level, RouteGraph, Rule, SeverityOrder};
//! use logroute_test::prelude::*;
//!
//! let journal = Journal::new();
//! let mut graph = RouteGraph::new();
//! let alerts = graph.insert_sink(journal.sink("alerts"));
//! let console = graph.insert_sink(journal.sink("console"));
//! let root = graph.insert_dispatch([
//!     Rule::to(alerts).when(SeverityOrder::at_least(Level::Error)),
//!     Rule::to(console),
//! ]);
//!
//! graph.route(root, &Event::new().with_severity(Level::Info));
//! assert_eq!(journal.take(), vec!["console"]);
//! ```

use logroute::{Adjustment, Event, Severity, Sink, SinkError};
use parking_lot::Mutex;
use std::borrow::Cow;
use std::sync::Arc;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Shared, ordered record of sink deliveries.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink named `name` that records into this journal.
    #[must_use]
    pub fn sink(&self, name: impl Into<String>) -> RecordingSink {
        RecordingSink {
            name: name.into(),
            journal: self.clone(),
        }
    }

    /// Append an entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    /// Copy of the entries so far.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Drain the entries.
    #[must_use]
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.lock())
    }
}

/// Sink that records its name on every dispatch and `close:<name>` on close.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    name: String,
    journal: Journal,
}

impl RecordingSink {
    /// Name written into the journal.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Sink for RecordingSink {
    fn dispatch(&self, _event: &Event) -> Result<(), SinkError> {
        self.journal.record(self.name.as_str());
        Ok(())
    }

    fn close(&self) -> Result<(), SinkError> {
        self.journal.record(format!("close:{}", self.name));
        Ok(())
    }
}

/// Severity given only by its rank, for ranks outside [`logroute::Level`].
///
/// Renders as `RANK<n>`; ranks below 3 are nominal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank(pub i32);

impl Severity for Rank {
    fn rank(&self) -> i32 {
        self.0
    }

    fn render(&self, _adjustment: Adjustment) -> Cow<'static, str> {
        Cow::Owned(format!("RANK{}", self.0))
    }

    fn is_nominal(&self) -> bool {
        self.0 < 3
    }
}

/// Common imports for tests.
pub mod prelude {
    pub use crate::{Journal, Rank, RecordingSink};

    #[cfg(feature = "fixtures")]
    pub use crate::fixture::Fixture;
}

#[cfg(test)]
mod tests {
    use super::*;
    use logroute::{Level, Predicate, RouteGraph, Rule, SeverityOrder};

    #[test]
    fn journal_records_in_order() {
        let journal = Journal::new();
        let mut graph = RouteGraph::new();
        let a = graph.insert_sink(journal.sink("a"));
        let b = graph.insert_sink(journal.sink("b"));
        let root = graph.insert_broadcast([b, a, b]);

        graph.route(root, &Event::new());
        assert_eq!(journal.entries(), vec!["b", "a", "b"]);
        assert_eq!(journal.take(), vec!["b", "a", "b"]);
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn close_is_recorded_once() {
        let journal = Journal::new();
        let mut graph = RouteGraph::new();
        let a = graph.insert_sink(journal.sink("a"));
        let root = graph.insert_broadcast([a, a]);

        assert_eq!(graph.close(root), 1);
        assert_eq!(journal.take(), vec!["close:a"]);
    }

    #[test]
    fn rank_compares_against_levels() {
        let journal = Journal::new();
        let mut graph = RouteGraph::new();
        let high = graph.insert_sink(journal.sink("high"));
        let root = graph.insert_dispatch([
            Rule::to(high)
                .when(SeverityOrder::at_least(Level::Fatal))
                .continue_when(Predicate::False),
        ]);

        graph.route(root, &Event::new().with_severity(Rank(100)));
        graph.route(root, &Event::new().with_severity(Rank(5)));
        assert_eq!(journal.take(), vec!["high"]);
        assert_eq!(Rank(7).render(Adjustment::Left), "RANK7");
        assert!(Rank(2).is_nominal());
    }
}
