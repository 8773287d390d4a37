//! logroute - Structured log event routing
//!
//! Decides, for each log event, which sinks receive it and in what textual
//! shape. The routing layer is synchronous and side-effect free apart from
//! what the leaf sinks do.
//!
//! # Architecture
//!
//! - [`Event`] — Four optional facets: severity, message, origin, timestamp
//! - [`Predicate<S>`] — Boolean algebra (All/Any/None/True/False) over a subject
//! - [`FacetPredicate`] — Lifts a facet predicate to events with a missing-result policy
//! - [`RouteGraph`] — Arena of routing nodes (broadcast, rule dispatch, null, sink)
//! - [`walk`](RouteGraph::walk) — Cycle-safe traversal reporting enter/leave/skip
//! - [`TextStructSink`] — Renders pushed structured values, tracked by a [`NestingStack`]
//!
//! # Key Design Insights
//!
//! 1. **Absence is data**: absent facets, predicates, rules and children are
//!    handled by policy, never by errors.
//!
//! 2. **Handles, not pointers**: nodes live in an arena and refer to children
//!    by [`NodeHandle`], so shared and cyclic graphs need no reference cycles.
//!
//! 3. **Sinks fail alone**: a failing sink is logged through `tracing` and the
//!    remaining children and rules still run.
//!
//! # Example
//!
//! ```
//! use logroute::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct Counter(std::sync::atomic::AtomicUsize);
//!
//! impl Sink for Counter {
//!     fn dispatch(&self, _event: &Event) -> Result<(), SinkError> {
//!         self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
//!         Ok(())
//!     }
//! }
//!
//! let mut graph = RouteGraph::new();
//! let errors = graph.insert_sink(Counter::default());
//! let everything = graph.insert_sink(Counter::default());
//! let root = graph.insert_dispatch([
//!     Rule::to(errors)
//!         .when(SeverityOrder::at_least(Level::Error))
//!         .continue_when(Predicate::True),
//!     Rule::to(everything),
//! ]);
//!
//! graph.dispatch(root, Event::new().with_severity(Level::Fatal));
//! graph.dispatch(root, Event::new().with_severity(Level::Info));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod event;
mod facet_predicate;
mod facets;
mod format;
mod graph;
mod identity;
mod logger;
mod nesting_stack;
mod node;
mod predicate;
mod sink;
mod string_match;
mod structure;
mod walk;

#[cfg(feature = "config")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Events and facets
pub use event::{Adjustment, Event, Message, Origin, Severity};
pub use facets::{CodeOrigin, Level, ParseLevelError, TextMessage};

// Predicates
pub use facet_predicate::{
    Facet, FacetPredicate, MessageFacet, MessageMatch, MessagePredicate, OrderRelation,
    OriginFacet, OriginMatch, OriginPredicate, SeverityFacet, SeverityOrder, SeverityPredicate,
    TimeWindow, TimestampFacet, TimestampPredicate,
};
pub use predicate::{Predicate, SubjectPredicate};
pub use string_match::StringMatcher;

// Routing
pub use graph::RouteGraph;
pub use identity::{Identity, IdentityAllocator};
pub use logger::Logger;
pub use node::{Broadcast, Node, NodeHandle, NodeKind, Rule, RuleDispatch};
pub use sink::{Sink, SinkError, TextSink};
pub use walk::{Outline, RouteVisitor, WalkControl, WalkStep};

// Rendering
pub use format::{
    Continuation, MessageLines, StructFormatter, SummaryFormatter, TextFormatter,
    TextStructFormatter,
};
pub use nesting_stack::NestingStack;
pub use structure::{StructSink, Structure, TextStructSink};

// Config (feature-gated)
#[cfg(feature = "config")]
pub use config::{NodeConfig, PredicateConfig, RouteConfig, RuleConfig, StringMatcherConfig};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use logroute::prelude::*;
/// ```
pub mod prelude {
    // Events
    pub use crate::{CodeOrigin, Event, Level, Message, Origin, Severity, TextMessage};

    // Predicates
    pub use crate::{Predicate, SeverityOrder, SubjectPredicate};

    // Routing
    pub use crate::{
        Logger, NodeHandle, RouteError, RouteGraph, RouteVisitor, Rule, Sink, SinkError,
        TextSink, WalkControl, WalkStep,
    };

    // Rendering
    pub use crate::{StructSink, Structure, TextStructSink};
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// How many times one node may appear on a single dispatch path.
///
/// Routing graphs may contain cycles. A dispatch that would enter a node a
/// further time along the same branch stops there and logs a warning instead
/// of recursing forever. Depth alone is never limited.
pub const MAX_REENTRY: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from graph construction and config loading.
///
/// Routing itself never fails: these surface only while a graph is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// A handle does not address a node of this graph.
    #[error("node handle {handle} does not exist in this graph")]
    UnknownNode {
        /// The offending handle.
        handle: NodeHandle,
    },
    /// The node cannot hold what was being added to it.
    #[error("node {handle} is a {kind} node and cannot take {wanted}")]
    WrongNodeKind {
        /// The node being modified.
        handle: NodeHandle,
        /// Its kind.
        kind: &'static str,
        /// What was being added (`"children"` or `"rules"`).
        wanted: &'static str,
    },
    /// A config refers to a name that is neither a node nor a sink.
    #[error("route config references unknown node \"{name}\"")]
    UnknownReference {
        /// The unresolved name.
        name: String,
    },
    /// A config node shares its name with another node or sink.
    #[error("route config defines \"{name}\" twice")]
    DuplicateName {
        /// The duplicated name.
        name: String,
    },
    /// A severity predicate config has neither `threshold` nor `level`.
    #[error("severity predicate needs either `threshold` or `level`")]
    MissingThreshold,
    /// A level name did not parse.
    #[error(transparent)]
    UnknownLevel(#[from] ParseLevelError),
    /// A regex did not compile.
    #[error("invalid pattern \"{pattern}\": {reason}")]
    InvalidPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// The compiler's message.
        reason: String,
    },
    /// The config document is malformed.
    #[error("invalid route config: {reason}")]
    InvalidConfig {
        /// The deserializer's message.
        reason: String,
    },
}
