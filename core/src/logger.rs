//! `Logger` — Convenience front-end over a routing graph
//!
//! Binds a graph, an entry node and optionally an origin, and turns
//! `info("...")`-style calls into events.

use crate::{Event, Level, Message, NodeHandle, Origin, RouteGraph, Severity, Structure, TextMessage};
use std::fmt;
use std::sync::Arc;

/// Entry point that builds events and dispatches them into a graph.
///
/// The bound origin and the current time fill in events that lack them.
///
/// ```
/// use logroute::{CodeOrigin, Logger, RouteGraph, TextSink};
/// use std::sync::Arc;
///
/// let mut graph = RouteGraph::new();
/// let console = graph.insert_sink(TextSink::stdio());
/// let log = Logger::new(Arc::new(graph), console)
///     .bound_to(CodeOrigin::new("app", "", "main"));
///
/// log.info("started");
/// log.warn("config file missing, using defaults");
/// ```
#[derive(Clone)]
pub struct Logger {
    graph: Arc<RouteGraph>,
    root: NodeHandle,
    origin: Option<Arc<dyn Origin>>,
}

impl Logger {
    /// A logger dispatching into `graph` at `root`.
    #[must_use]
    pub fn new(graph: Arc<RouteGraph>, root: NodeHandle) -> Self {
        Self {
            graph,
            root,
            origin: None,
        }
    }

    /// Bind an origin for events that carry none (builder pattern).
    #[must_use]
    pub fn bound_to(mut self, origin: impl Origin + 'static) -> Self {
        self.origin = Some(Arc::new(origin));
        self
    }

    /// The graph events go to.
    #[must_use]
    pub fn graph(&self) -> &Arc<RouteGraph> {
        &self.graph
    }

    /// The node events enter at.
    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Dispatch a prepared event.
    pub fn log_event(&self, mut event: Event) {
        if let Some(origin) = &self.origin {
            event.default_origin(origin);
        }
        self.graph.dispatch(self.root, event);
    }

    /// Dispatch `message` at `severity`.
    pub fn log(&self, severity: impl Severity + 'static, message: impl Message + 'static) {
        self.log_event(Event::new().with_severity(severity).with_message(message));
    }

    /// Dispatch a one-line text message at `severity`.
    pub fn log_text(&self, severity: impl Severity + 'static, text: impl Into<String>) {
        self.log(severity, TextMessage::new(text));
    }

    /// Dispatch a text message with a structured payload at `severity`.
    pub fn log_details(
        &self,
        severity: impl Severity + 'static,
        details: impl Structure + Send + Sync + 'static,
        text: impl Into<String>,
    ) {
        self.log(severity, TextMessage::new(text).with_details(details));
    }

    /// [`Level::Debug`] text.
    pub fn debug(&self, text: impl Into<String>) {
        self.log_text(Level::Debug, text);
    }

    /// [`Level::Config`] text.
    pub fn config(&self, text: impl Into<String>) {
        self.log_text(Level::Config, text);
    }

    /// [`Level::Info`] text.
    pub fn info(&self, text: impl Into<String>) {
        self.log_text(Level::Info, text);
    }

    /// [`Level::Warning`] text.
    pub fn warn(&self, text: impl Into<String>) {
        self.log_text(Level::Warning, text);
    }

    /// [`Level::Error`] text.
    pub fn error(&self, text: impl Into<String>) {
        self.log_text(Level::Error, text);
    }

    /// [`Level::Misuse`] text.
    pub fn misuse(&self, text: impl Into<String>) {
        self.log_text(Level::Misuse, text);
    }

    /// [`Level::Fatal`] text. Classification only; execution continues.
    pub fn fatal(&self, text: impl Into<String>) {
        self.log_text(Level::Fatal, text);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("root", &self.root)
            .field("origin", &self.origin.as_ref().map(|o| o.describe().into_owned()))
            .finish_non_exhaustive()
    }
}
