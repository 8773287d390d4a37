//! Text formatting — Turning events into lines
//!
//! A [`TextFormatter`] maps an event to zero or more lines; zero lines means
//! "write nothing". A [`StructFormatter`] renders a structured payload to a
//! single string and is what formatters fall back on for message details.

use crate::{Adjustment, Event, Structure, TextStructSink};
use std::fmt::{Debug, Write};

/// Event-to-lines rendering used by [`TextSink`](crate::TextSink).
pub trait TextFormatter: Send + Sync + Debug {
    /// Render `event`. An empty result suppresses output.
    fn format(&self, event: &Event) -> Vec<String>;
}

/// Structured-value rendering.
pub trait StructFormatter: Send + Sync + Debug {
    /// Render `value` to one string.
    fn render(&self, value: &dyn Structure) -> String;
}

/// The message's own lines, nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageLines;

impl TextFormatter for MessageLines {
    fn format(&self, event: &Event) -> Vec<String> {
        event.message().map(|m| m.lines()).unwrap_or_default()
    }
}

/// Renders through a [`TextStructSink`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TextStructFormatter {
    /// Keep `{}`/`[]` around the outermost container.
    pub keep_outermost_brackets: bool,
}

impl StructFormatter for TextStructFormatter {
    fn render(&self, value: &dyn Structure) -> String {
        let mut sink = TextStructSink::with_outermost_brackets(self.keep_outermost_brackets);
        value.put_struct(&mut sink);
        sink.finish()
    }
}

/// How lines after the first are prefixed by [`SummaryFormatter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Continuation {
    /// Repeat the full prefix on every line.
    Repeat,
    /// Indent with as many spaces as the prefix is wide.
    #[default]
    Indent,
    /// No prefix after the first line.
    Bare,
}

/// `timestamp LEVEL [origin] text` lines, with details as an extra line.
///
/// Absent facets drop their piece of the prefix. If the event renders no
/// lines at all, nothing is written.
///
/// ```
/// use logroute::{CodeOrigin, Event, Level, SummaryFormatter, TextFormatter, TextMessage};
///
/// let formatter = SummaryFormatter::new().without_timestamp();
/// let event = Event::new()
///     .with_severity(Level::Info)
///     .with_origin(CodeOrigin::new("net", "Conn", "read"))
///     .with_message(TextMessage::from_lines(["short read", "retrying"]));
///
/// assert_eq!(
///     formatter.format(&event),
///     vec![
///         "INFO    [net.Conn.read] short read".to_string(),
///         "                        retrying".to_string(),
///     ],
/// );
/// ```
#[derive(Debug)]
pub struct SummaryFormatter {
    timestamp_format: Option<String>,
    adjustment: Adjustment,
    show_origin: bool,
    continuation: Continuation,
    details: Option<Box<dyn StructFormatter>>,
}

/// `2006-01-02 15:04:05` style.
const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl Default for SummaryFormatter {
    fn default() -> Self {
        Self {
            timestamp_format: Some(DEFAULT_TIMESTAMP_FORMAT.to_string()),
            adjustment: Adjustment::Left,
            show_origin: true,
            continuation: Continuation::default(),
            details: Some(Box::new(TextStructFormatter::default())),
        }
    }
}

impl SummaryFormatter {
    /// Timestamp, left-aligned level, origin and details, indented continuation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a `chrono` strftime pattern for the timestamp.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = Some(format.into());
        self
    }

    /// Leave the timestamp out.
    #[must_use]
    pub fn without_timestamp(mut self) -> Self {
        self.timestamp_format = None;
        self
    }

    /// Padding of the level name.
    #[must_use]
    pub fn with_adjustment(mut self, adjustment: Adjustment) -> Self {
        self.adjustment = adjustment;
        self
    }

    /// Whether to print the origin.
    #[must_use]
    pub fn with_origin(mut self, show: bool) -> Self {
        self.show_origin = show;
        self
    }

    /// Prefix policy for continuation lines.
    #[must_use]
    pub fn with_continuation(mut self, continuation: Continuation) -> Self {
        self.continuation = continuation;
        self
    }

    /// Render message details with `formatter`.
    #[must_use]
    pub fn with_details(mut self, formatter: impl StructFormatter + 'static) -> Self {
        self.details = Some(Box::new(formatter));
        self
    }

    /// Leave message details out.
    #[must_use]
    pub fn without_details(mut self) -> Self {
        self.details = None;
        self
    }

    fn prefix(&self, event: &Event) -> String {
        let mut prefix = String::new();
        if let (Some(format), Some(at)) = (&self.timestamp_format, event.timestamp()) {
            // An invalid pattern yields an empty timestamp, not a panic.
            let mark = prefix.len();
            if write!(prefix, "{} ", at.format(format)).is_err() {
                prefix.truncate(mark);
            }
        }
        if let Some(severity) = event.severity() {
            prefix.push_str(&severity.render(self.adjustment));
            prefix.push(' ');
        }
        if self.show_origin {
            if let Some(origin) = event.origin() {
                let origin = origin.describe();
                if !origin.is_empty() {
                    let _ = write!(prefix, "[{origin}] ");
                }
            }
        }
        prefix
    }
}

impl TextFormatter for SummaryFormatter {
    fn format(&self, event: &Event) -> Vec<String> {
        let Some(message) = event.message() else {
            return Vec::new();
        };
        let mut lines = message.lines();
        if let (Some(formatter), Some(details)) = (&self.details, message.details()) {
            let rendered = formatter.render(details);
            if !rendered.is_empty() {
                lines.push(rendered);
            }
        }
        if lines.is_empty() {
            return lines;
        }

        let first = self.prefix(event);
        if first.is_empty() {
            return lines;
        }
        let rest = match self.continuation {
            Continuation::Repeat => first.clone(),
            Continuation::Indent => " ".repeat(first.chars().count()),
            Continuation::Bare => String::new(),
        };
        for (index, line) in lines.iter_mut().enumerate() {
            let prefix = if index == 0 { &first } else { &rest };
            line.insert_str(0, prefix);
        }
        lines
    }
}
