//! Sinks — Leaf nodes that write events somewhere
//!
//! [`Sink`] is the boundary to output adapters. The routing layer only needs
//! `dispatch` and `close`; failures come back as [`SinkError`] and are logged
//! by the graph, never propagated to the caller of a dispatch.

use crate::{Event, MessageLines, TextFormatter};
use parking_lot::Mutex;
use std::fmt::{self, Debug};
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Errors raised by leaf sinks.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Writing to the underlying stream failed.
    #[error("sink I/O failed: {0}")]
    Io(#[from] io::Error),
    /// The sink was already closed.
    #[error("sink is closed")]
    Closed,
    /// The sink refused the event.
    #[error("sink rejected event: {reason}")]
    Rejected {
        /// Why the event was refused.
        reason: String,
    },
}

/// A leaf of the routing graph.
///
/// # Thread Safety
///
/// `dispatch` and `close` may be called concurrently from several threads.
/// Sinks that do I/O serialize their own writes.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a routing sink",
    note = "implement `logroute::Sink` (dispatch + optional close) for it"
)]
pub trait Sink: Send + Sync + Debug {
    /// Write one event.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the event could not be written.
    fn dispatch(&self, event: &Event) -> Result<(), SinkError>;

    /// Release resources. Called at most once per [`close`](crate::RouteGraph::close).
    ///
    /// # Errors
    ///
    /// Returns `Err` if flushing or closing failed.
    fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<T: Sink + ?Sized> Sink for Box<T> {
    fn dispatch(&self, event: &Event) -> Result<(), SinkError> {
        (**self).dispatch(event)
    }

    fn close(&self) -> Result<(), SinkError> {
        (**self).close()
    }
}

impl<T: Sink + ?Sized> Sink for std::sync::Arc<T> {
    fn dispatch(&self, event: &Event) -> Result<(), SinkError> {
        (**self).dispatch(event)
    }

    fn close(&self) -> Result<(), SinkError> {
        (**self).close()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TextSink
// ═══════════════════════════════════════════════════════════════════════════════

type Stream = Box<dyn Write + Send>;

struct Streams {
    nominal: Option<Stream>,
    abnormal: Option<Stream>,
    closed: bool,
}

impl Streams {
    /// The stream for an event, falling back to the other one.
    fn pick(&mut self, nominal: bool) -> Option<&mut Stream> {
        let (preferred, fallback) = if nominal {
            (&mut self.nominal, &mut self.abnormal)
        } else {
            (&mut self.abnormal, &mut self.nominal)
        };
        match preferred {
            Some(stream) => Some(stream),
            None => fallback.as_mut(),
        }
    }
}

/// Sink that renders events to text lines.
///
/// Events without a message are ignored, as are events the formatter turns
/// into no lines. Nominal events (or events without severity) go to the
/// nominal stream, the rest to the abnormal stream; if one stream is missing
/// the other is used. All lines of one event are written under one lock, so
/// concurrent events never interleave.
///
/// ```
/// use logroute::{Event, Level, Sink, TextMessage, TextSink};
/// use std::io::Write;
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Clone, Default)]
/// struct Shared(Arc<Mutex<Vec<u8>>>);
///
/// impl Write for Shared {
///     fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
///         self.0.lock().unwrap().write(buf)
///     }
///     fn flush(&mut self) -> std::io::Result<()> {
///         Ok(())
///     }
/// }
///
/// let out = Shared::default();
/// let sink = TextSink::new(out.clone());
/// let event = Event::new()
///     .with_severity(Level::Info)
///     .with_message(TextMessage::from_lines(["one", "two"]));
/// sink.dispatch(&event).unwrap();
/// assert_eq!(out.0.lock().unwrap().as_slice(), b"one\ntwo\n");
/// ```
pub struct TextSink {
    streams: Mutex<Streams>,
    formatter: Box<dyn TextFormatter>,
}

impl TextSink {
    /// A sink writing every event to `out`.
    #[must_use]
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self::from_streams(Some(Box::new(out)), None)
    }

    /// A sink with separate nominal and abnormal streams.
    #[must_use]
    pub fn split(
        nominal: impl Write + Send + 'static,
        abnormal: impl Write + Send + 'static,
    ) -> Self {
        Self::from_streams(Some(Box::new(nominal)), Some(Box::new(abnormal)))
    }

    /// Nominal events to stdout, abnormal ones to stderr.
    #[must_use]
    pub fn stdio() -> Self {
        Self::split(io::stdout(), io::stderr())
    }

    /// Append every event to the file at `path`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Io`] if the file cannot be opened.
    pub fn file(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }

    fn from_streams(nominal: Option<Stream>, abnormal: Option<Stream>) -> Self {
        Self {
            streams: Mutex::new(Streams {
                nominal,
                abnormal,
                closed: false,
            }),
            formatter: Box::new(MessageLines),
        }
    }

    /// Replace the formatter (builder pattern). Defaults to [`MessageLines`].
    #[must_use]
    pub fn with_formatter(mut self, formatter: impl TextFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }
}

impl Sink for TextSink {
    fn dispatch(&self, event: &Event) -> Result<(), SinkError> {
        if event.message().is_none() {
            return Ok(());
        }
        let lines = self.formatter.format(event);
        if lines.is_empty() {
            return Ok(());
        }
        let nominal = event.severity().map_or(true, |s| s.is_nominal());

        let mut streams = self.streams.lock();
        if streams.closed {
            return Err(SinkError::Closed);
        }
        let Some(out) = streams.pick(nominal) else {
            return Ok(());
        };
        for line in &lines {
            writeln!(out, "{line}")?;
        }
        out.flush()?;
        Ok(())
    }

    fn close(&self) -> Result<(), SinkError> {
        let mut streams = self.streams.lock();
        streams.closed = true;
        let nominal = streams.nominal.take();
        let abnormal = streams.abnormal.take();
        drop(streams);

        // Every stream is flushed; the first failure is the one reported.
        let mut failure = None;
        for mut stream in [nominal, abnormal].into_iter().flatten() {
            if let Err(error) = stream.flush() {
                failure.get_or_insert(error);
            }
        }
        failure.map_or(Ok(()), |error| Err(error.into()))
    }
}

impl Debug for TextSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("TextSink");
        if let Some(streams) = self.streams.try_lock() {
            out.field("nominal", &streams.nominal.is_some())
                .field("abnormal", &streams.abnormal.is_some())
                .field("closed", &streams.closed);
        }
        out.field("formatter", &self.formatter).finish()
    }
}
