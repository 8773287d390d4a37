//! Stock facet implementations: [`Level`], [`TextMessage`], [`CodeOrigin`].

use crate::{Adjustment, Message, Origin, Severity, Structure};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The standard seven-step severity scale.
///
/// Ranks run from `Debug = 0` to `Fatal = 6`. Everything below
/// [`Level::Warning`] is nominal. `Fatal` is only a classification; nothing
/// in this crate aborts on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "config", derive(serde::Deserialize), serde(try_from = "String"))]
pub enum Level {
    /// Developer detail.
    Debug = 0,
    /// Configuration report.
    Config = 1,
    /// Routine information.
    Info = 2,
    /// Something unexpected but tolerated.
    Warning = 3,
    /// An operation failed.
    Error = 4,
    /// The program was used incorrectly.
    Misuse = 5,
    /// The program cannot continue.
    Fatal = 6,
}

/// Width of the longest level name (`WARNING`).
const LEVEL_WIDTH: usize = 7;

impl Level {
    /// All levels in rank order.
    pub const ALL: [Self; 7] = [
        Self::Debug,
        Self::Config,
        Self::Info,
        Self::Warning,
        Self::Error,
        Self::Misuse,
        Self::Fatal,
    ];

    /// Upper-case name of the level.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Config => "CONFIG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Misuse => "MISUSE",
            Self::Fatal => "FATAL",
        }
    }

    /// Look a level up by rank.
    #[must_use]
    pub fn from_rank(rank: i32) -> Option<Self> {
        usize::try_from(rank).ok().and_then(|i| Self::ALL.get(i).copied())
    }
}

impl Severity for Level {
    fn rank(&self) -> i32 {
        *self as i32
    }

    fn render(&self, adjustment: Adjustment) -> Cow<'static, str> {
        let name = self.name();
        match adjustment {
            Adjustment::None => Cow::Borrowed(name),
            Adjustment::Left => Cow::Owned(format!("{name:<width$}", width = LEVEL_WIDTH)),
            Adjustment::Right => Cow::Owned(format!("{name:>width$}", width = LEVEL_WIDTH)),
        }
    }

    fn is_nominal(&self) -> bool {
        *self < Self::Warning
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string does not name a [`Level`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown level \"{0}\"; expected one of DEBUG, CONFIG, INFO, WARNING, ERROR, MISUSE, FATAL")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

impl TryFrom<String> for Level {
    type Error = ParseLevelError;

    fn try_from(value: String) -> Result<Self, ParseLevelError> {
        value.parse()
    }
}

/// Plain text message with an optional structured payload.
#[derive(Clone, Default)]
pub struct TextMessage {
    lines: Vec<String>,
    details: Option<Arc<dyn Structure + Send + Sync>>,
}

impl TextMessage {
    /// A single-line message.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            details: None,
        }
    }

    /// A multi-line message.
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            details: None,
        }
    }

    /// Attach a structured payload (builder pattern).
    #[must_use]
    pub fn with_details(mut self, details: impl Structure + Send + Sync + 'static) -> Self {
        self.details = Some(Arc::new(details));
        self
    }
}

impl Message for TextMessage {
    fn lines(&self) -> Vec<String> {
        self.lines.clone()
    }

    fn details(&self) -> Option<&dyn Structure> {
        self.details.as_deref().map(|d| d as &dyn Structure)
    }
}

impl fmt::Debug for TextMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextMessage")
            .field("lines", &self.lines)
            .field("has_details", &self.details.is_some())
            .finish()
    }
}

/// Code location origin: `module.Type.function`, skipping empty parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeOrigin {
    /// Module or package.
    pub module: String,
    /// Type the code belongs to.
    pub type_name: String,
    /// Function or method.
    pub function: String,
}

impl CodeOrigin {
    /// Create an origin from its parts. Any part may be empty.
    #[must_use]
    pub fn new(
        module: impl Into<String>,
        type_name: impl Into<String>,
        function: impl Into<String>,
    ) -> Self {
        Self {
            module: module.into(),
            type_name: type_name.into(),
            function: function.into(),
        }
    }
}

impl Origin for CodeOrigin {
    fn describe(&self) -> Cow<'_, str> {
        let parts: Vec<&str> = [&self.module, &self.type_name, &self.function]
            .into_iter()
            .map(String::as_str)
            .filter(|part| !part.is_empty())
            .collect();
        match parts.as_slice() {
            [] => Cow::Borrowed(""),
            [only] => Cow::Borrowed(*only),
            _ => Cow::Owned(parts.join(".")),
        }
    }
}

impl Origin for String {
    fn describe(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}
