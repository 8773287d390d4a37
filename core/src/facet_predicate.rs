//! Facet predicates — Lifting facet decisions to whole events
//!
//! A [`FacetPredicate`] extracts one facet from an [`Event`] and hands it to
//! an inner [`Predicate`] over that facet's type. When the facet is absent,
//! or no inner predicate is configured, it answers with its
//! `missing_result` instead.
//!
//! Leaf predicates over facets:
//!
//! - [`SeverityOrder`] — numeric rank against a threshold
//! - [`MessageMatch`] — any message line matches a [`StringMatcher`]
//! - [`OriginMatch`] — origin display string matches a [`StringMatcher`]
//! - [`TimeWindow`] — timestamp within inclusive bounds

use crate::{Event, Message, Origin, Predicate, Severity, StringMatcher, SubjectPredicate};
use chrono::{DateTime, Utc};
use std::fmt::{self, Debug};
use std::marker::PhantomData;

/// One extractable facet of an [`Event`].
pub trait Facet: 'static {
    /// The type predicates over this facet decide on.
    type Subject: ?Sized;

    /// Facet name used in diagnostics.
    const NAME: &'static str;

    /// Pull the facet out of an event.
    fn extract(event: &Event) -> Option<&Self::Subject>;
}

/// The severity facet.
#[derive(Debug, Clone, Copy)]
pub struct SeverityFacet;

impl Facet for SeverityFacet {
    type Subject = dyn Severity;
    const NAME: &'static str = "severity";

    fn extract(event: &Event) -> Option<&Self::Subject> {
        event.severity()
    }
}

/// The message facet.
#[derive(Debug, Clone, Copy)]
pub struct MessageFacet;

impl Facet for MessageFacet {
    type Subject = dyn Message;
    const NAME: &'static str = "message";

    fn extract(event: &Event) -> Option<&Self::Subject> {
        event.message()
    }
}

/// The origin facet.
#[derive(Debug, Clone, Copy)]
pub struct OriginFacet;

impl Facet for OriginFacet {
    type Subject = dyn Origin;
    const NAME: &'static str = "origin";

    fn extract(event: &Event) -> Option<&Self::Subject> {
        event.origin()
    }
}

/// The timestamp facet.
#[derive(Debug, Clone, Copy)]
pub struct TimestampFacet;

impl Facet for TimestampFacet {
    type Subject = DateTime<Utc>;
    const NAME: &'static str = "timestamp";

    fn extract(event: &Event) -> Option<&Self::Subject> {
        event.timestamp()
    }
}

/// Event predicate that delegates to a predicate over one facet.
///
/// # INV: absence answers `missing_result`
///
/// If the facet is absent or `predicate` is `None`, [`matches`](Self::matches)
/// returns `missing_result` without consulting anything else.
pub struct FacetPredicate<F: Facet> {
    /// Predicate over the extracted facet.
    pub predicate: Option<Predicate<F::Subject>>,
    /// Answer when the facet or the predicate is absent.
    pub missing_result: bool,
    _facet: PhantomData<fn() -> F>,
}

/// Predicate over an event's severity.
pub type SeverityPredicate = FacetPredicate<SeverityFacet>;
/// Predicate over an event's message.
pub type MessagePredicate = FacetPredicate<MessageFacet>;
/// Predicate over an event's origin.
pub type OriginPredicate = FacetPredicate<OriginFacet>;
/// Predicate over an event's timestamp.
pub type TimestampPredicate = FacetPredicate<TimestampFacet>;

impl<F: Facet> FacetPredicate<F> {
    /// Wrap `predicate`, answering `missing_result` when the facet is absent.
    #[must_use]
    pub fn new(predicate: Predicate<F::Subject>, missing_result: bool) -> Self {
        Self {
            predicate: Some(predicate),
            missing_result,
            _facet: PhantomData,
        }
    }

    /// A wrapper with no inner predicate: always answers `missing_result`.
    #[must_use]
    pub fn unset(missing_result: bool) -> Self {
        Self {
            predicate: None,
            missing_result,
            _facet: PhantomData,
        }
    }

    /// Evaluate against an event.
    pub fn matches(&self, event: &Event) -> bool {
        match (F::extract(event), &self.predicate) {
            (Some(facet), Some(predicate)) => predicate.matches(facet),
            _ => self.missing_result,
        }
    }
}

impl<F: Facet> SubjectPredicate<Event> for FacetPredicate<F> {
    fn matches(&self, event: &Event) -> bool {
        FacetPredicate::matches(self, event)
    }
}

impl<F: Facet> Debug for FacetPredicate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacetPredicate")
            .field("facet", &F::NAME)
            .field("predicate", &self.predicate)
            .field("missing_result", &self.missing_result)
            .finish()
    }
}

impl<F: Facet> From<FacetPredicate<F>> for Predicate<Event> {
    fn from(value: FacetPredicate<F>) -> Self {
        Predicate::custom(value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Severity order
// ═══════════════════════════════════════════════════════════════════════════════

/// Relation between an actual rank and a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
pub enum OrderRelation {
    /// `actual >= threshold`
    #[default]
    #[cfg_attr(feature = "config", serde(rename = ">="))]
    GreaterEqual,
    /// `actual > threshold`
    #[cfg_attr(feature = "config", serde(rename = ">"))]
    Greater,
    /// `actual == threshold`
    #[cfg_attr(feature = "config", serde(rename = "=="))]
    Equal,
    /// `actual < threshold`
    #[cfg_attr(feature = "config", serde(rename = "<"))]
    Less,
    /// `actual <= threshold`
    #[cfg_attr(feature = "config", serde(rename = "<="))]
    LessEqual,
}

impl OrderRelation {
    /// Apply the relation.
    #[must_use]
    pub fn holds(self, actual: i32, threshold: i32) -> bool {
        match self {
            Self::GreaterEqual => actual >= threshold,
            Self::Greater => actual > threshold,
            Self::Equal => actual == threshold,
            Self::Less => actual < threshold,
            Self::LessEqual => actual <= threshold,
        }
    }
}

/// Compares a severity's numeric rank against a threshold.
///
/// Usable both over a bare severity (`Predicate<dyn Severity>`) and directly
/// over an event, where a missing severity answers `missing_result`.
///
/// ```
/// use logroute::{Level, OrderRelation, SeverityOrder};
///
/// let below_info = SeverityOrder::new(2, OrderRelation::Less, false);
/// assert!(below_info.matches_rank(Some(1)));
/// assert!(!below_info.matches_rank(Some(2)));
/// assert!(!below_info.matches_rank(None));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityOrder {
    /// Rank to compare against.
    pub threshold: i32,
    /// How `actual` must relate to `threshold`.
    pub relation: OrderRelation,
    /// Answer when there is no severity.
    pub missing_result: bool,
}

impl SeverityOrder {
    /// Create an order predicate.
    #[must_use]
    pub fn new(threshold: i32, relation: OrderRelation, missing_result: bool) -> Self {
        Self {
            threshold,
            relation,
            missing_result,
        }
    }

    /// `rank >= severity.rank()`; events without severity do not match.
    #[must_use]
    pub fn at_least(severity: impl Severity) -> Self {
        Self::new(severity.rank(), OrderRelation::GreaterEqual, false)
    }

    /// `rank < severity.rank()`; events without severity do not match.
    #[must_use]
    pub fn below(severity: impl Severity) -> Self {
        Self::new(severity.rank(), OrderRelation::Less, false)
    }

    /// Evaluate against an optional rank.
    #[must_use]
    pub fn matches_rank(&self, rank: Option<i32>) -> bool {
        rank.map_or(self.missing_result, |actual| {
            self.relation.holds(actual, self.threshold)
        })
    }
}

impl SubjectPredicate<dyn Severity> for SeverityOrder {
    fn matches(&self, severity: &(dyn Severity + 'static)) -> bool {
        self.matches_rank(Some(severity.rank()))
    }
}

impl SubjectPredicate<Event> for SeverityOrder {
    fn matches(&self, event: &Event) -> bool {
        self.matches_rank(event.severity().map(|s| s.rank()))
    }
}

impl From<SeverityOrder> for Predicate<Event> {
    fn from(value: SeverityOrder) -> Self {
        Predicate::custom(value)
    }
}

impl From<SeverityOrder> for Predicate<dyn Severity> {
    fn from(value: SeverityOrder) -> Self {
        Predicate::custom(value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Text and time matchers
// ═══════════════════════════════════════════════════════════════════════════════

/// Matches a message when any of its lines matches.
#[derive(Debug, Clone)]
pub struct MessageMatch(pub StringMatcher);

impl SubjectPredicate<dyn Message> for MessageMatch {
    fn matches(&self, message: &(dyn Message + 'static)) -> bool {
        message.lines().iter().any(|line| self.0.matches(line))
    }
}

impl From<MessageMatch> for Predicate<dyn Message> {
    fn from(value: MessageMatch) -> Self {
        Predicate::custom(value)
    }
}

/// Matches an origin by its display string.
#[derive(Debug, Clone)]
pub struct OriginMatch(pub StringMatcher);

impl SubjectPredicate<dyn Origin> for OriginMatch {
    fn matches(&self, origin: &(dyn Origin + 'static)) -> bool {
        self.0.matches(&origin.describe())
    }
}

impl From<OriginMatch> for Predicate<dyn Origin> {
    fn from(value: OriginMatch) -> Self {
        Predicate::custom(value)
    }
}

/// Matches timestamps inside inclusive bounds. An unset bound is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeWindow {
    /// Earliest matching instant.
    pub not_before: Option<DateTime<Utc>>,
    /// Latest matching instant.
    pub not_after: Option<DateTime<Utc>>,
}

impl SubjectPredicate<DateTime<Utc>> for TimeWindow {
    fn matches(&self, at: &DateTime<Utc>) -> bool {
        self.not_before.map_or(true, |lo| *at >= lo) && self.not_after.map_or(true, |hi| *at <= hi)
    }
}

impl From<TimeWindow> for Predicate<DateTime<Utc>> {
    fn from(value: TimeWindow) -> Self {
        Predicate::custom(value)
    }
}
