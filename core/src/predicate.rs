//! Predicate — Boolean decisions over a typed subject
//!
//! [`Predicate<S>`] is the closed algebra: constants and the three
//! combinators. Anything else plugs in through [`SubjectPredicate`] and the
//! [`Predicate::Custom`] variant, which is how the facet wrappers, the
//! severity order and the text matchers join the algebra.
//!
//! # Absent children
//!
//! Combinator children are `Option`s. An absent child is skipped: it neither
//! satisfies `Any` nor fails `All`/`None`. Absence never panics and never
//! counts as an error.

use std::fmt::{self, Debug};

/// Open extension point of the predicate algebra.
///
/// Implement this for any decision over a subject `S` and wrap it with
/// [`Predicate::custom`].
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: predicates live inside routing
/// nodes that dispatch concurrently.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `SubjectPredicate<{S}>`",
    label = "this type cannot decide on `{S}`",
    note = "facet predicates decide on `Event`; severity orders on `dyn Severity`"
)]
pub trait SubjectPredicate<S: ?Sized>: Send + Sync + Debug {
    /// Decide whether `subject` matches.
    fn matches(&self, subject: &S) -> bool;
}

impl<S: ?Sized> SubjectPredicate<S> for Box<dyn SubjectPredicate<S>> {
    fn matches(&self, subject: &S) -> bool {
        (**self).matches(subject)
    }
}

/// Composite predicate over a subject `S`.
///
/// # Variants
///
/// - `True` / `False` — constants, ignore the subject
/// - `All` — every present child matches; short-circuits on the first miss; empty ⇒ `true`
/// - `Any` — some present child matches; short-circuits on the first hit; empty ⇒ `false`
/// - `None` — no present child matches; short-circuits on the first hit; empty ⇒ `true`
/// - `Custom` — an extension [`SubjectPredicate`]
///
/// # Example
///
/// ```
/// use logroute::{Event, Level, Predicate, SeverityOrder};
///
/// let urgent: Predicate<Event> = Predicate::any([
///     SeverityOrder::at_least(Level::Error).into(),
///     Predicate::False,
/// ]);
/// assert!(urgent.matches(&Event::new().with_severity(Level::Fatal)));
/// assert!(!urgent.matches(&Event::new().with_severity(Level::Info)));
/// ```
pub enum Predicate<S: ?Sized> {
    /// Always matches.
    True,
    /// Never matches.
    False,
    /// Logical AND over present children.
    All(Vec<Option<Predicate<S>>>),
    /// Logical OR over present children.
    Any(Vec<Option<Predicate<S>>>),
    /// Logical NOR over present children.
    None(Vec<Option<Predicate<S>>>),
    /// Extension predicate.
    Custom(Box<dyn SubjectPredicate<S>>),
}

impl<S: ?Sized> Predicate<S> {
    /// Evaluate this predicate against `subject`.
    ///
    /// Recursive; nesting depth is bounded by how the predicate was built.
    pub fn matches(&self, subject: &S) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::All(children) => children.iter().flatten().all(|p| p.matches(subject)),
            Self::Any(children) => children.iter().flatten().any(|p| p.matches(subject)),
            Self::None(children) => !children.iter().flatten().any(|p| p.matches(subject)),
            Self::Custom(p) => p.matches(subject),
        }
    }

    /// Wrap an extension predicate.
    #[must_use]
    pub fn custom(predicate: impl SubjectPredicate<S> + 'static) -> Self {
        Self::Custom(Box::new(predicate))
    }

    /// `All` over the given (all present) children.
    #[must_use]
    pub fn all(children: impl IntoIterator<Item = Self>) -> Self {
        Self::All(children.into_iter().map(Some).collect())
    }

    /// `Any` over the given (all present) children.
    #[must_use]
    pub fn any(children: impl IntoIterator<Item = Self>) -> Self {
        Self::Any(children.into_iter().map(Some).collect())
    }

    /// `None` over the given (all present) children.
    #[must_use]
    pub fn none_of(children: impl IntoIterator<Item = Self>) -> Self {
        Self::None(children.into_iter().map(Some).collect())
    }

    /// Depth of this predicate tree (constants and customs count 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::True | Self::False | Self::Custom(_) => 1,
            Self::All(ps) | Self::Any(ps) | Self::None(ps) => {
                1 + ps.iter().flatten().map(Self::depth).max().unwrap_or(0)
            }
        }
    }
}

impl<S: ?Sized> Debug for Predicate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("True"),
            Self::False => f.write_str("False"),
            Self::All(ps) => f.debug_tuple("All").field(ps).finish(),
            Self::Any(ps) => f.debug_tuple("Any").field(ps).finish(),
            Self::None(ps) => f.debug_tuple("None").field(ps).finish(),
            Self::Custom(p) => f.debug_tuple("Custom").field(p).finish(),
        }
    }
}

impl<S: ?Sized> From<bool> for Predicate<S> {
    fn from(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }
}
