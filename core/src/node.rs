//! Routing nodes — Broadcast, rule dispatch, null and sink
//!
//! Nodes live in a [`RouteGraph`](crate::RouteGraph) arena and address each
//! other through [`NodeHandle`]s. A node only decides *where* an event goes;
//! the graph does the actual forwarding, so a node never owns its children.

use crate::{Event, Identity, Predicate, Sink};
use std::fmt;

/// Index of a node inside the [`RouteGraph`](crate::RouteGraph) that created it.
///
/// Handles are positional: using a handle with a different graph addresses
/// whatever node sits at that position there, or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle(pub(crate) usize);

impl NodeHandle {
    /// Position of the node in its graph's arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rules
// ═══════════════════════════════════════════════════════════════════════════════

/// One entry of a [`RuleDispatch`] node.
///
/// # Evaluation
///
/// 1. A `condition` that is present and does not match skips the rule with
///    no side effect; evaluation moves on to the next rule.
/// 2. Otherwise the event goes to `target`, if present.
/// 3. Then evaluation stops, unless `continue_when` is present and matches.
///
/// A rule with every field absent matches, forwards nowhere and stops.
#[derive(Debug, Default)]
pub struct Rule {
    /// Gate for this rule; absent means "always".
    pub condition: Option<Predicate<Event>>,
    /// Where matching events go; absent means "nowhere".
    pub target: Option<NodeHandle>,
    /// Whether evaluation continues after this rule; absent means "stop".
    pub continue_when: Option<Predicate<Event>>,
}

impl Rule {
    /// A rule with every field absent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A rule that forwards to `target`, unconditionally, then stops.
    #[must_use]
    pub fn to(target: NodeHandle) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }

    /// Set the gate (builder pattern).
    #[must_use]
    pub fn when(mut self, condition: impl Into<Predicate<Event>>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Set the continuation predicate (builder pattern).
    #[must_use]
    pub fn continue_when(mut self, predicate: impl Into<Predicate<Event>>) -> Self {
        self.continue_when = Some(predicate.into());
        self
    }

    fn applies(&self, event: &Event) -> bool {
        self.condition.as_ref().map_or(true, |c| c.matches(event))
    }

    fn continues(&self, event: &Event) -> bool {
        self.continue_when.as_ref().is_some_and(|c| c.matches(event))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Node kinds
// ═══════════════════════════════════════════════════════════════════════════════

/// Forwards every event to every present child, in order.
#[derive(Debug, Default)]
pub struct Broadcast {
    children: Vec<Option<NodeHandle>>,
}

impl Broadcast {
    /// A broadcast over `children`. Absent slots are kept and skipped.
    #[must_use]
    pub fn new(children: impl IntoIterator<Item = Option<NodeHandle>>) -> Self {
        Self {
            children: children.into_iter().collect(),
        }
    }

    /// Child slots, absent ones included.
    #[must_use]
    pub fn slots(&self) -> &[Option<NodeHandle>] {
        &self.children
    }

    /// Append a child.
    pub fn push(&mut self, child: NodeHandle) {
        self.children.push(Some(child));
    }

    /// Call `forward` once per present child, in order.
    pub fn route(&self, mut forward: impl FnMut(NodeHandle)) {
        self.children.iter().flatten().for_each(|&child| forward(child));
    }
}

/// Evaluates an ordered rule list per event.
#[derive(Debug, Default)]
pub struct RuleDispatch {
    rules: Vec<Option<Rule>>,
}

impl RuleDispatch {
    /// A dispatcher over `rules`. Absent slots are kept and skipped.
    #[must_use]
    pub fn new(rules: impl IntoIterator<Item = Option<Rule>>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// Rule slots, absent ones included.
    #[must_use]
    pub fn rules(&self) -> &[Option<Rule>] {
        &self.rules
    }

    /// Append a rule.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(Some(rule));
    }

    /// Evaluate the rules against `event`, calling `forward` for each target hit.
    pub fn route(&self, event: &Event, mut forward: impl FnMut(NodeHandle)) {
        for (index, rule) in self.rules.iter().enumerate() {
            let Some(rule) = rule else { continue };

            if !rule.applies(event) {
                tracing::trace!(rule = index, "rule condition did not match");
                continue;
            }

            if let Some(target) = rule.target {
                tracing::trace!(rule = index, %target, "rule forwards event");
                forward(target);
            }

            if !rule.continues(event) {
                tracing::trace!(rule = index, "rule stops evaluation");
                return;
            }
        }
    }

    /// Targets of present rules, in rule order.
    #[must_use]
    pub fn targets(&self) -> Vec<NodeHandle> {
        self.rules.iter().flatten().filter_map(|r| r.target).collect()
    }
}

/// What a node does with an event.
#[derive(Debug)]
pub enum NodeKind {
    /// Fan out to every child.
    Broadcast(Broadcast),
    /// Ordered, predicate-driven selection.
    Dispatch(RuleDispatch),
    /// Drop the event.
    Null,
    /// Leaf that writes events somewhere.
    Sink(Box<dyn Sink>),
}

impl NodeKind {
    /// Short lowercase name of the kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Broadcast(_) => "broadcast",
            Self::Dispatch(_) => "dispatch",
            Self::Null => "null",
            Self::Sink(_) => "sink",
        }
    }
}

/// A routing node: an identity plus its behavior.
#[derive(Debug)]
pub struct Node {
    identity: Identity,
    kind: NodeKind,
}

impl Node {
    pub(crate) fn new(identity: Identity, kind: NodeKind) -> Self {
        Self { identity, kind }
    }

    /// Identity assigned at creation; may be [`Identity::NONE`].
    #[must_use]
    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// What this node does.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    /// Direct children, in order: present broadcast slots, or the targets
    /// of present dispatch rules. A node listed twice appears twice.
    #[must_use]
    pub fn children(&self) -> Vec<NodeHandle> {
        match &self.kind {
            NodeKind::Broadcast(b) => b.slots().iter().flatten().copied().collect(),
            NodeKind::Dispatch(d) => d.targets(),
            NodeKind::Null | NodeKind::Sink(_) => Vec::new(),
        }
    }
}
