//! Cycle-safe graph walking
//!
//! [`RouteGraph::walk`] traverses the graph depth-first, pre-order, and
//! reports to a [`RouteVisitor`]. Deduplication is by [`Identity`] across the
//! whole traversal, so shared subgraphs and cycles are entered once.
//!
//! # INV
//!
//! - A non-zero identity already entered is reported with `skip(.., true)`
//!   and not descended into again.
//! - A subtree pruned by `enter` does not mark its identity; the same
//!   identity reached along another path is entered again.
//! - [`Identity::NONE`] is never marked, so such nodes are entered every time
//!   they are reached, except when the same node is already open on the
//!   current path: that re-entry closes a cycle and is reported as seen.

use crate::{Identity, Node, NodeHandle, RouteGraph};
use std::collections::HashSet;
use std::fmt::Write;

/// Answer of [`RouteVisitor::enter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkControl {
    /// Descend into the children, then call `leave`.
    #[default]
    Continue,
    /// Do not descend; `skip` is called with `seen = false`.
    SkipSubtree,
}

/// Position of a node in the current traversal.
#[derive(Debug, Clone, Copy)]
pub struct WalkStep<'g> {
    /// Handle of the node.
    pub handle: NodeHandle,
    /// The node itself.
    pub node: &'g Node,
    /// Position among the parent's children; `None` for the root.
    pub index: Option<usize>,
    /// Distance from the root (root is 0).
    pub depth: usize,
    /// `true` if the node has no children.
    pub leaf: bool,
}

/// Observer of a graph walk.
pub trait RouteVisitor {
    /// Called before descending into a node.
    fn enter(&mut self, step: &WalkStep<'_>) -> WalkControl;

    /// Called after all children of an entered node were walked.
    fn leave(&mut self, _step: &WalkStep<'_>) {}

    /// Called instead of descending: `seen` is `true` when the node's
    /// identity was already entered, `false` when `enter` pruned it.
    fn skip(&mut self, _step: &WalkStep<'_>, _seen: bool) {}
}

impl RouteGraph {
    /// Walk the graph from `root`, reporting to `visitor`.
    ///
    /// Handles that do not resolve are logged and left out. An identity-less
    /// node reached again while it is still open on the current path is
    /// reported as seen and not descended, which bounds walks over cycles of
    /// such nodes.
    pub fn walk(&self, root: NodeHandle, visitor: &mut dyn RouteVisitor) {
        let mut seen = HashSet::new();
        let mut open = Vec::new();
        self.walk_at(root, None, 0, visitor, &mut seen, &mut open);
    }

    fn walk_at(
        &self,
        handle: NodeHandle,
        index: Option<usize>,
        depth: usize,
        visitor: &mut dyn RouteVisitor,
        seen: &mut HashSet<Identity>,
        open: &mut Vec<NodeHandle>,
    ) {
        let Some(node) = self.node(handle) else {
            tracing::warn!(%handle, "walk reached unknown node");
            return;
        };
        let children = node.children();
        let step = WalkStep {
            handle,
            node,
            index,
            depth,
            leaf: children.is_empty(),
        };

        let identity = node.identity();
        let revisit = if identity.is_none() {
            open.contains(&handle)
        } else {
            seen.contains(&identity)
        };
        if revisit {
            visitor.skip(&step, true);
            return;
        }

        if visitor.enter(&step) == WalkControl::SkipSubtree {
            visitor.skip(&step, false);
            return;
        }
        if !identity.is_none() {
            seen.insert(identity);
        }
        open.push(handle);
        for (position, child) in children.into_iter().enumerate() {
            self.walk_at(child, Some(position), depth + 1, visitor, seen, open);
        }
        open.pop();
        visitor.leave(&step);
    }

    /// Indented outline of the graph below `root`, one node per line.
    ///
    /// ```
    /// use logroute::RouteGraph;
    ///
    /// let mut graph = RouteGraph::new();
    /// let null = graph.insert_null();
    /// let root = graph.insert_broadcast([null, null]);
    ///
    /// assert_eq!(graph.outline(root), "broadcast #2\n  null #1\n  null #1 (seen)\n");
    /// ```
    #[must_use]
    pub fn outline(&self, root: NodeHandle) -> String {
        let mut outline = Outline::default();
        self.walk(root, &mut outline);
        outline.finish()
    }
}

/// Visitor that renders an indented outline.
#[derive(Debug, Default)]
pub struct Outline {
    out: String,
}

impl Outline {
    /// The rendered outline.
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, step: &WalkStep<'_>, suffix: &str) {
        let _ = writeln!(
            self.out,
            "{:indent$}{} {}{suffix}",
            "",
            step.node.kind().name(),
            step.node.identity(),
            indent = step.depth * 2,
        );
    }
}

impl RouteVisitor for Outline {
    fn enter(&mut self, step: &WalkStep<'_>) -> WalkControl {
        self.line(step, "");
        WalkControl::Continue
    }

    fn skip(&mut self, step: &WalkStep<'_>, seen: bool) {
        if seen {
            self.line(step, " (seen)");
        }
    }
}
