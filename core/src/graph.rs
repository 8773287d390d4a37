//! `RouteGraph` — Arena of routing nodes
//!
//! Every node is registered in one `Vec` and addressed by [`NodeHandle`].
//! Children are handles, so a node may be shared by several parents and the
//! graph may contain cycles. Building needs `&mut self`; dispatching, closing
//! and walking only need `&self` and may run concurrently.
//!
//! # INV
//!
//! - Handles returned by `insert_*` stay valid for the life of the graph.
//! - A dispatch enters one node at most [`MAX_REENTRY`] times along a single
//!   path; acyclic graphs are routed in full, whatever their depth.
//! - `close` closes every sink reachable from the root exactly once.

use crate::{
    Broadcast, Event, Identity, IdentityAllocator, Node, NodeHandle, NodeKind, Rule, RouteError,
    RuleDispatch, Sink, MAX_REENTRY,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Routing nodes plus the identity allocator that stamped them.
#[derive(Debug)]
pub struct RouteGraph {
    nodes: Vec<Node>,
    identities: Arc<IdentityAllocator>,
}

impl Default for RouteGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteGraph {
    /// An empty graph with its own identity allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_allocator(Arc::new(IdentityAllocator::new()))
    }

    /// An empty graph drawing identities from a shared allocator.
    #[must_use]
    pub fn with_allocator(identities: Arc<IdentityAllocator>) -> Self {
        Self {
            nodes: Vec::new(),
            identities,
        }
    }

    /// The allocator this graph draws identities from.
    #[must_use]
    pub fn allocator(&self) -> &Arc<IdentityAllocator> {
        &self.identities
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` if no node was inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Building
    // ═══════════════════════════════════════════════════════════════════════

    /// Insert a node with a fresh identity.
    pub fn insert(&mut self, kind: NodeKind) -> NodeHandle {
        let identity = self.identities.allocate();
        self.insert_with_identity(identity, kind)
    }

    /// Insert a node with a caller-chosen identity.
    ///
    /// [`Identity::NONE`] opts the node out of walk deduplication. Reusing an
    /// identity makes the walker treat both nodes as one.
    pub fn insert_with_identity(&mut self, identity: Identity, kind: NodeKind) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(Node::new(identity, kind));
        handle
    }

    /// Insert a broadcast node over `children`.
    pub fn insert_broadcast(&mut self, children: impl IntoIterator<Item = NodeHandle>) -> NodeHandle {
        self.insert(NodeKind::Broadcast(Broadcast::new(children.into_iter().map(Some))))
    }

    /// Insert a rule-dispatch node over `rules`.
    pub fn insert_dispatch(&mut self, rules: impl IntoIterator<Item = Rule>) -> NodeHandle {
        self.insert(NodeKind::Dispatch(RuleDispatch::new(rules.into_iter().map(Some))))
    }

    /// Insert a node that drops every event.
    pub fn insert_null(&mut self) -> NodeHandle {
        self.insert(NodeKind::Null)
    }

    /// Insert a leaf sink.
    pub fn insert_sink(&mut self, sink: impl Sink + 'static) -> NodeHandle {
        self.insert(NodeKind::Sink(Box::new(sink)))
    }

    /// Append `child` to the broadcast node `parent`.
    ///
    /// This is how cycles are built: insert the parent first, then link it.
    ///
    /// # Errors
    ///
    /// - [`RouteError::UnknownNode`] if either handle is not in this graph
    /// - [`RouteError::WrongNodeKind`] if `parent` is not a broadcast node
    pub fn push_child(&mut self, parent: NodeHandle, child: NodeHandle) -> Result<(), RouteError> {
        self.check(child)?;
        match self.node_mut(parent)?.kind_mut() {
            NodeKind::Broadcast(b) => {
                b.push(child);
                Ok(())
            }
            other => Err(RouteError::WrongNodeKind {
                handle: parent,
                kind: other.name(),
                wanted: "children",
            }),
        }
    }

    /// Append `rule` to the rule-dispatch node `parent`.
    ///
    /// # Errors
    ///
    /// - [`RouteError::UnknownNode`] if `parent` or the rule's target is not in this graph
    /// - [`RouteError::WrongNodeKind`] if `parent` is not a dispatch node
    pub fn push_rule(&mut self, parent: NodeHandle, rule: Rule) -> Result<(), RouteError> {
        if let Some(target) = rule.target {
            self.check(target)?;
        }
        match self.node_mut(parent)?.kind_mut() {
            NodeKind::Dispatch(d) => {
                d.push(rule);
                Ok(())
            }
            other => Err(RouteError::WrongNodeKind {
                handle: parent,
                kind: other.name(),
                wanted: "rules",
            }),
        }
    }

    fn check(&self, handle: NodeHandle) -> Result<(), RouteError> {
        self.node(handle)
            .map(|_| ())
            .ok_or(RouteError::UnknownNode { handle })
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Result<&mut Node, RouteError> {
        self.nodes
            .get_mut(handle.0)
            .ok_or(RouteError::UnknownNode { handle })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════════

    /// The node behind `handle`.
    #[must_use]
    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle.0)
    }

    /// Identity of the node behind `handle`.
    #[must_use]
    pub fn identity(&self, handle: NodeHandle) -> Option<Identity> {
        self.node(handle).map(Node::identity)
    }

    /// Direct children of the node behind `handle` (empty if unknown).
    #[must_use]
    pub fn children(&self, handle: NodeHandle) -> Vec<NodeHandle> {
        self.node(handle).map(Node::children).unwrap_or_default()
    }

    /// All handles, in insertion order.
    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        (0..self.nodes.len()).map(NodeHandle)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Dispatch
    // ═══════════════════════════════════════════════════════════════════════

    /// Route `event` from `root`, stamping the current time if it has none.
    pub fn dispatch(&self, root: NodeHandle, mut event: Event) {
        event.stamp();
        self.route(root, &event);
    }

    /// Route `event` from `root` as is.
    ///
    /// Sink failures are logged and do not stop the remaining children or
    /// rules. A node re-entered more than [`MAX_REENTRY`] times on one path
    /// (a cycle) cuts that branch off.
    pub fn route(&self, root: NodeHandle, event: &Event) {
        let mut path = HashMap::new();
        self.route_at(root, event, &mut path);
    }

    /// `path` counts how often each handle sits on the current branch.
    fn route_at(&self, handle: NodeHandle, event: &Event, path: &mut HashMap<NodeHandle, usize>) {
        let Some(node) = self.node(handle) else {
            tracing::warn!(%handle, "dispatch to unknown node");
            return;
        };
        let entries = path.entry(handle).or_insert(0);
        if *entries >= MAX_REENTRY {
            tracing::warn!(
                %handle,
                max_reentry = MAX_REENTRY,
                "dispatch cycle limit reached, dropping event on this branch"
            );
            return;
        }
        *entries += 1;

        match node.kind() {
            NodeKind::Broadcast(b) => b.route(|child| self.route_at(child, event, path)),
            NodeKind::Dispatch(d) => {
                d.route(event, |target| self.route_at(target, event, path));
            }
            NodeKind::Null => {}
            NodeKind::Sink(sink) => {
                if let Err(error) = sink.dispatch(event) {
                    tracing::warn!(%handle, identity = %node.identity(), %error, "sink dispatch failed");
                }
            }
        }

        if let Some(entries) = path.get_mut(&handle) {
            *entries -= 1;
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Teardown
    // ═══════════════════════════════════════════════════════════════════════

    /// Close every sink reachable from `root`, each once, in pre-order.
    ///
    /// Returns the number of sinks closed. Close failures are logged.
    pub fn close(&self, root: NodeHandle) -> usize {
        let mut seen = HashSet::new();
        let mut pending = vec![root];
        let mut closed = 0;

        while let Some(handle) = pending.pop() {
            if !seen.insert(handle) {
                continue;
            }
            let Some(node) = self.node(handle) else {
                tracing::warn!(%handle, "close of unknown node");
                continue;
            };
            if let NodeKind::Sink(sink) = node.kind() {
                close_sink(handle, node, sink.as_ref());
                closed += 1;
            }
            pending.extend(node.children().into_iter().rev());
        }
        closed
    }

    /// Close every sink in the graph, reachable or not.
    pub fn close_all(&self) -> usize {
        let mut closed = 0;
        for (index, node) in self.nodes.iter().enumerate() {
            if let NodeKind::Sink(sink) = node.kind() {
                close_sink(NodeHandle(index), node, sink.as_ref());
                closed += 1;
            }
        }
        closed
    }
}

fn close_sink(handle: NodeHandle, node: &Node, sink: &dyn Sink) {
    if let Err(error) = sink.close() {
        tracing::warn!(%handle, identity = %node.identity(), %error, "sink close failed");
    }
}
