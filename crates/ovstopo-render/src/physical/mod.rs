//! Physical view: OVSDB nodes and bridges laid out by a force simulation.

mod graph;
mod model;

pub use graph::{ForceLayoutGraph, link_path};
pub use model::{ConnectionHighlight, GraphLink, GraphNode, NodeKind, NodeSelector};

/// Pointer callbacks of the physical view. Every method defaults to doing nothing.
///
/// Each call receives the node under the pointer plus the full node and link sets.
pub trait GraphObserver {
    fn on_node_click(&self, _node: &GraphNode, _nodes: &[GraphNode], _links: &[GraphLink]) {}
    fn on_node_over(&self, _node: &GraphNode, _nodes: &[GraphNode], _links: &[GraphLink]) {}
    fn on_node_out(&self, _node: &GraphNode, _nodes: &[GraphNode], _links: &[GraphLink]) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl GraphObserver for NoopObserver {}
