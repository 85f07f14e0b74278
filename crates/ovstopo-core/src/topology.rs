use crate::entities::{BridgeNode, Link, OvsdbNode};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// A node of the physical graph, in `Topology::nodes()` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TopologyNode<'a> {
    Bridge(&'a BridgeNode),
    Ovsdb(&'a OvsdbNode),
}

impl<'a> TopologyNode<'a> {
    pub fn node_id(&self) -> &'a str {
        match self {
            Self::Bridge(b) => &b.node_id,
            Self::Ovsdb(o) => &o.node_id,
        }
    }

    pub fn label(&self) -> &'a str {
        match self {
            Self::Bridge(b) => &b.name,
            Self::Ovsdb(o) => &o.node_id,
        }
    }

    pub fn is_bridge(&self) -> bool {
        matches!(self, Self::Bridge(_))
    }
}

/// The physical graph: bridges, OVSDB nodes and the links between them.
///
/// Node indices are the concatenation `bridge_nodes ∘ ovsdb_nodes`. Link `source`/`target`
/// indices refer to that order and are cleared whenever the node set changes; call
/// [`Topology::resolve_links`] again after mutating nodes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Topology {
    bridge_nodes: IndexMap<String, BridgeNode>,
    ovsdb_nodes: IndexMap<String, OvsdbNode>,
    links: IndexMap<String, Link>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_bridge_node(&mut self, node: BridgeNode) {
        self.bridge_nodes.insert(node.node_id.clone(), node);
        self.invalidate_links();
    }

    pub fn register_ovsdb_node(&mut self, node: OvsdbNode) {
        self.ovsdb_nodes.insert(node.node_id.clone(), node);
        self.invalidate_links();
    }

    /// Registers `link`; a duplicate id replaces the earlier entry in place.
    pub fn register_link(&mut self, link: Link) {
        if self.links.contains_key(&link.id) {
            tracing::warn!(link_id = %link.id, "duplicate link id, keeping the newest entry");
        }
        self.links.insert(link.id.clone(), link);
    }

    pub fn bridge_nodes(&self) -> impl ExactSizeIterator<Item = &BridgeNode> {
        self.bridge_nodes.values()
    }

    pub fn ovsdb_nodes(&self) -> impl ExactSizeIterator<Item = &OvsdbNode> {
        self.ovsdb_nodes.values()
    }

    pub fn links(&self) -> impl ExactSizeIterator<Item = &Link> {
        self.links.values()
    }

    pub fn bridge_node(&self, node_id: &str) -> Option<&BridgeNode> {
        self.bridge_nodes.get(node_id)
    }

    pub(crate) fn bridge_node_mut(&mut self, node_id: &str) -> Option<&mut BridgeNode> {
        self.bridge_nodes.get_mut(node_id)
    }

    pub fn ovsdb_node(&self, node_id: &str) -> Option<&OvsdbNode> {
        self.ovsdb_nodes.get(node_id)
    }

    pub fn link(&self, link_id: &str) -> Option<&Link> {
        self.links.get(link_id)
    }

    pub fn node_count(&self) -> usize {
        self.bridge_nodes.len() + self.ovsdb_nodes.len()
    }

    /// Bridges first, then OVSDB nodes.
    pub fn nodes(&self) -> impl Iterator<Item = TopologyNode<'_>> {
        self.bridge_nodes
            .values()
            .map(TopologyNode::Bridge)
            .chain(self.ovsdb_nodes.values().map(TopologyNode::Ovsdb))
    }

    pub fn node(&self, index: usize) -> Option<TopologyNode<'_>> {
        match self.bridge_nodes.get_index(index) {
            Some((_, b)) => Some(TopologyNode::Bridge(b)),
            None => self
                .ovsdb_nodes
                .get_index(index - self.bridge_nodes.len())
                .map(|(_, o)| TopologyNode::Ovsdb(o)),
        }
    }

    pub fn node_index(&self, node_id: &str) -> Option<usize> {
        self.bridge_nodes.get_index_of(node_id).or_else(|| {
            self.ovsdb_nodes
                .get_index_of(node_id)
                .map(|idx| idx + self.bridge_nodes.len())
        })
    }

    pub fn bridge_by_flow_name(&self, flow_name: &str) -> Option<&BridgeNode> {
        self.bridge_nodes
            .values()
            .find(|b| b.flow_name() == flow_name)
    }

    /// The OVSDB node managing `bridge` (its id is contained in the bridge id).
    pub fn ovsdb_for_bridge(&self, bridge: &BridgeNode) -> Option<&OvsdbNode> {
        self.ovsdb_nodes
            .values()
            .find(|o| bridge.node_id.contains(o.node_id.as_str()))
    }

    /// Maps link endpoints onto node ids and indices in `nodes()` order.
    ///
    /// Endpoints given as OpenFlow names (`openflow:<n>`) are rewritten to the owning bridge's
    /// node id. Endpoints that match no node keep `None` indices. Idempotent.
    pub fn resolve_links(&mut self) {
        let mut by_flow_name: FxHashMap<String, String> = FxHashMap::default();
        for b in self.bridge_nodes.values() {
            let flow_name = b.flow_name();
            if flow_name != b.node_id {
                by_flow_name.entry(flow_name).or_insert_with(|| b.node_id.clone());
            }
        }

        let bridge_nodes = &self.bridge_nodes;
        let ovsdb_nodes = &self.ovsdb_nodes;
        let index_of = |id: &str| {
            bridge_nodes
                .get_index_of(id)
                .or_else(|| ovsdb_nodes.get_index_of(id).map(|i| i + bridge_nodes.len()))
        };

        for link in self.links.values_mut() {
            for endpoint in [&mut link.src_node_id, &mut link.dest_node_id] {
                if index_of(endpoint.as_str()).is_none() {
                    if let Some(node_id) = by_flow_name.get(endpoint.as_str()) {
                        *endpoint = node_id.clone();
                    }
                }
            }
            link.source = index_of(link.src_node_id.as_str());
            link.target = index_of(link.dest_node_id.as_str());
            if !link.is_resolved() {
                tracing::debug!(
                    link_id = %link.id,
                    src = %link.src_node_id,
                    dest = %link.dest_node_id,
                    "link endpoint does not match any node"
                );
            }
        }
    }

    fn invalidate_links(&mut self) {
        for link in self.links.values_mut() {
            link.source = None;
            link.target = None;
        }
    }
}
