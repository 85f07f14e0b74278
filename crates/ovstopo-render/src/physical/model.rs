use crate::geom::{Point, point};
use ovstopo_core::TopologyNode;
use ovstopo_core::entities::{Link, LinkKind, LinkStyle};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Bridge,
    Ovsdb,
}

/// A node of the physical view.
///
/// `position` is the simulation frame; `local` is that position through the graph's own
/// transform (what the node group is translated to); `screen` additionally goes through the
/// ambient parent transform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub position: Point,
    pub local: Point,
    pub screen: Point,
    pub fixed: bool,
    pub hidden: bool,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        let unplaced = point(f64::NAN, f64::NAN);
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            position: unplaced,
            local: unplaced,
            screen: unplaced,
            fixed: false,
            hidden: false,
        }
    }

    pub fn from_topology_node(node: TopologyNode<'_>) -> Self {
        match node {
            TopologyNode::Bridge(bridge) => {
                let label = bridge.flow_info.ip.as_deref().unwrap_or(&bridge.name);
                Self::new(&bridge.node_id, label, NodeKind::Bridge)
            }
            TopologyNode::Ovsdb(ovsdb) => Self::new(&ovsdb.node_id, &ovsdb.node_id, NodeKind::Ovsdb),
        }
    }

    pub fn opacity(&self) -> f64 {
        if self.hidden { 0.3 } else { 1.0 }
    }
}

/// A drawable edge of the physical view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphLink {
    pub id: String,
    pub source: usize,
    pub target: usize,
    /// 1-based rank among parallel links between the same `(source, target)` pair.
    pub link_index: usize,
    pub kind: LinkKind,
    pub style: LinkStyle,
    /// SVG path data, refreshed by every update.
    pub path: String,
    pub hidden: bool,
}

impl GraphLink {
    pub fn new(id: impl Into<String>, source: usize, target: usize, kind: LinkKind) -> Self {
        let style = match kind {
            LinkKind::Physical => LinkStyle::physical(),
            LinkKind::Tunnel(_) => LinkStyle::tunnel(),
            LinkKind::BridgeOvs => LinkStyle::bridge_ovs(),
        };
        Self {
            id: id.into(),
            source,
            target,
            link_index: 1,
            kind,
            style,
            path: String::new(),
            hidden: false,
        }
    }

    /// `None` while the link's endpoints are unresolved.
    pub fn from_topology_link(link: &Link) -> Option<Self> {
        let (source, target) = (link.source?, link.target?);
        Some(Self {
            style: link.style.clone(),
            ..Self::new(&link.id, source, target, link.kind.clone())
        })
    }

    pub fn is_tunnel(&self) -> bool {
        matches!(self.kind, LinkKind::Tunnel(_))
    }

    pub fn touches(&self, node: usize) -> bool {
        self.source == node || self.target == node
    }
}

/// Which node groups a visibility filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeSelector {
    #[default]
    All,
    Bridges,
    Ovsdb,
}

impl NodeSelector {
    pub fn matches(self, kind: NodeKind) -> bool {
        match self {
            Self::All => true,
            Self::Bridges => kind == NodeKind::Bridge,
            Self::Ovsdb => kind == NodeKind::Ovsdb,
        }
    }
}

/// What a hover over one node highlights.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConnectionHighlight {
    /// The hovered node and every node sharing a link with it.
    pub nodes: Vec<usize>,
    /// Non-tunnel links touching the hovered node.
    pub links: Vec<usize>,
}
