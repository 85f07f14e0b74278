use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkStyle {
    pub color: String,
    pub width: f64,
    /// SVG `stroke-dasharray`, `None` for solid strokes.
    pub dash: Option<String>,
}

impl LinkStyle {
    pub fn physical() -> Self {
        Self {
            color: "#0077b6".to_string(),
            width: 1.0,
            dash: None,
        }
    }

    pub fn tunnel() -> Self {
        Self {
            color: "#e07b00".to_string(),
            width: 2.0,
            dash: Some("5,5".to_string()),
        }
    }

    pub fn bridge_ovs() -> Self {
        Self {
            color: "#888888".to_string(),
            width: 1.0,
            dash: None,
        }
    }
}

/// The two VXLAN endpoints a tunnel link was paired from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TunnelPair {
    pub source_port: String,
    pub dest_port: String,
    pub source_ip: String,
    pub dest_ip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LinkKind {
    /// Inventory link between two switches.
    Physical,
    Tunnel(TunnelPair),
    /// Management-plane edge from an OVSDB node to a bridge it manages.
    BridgeOvs,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub id: String,
    pub src_node_id: String,
    pub dest_node_id: String,
    pub kind: LinkKind,
    pub style: LinkStyle,
    /// Index of the source node in `Topology::nodes()`, valid after `Topology::resolve_links`.
    pub source: Option<usize>,
    pub target: Option<usize>,
}

impl Link {
    fn with_kind(
        id: impl Into<String>,
        src: impl Into<String>,
        dest: impl Into<String>,
        kind: LinkKind,
        style: LinkStyle,
    ) -> Self {
        Self {
            id: id.into(),
            src_node_id: src.into(),
            dest_node_id: dest.into(),
            kind,
            style,
            source: None,
            target: None,
        }
    }

    pub fn physical(id: impl Into<String>, src: impl Into<String>, dest: impl Into<String>) -> Self {
        Self::with_kind(id, src, dest, LinkKind::Physical, LinkStyle::physical())
    }

    pub fn tunnel(
        id: impl Into<String>,
        src: impl Into<String>,
        dest: impl Into<String>,
        pair: TunnelPair,
    ) -> Self {
        Self::with_kind(id, src, dest, LinkKind::Tunnel(pair), LinkStyle::tunnel())
    }

    /// Link ids are `<ovsdb id>/<bridge id>`.
    pub fn bridge_ovs(ovsdb_node_id: &str, bridge_node_id: &str) -> Self {
        Self::with_kind(
            format!("{ovsdb_node_id}/{bridge_node_id}"),
            ovsdb_node_id,
            bridge_node_id,
            LinkKind::BridgeOvs,
            LinkStyle::bridge_ovs(),
        )
    }

    pub fn is_tunnel(&self) -> bool {
        matches!(self.kind, LinkKind::Tunnel(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            LinkKind::Physical => "link",
            LinkKind::Tunnel(_) => "tunnel",
            LinkKind::BridgeOvs => "bridgeOvsLink",
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.source.is_some() && self.target.is_some()
    }

    /// Whether `node_id` is one of the two endpoints.
    pub fn touches(&self, node_id: &str) -> bool {
        self.src_node_id == node_id || self.dest_node_id == node_id
    }
}
