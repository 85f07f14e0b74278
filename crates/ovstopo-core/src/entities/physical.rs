use serde::Serialize;
use serde_json::Value;

/// Management-plane entity: one vSwitch configuration database connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OvsdbNode {
    pub node_id: String,
    /// `local-ip:local-port` of the connection (the manager side).
    pub manager_address: String,
    /// `remote-ip:remote-port` of the connection (the switch side).
    pub node_address: String,
    /// Overlay (tunnel endpoint) address from `other_config:local_ip`.
    pub local_ip: String,
    pub ovs_version: String,
}

impl OvsdbNode {
    pub fn new(
        node_id: impl Into<String>,
        manager_address: impl Into<String>,
        node_address: impl Into<String>,
        local_ip: impl Into<String>,
        ovs_version: impl Into<String>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            manager_address: manager_address.into(),
            node_address: node_address.into(),
            local_ip: local_ip.into(),
            ovs_version: ovs_version.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PortKind {
    Port,
    Tunnel { local_ip: String, remote_ip: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminationPoint {
    pub name: String,
    pub of_port: Option<u32>,
    pub interface_type: String,
    pub mac: String,
    pub iface_id: String,
    #[serde(flatten)]
    pub kind: PortKind,
}

impl TerminationPoint {
    pub const VXLAN_INTERFACE_TYPE: &'static str = "ovsdb:interface-type-vxlan";

    pub fn port(
        name: impl Into<String>,
        of_port: Option<u32>,
        interface_type: impl Into<String>,
        mac: impl Into<String>,
        iface_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            of_port,
            interface_type: interface_type.into(),
            mac: mac.into(),
            iface_id: iface_id.into(),
            kind: PortKind::Port,
        }
    }

    pub fn tunnel(
        name: impl Into<String>,
        of_port: Option<u32>,
        mac: impl Into<String>,
        iface_id: impl Into<String>,
        local_ip: impl Into<String>,
        remote_ip: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            of_port,
            interface_type: Self::VXLAN_INTERFACE_TYPE.to_string(),
            mac: mac.into(),
            iface_id: iface_id.into(),
            kind: PortKind::Tunnel {
                local_ip: local_ip.into(),
                remote_ip: remote_ip.into(),
            },
        }
    }

    pub fn is_tunnel(&self) -> bool {
        matches!(self.kind, PortKind::Tunnel { .. })
    }

    /// `(local_ip, remote_ip)` for tunnel ports.
    pub fn tunnel_endpoints(&self) -> Option<(&str, &str)> {
        match &self.kind {
            PortKind::Tunnel {
                local_ip,
                remote_ip,
            } => Some((local_ip.as_str(), remote_ip.as_str())),
            PortKind::Port => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowInfo {
    pub features: Option<Value>,
    pub software: Option<String>,
    pub hardware: Option<String>,
    pub manufacturer: Option<String>,
    pub ip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowTableEntry {
    pub key: u64,
    pub value: String,
}

/// OpenFlow-capable virtual switch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BridgeNode {
    pub node_id: String,
    pub datapath_id: Option<String>,
    pub name: String,
    pub controller_target: String,
    pub controller_connected: bool,
    termination_points: Vec<TerminationPoint>,
    pub flow_info: FlowInfo,
    flow_table: Vec<FlowTableEntry>,
}

impl BridgeNode {
    pub fn new(
        node_id: impl Into<String>,
        datapath_id: Option<String>,
        name: impl Into<String>,
        controller_target: impl Into<String>,
        controller_connected: bool,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            datapath_id,
            name: name.into(),
            controller_target: controller_target.into(),
            controller_connected,
            termination_points: Vec::new(),
            flow_info: FlowInfo::default(),
            flow_table: Vec::new(),
        }
    }

    /// OpenFlow node id (`openflow:<decimal datapath id>`), the join key with the inventory.
    ///
    /// Falls back to the node id when the bridge has no parseable datapath id.
    pub fn flow_name(&self) -> String {
        self.datapath_id
            .as_deref()
            .and_then(parse_datapath_id)
            .map(|dpid| format!("openflow:{dpid}"))
            .unwrap_or_else(|| self.node_id.clone())
    }

    /// Inserts keeping the list ordered by OpenFlow port number (ties keep insertion order).
    pub fn add_termination_point(&mut self, tp: TerminationPoint) {
        let at = self
            .termination_points
            .partition_point(|cur| cur.of_port <= tp.of_port);
        self.termination_points.insert(at, tp);
    }

    pub fn termination_points(&self) -> &[TerminationPoint] {
        &self.termination_points
    }

    pub fn tunnels(&self) -> impl Iterator<Item = &TerminationPoint> {
        self.termination_points.iter().filter(|tp| tp.is_tunnel())
    }

    pub fn add_flow_table_entry(&mut self, entry: FlowTableEntry) {
        let at = self.flow_table.partition_point(|cur| cur.key <= entry.key);
        self.flow_table.insert(at, entry);
    }

    pub fn flow_table(&self) -> &[FlowTableEntry] {
        &self.flow_table
    }
}

/// Parses a colon separated hexadecimal datapath id (`00:00:00:00:00:00:00:01`).
pub fn parse_datapath_id(raw: &str) -> Option<u64> {
    let hex: String = raw.chars().filter(|c| *c != ':').collect();
    if hex.is_empty() {
        return None;
    }
    u64::from_str_radix(&hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_name_uses_decimal_datapath_id() {
        let bridge = BridgeNode::new(
            "ovsdb:1-br0",
            Some("00:00:00:00:00:00:01:0a".to_string()),
            "br0",
            "",
            false,
        );
        assert_eq!(bridge.flow_name(), "openflow:266");
    }

    #[test]
    fn flow_name_falls_back_to_node_id() {
        let missing = BridgeNode::new("ovsdb:1-br0", None, "br0", "", false);
        assert_eq!(missing.flow_name(), "ovsdb:1-br0");

        let garbage = BridgeNode::new("ovsdb:2-br0", Some("zz:zz".to_string()), "br0", "", false);
        assert_eq!(garbage.flow_name(), "ovsdb:2-br0");
    }

    #[test]
    fn termination_points_stay_sorted_by_of_port() {
        let mut bridge = BridgeNode::new("b", None, "br", "", false);
        for (name, port) in [("c", 3), ("a", 1), ("b", 2), ("a2", 1)] {
            bridge.add_termination_point(TerminationPoint::port(name, Some(port), "", "", ""));
        }
        let names: Vec<&str> = bridge
            .termination_points()
            .iter()
            .map(|tp| tp.name.as_str())
            .collect();
        assert_eq!(names, ["a", "a2", "b", "c"]);
    }

    #[test]
    fn flow_table_is_sorted_by_table_key() {
        let mut bridge = BridgeNode::new("b", None, "br", "", false);
        for key in [20, 0, 110] {
            bridge.add_flow_table_entry(FlowTableEntry {
                key,
                value: format!("flow-{key}"),
            });
        }
        let keys: Vec<u64> = bridge.flow_table().iter().map(|e| e.key).collect();
        assert_eq!(keys, [0, 20, 110]);
    }
}
