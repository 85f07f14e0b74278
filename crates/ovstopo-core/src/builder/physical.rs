use super::raw::{
    InventoryDoc, NetworkTopologyDoc, RawConnectionInfo, RawInventoryNode, RawLink, RawNode,
    RawTerminationPoint,
};
use crate::entities::{
    BridgeNode, FlowTableEntry, Link, OvsdbNode, TerminationPoint, TunnelPair,
};
use crate::error::{Error, Result};
use crate::topology::Topology;
use serde::Deserialize;
use serde_json::Value;

const NETWORK_TOPOLOGY: &str = "network-topology";
const INVENTORY: &str = "inventory-node";

/// OpenFlow port number OVS reserves for a bridge's internal (`LOCAL`) port.
const LOCAL_OF_PORT: u32 = 65534;

/// Builds the physical topology from the inventory and network-topology payloads.
///
/// Fails without producing a partial topology when a required field is missing.
pub fn build_topology(inventory: &Value, network_topology: &Value) -> Result<Topology> {
    let net_doc = NetworkTopologyDoc::deserialize(network_topology)?;
    let topologies = net_doc
        .network_topology
        .and_then(|n| n.topology)
        .ok_or_else(|| Error::missing(NETWORK_TOPOLOGY, "network-topology.topology"))?;

    let inv_doc = InventoryDoc::deserialize(inventory)?;
    let inventory_nodes = inv_doc
        .nodes
        .and_then(|n| n.node)
        .ok_or_else(|| Error::missing(INVENTORY, "nodes.node"))?;

    let mut topo = Topology::new();

    for (topo_index, raw_topo) in topologies.into_iter().enumerate() {
        if raw_topo.topology_id.is_none() {
            return Err(Error::missing(
                format!("{NETWORK_TOPOLOGY} topology [{topo_index}]"),
                "topology-id",
            ));
        }

        for node in raw_topo.node.unwrap_or_default() {
            let Some(node_id) = node.node_id.clone() else {
                return Err(Error::missing(NETWORK_TOPOLOGY, "node-id"));
            };
            if node.bridge_name.is_some() {
                topo.register_bridge_node(parse_bridge_node(node_id, node));
            } else if let Some(info) = &node.connection_info {
                topo.register_ovsdb_node(parse_ovsdb_node(node_id, info, &node));
            }
        }

        for link in raw_topo.link.unwrap_or_default() {
            topo.register_link(parse_link(link)?);
        }
    }

    for inv in &inventory_nodes {
        attach_flow_info(&mut topo, inv);
    }

    link_ovsdb_bridges(&mut topo);
    pair_tunnels(&mut topo);
    topo.resolve_links();
    Ok(topo)
}

fn parse_ovsdb_node(node_id: String, info: &RawConnectionInfo, node: &RawNode) -> OvsdbNode {
    let address = |ip: &Option<String>, port: &Option<Value>| {
        format!(
            "{}:{}",
            ip.as_deref().unwrap_or_default(),
            port.as_ref().map(scalar_to_string).unwrap_or_default()
        )
    };

    let local_ip = node
        .other_configs
        .iter()
        .flatten()
        .filter(|c| c.key.as_deref() == Some("local_ip"))
        .filter_map(|c| c.value.clone())
        .last()
        .unwrap_or_default();

    OvsdbNode::new(
        node_id,
        address(&info.local_ip, &info.local_port),
        address(&info.remote_ip, &info.remote_port),
        local_ip,
        node.ovs_version.clone().unwrap_or_default(),
    )
}

fn parse_bridge_node(node_id: String, node: RawNode) -> BridgeNode {
    let (controller_target, controller_connected) = node
        .controller_entry
        .as_ref()
        .and_then(|entries| entries.first())
        .map(|c| {
            (
                c.target.clone().unwrap_or_default(),
                c.is_connected.unwrap_or(false),
            )
        })
        .unwrap_or_default();

    let mut bridge = BridgeNode::new(
        node_id,
        node.datapath_id,
        node.bridge_name.unwrap_or_default(),
        controller_target,
        controller_connected,
    );

    for raw in node.termination_point.unwrap_or_default() {
        let tp = parse_termination_point(raw);
        if tp.of_port == Some(LOCAL_OF_PORT) && (tp.name == "br-ex" || tp.name == "br-int") {
            continue;
        }
        bridge.add_termination_point(tp);
    }
    bridge
}

fn parse_termination_point(tp: RawTerminationPoint) -> TerminationPoint {
    let mut mac = String::new();
    let mut iface_id = String::new();
    let external_ids = tp.port_external_ids.or(tp.interface_external_ids);
    for ext in external_ids.iter().flatten() {
        match ext.key.as_deref() {
            Some("attached-mac") => mac = ext.value.clone().unwrap_or_default(),
            Some("iface-id") => iface_id = ext.value.clone().unwrap_or_default(),
            _ => {}
        }
    }

    let name = tp.name.unwrap_or_default();
    let interface_type = tp.interface_type.unwrap_or_default();
    if interface_type != TerminationPoint::VXLAN_INTERFACE_TYPE {
        return TerminationPoint::port(name, tp.of_port, interface_type, mac, iface_id);
    }

    let mut local_ip = String::new();
    let mut remote_ip = String::new();
    for opt in tp.options.iter().flatten() {
        match opt.option.as_deref() {
            Some("local_ip") => local_ip = opt.value.clone().unwrap_or_default(),
            Some("remote_ip") => remote_ip = opt.value.clone().unwrap_or_default(),
            _ => {}
        }
    }
    TerminationPoint::tunnel(name, tp.of_port, mac, iface_id, local_ip, remote_ip)
}

fn parse_link(link: RawLink) -> Result<Link> {
    let id = link
        .link_id
        .ok_or_else(|| Error::missing(NETWORK_TOPOLOGY, "link-id"))?;
    let source = link
        .source
        .and_then(|s| s.source_node)
        .ok_or_else(|| Error::missing(format!("{NETWORK_TOPOLOGY} link {id}"), "source-node"))?;
    let dest = link
        .destination
        .and_then(|d| d.dest_node)
        .ok_or_else(|| Error::missing(format!("{NETWORK_TOPOLOGY} link {id}"), "dest-node"))?;
    Ok(Link::physical(id, source, dest))
}

/// Copies flow metadata from an inventory node onto the bridge whose flow name matches its id.
fn attach_flow_info(topo: &mut Topology, inv: &RawInventoryNode) {
    let Some(inv_id) = inv.id.as_deref() else {
        return;
    };
    let Some(bridge_id) = topo.bridge_by_flow_name(inv_id).map(|b| b.node_id.clone()) else {
        tracing::debug!(inventory_id = inv_id, "inventory node matches no bridge");
        return;
    };
    let Some(bridge) = topo.bridge_node_mut(&bridge_id) else {
        return;
    };

    bridge.flow_info.features = inv.switch_features.clone();
    bridge.flow_info.software = inv.software.clone();
    bridge.flow_info.hardware = inv.hardware.clone();
    bridge.flow_info.manufacturer = inv.manufacturer.clone();
    bridge.flow_info.ip = inv.ip_address.clone();

    for table in inv.table.iter().flatten() {
        if table.id.is_none() {
            continue;
        }
        for flow in table.flow.iter().flatten() {
            let (Some(key), Some(value)) = (flow.table_id, flow.id.clone()) else {
                continue;
            };
            bridge.add_flow_table_entry(FlowTableEntry { key, value });
        }
    }
}

/// Adds a management-plane link from every OVSDB node to each bridge whose id contains its id.
pub fn link_ovsdb_bridges(topo: &mut Topology) {
    let mut links = Vec::new();
    for ovsdb in topo.ovsdb_nodes() {
        for bridge in topo.bridge_nodes() {
            if bridge.node_id.contains(ovsdb.node_id.as_str()) {
                links.push(Link::bridge_ovs(&ovsdb.node_id, &bridge.node_id));
            }
        }
    }
    for link in links {
        topo.register_link(link);
    }
}

/// Pairs mirrored VXLAN endpoints (`a.local == b.remote && a.remote == b.local`) into tunnel
/// links. Each tunnel joins at most one link; unmatched tunnels produce nothing.
pub fn pair_tunnels(topo: &mut Topology) {
    let mut pool: Vec<(&str, &TerminationPoint)> = topo
        .bridge_nodes()
        .flat_map(|b| b.tunnels().map(move |tp| (b.node_id.as_str(), tp)))
        .collect();

    let mut links = Vec::new();
    while !pool.is_empty() {
        let (bridge_id, tunnel) = pool.remove(0);
        let Some((local, remote)) = tunnel.tunnel_endpoints() else {
            continue;
        };
        let peer = pool.iter().position(|(_, p)| {
            p.tunnel_endpoints()
                .is_some_and(|(p_local, p_remote)| p_remote == local && p_local == remote)
        });
        match peer {
            Some(at) => {
                let (peer_bridge_id, peer_tunnel) = pool.remove(at);
                links.push(Link::tunnel(
                    format!("{}{}", tunnel.name, peer_tunnel.name),
                    bridge_id,
                    peer_bridge_id,
                    TunnelPair {
                        source_port: tunnel.name.clone(),
                        dest_port: peer_tunnel.name.clone(),
                        source_ip: local.to_string(),
                        dest_ip: remote.to_string(),
                    },
                ));
            }
            None => tracing::debug!(
                bridge = bridge_id,
                port = %tunnel.name,
                local,
                remote,
                "tunnel has no peer"
            ),
        }
    }

    for link in links {
        topo.register_link(link);
    }
}

fn scalar_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::LinkKind;

    fn bridge_with_tunnels(id: &str, tunnels: &[(&str, &str, &str)]) -> BridgeNode {
        let mut b = BridgeNode::new(id, None, "br-int", "", false);
        for (i, (name, local, remote)) in tunnels.iter().enumerate() {
            b.add_termination_point(TerminationPoint::tunnel(
                *name,
                Some(i as u32 + 1),
                "",
                "",
                *local,
                *remote,
            ));
        }
        b
    }

    #[test]
    fn mirrored_tunnels_pair_once_and_strays_are_dropped() {
        let mut topo = Topology::new();
        topo.register_bridge_node(bridge_with_tunnels(
            "A",
            &[("vxlan-a", "10.0.0.1", "10.0.0.2"), ("vxlan-x", "10.0.0.1", "10.0.0.9")],
        ));
        topo.register_bridge_node(bridge_with_tunnels("B", &[("vxlan-b", "10.0.0.2", "10.0.0.1")]));

        pair_tunnels(&mut topo);

        let tunnels: Vec<&Link> = topo.links().filter(|l| l.is_tunnel()).collect();
        assert_eq!(tunnels.len(), 1);
        let link = tunnels[0];
        assert_eq!(link.id, "vxlan-avxlan-b");
        assert_eq!((link.src_node_id.as_str(), link.dest_node_id.as_str()), ("A", "B"));
        match &link.kind {
            LinkKind::Tunnel(pair) => {
                assert_eq!(pair.source_ip, "10.0.0.1");
                assert_eq!(pair.dest_ip, "10.0.0.2");
            }
            other => panic!("expected tunnel, got {other:?}"),
        }
    }

    #[test]
    fn each_tunnel_joins_at_most_one_link() {
        // Two identical endpoints on A compete for the single peer on B.
        let mut topo = Topology::new();
        topo.register_bridge_node(bridge_with_tunnels(
            "A",
            &[("t1", "10.0.0.1", "10.0.0.2"), ("t2", "10.0.0.1", "10.0.0.2")],
        ));
        topo.register_bridge_node(bridge_with_tunnels("B", &[("t3", "10.0.0.2", "10.0.0.1")]));
        pair_tunnels(&mut topo);
        assert_eq!(topo.links().filter(|l| l.is_tunnel()).count(), 1);
    }

    #[test]
    fn full_mesh_pairs_every_tunnel_exactly_once() {
        let mut topo = Topology::new();
        topo.register_bridge_node(bridge_with_tunnels(
            "A",
            &[("a-b", "10.0.0.1", "10.0.0.2"), ("a-c", "10.0.0.1", "10.0.0.3")],
        ));
        topo.register_bridge_node(bridge_with_tunnels(
            "B",
            &[("b-a", "10.0.0.2", "10.0.0.1"), ("b-c", "10.0.0.2", "10.0.0.3")],
        ));
        topo.register_bridge_node(bridge_with_tunnels(
            "C",
            &[("c-a", "10.0.0.3", "10.0.0.1"), ("c-b", "10.0.0.3", "10.0.0.2")],
        ));

        pair_tunnels(&mut topo);

        let mut ends: Vec<(&str, &str)> = Vec::new();
        let mut ports: Vec<&str> = Vec::new();
        for link in topo.links().filter(|l| l.is_tunnel()) {
            ends.push((link.src_node_id.as_str(), link.dest_node_id.as_str()));
            let LinkKind::Tunnel(pair) = &link.kind else {
                panic!("expected tunnel, got {:?}", link.kind);
            };
            ports.push(pair.source_port.as_str());
            ports.push(pair.dest_port.as_str());
        }
        assert_eq!(ends, [("A", "B"), ("A", "C"), ("B", "C")]);

        ports.sort_unstable();
        assert_eq!(ports, ["a-b", "a-c", "b-a", "b-c", "c-a", "c-b"]);
    }

    #[test]
    fn bridge_internal_ports_are_dropped() {
        let raw: RawNode = serde_json::from_value(serde_json::json!({
            "node-id": "ovsdb:1/bridge/br-int",
            "ovsdb:bridge-name": "br-int",
            "termination-point": [
                { "ovsdb:name": "br-int", "ovsdb:ofport": 65534 },
                { "ovsdb:name": "tap0", "ovsdb:ofport": 3 }
            ]
        }))
        .expect("raw node");
        let bridge = parse_bridge_node("ovsdb:1/bridge/br-int".to_string(), raw);
        let names: Vec<&str> = bridge.termination_points().iter().map(|tp| tp.name.as_str()).collect();
        assert_eq!(names, ["tap0"]);
    }

    #[test]
    fn connection_info_ports_may_be_numbers_or_strings() {
        let raw: RawNode = serde_json::from_value(serde_json::json!({
            "node-id": "ovsdb:1",
            "ovsdb:connection-info": {
                "local-ip": "10.0.0.9", "local-port": 6640,
                "remote-ip": "10.0.0.1", "remote-port": "43210"
            },
            "ovsdb:openvswitch-other-configs": [
                { "other-config-key": "local_ip", "other-config-value": "192.168.0.1" }
            ],
            "ovsdb:ovs-version": "2.5.0"
        }))
        .expect("raw node");
        let info = raw.connection_info.as_ref().expect("connection info");
        let node = parse_ovsdb_node("ovsdb:1".to_string(), info, &raw);
        assert_eq!(node.manager_address, "10.0.0.9:6640");
        assert_eq!(node.node_address, "10.0.0.1:43210");
        assert_eq!(node.local_ip, "192.168.0.1");
    }
}
