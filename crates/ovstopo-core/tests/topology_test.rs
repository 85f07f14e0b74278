use ovstopo_core::entities::LinkKind;
use ovstopo_core::{DirectorySource, Error, Topology, build_topology, load_topology};
use serde_json::{Value, json};
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn basic_source() -> DirectorySource {
    DirectorySource::new(workspace_root().join("fixtures").join("basic"))
}

fn basic_topology() -> Topology {
    futures::executor::block_on(load_topology(&basic_source())).expect("topology ok")
}

#[test]
fn basic_fixture_classifies_nodes() {
    let topo = basic_topology();
    let bridges: Vec<&str> = topo.bridge_nodes().map(|b| b.node_id.as_str()).collect();
    assert_eq!(
        bridges,
        [
            "ovsdb:1/bridge/br-int",
            "ovsdb:1/bridge/br-ex",
            "ovsdb:2/bridge/br-int"
        ]
    );
    let ovsdb: Vec<&str> = topo.ovsdb_nodes().map(|o| o.node_id.as_str()).collect();
    assert_eq!(ovsdb, ["ovsdb:1", "ovsdb:2"]);

    let node = topo.ovsdb_node("ovsdb:1").expect("ovsdb:1");
    assert_eq!(node.manager_address, "192.168.56.1:6640");
    assert_eq!(node.local_ip, "10.0.0.1");
}

#[test]
fn bridge_ports_are_sorted_and_internal_ports_dropped() {
    let topo = basic_topology();
    let br_int = topo.bridge_node("ovsdb:1/bridge/br-int").expect("br-int");
    let ports: Vec<(Option<u32>, &str)> = br_int
        .termination_points()
        .iter()
        .map(|tp| (tp.of_port, tp.name.as_str()))
        .collect();
    assert_eq!(
        ports,
        [
            (Some(1), "vxlan-10.0.0.2"),
            (Some(2), "vxlan-10.0.0.9"),
            (Some(3), "tap-vm1"),
            (Some(4), "tap-dhcp"),
            (Some(5), "qr-ri1"),
        ]
    );
    assert_eq!(br_int.controller_target, "tcp:192.168.56.1:6653");
    assert!(br_int.controller_connected);
    assert_eq!(br_int.termination_points()[3].iface_id, "port-dhcp");
}

#[test]
fn inventory_flow_info_joins_on_flow_name() {
    let topo = basic_topology();
    let br_int = topo.bridge_node("ovsdb:1/bridge/br-int").expect("br-int");
    assert_eq!(br_int.flow_name(), "openflow:1");
    assert_eq!(br_int.flow_info.manufacturer.as_deref(), Some("Nicira, Inc."));
    assert_eq!(
        br_int
            .flow_info
            .features
            .as_ref()
            .and_then(|f| f.get("max_tables"))
            .and_then(Value::as_u64),
        Some(254)
    );
    let table: Vec<(u64, &str)> = br_int
        .flow_table()
        .iter()
        .map(|e| (e.key, e.value.as_str()))
        .collect();
    assert_eq!(table, [(0, "LLDP"), (0, "TableOffset"), (110, "DHCP_ACCEPT")]);

    // No inventory node for the external bridge.
    let br_ex = topo.bridge_node("ovsdb:1/bridge/br-ex").expect("br-ex");
    assert!(br_ex.flow_info.hardware.is_none());
}

#[test]
fn links_cover_physical_management_and_tunnel_edges() {
    let topo = basic_topology();
    let kinds: Vec<&str> = topo.links().map(|l| l.type_name()).collect();
    assert_eq!(
        kinds,
        ["link", "bridgeOvsLink", "bridgeOvsLink", "bridgeOvsLink", "tunnel"]
    );

    let physical = topo.link("openflow:1:1").expect("physical link");
    assert_eq!(physical.src_node_id, "ovsdb:1/bridge/br-int");
    assert_eq!(physical.dest_node_id, "ovsdb:2/bridge/br-int");

    let tunnels: Vec<_> = topo.links().filter(|l| l.is_tunnel()).collect();
    assert_eq!(tunnels.len(), 1, "the stray vxlan-10.0.0.9 endpoint has no peer");
    let LinkKind::Tunnel(pair) = &tunnels[0].kind else {
        panic!("expected tunnel kind");
    };
    assert_eq!(pair.source_port, "vxlan-10.0.0.2");
    assert_eq!(pair.dest_port, "vxlan-10.0.0.1");
}

#[test]
fn every_link_index_matches_node_order() {
    let topo = basic_topology();
    let ids: Vec<&str> = topo.nodes().map(|n| n.node_id()).collect();
    for link in topo.links() {
        let source = link.source.expect("resolved source");
        let target = link.target.expect("resolved target");
        assert_eq!(ids[source], link.src_node_id, "link {}", link.id);
        assert_eq!(ids[target], link.dest_node_id, "link {}", link.id);
    }
}

#[test]
fn ovsdb_bridge_link_is_synthesized_by_id_containment() {
    let network_topology = json!({
        "network-topology": { "topology": [{
            "topology-id": "ovsdb:1",
            "node": [
                { "node-id": "ovsdb:1", "ovsdb:connection-info": { "local-ip": "10.0.0.9" } },
                {
                    "node-id": "ovsdb:1-br0",
                    "ovsdb:bridge-name": "br0",
                    "ovsdb:datapath-id": "00:00:00:00:00:01"
                }
            ]
        }]}
    });
    let inventory = json!({ "nodes": { "node": [{ "id": "openflow:1" }] } });

    let topo = build_topology(&inventory, &network_topology).expect("topology");
    assert_eq!(topo.bridge_node("ovsdb:1-br0").map(|b| b.flow_name()).as_deref(), Some("openflow:1"));

    let links: Vec<_> = topo.links().collect();
    assert_eq!(links.len(), 1);
    assert!(matches!(links[0].kind, LinkKind::BridgeOvs));
    assert_eq!(links[0].src_node_id, "ovsdb:1");
    assert_eq!(links[0].dest_node_id, "ovsdb:1-br0");
    assert_eq!((links[0].source, links[0].target), (Some(1), Some(0)));
}

#[test]
fn missing_required_fields_fail_fast() {
    let inventory = json!({ "nodes": { "node": [] } });

    let err = build_topology(&inventory, &json!({})).unwrap_err();
    assert!(matches!(err, Error::MissingField { field: "network-topology.topology", .. }));

    let no_topology_id = json!({ "network-topology": { "topology": [{ "node": [] }] } });
    let err = build_topology(&inventory, &no_topology_id).unwrap_err();
    assert!(matches!(err, Error::MissingField { field: "topology-id", .. }));
    assert!(err.to_string().contains("topology [0]"));

    let no_node_id = json!({ "network-topology": { "topology": [{
        "topology-id": "ovsdb:1",
        "node": [{ "ovsdb:bridge-name": "br0" }]
    }]}});
    let err = build_topology(&inventory, &no_node_id).unwrap_err();
    assert!(matches!(err, Error::MissingField { field: "node-id", .. }));

    let ok_topology = json!({ "network-topology": { "topology": [{ "topology-id": "t" }] } });
    let err = build_topology(&json!({ "nodes": {} }), &ok_topology).unwrap_err();
    assert!(matches!(err, Error::MissingField { field: "nodes.node", .. }));
}

#[test]
fn topology_without_node_or_link_arrays_is_empty() {
    let topo = build_topology(
        &json!({ "nodes": { "node": [] } }),
        &json!({ "network-topology": { "topology": [{ "topology-id": "empty" }] } }),
    )
    .expect("empty topology");
    assert_eq!(topo.node_count(), 0);
    assert_eq!(topo.links().len(), 0);
}

#[test]
fn unreadable_fixture_reports_the_path() {
    let source = DirectorySource::new(workspace_root().join("fixtures").join("does-not-exist"));
    let err = futures::executor::block_on(load_topology(&source)).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.to_string().contains("does-not-exist"));
}
