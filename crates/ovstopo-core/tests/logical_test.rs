use ovstopo_core::entities::{InterfaceKind, Pretty};
use ovstopo_core::{
    CacheOptions, CachedSource, DirectorySource, LogicalTopology, Topology, load_logical_topology,
};
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn basic() -> (Topology, LogicalTopology) {
    let source = DirectorySource::new(workspace_root().join("fixtures").join("basic"));
    futures::executor::block_on(load_logical_topology(&source, &source)).expect("logical ok")
}

#[test]
fn instances_are_sorted_by_numeric_last_octet() {
    let (_, logical) = basic();
    let private = logical.network("net-priv").expect("private network");
    let ips: Vec<&str> = private.instances.iter().map(|i| i.ip.as_str()).collect();
    assert_eq!(ips, ["10.0.0.3", "10.0.0.5", "10.0.0.20"]);
    assert!(private.instances[0].is_dhcp());
}

#[test]
fn router_ports_become_interfaces() {
    let (_, logical) = basic();
    let router = logical.router("router1").expect("router1");
    let kinds: Vec<(&str, InterfaceKind)> = router
        .interfaces
        .iter()
        .map(|i| (i.network_id.as_str(), i.kind))
        .collect();
    assert_eq!(
        kinds,
        [
            ("net-ext", InterfaceKind::Gateway),
            ("net-priv", InterfaceKind::Interface),
            ("net-db", InterfaceKind::Interface),
        ]
    );
    assert_eq!(router.interfaces[1].topo_info[0].tp_name, "qr-ri1");
    assert!(router.interfaces[2].topo_info.is_empty());
}

#[test]
fn external_network_owns_the_gateway_router() {
    let (_, logical) = basic();
    let public = logical.network("net-ext").expect("public network");
    assert_eq!(public.routers.len(), 1);
    assert_eq!(public.display_ip(), "172.24.4.0");
    assert!(logical.network("net-priv").expect("private").routers.is_empty());
}

#[test]
fn ports_join_termination_points_and_ovsdb_nodes() {
    let (_, logical) = basic();
    let vm2 = logical
        .network("net-priv")
        .and_then(|n| n.instances.iter().find(|i| i.id == "port-vm2"))
        .expect("vm2");
    let info = &vm2.topo_info[0];
    assert_eq!(info.bridge_id, "ovsdb:2/bridge/br-int");
    assert_eq!(info.of_port, Some(3));
    assert_eq!(info.ovsdb_node_id.as_deref(), Some("ovsdb:2"));

    let lab_vm = logical
        .network("net-t2")
        .map(|n| &n.instances[0])
        .expect("lab vm");
    assert!(lab_vm.topo_info.is_empty());
}

#[test]
fn floating_ip_is_attached_by_tenant_and_fixed_ip() {
    let (_, logical) = basic();
    let private = logical.network("net-priv").expect("private");
    let web = private
        .instances
        .iter()
        .find(|i| i.ip == "10.0.0.20")
        .expect("web");
    assert_eq!(
        web.floating_ip.as_ref().map(|f| f.floating_ip.as_str()),
        Some("172.24.4.10")
    );
    assert!(private.instances.iter().filter(|i| i.floating_ip.is_some()).count() == 1);

    let view = web.pretty();
    assert_eq!(view.tabs[0].get("Floating IP"), Some("172.24.4.10"));
    assert_eq!(view.tabs[0].get("Bridge"), Some("br-int"));
}

#[test]
fn tenants_are_collected_in_first_seen_order() {
    let (_, logical) = basic();
    assert_eq!(logical.tenants(), ["admin", "t1", "t2"]);
}

#[test]
fn tenant_selection_returns_hosting_nodes() {
    let (_, logical) = basic();
    let selection = logical.extract_by_tenant("t1");
    assert_eq!(
        selection.bridge_ids,
        ["ovsdb:1/bridge/br-int", "ovsdb:2/bridge/br-int"]
    );
    assert_eq!(selection.ovsdb_ids, ["ovsdb:1", "ovsdb:2"]);

    assert!(logical.extract_by_tenant("t2").is_empty());
    assert!(logical.extract_by_tenant("nobody").is_empty());
}

#[test]
fn subnet_selection_follows_the_owning_network() {
    let (_, logical) = basic();
    let selection = logical.extract_by_subnets(&["sub-db"]);
    assert_eq!(selection.bridge_ids, ["ovsdb:2/bridge/br-int"]);
    assert_eq!(selection.ovsdb_ids, ["ovsdb:2"]);
    assert_eq!(
        selection.node_ids().collect::<Vec<_>>(),
        ["ovsdb:2/bridge/br-int", "ovsdb:2"]
    );
}

#[test]
fn cached_source_builds_the_same_topology() {
    let dir = DirectorySource::new(workspace_root().join("fixtures").join("basic"));
    let cached = CachedSource::new(dir, CacheOptions::default());
    let (topo_a, logical_a) =
        futures::executor::block_on(load_logical_topology(&cached, &cached)).expect("first");
    let (topo_b, logical_b) =
        futures::executor::block_on(load_logical_topology(&cached, &cached)).expect("second");
    assert_eq!(topo_a.node_count(), topo_b.node_count());
    assert_eq!(logical_a.networks, logical_b.networks);
}
