use ovstopo_core::entities::{
    ExternalGateway, FixedIp, InterfaceKind, Network, Router, RouterInterface,
};
use ovstopo_core::{DirectorySource, LogicalTopology, load_logical_topology};
use ovstopo_render::geom::{Size, point};
use ovstopo_render::logical::{LogicalElement, LogicalLayoutEngine, LogicalObserver};
use ovstopo_render::{Error, LogicalLayoutOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn basic_logical() -> LogicalTopology {
    let source = DirectorySource::new(workspace_root().join("fixtures").join("basic"));
    let (_, logical) =
        futures::executor::block_on(load_logical_topology(&source, &source)).expect("logical");
    logical
}

#[test]
fn networks_form_a_left_to_right_bus() {
    let mut engine = LogicalLayoutEngine::new(LogicalLayoutOptions::default());
    let layout = engine.layout(&basic_logical());

    let origins: Vec<(&str, f64, f64)> = layout
        .networks
        .iter()
        .map(|n| (n.id.as_str(), n.origin.x, n.origin.y))
        .collect();
    assert_eq!(
        origins,
        [
            ("net-ext", 5.0, 15.0),
            ("net-priv", 323.0, 15.0),
            ("net-db", 585.0, 15.0),
            ("net-t2", 795.0, 15.0),
        ]
    );

    let router = layout.router("router1").expect("router");
    assert_eq!(router.origin, point(151.0, 15.0));
    assert_eq!(router.network_id, "net-ext");
}

#[test]
fn instances_stack_below_their_network_in_octet_order() {
    let mut engine = LogicalLayoutEngine::new(LogicalLayoutOptions::default());
    let layout = engine.layout(&basic_logical());

    let private: Vec<(&str, f64, f64)> = layout
        .instances
        .iter()
        .filter(|i| i.network_id == "net-priv")
        .map(|i| (i.ip.as_str(), i.origin.x, i.origin.y))
        .collect();
    assert_eq!(
        private,
        [
            ("10.0.0.3", 413.0, 50.0),
            ("10.0.0.5", 413.0, 128.0),
            ("10.0.0.20", 413.0, 206.0),
        ]
    );

    let dhcp = layout.instance("port-dhcp").expect("dhcp");
    assert!(dhcp.dhcp);
    let web = layout.instance("port-vm1").expect("web");
    assert_eq!(web.floating_ip.as_deref(), Some("172.24.4.10"));
    assert_eq!(web.name, "web");
}

#[test]
fn links_carry_addresses_and_network_colors() {
    let mut engine = LogicalLayoutEngine::new(LogicalLayoutOptions::default());
    let layout = engine.layout(&basic_logical());

    let labels: Vec<&str> = layout.links.iter().map(|l| l.label.as_str()).collect();
    for expected in ["172.24.4.3", "10.0.0.1", "10.0.1.1", "10.0.0.20", "192.168.5.4"] {
        assert!(labels.contains(&expected), "missing link label {expected}");
    }
    assert_eq!(layout.links.len(), 8);

    let public = layout.network("net-ext").expect("public");
    assert_eq!(public.ip, "172.24.4.0");
    assert!(public.external);
    assert_eq!(layout.network("net-priv").map(|n| n.ip.as_str()), Some("10.0.0.0/24"));

    let gateway = layout
        .links
        .iter()
        .find(|l| l.label == "172.24.4.3")
        .expect("gateway link");
    assert_eq!(gateway.color, public.color);
    assert_eq!(gateway.source, point(12.5, 41.0));
    assert_eq!(gateway.target, point(177.0, 22.5));

    let db = layout.network("net-db").expect("db");
    let to_db = layout
        .links
        .iter()
        .find(|l| l.label == "10.0.1.1")
        .expect("router to db");
    assert_eq!(to_db.color, db.color);
    assert_eq!(to_db.target.x, db.origin.x + 7.5);
}

#[test]
fn layout_is_deterministic_for_a_seed() {
    let logical = basic_logical();
    let a = LogicalLayoutEngine::new(LogicalLayoutOptions::default())
        .layout(&logical)
        .clone();
    let b = LogicalLayoutEngine::new(LogicalLayoutOptions::default())
        .layout(&logical)
        .clone();
    assert_eq!(a, b);

    let colors: Vec<&str> = a.networks.iter().map(|n| n.color.as_str()).collect();
    assert!(colors.iter().all(|c| c.starts_with('#') && c.len() == 7));
}

#[test]
fn overflowing_bus_is_scaled_down_to_the_canvas() {
    let mut engine = LogicalLayoutEngine::new(LogicalLayoutOptions::default());
    let layout = engine.layout(&basic_logical());

    assert_eq!(layout.bounds.origin, point(5.0, 15.0));
    assert_eq!(layout.bounds.size, Size::new(928.0, 585.0));
    assert_eq!(layout.scale, 800.0 / 928.0);

    let mut wide = LogicalLayoutEngine::new(LogicalLayoutOptions::new(2000.0, 600.0).expect("opts"));
    assert_eq!(wide.layout(&basic_logical()).scale, 1.0);
}

fn network(id: &str, routers: Vec<Router>) -> Network {
    Network {
        id: id.to_string(),
        name: id.to_string(),
        shared: false,
        status: "ACTIVE".to_string(),
        external: false,
        tenant_id: "t".to_string(),
        subnets: Vec::new(),
        routers,
        instances: Vec::new(),
    }
}

fn interface(network_id: &str, ip: &str) -> RouterInterface {
    RouterInterface {
        id: format!("itf-{network_id}"),
        network_id: network_id.to_string(),
        ip: Some(FixedIp {
            subnet_id: None,
            ip_address: ip.to_string(),
        }),
        mac: String::new(),
        kind: InterfaceKind::Interface,
        tenant_id: "t".to_string(),
        topo_info: Vec::new(),
    }
}

#[test]
fn each_network_is_placed_once_even_through_router_cycles() {
    let router = Router {
        id: "r".to_string(),
        name: "r".to_string(),
        status: "ACTIVE".to_string(),
        tenant_id: "t".to_string(),
        external_gateway: Some(ExternalGateway {
            network_id: Some("a".to_string()),
            external_fixed_ips: Vec::new(),
        }),
        // Points back at its own gateway network and twice at `b`.
        interfaces: vec![
            interface("a", "1.1.1.1"),
            interface("b", "2.2.2.1"),
            interface("b", "2.2.2.2"),
        ],
    };
    let mut logical = LogicalTopology::default();
    logical.networks = vec![network("b", Vec::new()), network("a", vec![router])];

    let mut engine = LogicalLayoutEngine::new(LogicalLayoutOptions::default());
    let layout = engine.layout(&logical);
    let ids: Vec<&str> = layout.networks.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["a", "b"], "routed networks come first");
    assert_eq!(layout.links.len(), 2, "one gateway bar, one bar to b");
}

#[derive(Default)]
struct Clicks(Mutex<Vec<String>>);

impl LogicalObserver for Clicks {
    fn on_click(&self, element: LogicalElement<'_>) {
        let id = match element {
            LogicalElement::Network(n) => format!("network {}", n.id),
            LogicalElement::Router(r) => format!("router {}", r.id),
            LogicalElement::Instance(i) => format!("instance {}", i.id),
        };
        self.0.lock().expect("lock").push(id);
    }
}

#[test]
fn observer_sees_clicks_on_placed_elements() {
    let clicks = Arc::new(Clicks::default());
    let mut engine =
        LogicalLayoutEngine::with_observer(LogicalLayoutOptions::default(), clicks.clone());
    assert!(matches!(engine.click("router1"), Err(Error::UnknownNode { .. })));

    engine.layout(&basic_logical());
    engine.click("router1").expect("router");
    engine.click("port-vm2").expect("instance");
    engine.double_click("net-db").expect("default no-op");
    assert!(engine.click("nope").is_err());

    let seen = clicks.0.lock().expect("lock").clone();
    assert_eq!(seen, ["router router1", "instance port-vm2"]);
}
