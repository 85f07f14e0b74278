use super::neutron::{Instance, Network, Router};
use super::physical::{BridgeNode, OvsdbNode};
use serde::Serialize;

/// Tabbed key/value presentation of an entity, consumed by detail panels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrettyView {
    pub title: String,
    pub tabs: Vec<PrettyTab>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrettyTab {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

impl PrettyTab {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    fn entry_opt(self, key: &str, value: Option<&str>) -> Self {
        self.entry(key, value.unwrap_or("-"))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl PrettyView {
    pub fn tab(&self, name: &str) -> Option<&PrettyTab> {
        self.tabs.iter().find(|t| t.name == name)
    }
}

pub trait Pretty {
    fn pretty(&self) -> PrettyView;
}

impl Pretty for OvsdbNode {
    fn pretty(&self) -> PrettyView {
        PrettyView {
            title: self.node_id.clone(),
            tabs: vec![
                PrettyTab::new("Info")
                    .entry("Node id", &self.node_id)
                    .entry("Manager", &self.manager_address)
                    .entry("Address", &self.node_address)
                    .entry("Local IP", &self.local_ip)
                    .entry("OVS version", &self.ovs_version),
            ],
        }
    }
}

impl Pretty for BridgeNode {
    fn pretty(&self) -> PrettyView {
        let info = PrettyTab::new("Info")
            .entry("Name", &self.name)
            .entry("Node id", &self.node_id)
            .entry("Flow name", self.flow_name())
            .entry_opt("Datapath id", self.datapath_id.as_deref())
            .entry("Controller", &self.controller_target)
            .entry("Connected", self.controller_connected.to_string());

        let flow = PrettyTab::new("Flow")
            .entry_opt("Manufacturer", self.flow_info.manufacturer.as_deref())
            .entry_opt("Hardware", self.flow_info.hardware.as_deref())
            .entry_opt("Software", self.flow_info.software.as_deref())
            .entry_opt("IP", self.flow_info.ip.as_deref());

        let mut ports = PrettyTab::new("Ports");
        for tp in self.termination_points() {
            let of_port = tp.of_port.map(|p| p.to_string()).unwrap_or_else(|| "-".into());
            let value = match tp.tunnel_endpoints() {
                Some((local, remote)) => format!("{of_port} vxlan {local} -> {remote}"),
                None => format!("{of_port} {}", tp.mac),
            };
            ports = ports.entry(&tp.name, value);
        }

        let mut tables = PrettyTab::new("Tables");
        for e in self.flow_table() {
            tables = tables.entry(e.key.to_string(), &e.value);
        }

        PrettyView {
            title: self.name.clone(),
            tabs: vec![info, flow, ports, tables],
        }
    }
}

impl Pretty for Network {
    fn pretty(&self) -> PrettyView {
        let info = PrettyTab::new("Info")
            .entry("Name", &self.name)
            .entry("Id", &self.id)
            .entry("Tenant", &self.tenant_id)
            .entry("Status", &self.status)
            .entry("Shared", self.shared.to_string())
            .entry("External", self.external.to_string())
            .entry("IP", self.display_ip());

        let mut subnets = PrettyTab::new("Subnets");
        for s in &self.subnets {
            subnets = subnets.entry(&s.name, &s.cidr);
        }

        PrettyView {
            title: self.name.clone(),
            tabs: vec![info, subnets],
        }
    }
}

impl Pretty for Router {
    fn pretty(&self) -> PrettyView {
        let info = PrettyTab::new("Info")
            .entry("Name", &self.name)
            .entry("Id", &self.id)
            .entry("Tenant", &self.tenant_id)
            .entry("Status", &self.status)
            .entry_opt("Gateway", self.gateway_ip());

        let mut interfaces = PrettyTab::new("Interfaces");
        for itf in &self.interfaces {
            let ip = itf.ip.as_ref().map(|ip| ip.ip_address.as_str()).unwrap_or("-");
            interfaces = interfaces.entry(&itf.id, format!("{ip} {}", itf.mac));
        }

        PrettyView {
            title: self.name.clone(),
            tabs: vec![info, interfaces],
        }
    }
}

impl Pretty for Instance {
    fn pretty(&self) -> PrettyView {
        let mut info = PrettyTab::new("Info")
            .entry("Name", &self.name)
            .entry("Id", &self.id)
            .entry("Owner", &self.device_owner)
            .entry("IP", &self.ip)
            .entry("MAC", &self.mac)
            .entry_opt(
                "Floating IP",
                self.floating_ip.as_ref().map(|f| f.floating_ip.as_str()),
            );

        if let Some(topo) = self.topo_info.first() {
            info = info
                .entry("Bridge", &topo.bridge_name)
                .entry("Port", &topo.tp_name);
        }

        PrettyView {
            title: self.name.clone(),
            tabs: vec![info],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TerminationPoint;

    #[test]
    fn bridge_view_lists_ports_in_port_order() {
        let mut bridge = BridgeNode::new(
            "ovsdb:1-br0",
            Some("00:00:00:00:00:00:00:01".into()),
            "br0",
            "tcp:10.0.0.9:6653",
            true,
        );
        bridge.add_termination_point(TerminationPoint::tunnel(
            "vxlan-1", Some(2), "", "", "10.0.0.1", "10.0.0.2",
        ));
        bridge.add_termination_point(TerminationPoint::port("tap1", Some(1), "", "fa:16:3e:00:00:01", ""));

        let view = bridge.pretty();
        assert_eq!(view.title, "br0");
        assert_eq!(view.tab("Info").and_then(|t| t.get("Flow name")), Some("openflow:1"));
        let ports = view.tab("Ports").expect("ports tab");
        assert_eq!(ports.entries[0].0, "tap1");
        assert_eq!(ports.entries[1].1, "2 vxlan 10.0.0.1 -> 10.0.0.2");
    }

    #[test]
    fn ovsdb_view_has_single_info_tab() {
        let node = OvsdbNode::new("ovsdb:1", "10.0.0.9:6640", "10.0.0.1:53412", "10.0.0.1", "2.5.0");
        let view = node.pretty();
        assert_eq!(view.tabs.len(), 1);
        assert_eq!(view.tabs[0].get("OVS version"), Some("2.5.0"));
    }
}
