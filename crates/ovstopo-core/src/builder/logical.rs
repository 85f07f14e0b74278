use super::neutron::NeutronData;
use crate::entities::{
    DeviceOwner, Instance, InterfaceKind, Network, Port, Router, RouterInterface, TopoInfo,
};
use crate::topology::Topology;
use serde::Serialize;

/// Tenant-facing view: Neutron networks with their routers and instances, cross-referenced
/// with the bridge ports that host them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogicalTopology {
    pub networks: Vec<Network>,
    pub routers: Vec<Router>,
    pub ports: Vec<Port>,
    tenants: Vec<String>,
}

impl LogicalTopology {
    pub fn tenants(&self) -> &[String] {
        &self.tenants
    }

    pub fn network(&self, id: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.id == id)
    }

    pub fn router(&self, id: &str) -> Option<&Router> {
        self.routers.iter().find(|r| r.id == id)
    }
}

/// Joins Neutron ports with bridge termination points and distributes them onto routers
/// (interfaces) and networks (instances).
pub fn build_logical_topology(data: NeutronData, topo: &Topology) -> LogicalTopology {
    let NeutronData {
        mut networks,
        mut routers,
        mut ports,
        floating_ips,
        tenants,
    } = data;

    for port in &mut ports {
        port.topo_info = topo_info_for(topo, &port.id);
        if port.topo_info.is_empty() {
            tracing::debug!(port_id = %port.id, "port is not attached to any bridge port");
        }

        match port.owner() {
            owner @ (DeviceOwner::RouterGateway | DeviceOwner::RouterInterface) => {
                let Some(router) = routers.iter_mut().find(|r| r.id == port.device_id) else {
                    tracing::debug!(port_id = %port.id, router_id = %port.device_id, "router not found");
                    continue;
                };
                router.interfaces.push(RouterInterface {
                    id: port.id.clone(),
                    network_id: port.network_id.clone(),
                    ip: port.first_ip().cloned(),
                    mac: port.mac.clone(),
                    kind: if owner == DeviceOwner::RouterGateway {
                        InterfaceKind::Gateway
                    } else {
                        InterfaceKind::Interface
                    },
                    tenant_id: port.tenant_id.clone(),
                    topo_info: port.topo_info.clone(),
                });
            }
            DeviceOwner::Compute(_) | DeviceOwner::Dhcp => {
                let Some(network) = networks.iter_mut().find(|n| n.id == port.network_id) else {
                    tracing::debug!(port_id = %port.id, network_id = %port.network_id, "network not found");
                    continue;
                };
                let mut inst = Instance {
                    id: port.id.clone(),
                    network_id: port.network_id.clone(),
                    name: port.name.clone(),
                    ip: port
                        .first_ip()
                        .map(|ip| ip.ip_address.clone())
                        .unwrap_or_default(),
                    mac: port.mac.clone(),
                    device_owner: port.device_owner.clone(),
                    tenant_id: port.tenant_id.clone(),
                    topo_info: port.topo_info.clone(),
                    floating_ip: None,
                };
                inst.attach_floating_ip(&floating_ips);
                network.instances.push(inst);
            }
            DeviceOwner::Other(_) => {}
        }
    }

    for network in &mut networks {
        network.routers = routers
            .iter()
            .filter(|r| r.external_network_id() == Some(network.id.as_str()))
            .cloned()
            .collect();
        network.sort_instances();
    }

    LogicalTopology {
        networks,
        routers,
        ports,
        tenants: tenants.into_iter().collect(),
    }
}

fn topo_info_for(topo: &Topology, port_id: &str) -> Vec<TopoInfo> {
    let mut out = Vec::new();
    if port_id.is_empty() {
        return out;
    }
    for bridge in topo.bridge_nodes() {
        for tp in bridge.termination_points() {
            if tp.iface_id == port_id {
                out.push(TopoInfo {
                    bridge_id: bridge.node_id.clone(),
                    bridge_name: bridge.name.clone(),
                    tp_name: tp.name.clone(),
                    of_port: tp.of_port,
                    ovsdb_node_id: topo.ovsdb_for_bridge(bridge).map(|o| o.node_id.clone()),
                });
            }
        }
    }
    out
}
