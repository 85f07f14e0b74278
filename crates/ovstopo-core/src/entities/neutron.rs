use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedIp {
    #[serde(default)]
    pub subnet_id: Option<String>,
    pub ip_address: String,
}

/// A physical attachment of a Neutron port: the bridge port whose `iface-id` is the port id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopoInfo {
    pub bridge_id: String,
    pub bridge_name: String,
    pub tp_name: String,
    pub of_port: Option<u32>,
    pub ovsdb_node_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubNet {
    pub id: String,
    pub network_id: String,
    pub name: String,
    pub ip_version: Option<u8>,
    pub cidr: String,
    pub gateway_ip: Option<String>,
    pub tenant_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloatingIp {
    pub id: String,
    pub floating_network_id: String,
    pub port_id: Option<String>,
    pub fixed_ip: Option<String>,
    pub floating_ip: String,
    pub tenant_id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    pub id: String,
    pub network_id: String,
    pub name: String,
    pub ip: String,
    pub mac: String,
    /// Neutron `device_owner` (`compute:nova`, `network:dhcp`, ...).
    pub device_owner: String,
    pub tenant_id: String,
    pub topo_info: Vec<TopoInfo>,
    pub floating_ip: Option<FloatingIp>,
}

impl Instance {
    pub fn is_dhcp(&self) -> bool {
        self.device_owner == "network:dhcp"
    }

    /// Attaches the first floating IP of the same tenant mapped onto this instance's fixed IP.
    pub fn attach_floating_ip(&mut self, floating_ips: &[FloatingIp]) {
        self.floating_ip = floating_ips
            .iter()
            .find(|fip| {
                fip.tenant_id == self.tenant_id && fip.fixed_ip.as_deref() == Some(self.ip.as_str())
            })
            .cloned();
    }

    pub fn last_octet(&self) -> Option<u32> {
        last_octet(&self.ip)
    }
}

/// Numeric value of the last dotted-decimal group of `ip`.
pub fn last_octet(ip: &str) -> Option<u32> {
    ip.rsplit('.').next()?.trim().parse().ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceKind {
    Gateway,
    Interface,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouterInterface {
    pub id: String,
    pub network_id: String,
    pub ip: Option<FixedIp>,
    pub mac: String,
    pub kind: InterfaceKind,
    pub tenant_id: String,
    pub topo_info: Vec<TopoInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExternalGateway {
    pub network_id: Option<String>,
    pub external_fixed_ips: Vec<FixedIp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Router {
    pub id: String,
    pub name: String,
    pub status: String,
    pub tenant_id: String,
    pub external_gateway: Option<ExternalGateway>,
    pub interfaces: Vec<RouterInterface>,
}

impl Router {
    pub fn external_network_id(&self) -> Option<&str> {
        self.external_gateway.as_ref()?.network_id.as_deref()
    }

    /// First external fixed IP of the gateway.
    pub fn gateway_ip(&self) -> Option<&str> {
        self.external_gateway
            .as_ref()?
            .external_fixed_ips
            .first()
            .map(|ip| ip.ip_address.as_str())
    }

    /// Interfaces that attach the router to an internal network.
    pub fn internal_interfaces(&self) -> impl Iterator<Item = &RouterInterface> {
        self.interfaces
            .iter()
            .filter(|itf| itf.kind == InterfaceKind::Interface)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceOwner {
    RouterGateway,
    RouterInterface,
    Dhcp,
    Compute(String),
    Other(String),
}

impl DeviceOwner {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "network:router_gateway" => Self::RouterGateway,
            "network:router_interface" => Self::RouterInterface,
            "network:dhcp" => Self::Dhcp,
            other if other.starts_with("compute:") => Self::Compute(other.to_string()),
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Port {
    pub id: String,
    pub network_id: String,
    pub name: String,
    pub tenant_id: String,
    pub device_id: String,
    pub device_owner: String,
    pub fixed_ips: Vec<FixedIp>,
    pub mac: String,
    pub topo_info: Vec<TopoInfo>,
}

impl Port {
    pub fn owner(&self) -> DeviceOwner {
        DeviceOwner::parse(&self.device_owner)
    }

    pub fn first_ip(&self) -> Option<&FixedIp> {
        self.fixed_ips.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Network {
    pub id: String,
    pub name: String,
    pub shared: bool,
    pub status: String,
    pub external: bool,
    pub tenant_id: String,
    pub subnets: Vec<SubNet>,
    pub routers: Vec<Router>,
    pub instances: Vec<Instance>,
}

impl Network {
    /// Display address: the subnet CIDRs, or for an external network the `/24` of the
    /// first router's external gateway address (`a.b.c.0`).
    pub fn display_ip(&self) -> String {
        if self.external {
            return self
                .routers
                .iter()
                .find_map(Router::gateway_ip)
                .map(network_of)
                .unwrap_or_default();
        }
        self.subnets
            .iter()
            .map(|s| s.cidr.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn has_subnet(&self, subnet_id: &str) -> bool {
        self.subnets.iter().any(|s| s.id == subnet_id)
    }

    /// Sorts instances by the numeric value of the last IP octet; unparseable addresses go last.
    pub fn sort_instances(&mut self) {
        self.instances
            .sort_by_key(|inst| inst.last_octet().unwrap_or(u32::MAX));
    }
}

fn network_of(ip: &str) -> String {
    match ip.rfind('.') {
        Some(pos) => format!("{}.0", &ip[..pos]),
        None => ip.to_string(),
    }
}
