use super::raw::{FloatingIpsDoc, NetworksDoc, PortsDoc, RoutersDoc, SubnetsDoc};
use crate::entities::{ExternalGateway, FloatingIp, Network, Port, Router, SubNet};
use crate::error::{Error, Result};
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;

/// Parsed Neutron collections, before they are cross-referenced with the physical topology.
#[derive(Debug, Clone, Default)]
pub struct NeutronData {
    pub networks: Vec<Network>,
    pub routers: Vec<Router>,
    pub ports: Vec<Port>,
    pub floating_ips: Vec<FloatingIp>,
    /// Every tenant id seen in any collection, first-seen order.
    pub tenants: IndexSet<String>,
}

/// The Neutron REST responses, one JSON document per collection.
#[derive(Debug, Clone, Copy)]
pub struct NeutronPayloads<'a> {
    pub networks: &'a Value,
    pub subnets: &'a Value,
    pub routers: &'a Value,
    pub ports: &'a Value,
    pub floating_ips: &'a Value,
}

impl NeutronData {
    pub fn from_payloads(payloads: NeutronPayloads<'_>) -> Result<Self> {
        let mut tenants = IndexSet::new();
        let mut seen = |tenant: &str| {
            if !tenant.is_empty() && !tenants.contains(tenant) {
                tenants.insert(tenant.to_string());
            }
        };

        let mut subnets_by_network: FxHashMap<String, Vec<SubNet>> = FxHashMap::default();
        for subnet in parse_subnets(payloads.subnets)? {
            seen(&subnet.tenant_id);
            subnets_by_network
                .entry(subnet.network_id.clone())
                .or_default()
                .push(subnet);
        }

        let mut networks = parse_networks(payloads.networks)?;
        for net in &mut networks {
            seen(&net.tenant_id);
            net.subnets = subnets_by_network.remove(&net.id).unwrap_or_default();
        }

        let routers = parse_routers(payloads.routers)?;
        for r in &routers {
            seen(&r.tenant_id);
        }
        let ports = parse_ports(payloads.ports)?;
        for p in &ports {
            seen(&p.tenant_id);
        }
        let floating_ips = parse_floating_ips(payloads.floating_ips)?;
        for f in &floating_ips {
            seen(&f.tenant_id);
        }

        Ok(Self {
            networks,
            routers,
            ports,
            floating_ips,
            tenants,
        })
    }
}

fn required(id: Option<String>, context: &'static str) -> Result<String> {
    id.ok_or_else(|| Error::missing(context, "id"))
}

pub fn parse_subnets(payload: &Value) -> Result<Vec<SubNet>> {
    let doc = SubnetsDoc::deserialize(payload)?;
    let raw = doc
        .subnets
        .ok_or_else(|| Error::missing("neutron subnets", "subnets"))?;
    raw.into_iter()
        .map(|s| {
            Ok(SubNet {
                id: required(s.id, "neutron subnet")?,
                network_id: s.network_id.unwrap_or_default(),
                name: s.name.unwrap_or_default(),
                ip_version: s.ip_version,
                cidr: s.cidr.unwrap_or_default(),
                gateway_ip: s.gateway_ip,
                tenant_id: s.tenant_id.unwrap_or_default(),
            })
        })
        .collect()
}

pub fn parse_networks(payload: &Value) -> Result<Vec<Network>> {
    let doc = NetworksDoc::deserialize(payload)?;
    let raw = doc
        .networks
        .ok_or_else(|| Error::missing("neutron networks", "networks"))?;
    raw.into_iter()
        .map(|n| {
            Ok(Network {
                id: required(n.id, "neutron network")?,
                name: n.name.unwrap_or_default(),
                shared: n.shared.unwrap_or(false),
                status: n.status.unwrap_or_default(),
                external: n.external.unwrap_or(false),
                tenant_id: n.tenant_id.unwrap_or_default(),
                subnets: Vec::new(),
                routers: Vec::new(),
                instances: Vec::new(),
            })
        })
        .collect()
}

pub fn parse_routers(payload: &Value) -> Result<Vec<Router>> {
    let doc = RoutersDoc::deserialize(payload)?;
    let raw = doc
        .routers
        .ok_or_else(|| Error::missing("neutron routers", "routers"))?;
    raw.into_iter()
        .map(|r| {
            Ok(Router {
                id: required(r.id, "neutron router")?,
                name: r.name.unwrap_or_default(),
                status: r.status.unwrap_or_default(),
                tenant_id: r.tenant_id.unwrap_or_default(),
                external_gateway: r.external_gateway_info.map(|g| ExternalGateway {
                    network_id: g.network_id,
                    external_fixed_ips: g.external_fixed_ips.unwrap_or_default(),
                }),
                interfaces: Vec::new(),
            })
        })
        .collect()
}

pub fn parse_ports(payload: &Value) -> Result<Vec<Port>> {
    let doc = PortsDoc::deserialize(payload)?;
    let raw = doc
        .ports
        .ok_or_else(|| Error::missing("neutron ports", "ports"))?;
    raw.into_iter()
        .map(|p| {
            Ok(Port {
                id: required(p.id, "neutron port")?,
                network_id: p.network_id.unwrap_or_default(),
                name: p.name.unwrap_or_default(),
                tenant_id: p.tenant_id.unwrap_or_default(),
                device_id: p.device_id.unwrap_or_default(),
                device_owner: p.device_owner.unwrap_or_default(),
                fixed_ips: p.fixed_ips.unwrap_or_default(),
                mac: p.mac_address.unwrap_or_default(),
                topo_info: Vec::new(),
            })
        })
        .collect()
}

pub fn parse_floating_ips(payload: &Value) -> Result<Vec<FloatingIp>> {
    let doc = FloatingIpsDoc::deserialize(payload)?;
    let raw = doc
        .floatingips
        .ok_or_else(|| Error::missing("neutron floating ips", "floatingips"))?;
    raw.into_iter()
        .map(|f| {
            Ok(FloatingIp {
                id: required(f.id, "neutron floating ip")?,
                floating_network_id: f.floating_network_id.unwrap_or_default(),
                port_id: f.port_id,
                fixed_ip: f.fixed_ip_address,
                floating_ip: f.floating_ip_address.unwrap_or_default(),
                tenant_id: f.tenant_id.unwrap_or_default(),
                status: f.status.unwrap_or_default(),
            })
        })
        .collect()
}
