//! Wire shapes of the RESTCONF (network-topology, inventory) and Neutron payloads.
//!
//! Everything is optional here; the builders decide which fields are required.

use crate::entities::FixedIp;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct NetworkTopologyDoc {
    #[serde(rename = "network-topology")]
    pub network_topology: Option<NetworkTopology>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NetworkTopology {
    pub topology: Option<Vec<RawTopology>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTopology {
    #[serde(rename = "topology-id")]
    pub topology_id: Option<String>,
    pub node: Option<Vec<RawNode>>,
    pub link: Option<Vec<RawLink>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNode {
    #[serde(rename = "node-id")]
    pub node_id: Option<String>,
    #[serde(rename = "ovsdb:bridge-name")]
    pub bridge_name: Option<String>,
    #[serde(rename = "ovsdb:datapath-id")]
    pub datapath_id: Option<String>,
    #[serde(rename = "ovsdb:controller-entry")]
    pub controller_entry: Option<Vec<RawController>>,
    #[serde(rename = "termination-point")]
    pub termination_point: Option<Vec<RawTerminationPoint>>,
    #[serde(rename = "ovsdb:connection-info")]
    pub connection_info: Option<RawConnectionInfo>,
    #[serde(rename = "ovsdb:openvswitch-other-configs")]
    pub other_configs: Option<Vec<RawOtherConfig>>,
    #[serde(rename = "ovsdb:ovs-version")]
    pub ovs_version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawController {
    pub target: Option<String>,
    #[serde(rename = "is-connected")]
    pub is_connected: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawConnectionInfo {
    #[serde(rename = "local-ip")]
    pub local_ip: Option<String>,
    #[serde(rename = "local-port")]
    pub local_port: Option<Value>,
    #[serde(rename = "remote-ip")]
    pub remote_ip: Option<String>,
    #[serde(rename = "remote-port")]
    pub remote_port: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawOtherConfig {
    #[serde(rename = "other-config-key")]
    pub key: Option<String>,
    #[serde(rename = "other-config-value")]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTerminationPoint {
    #[serde(rename = "ovsdb:name")]
    pub name: Option<String>,
    #[serde(rename = "ovsdb:ofport")]
    pub of_port: Option<u32>,
    #[serde(rename = "ovsdb:interface-type")]
    pub interface_type: Option<String>,
    #[serde(rename = "ovsdb:port-external-ids")]
    pub port_external_ids: Option<Vec<RawExternalId>>,
    #[serde(rename = "ovsdb:interface-external-ids")]
    pub interface_external_ids: Option<Vec<RawExternalId>>,
    #[serde(rename = "ovsdb:options")]
    pub options: Option<Vec<RawOption>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawExternalId {
    #[serde(rename = "external-id-key")]
    pub key: Option<String>,
    #[serde(rename = "external-id-value")]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawOption {
    pub option: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLink {
    #[serde(rename = "link-id")]
    pub link_id: Option<String>,
    pub source: Option<RawLinkSource>,
    pub destination: Option<RawLinkDestination>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLinkSource {
    #[serde(rename = "source-node")]
    pub source_node: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLinkDestination {
    #[serde(rename = "dest-node")]
    pub dest_node: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InventoryDoc {
    pub nodes: Option<InventoryNodes>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InventoryNodes {
    pub node: Option<Vec<RawInventoryNode>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawInventoryNode {
    pub id: Option<String>,
    #[serde(rename = "flow-node-inventory:manufacturer")]
    pub manufacturer: Option<String>,
    #[serde(rename = "flow-node-inventory:hardware")]
    pub hardware: Option<String>,
    #[serde(rename = "flow-node-inventory:software")]
    pub software: Option<String>,
    #[serde(rename = "flow-node-inventory:ip-address")]
    pub ip_address: Option<String>,
    #[serde(rename = "flow-node-inventory:switch-features")]
    pub switch_features: Option<Value>,
    #[serde(rename = "flow-node-inventory:table")]
    pub table: Option<Vec<RawTable>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawTable {
    pub id: Option<Value>,
    pub flow: Option<Vec<RawFlow>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFlow {
    pub id: Option<String>,
    pub table_id: Option<u64>,
}

// Neutron.

#[derive(Debug, Deserialize)]
pub(crate) struct NetworksDoc {
    pub networks: Option<Vec<RawNetwork>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNetwork {
    pub id: Option<String>,
    pub name: Option<String>,
    pub shared: Option<bool>,
    pub status: Option<String>,
    #[serde(rename = "router:external")]
    pub external: Option<bool>,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubnetsDoc {
    pub subnets: Option<Vec<RawSubnet>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSubnet {
    pub id: Option<String>,
    pub network_id: Option<String>,
    pub name: Option<String>,
    pub ip_version: Option<u8>,
    pub cidr: Option<String>,
    pub gateway_ip: Option<String>,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoutersDoc {
    pub routers: Option<Vec<RawRouter>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRouter {
    pub id: Option<String>,
    pub name: Option<String>,
    pub status: Option<String>,
    pub tenant_id: Option<String>,
    pub external_gateway_info: Option<RawGatewayInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGatewayInfo {
    pub network_id: Option<String>,
    pub external_fixed_ips: Option<Vec<FixedIp>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PortsDoc {
    pub ports: Option<Vec<RawPort>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPort {
    pub id: Option<String>,
    pub network_id: Option<String>,
    pub name: Option<String>,
    pub tenant_id: Option<String>,
    pub device_id: Option<String>,
    pub device_owner: Option<String>,
    pub fixed_ips: Option<Vec<FixedIp>>,
    pub mac_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FloatingIpsDoc {
    pub floatingips: Option<Vec<RawFloatingIp>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFloatingIp {
    pub id: Option<String>,
    pub floating_network_id: Option<String>,
    pub port_id: Option<String>,
    pub fixed_ip_address: Option<String>,
    pub floating_ip_address: Option<String>,
    pub tenant_id: Option<String>,
    pub status: Option<String>,
}
