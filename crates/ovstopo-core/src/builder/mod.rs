//! Turns REST payloads into [`Topology`](crate::Topology) and
//! [`LogicalTopology`](logical::LogicalTopology).

mod logical;
mod neutron;
mod physical;
mod raw;

pub use logical::{LogicalTopology, build_logical_topology};
pub use neutron::{
    NeutronData, NeutronPayloads, parse_floating_ips, parse_networks, parse_ports, parse_routers,
    parse_subnets,
};
pub use physical::{build_topology, link_ovsdb_bridges, pair_tunnels};
