//! REST collaborators. The transport is out of scope; a source just yields the JSON documents.

mod cache;
mod directory;

pub use cache::{CachedSource, FetchCache};
pub use directory::DirectorySource;

use crate::builder::{
    LogicalTopology, NeutronData, NeutronPayloads, build_logical_topology, build_topology,
};
use crate::error::Result;
use crate::topology::Topology;
use futures::future::BoxFuture;
use serde_json::Value;

pub type FetchFuture<'a> = BoxFuture<'a, Result<Value>>;

/// OpenDaylight operational datastore: inventory nodes and network-topology.
pub trait TopologySource: Send + Sync {
    fn inventory_nodes(&self) -> FetchFuture<'_>;
    fn network_topology(&self) -> FetchFuture<'_>;
}

/// Neutron northbound collections.
pub trait NeutronSource: Send + Sync {
    fn networks(&self) -> FetchFuture<'_>;
    fn subnets(&self) -> FetchFuture<'_>;
    fn routers(&self) -> FetchFuture<'_>;
    fn ports(&self) -> FetchFuture<'_>;
    fn floating_ips(&self) -> FetchFuture<'_>;
}

/// Fetches both documents, then builds the physical topology. No stitching on partial data.
pub async fn load_topology<S>(source: &S) -> Result<Topology>
where
    S: TopologySource + ?Sized,
{
    let (inventory, network_topology) =
        futures::try_join!(source.inventory_nodes(), source.network_topology())?;
    build_topology(&inventory, &network_topology)
}

/// Fetches every Neutron collection and the physical topology, then cross-references them.
pub async fn load_logical_topology<N, T>(neutron: &N, physical: &T) -> Result<(Topology, LogicalTopology)>
where
    N: NeutronSource + ?Sized,
    T: TopologySource + ?Sized,
{
    let (networks, subnets, routers, ports, floating_ips, topo) = futures::try_join!(
        neutron.networks(),
        neutron.subnets(),
        neutron.routers(),
        neutron.ports(),
        neutron.floating_ips(),
        load_topology(physical),
    )?;

    let data = NeutronData::from_payloads(NeutronPayloads {
        networks: &networks,
        subnets: &subnets,
        routers: &routers,
        ports: &ports,
        floating_ips: &floating_ips,
    })?;
    let logical = build_logical_topology(data, &topo);
    Ok((topo, logical))
}
