//! Plain data types of the physical and logical views.

mod link;
mod neutron;
mod physical;
mod pretty;

pub use link::{Link, LinkKind, LinkStyle, TunnelPair};
pub use neutron::{
    DeviceOwner, ExternalGateway, FixedIp, FloatingIp, Instance, InterfaceKind, Network, Port,
    Router, RouterInterface, SubNet, TopoInfo, last_octet,
};
pub use physical::{
    BridgeNode, FlowInfo, FlowTableEntry, OvsdbNode, PortKind, TerminationPoint, parse_datapath_id,
};
pub use pretty::{Pretty, PrettyTab, PrettyView};
