#![forbid(unsafe_code)]

//! OVSDB/OpenFlow topology reconstruction and Neutron logical overlay (headless).
//!
//! Design goals:
//! - one consistent, cross-referenced graph out of disjoint REST payloads
//! - fail fast on malformed payloads, skip (and log) unmatched joins
//! - runtime-agnostic async loading (no specific executor required)

pub mod builder;
pub mod config;
pub mod entities;
pub mod error;
pub mod selection;
pub mod source;
pub mod topology;

pub use builder::{
    LogicalTopology, NeutronData, NeutronPayloads, build_logical_topology, build_topology,
};
pub use config::{CacheOptions, ViewerConfig};
pub use error::{Error, Result};
pub use selection::HostSelection;
pub use source::{
    CachedSource, DirectorySource, FetchCache, NeutronSource, TopologySource,
    load_logical_topology, load_topology,
};
pub use topology::{Topology, TopologyNode};
