use super::{FetchFuture, NeutronSource, TopologySource};
use crate::error::{Error, Result};
use futures::future::{self, FutureExt};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Reads every payload from `<root>/<name>.json`.
///
/// | payload | file |
/// |---|---|
/// | inventory nodes | `inventory.json` |
/// | network-topology | `network-topology.json` |
/// | Neutron collections | `networks.json`, `subnets.json`, `routers.json`, `ports.json`, `floatingips.json` |
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn read(&self, name: &str) -> Result<Value> {
        let path = self.root.join(format!("{name}.json"));
        let text = std::fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|err| Error::InvalidPayload {
            context: path.display().to_string(),
            message: err.to_string(),
        })
    }

    fn fetch(&self, name: &str) -> FetchFuture<'_> {
        future::ready(self.read(name)).boxed()
    }
}

impl TopologySource for DirectorySource {
    fn inventory_nodes(&self) -> FetchFuture<'_> {
        self.fetch("inventory")
    }

    fn network_topology(&self) -> FetchFuture<'_> {
        self.fetch("network-topology")
    }
}

impl NeutronSource for DirectorySource {
    fn networks(&self) -> FetchFuture<'_> {
        self.fetch("networks")
    }

    fn subnets(&self) -> FetchFuture<'_> {
        self.fetch("subnets")
    }

    fn routers(&self) -> FetchFuture<'_> {
        self.fetch("routers")
    }

    fn ports(&self) -> FetchFuture<'_> {
        self.fetch("ports")
    }

    fn floating_ips(&self) -> FetchFuture<'_> {
        self.fetch("floatingips")
    }
}
