//! Physical hosts of a tenant or subnet selection, used to dim everything else.

use crate::builder::LogicalTopology;
use crate::entities::Port;
use indexmap::IndexSet;
use serde::Serialize;

/// Bridge and OVSDB node ids hosting the selected ports, first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostSelection {
    pub bridge_ids: Vec<String>,
    pub ovsdb_ids: Vec<String>,
}

impl HostSelection {
    pub fn is_empty(&self) -> bool {
        self.bridge_ids.is_empty() && self.ovsdb_ids.is_empty()
    }

    /// Every selected node id, bridges first.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.bridge_ids
            .iter()
            .chain(&self.ovsdb_ids)
            .map(String::as_str)
    }

    fn from_ports<'a>(ports: impl Iterator<Item = &'a Port>) -> Self {
        let mut bridges = IndexSet::new();
        let mut ovsdbs = IndexSet::new();
        // Only the first attachment of a port counts.
        for info in ports.filter_map(|p| p.topo_info.first()) {
            bridges.insert(info.bridge_id.clone());
            if let Some(ovsdb) = &info.ovsdb_node_id {
                ovsdbs.insert(ovsdb.clone());
            }
        }
        Self {
            bridge_ids: bridges.into_iter().collect(),
            ovsdb_ids: ovsdbs.into_iter().collect(),
        }
    }
}

impl LogicalTopology {
    pub fn extract_by_tenant(&self, tenant_id: &str) -> HostSelection {
        HostSelection::from_ports(self.ports.iter().filter(|p| p.tenant_id == tenant_id))
    }

    /// Hosts of the ports on any network that owns one of `subnet_ids`.
    pub fn extract_by_subnets<S: AsRef<str>>(&self, subnet_ids: &[S]) -> HostSelection {
        HostSelection::from_ports(self.ports.iter().filter(|p| {
            self.network(&p.network_id).is_some_and(|net| {
                subnet_ids.iter().any(|id| net.has_subnet(id.as_ref()))
            })
        }))
    }
}
