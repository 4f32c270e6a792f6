use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::ip::Prefix;

/// Name of the VRF holding everything not explicitly placed elsewhere.
pub const DEFAULT_VRF_NAME: &str = "default";

/// Static route scoped to a VRF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRoute {
    pub network: Prefix,
    pub next_hop_ip: Ipv4Addr,
    pub next_hop_interface: Option<String>,
    pub admin_cost: u8,
    pub tunneled: bool,
}

/// OSPF area with the interfaces covered by its network statements.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OspfArea {
    pub area_id: u32,
    pub networks: Vec<Prefix>,
    pub interfaces: BTreeSet<String>,
    pub stub: bool,
    pub nssa: bool,
    pub authentication: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OspfProcess {
    pub process_id: String,
    pub router_id: Ipv4Addr,
    pub areas: BTreeMap<u32, OspfArea>,
    pub passive_interfaces: BTreeSet<String>,
    pub passive_by_default: bool,
}

/// BGP neighbor that participates in IPv4 unicast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpActivePeerConfig {
    pub peer_address: Ipv4Addr,
    pub local_as: u32,
    pub remote_as: u32,
    pub description: Option<String>,
    pub import_policy: Option<String>,
    pub export_policy: Option<String>,
    pub keepalive: Option<u32>,
    pub hold_time: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpProcess {
    pub local_as: u32,
    pub router_id: Ipv4Addr,
    pub ebgp_admin_cost: u8,
    pub ibgp_admin_cost: u8,
    pub active_neighbors: BTreeMap<Ipv4Addr, BgpActivePeerConfig>,
}

/// Routing namespace with its static routes and routing processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vrf {
    pub name: String,
    pub static_routes: Vec<StaticRoute>,
    pub ospf_processes: BTreeMap<String, OspfProcess>,
    pub bgp_process: Option<BgpProcess>,
}

impl Vrf {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            static_routes: Vec::new(),
            ospf_processes: BTreeMap::new(),
            bgp_process: None,
        }
    }
}
