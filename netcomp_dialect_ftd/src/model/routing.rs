//! Interfaces, static routes, OSPF and BGP.

use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdInterfaceAddress {
    pub ip: Ipv4Addr,
    pub mask: Ipv4Addr,
}

/// Physical or logical interface, keyed by device name.
///
/// Other stanzas refer to interfaces by `nameif`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdInterface {
    pub name: String,
    pub nameif: Option<String>,
    pub security_level: Option<u8>,
    pub active: bool,
    pub vlan: Option<u16>,
    pub vrf: Option<String>,
    pub mtu: Option<u32>,
    pub address: Option<FtdInterfaceAddress>,
    pub standby_address: Option<Ipv4Addr>,
    pub description: Option<String>,
    pub management_only: bool,
    pub crypto_map: Option<String>,
}

impl FtdInterface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nameif: None,
            security_level: None,
            active: true,
            vlan: None,
            vrf: None,
            mtu: None,
            address: None,
            standby_address: None,
            description: None,
            management_only: false,
            crypto_map: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdStaticRoute {
    /// Egress interface nameif.
    pub interface: String,
    pub network: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub metric: u8,
    pub tunneled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdOspfNetwork {
    pub ip: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub area: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FtdOspfArea {
    pub id: u32,
    pub stub: bool,
    pub nssa: bool,
    pub authentication: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdOspfProcess {
    pub process_id: String,
    pub router_id: Option<Ipv4Addr>,
    pub networks: Vec<FtdOspfNetwork>,
    pub passive_interfaces: BTreeSet<String>,
    pub non_passive_interfaces: BTreeSet<String>,
    pub passive_by_default: bool,
    pub areas: BTreeMap<u32, FtdOspfArea>,
}

impl FtdOspfProcess {
    pub fn new(process_id: impl Into<String>) -> Self {
        Self {
            process_id: process_id.into(),
            router_id: None,
            networks: Vec::new(),
            passive_interfaces: BTreeSet::new(),
            non_passive_interfaces: BTreeSet::new(),
            passive_by_default: false,
            areas: BTreeMap::new(),
        }
    }

    pub fn area_mut(&mut self, id: u32) -> &mut FtdOspfArea {
        self.areas.entry(id).or_insert(FtdOspfArea {
            id,
            ..FtdOspfArea::default()
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdBgpNeighbor {
    pub ip: Ipv4Addr,
    pub remote_as: Option<u32>,
    pub description: Option<String>,
    pub route_map_in: Option<String>,
    pub route_map_out: Option<String>,
    pub keepalive: Option<u32>,
    pub hold_time: Option<u32>,
    /// Set only by an explicit `activate` inside `address-family ipv4`.
    pub ipv4_unicast_active: bool,
    pub shutdown: bool,
}

impl FtdBgpNeighbor {
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            remote_as: None,
            description: None,
            route_map_in: None,
            route_map_out: None,
            keepalive: None,
            hold_time: None,
            ipv4_unicast_active: false,
            shutdown: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdBgpProcess {
    pub asn: u32,
    pub router_id: Option<Ipv4Addr>,
    pub ipv4_address_family_active: bool,
    pub neighbors: BTreeMap<Ipv4Addr, FtdBgpNeighbor>,
}

impl FtdBgpProcess {
    pub fn new(asn: u32) -> Self {
        Self {
            asn,
            router_id: None,
            ipv4_address_family_active: false,
            neighbors: BTreeMap::new(),
        }
    }

    pub fn neighbor_mut(&mut self, ip: Ipv4Addr) -> &mut FtdBgpNeighbor {
        self.neighbors
            .entry(ip)
            .or_insert_with(|| FtdBgpNeighbor::new(ip))
    }
}
