//! FTD vendor model: name-keyed entities filled by the extractor.
//!
//! Cross-references (ACL to object-group, NAT to object, crypto map to
//! transform set, ...) are plain strings and are resolved only during
//! lowering, so the model can be built in a single pass regardless of
//! declaration order.

mod acl;
mod crypto;
mod routing;

use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::options::DEFAULT_HOSTNAME;

pub use acl::{
    AccessGroupScope, AclProtocol, AclType, AddressSpecifier, FtdAccessGroup, FtdAccessList,
    FtdAccessListLine, FtdAclRule, FtdNatRule, FtdNetworkObject, FtdNetworkObjectGroup,
    FtdServiceObjectGroup, NatAddress, NatDestination, NatKind, NatPosition, NatService, NatSource,
    NetworkGroupMember, NetworkObjectValue, PortSpecifier, RuleRemarks, ServiceGroupMember,
};
pub use crypto::{
    FtdClassMap, FtdCryptoMapEntry, FtdCryptoMapSet, FtdIkev2Policy, FtdIpsecProfile,
    FtdIpsecTransformSet, FtdPolicyMap, FtdPolicyMapClass, FtdServicePolicy, FtdTunnelGroup,
    IkeCipher, IkeHash, ServicePolicyScope, TransformMode, TunnelGroupKind,
};
pub use routing::{
    FtdBgpNeighbor, FtdBgpProcess, FtdInterface, FtdInterfaceAddress, FtdOspfArea, FtdOspfNetwork,
    FtdOspfProcess, FtdStaticRoute,
};

/// Everything extracted from one configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdConfiguration {
    pub hostname: Option<String>,
    /// Hostname used when `hostname` is absent.
    pub default_hostname: String,
    /// Keyed by device name (`GigabitEthernet0/0`).
    pub interfaces: BTreeMap<String, FtdInterface>,
    pub access_lists: BTreeMap<String, FtdAccessList>,
    pub access_groups: Vec<FtdAccessGroup>,
    pub network_objects: BTreeMap<String, FtdNetworkObject>,
    pub network_object_groups: BTreeMap<String, FtdNetworkObjectGroup>,
    pub service_object_groups: BTreeMap<String, FtdServiceObjectGroup>,
    /// File order; lowering sorts by position only.
    pub nat_rules: Vec<FtdNatRule>,
    pub static_routes: Vec<FtdStaticRoute>,
    pub ospf_processes: BTreeMap<String, FtdOspfProcess>,
    pub bgp_process: Option<FtdBgpProcess>,
    pub vrfs: BTreeSet<String>,
    pub crypto_maps: BTreeMap<String, FtdCryptoMapSet>,
    /// Interface nameif to crypto map name.
    pub crypto_map_bindings: BTreeMap<String, String>,
    pub transform_sets: BTreeMap<String, FtdIpsecTransformSet>,
    pub ipsec_profiles: BTreeMap<String, FtdIpsecProfile>,
    pub ikev2_policies: BTreeMap<u32, FtdIkev2Policy>,
    pub tunnel_groups: BTreeMap<String, FtdTunnelGroup>,
    pub class_maps: BTreeMap<String, FtdClassMap>,
    pub policy_maps: BTreeMap<String, FtdPolicyMap>,
    pub service_policies: Vec<FtdServicePolicy>,
    /// Opaque `failover ...` lines.
    pub failover: Vec<String>,
    pub names_enabled: bool,
    pub names: BTreeMap<String, Ipv4Addr>,
    pub arp_timeout: Option<u32>,
}

impl Default for FtdConfiguration {
    fn default() -> Self {
        Self::new(DEFAULT_HOSTNAME)
    }
}

impl FtdConfiguration {
    pub fn new(default_hostname: impl Into<String>) -> Self {
        Self {
            hostname: None,
            default_hostname: default_hostname.into(),
            interfaces: BTreeMap::new(),
            access_lists: BTreeMap::new(),
            access_groups: Vec::new(),
            network_objects: BTreeMap::new(),
            network_object_groups: BTreeMap::new(),
            service_object_groups: BTreeMap::new(),
            nat_rules: Vec::new(),
            static_routes: Vec::new(),
            ospf_processes: BTreeMap::new(),
            bgp_process: None,
            vrfs: BTreeSet::new(),
            crypto_maps: BTreeMap::new(),
            crypto_map_bindings: BTreeMap::new(),
            transform_sets: BTreeMap::new(),
            ipsec_profiles: BTreeMap::new(),
            ikev2_policies: BTreeMap::new(),
            tunnel_groups: BTreeMap::new(),
            class_maps: BTreeMap::new(),
            policy_maps: BTreeMap::new(),
            service_policies: Vec::new(),
            failover: Vec::new(),
            names_enabled: false,
            names: BTreeMap::new(),
            arp_timeout: None,
        }
    }

    /// Configured hostname, or the default.
    pub fn effective_hostname(&self) -> &str {
        self.hostname.as_deref().unwrap_or(&self.default_hostname)
    }

    /// Interface carrying `nameif`.
    pub fn interface_by_nameif(&self, nameif: &str) -> Option<&FtdInterface> {
        self.interfaces
            .values()
            .find(|iface| iface.nameif.as_deref() == Some(nameif))
    }
}
