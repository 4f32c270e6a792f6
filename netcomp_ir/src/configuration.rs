use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::acl::{IpAccessList, LineAction};
use crate::interface::{Interface, Zone};
use crate::routing::{DEFAULT_VRF_NAME, Vrf};
use crate::vendor_family::VendorFamily;
use crate::vpn::{
    IkePhase1Key, IkePhase1Policy, IkePhase1Proposal, IpsecPeerConfig, IpsecPhase2Policy,
    IpsecPhase2Proposal,
};

/// Dialect a lowered configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigurationFormat {
    CiscoFtd,
}

/// Vendor-independent configuration of one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub hostname: String,
    pub format: ConfigurationFormat,
    pub default_cross_zone_action: LineAction,
    pub default_inbound_action: LineAction,
    pub interfaces: BTreeMap<String, Interface>,
    pub ip_access_lists: BTreeMap<String, IpAccessList>,
    pub zones: BTreeMap<String, Zone>,
    pub vrfs: BTreeMap<String, Vrf>,
    pub ike_phase1_proposals: BTreeMap<String, IkePhase1Proposal>,
    pub ike_phase1_policies: BTreeMap<String, IkePhase1Policy>,
    pub ike_phase1_keys: BTreeMap<String, IkePhase1Key>,
    pub ipsec_phase2_proposals: BTreeMap<String, IpsecPhase2Proposal>,
    pub ipsec_phase2_policies: BTreeMap<String, IpsecPhase2Policy>,
    pub ipsec_peer_configs: BTreeMap<String, IpsecPeerConfig>,
    pub vendor_family: VendorFamily,
}

impl Configuration {
    /// Empty configuration holding only the default VRF.
    pub fn new(hostname: impl Into<String>, format: ConfigurationFormat) -> Self {
        Self {
            hostname: hostname.into(),
            format,
            default_cross_zone_action: LineAction::Permit,
            default_inbound_action: LineAction::Permit,
            interfaces: BTreeMap::new(),
            ip_access_lists: BTreeMap::new(),
            zones: BTreeMap::new(),
            vrfs: BTreeMap::from([(DEFAULT_VRF_NAME.to_string(), Vrf::new(DEFAULT_VRF_NAME))]),
            ike_phase1_proposals: BTreeMap::new(),
            ike_phase1_policies: BTreeMap::new(),
            ike_phase1_keys: BTreeMap::new(),
            ipsec_phase2_proposals: BTreeMap::new(),
            ipsec_phase2_policies: BTreeMap::new(),
            ipsec_peer_configs: BTreeMap::new(),
            vendor_family: VendorFamily::default(),
        }
    }

    pub fn default_vrf(&self) -> Option<&Vrf> {
        self.vrfs.get(DEFAULT_VRF_NAME)
    }

    /// Get or create the VRF called `name`.
    pub fn vrf_mut(&mut self, name: &str) -> &mut Vrf {
        self.vrfs
            .entry(name.to_string())
            .or_insert_with(|| Vrf::new(name))
    }
}
