use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::ip::Prefix;
use crate::routing::DEFAULT_VRF_NAME;
use crate::transformation::Transformation;

/// Interface address: host address plus the length of its connected subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceAddress {
    pub ip: Ipv4Addr,
    pub prefix_length: u8,
}

impl InterfaceAddress {
    pub fn connected_prefix(&self) -> Prefix {
        Prefix::new(self.ip, self.prefix_length)
    }
}

/// Lowered interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub description: Option<String>,
    pub vrf: String,
    pub active: bool,
    pub address: Option<InterfaceAddress>,
    pub mtu: Option<u32>,
    pub vlan: Option<u16>,
    pub zone: Option<String>,
    pub security_level: Option<u8>,
    pub incoming_filter: Option<String>,
    pub outgoing_filter: Option<String>,
    pub incoming_transformation: Option<Transformation>,
    pub outgoing_transformation: Option<Transformation>,
    pub crypto_map: Option<String>,
}

impl Interface {
    /// Active interface in the default VRF with nothing else configured.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            vrf: DEFAULT_VRF_NAME.to_string(),
            active: true,
            address: None,
            mtu: None,
            vlan: None,
            zone: None,
            security_level: None,
            incoming_filter: None,
            outgoing_filter: None,
            incoming_transformation: None,
            outgoing_transformation: None,
            crypto_map: None,
        }
    }
}

/// Named group of interfaces used for security-policy attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub interfaces: BTreeSet<String>,
}
