use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::ip::IpSpace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EncryptionAlgorithm {
    Null,
    DesCbc,
    ThreeDesCbc,
    Aes128Cbc,
    Aes192Cbc,
    Aes256Cbc,
    Aes128Gcm,
    Aes192Gcm,
    Aes256Gcm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IkeHashingAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffieHellmanGroup {
    Group1,
    Group2,
    Group5,
    Group14,
    Group15,
    Group16,
    Group19,
    Group20,
    Group21,
    Group24,
}

impl DiffieHellmanGroup {
    pub fn from_number(number: u32) -> Option<DiffieHellmanGroup> {
        let group = match number {
            1 => DiffieHellmanGroup::Group1,
            2 => DiffieHellmanGroup::Group2,
            5 => DiffieHellmanGroup::Group5,
            14 => DiffieHellmanGroup::Group14,
            15 => DiffieHellmanGroup::Group15,
            16 => DiffieHellmanGroup::Group16,
            19 => DiffieHellmanGroup::Group19,
            20 => DiffieHellmanGroup::Group20,
            21 => DiffieHellmanGroup::Group21,
            24 => DiffieHellmanGroup::Group24,
            _ => return None,
        };
        Some(group)
    }

    pub fn number(self) -> u32 {
        match self {
            DiffieHellmanGroup::Group1 => 1,
            DiffieHellmanGroup::Group2 => 2,
            DiffieHellmanGroup::Group5 => 5,
            DiffieHellmanGroup::Group14 => 14,
            DiffieHellmanGroup::Group15 => 15,
            DiffieHellmanGroup::Group16 => 16,
            DiffieHellmanGroup::Group19 => 19,
            DiffieHellmanGroup::Group20 => 20,
            DiffieHellmanGroup::Group21 => 21,
            DiffieHellmanGroup::Group24 => 24,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IpsecAuthenticationAlgorithm {
    HmacMd5,
    HmacSha1,
    HmacSha256,
    HmacSha384,
    HmacSha512,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IpsecProtocol {
    Esp,
    Ah,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IpsecEncapsulationMode {
    Tunnel,
    Transport,
}

/// One concrete IKE phase-1 parameter combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IkePhase1Proposal {
    pub name: String,
    pub encryption: EncryptionAlgorithm,
    pub hashing: IkeHashingAlgorithm,
    pub prf: Option<IkeHashingAlgorithm>,
    pub dh_group: DiffieHellmanGroup,
    pub lifetime_seconds: Option<u32>,
}

/// IKE phase-1 negotiation policy listing acceptable proposals in preference order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IkePhase1Policy {
    pub name: String,
    pub priority: u32,
    pub proposals: Vec<String>,
}

/// Pre-shared key bound to a peer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IkePhase1Key {
    pub name: String,
    pub pre_shared_key: String,
    pub local_pre_shared_key: Option<String>,
    pub remote_identity: Option<IpSpace>,
    pub policies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpsecPhase2Proposal {
    pub name: String,
    pub encryption: Vec<EncryptionAlgorithm>,
    pub authentication: Vec<IpsecAuthenticationAlgorithm>,
    pub protocols: Vec<IpsecProtocol>,
    pub mode: IpsecEncapsulationMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpsecPhase2Policy {
    pub name: String,
    pub proposals: Vec<String>,
    pub pfs_group: Option<DiffieHellmanGroup>,
}

/// IPsec tunnel endpoint derived from a crypto map entry on one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpsecPeerConfig {
    pub name: String,
    pub source_interface: String,
    pub local_address: Option<Ipv4Addr>,
    pub destination_address: Option<Ipv4Addr>,
    pub policy_access_list: Option<String>,
    pub ipsec_policy: String,
    pub ike_phase1_key: Option<String>,
    pub dynamic: bool,
}
