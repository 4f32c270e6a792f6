//! Crypto maps, IKE/IPsec policy objects, tunnel groups and MPF metadata.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IkeCipher {
    Des,
    TripleDes,
    Aes128,
    Aes192,
    Aes256,
    AesGcm128,
    AesGcm192,
    AesGcm256,
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IkeHash {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformMode {
    Tunnel,
    Transport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TunnelGroupKind {
    IpsecL2l,
    RemoteAccess,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FtdCryptoMapEntry {
    pub sequence: u32,
    pub peers: Vec<Ipv4Addr>,
    pub access_list: Option<String>,
    pub transform_sets: Vec<String>,
    pub pfs_group: Option<u32>,
    pub dynamic_map: Option<String>,
    pub isakmp_profile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdCryptoMapSet {
    pub name: String,
    pub entries: BTreeMap<u32, FtdCryptoMapEntry>,
}

impl FtdCryptoMapSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn entry_mut(&mut self, sequence: u32) -> &mut FtdCryptoMapEntry {
        self.entries.entry(sequence).or_insert(FtdCryptoMapEntry {
            sequence,
            ..FtdCryptoMapEntry::default()
        })
    }
}

/// IKEv1 transform set or IKEv2 ipsec-proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdIpsecTransformSet {
    pub name: String,
    pub ciphers: Vec<IkeCipher>,
    pub hashes: Vec<IkeHash>,
    pub mode: Option<TransformMode>,
    pub ikev2_proposal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdIpsecProfile {
    pub name: String,
    pub transform_sets: Vec<String>,
    pub pfs_group: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdIkev2Policy {
    pub priority: u32,
    pub encryption: Vec<IkeCipher>,
    pub integrity: Vec<IkeHash>,
    pub prf: Vec<IkeHash>,
    pub groups: Vec<u32>,
    pub lifetime_seconds: Option<u32>,
}

impl FtdIkev2Policy {
    pub fn new(priority: u32) -> Self {
        Self {
            priority,
            encryption: Vec::new(),
            integrity: Vec::new(),
            prf: Vec::new(),
            groups: Vec::new(),
            lifetime_seconds: None,
        }
    }
}

/// Tunnel group, keyed by peer identifier (usually the peer address).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdTunnelGroup {
    pub name: String,
    pub kind: Option<TunnelGroupKind>,
    pub remote_pre_shared_key: Option<String>,
    pub local_pre_shared_key: Option<String>,
    pub ikev1_pre_shared_key: Option<String>,
    pub default_group_policy: Option<String>,
}

impl FtdTunnelGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            remote_pre_shared_key: None,
            local_pre_shared_key: None,
            ikev1_pre_shared_key: None,
            default_group_policy: None,
        }
    }

    /// Key presented by the peer, falling back to the IKEv1 key.
    pub fn pre_shared_key(&self) -> Option<&str> {
        self.remote_pre_shared_key
            .as_deref()
            .or(self.ikev1_pre_shared_key.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdClassMap {
    pub name: String,
    pub class_type: Option<String>,
    /// Text after `match` on each match line.
    pub match_lines: Vec<String>,
    pub access_lists: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdPolicyMapClass {
    pub class_map: String,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdPolicyMap {
    pub name: String,
    pub policy_type: Option<String>,
    pub classes: Vec<FtdPolicyMapClass>,
    pub parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServicePolicyScope {
    Global,
    Interface(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdServicePolicy {
    pub policy_map: String,
    pub scope: ServicePolicyScope,
}
