//! IKE phase-1 and IPsec phase-2 objects.

use std::net::Ipv4Addr;

use netcomp_ir::{
    DiffieHellmanGroup, EncryptionAlgorithm, IkeHashingAlgorithm, IkePhase1Key, IkePhase1Policy,
    IkePhase1Proposal, IpSpace, IpsecAuthenticationAlgorithm, IpsecEncapsulationMode,
    IpsecPeerConfig, IpsecPhase2Policy, IpsecPhase2Proposal, IpsecProtocol,
};
use tracing::debug;

use super::Lowering;
use crate::model::{FtdCryptoMapEntry, FtdIkev2Policy, IkeCipher, IkeHash, TransformMode};

pub fn crypto_map_policy_name(map: &str, sequence: u32) -> String {
    format!("~IPSEC_PHASE2_POLICY:{map}:{sequence}~")
}

pub fn peer_config_name(map: &str, sequence: u32, interface: &str) -> String {
    format!("~IPSEC_PEER_CONFIG:{map}:{sequence}:{interface}~")
}

fn encryption(cipher: IkeCipher) -> EncryptionAlgorithm {
    match cipher {
        IkeCipher::Des => EncryptionAlgorithm::DesCbc,
        IkeCipher::TripleDes => EncryptionAlgorithm::ThreeDesCbc,
        IkeCipher::Aes128 => EncryptionAlgorithm::Aes128Cbc,
        IkeCipher::Aes192 => EncryptionAlgorithm::Aes192Cbc,
        IkeCipher::Aes256 => EncryptionAlgorithm::Aes256Cbc,
        IkeCipher::AesGcm128 => EncryptionAlgorithm::Aes128Gcm,
        IkeCipher::AesGcm192 => EncryptionAlgorithm::Aes192Gcm,
        IkeCipher::AesGcm256 => EncryptionAlgorithm::Aes256Gcm,
        IkeCipher::Null => EncryptionAlgorithm::Null,
    }
}

fn cipher_keyword(cipher: IkeCipher) -> &'static str {
    match cipher {
        IkeCipher::Des => "des",
        IkeCipher::TripleDes => "3des",
        IkeCipher::Aes128 => "aes",
        IkeCipher::Aes192 => "aes-192",
        IkeCipher::Aes256 => "aes-256",
        IkeCipher::AesGcm128 => "aes-gcm",
        IkeCipher::AesGcm192 => "aes-gcm-192",
        IkeCipher::AesGcm256 => "aes-gcm-256",
        IkeCipher::Null => "null",
    }
}

fn hashing(hash: IkeHash) -> IkeHashingAlgorithm {
    match hash {
        IkeHash::Md5 => IkeHashingAlgorithm::Md5,
        IkeHash::Sha1 => IkeHashingAlgorithm::Sha1,
        IkeHash::Sha256 => IkeHashingAlgorithm::Sha256,
        IkeHash::Sha384 => IkeHashingAlgorithm::Sha384,
        IkeHash::Sha512 => IkeHashingAlgorithm::Sha512,
    }
}

fn hash_keyword(hash: IkeHash) -> &'static str {
    match hash {
        IkeHash::Md5 => "md5",
        IkeHash::Sha1 => "sha",
        IkeHash::Sha256 => "sha256",
        IkeHash::Sha384 => "sha384",
        IkeHash::Sha512 => "sha512",
    }
}

fn hmac(hash: IkeHash) -> IpsecAuthenticationAlgorithm {
    match hash {
        IkeHash::Md5 => IpsecAuthenticationAlgorithm::HmacMd5,
        IkeHash::Sha1 => IpsecAuthenticationAlgorithm::HmacSha1,
        IkeHash::Sha256 => IpsecAuthenticationAlgorithm::HmacSha256,
        IkeHash::Sha384 => IpsecAuthenticationAlgorithm::HmacSha384,
        IkeHash::Sha512 => IpsecAuthenticationAlgorithm::HmacSha512,
    }
}

impl Lowering<'_, '_> {
    pub(super) fn vpn(&mut self) {
        let config = self.config;
        for policy in config.ikev2_policies.values() {
            self.ikev2_policy(policy);
        }
        let policy_names: Vec<String> = self.out.ike_phase1_policies.keys().cloned().collect();

        for group in config.tunnel_groups.values() {
            let Some(key) = group.pre_shared_key() else {
                continue;
            };
            self.out.ike_phase1_keys.insert(
                group.name.clone(),
                IkePhase1Key {
                    name: group.name.clone(),
                    pre_shared_key: key.to_string(),
                    local_pre_shared_key: group.local_pre_shared_key.clone(),
                    remote_identity: group.name.parse::<Ipv4Addr>().ok().map(IpSpace::Ip),
                    policies: policy_names.clone(),
                },
            );
        }

        for set in config.transform_sets.values() {
            let mode = match set.mode {
                Some(TransformMode::Transport) => IpsecEncapsulationMode::Transport,
                Some(TransformMode::Tunnel) | None => IpsecEncapsulationMode::Tunnel,
            };
            self.out.ipsec_phase2_proposals.insert(
                set.name.clone(),
                IpsecPhase2Proposal {
                    name: set.name.clone(),
                    encryption: set.ciphers.iter().copied().map(encryption).collect(),
                    authentication: set.hashes.iter().copied().map(hmac).collect(),
                    protocols: vec![IpsecProtocol::Esp],
                    mode,
                },
            );
        }

        for profile in config.ipsec_profiles.values() {
            let context = format!("crypto ipsec profile {}", profile.name);
            let policy = IpsecPhase2Policy {
                name: profile.name.clone(),
                proposals: self.phase2_proposals(&profile.transform_sets, &context),
                pfs_group: self.dh_group(profile.pfs_group, &context),
            };
            self.out.ipsec_phase2_policies.insert(profile.name.clone(), policy);
        }

        for set in config.crypto_maps.values() {
            let bound: Vec<&str> = config
                .crypto_map_bindings
                .iter()
                .filter(|(_, map)| **map == set.name)
                .filter_map(|(nameif, _)| self.device(nameif))
                .collect();
            for entry in set.entries.values() {
                self.crypto_map_entry(&set.name, entry, &bound);
            }
        }
        for (nameif, map) in &config.crypto_map_bindings {
            if !config.crypto_maps.contains_key(map) {
                self.warnings.red_flag(
                    "undefined-reference",
                    format!("crypto map {map} bound to {nameif} has no entries"),
                    None,
                );
            }
        }

        debug!(
            ike_proposals = self.out.ike_phase1_proposals.len(),
            ike_keys = self.out.ike_phase1_keys.len(),
            ipsec_policies = self.out.ipsec_phase2_policies.len(),
            peers = self.out.ipsec_peer_configs.len(),
            "lowered vpn objects"
        );
    }

    /// One proposal per encryption, hash and DH group combination.
    fn ikev2_policy(&mut self, policy: &FtdIkev2Policy) {
        let context = format!("crypto ikev2 policy {}", policy.priority);
        let hashes = if policy.integrity.is_empty() {
            &policy.prf
        } else {
            &policy.integrity
        };
        if policy.encryption.is_empty() || hashes.is_empty() || policy.groups.is_empty() {
            self.warnings.red_flag(
                "incomplete-ike-policy",
                format!("{context}: needs encryption, integrity and group"),
                None,
            );
        }
        let groups: Vec<DiffieHellmanGroup> = policy
            .groups
            .iter()
            .filter_map(|group| self.dh_group(Some(*group), &context))
            .collect();
        let prf = policy.prf.first().copied().map(hashing);

        let mut proposals = Vec::new();
        for cipher in &policy.encryption {
            for hash in hashes {
                for group in &groups {
                    let name = format!(
                        "{}:{}:{}:group{}",
                        policy.priority,
                        cipher_keyword(*cipher),
                        hash_keyword(*hash),
                        group.number()
                    );
                    self.out.ike_phase1_proposals.insert(
                        name.clone(),
                        IkePhase1Proposal {
                            name: name.clone(),
                            encryption: encryption(*cipher),
                            hashing: hashing(*hash),
                            prf,
                            dh_group: *group,
                            lifetime_seconds: policy.lifetime_seconds,
                        },
                    );
                    proposals.push(name);
                }
            }
        }
        let name = policy.priority.to_string();
        self.out.ike_phase1_policies.insert(
            name.clone(),
            IkePhase1Policy {
                name,
                priority: policy.priority,
                proposals,
            },
        );
    }

    fn crypto_map_entry(&mut self, map: &str, entry: &FtdCryptoMapEntry, bound: &[&str]) {
        let config = self.config;
        let context = format!("crypto map {map} {}", entry.sequence);
        let policy_name = crypto_map_policy_name(map, entry.sequence);
        let policy = IpsecPhase2Policy {
            name: policy_name.clone(),
            proposals: self.phase2_proposals(&entry.transform_sets, &context),
            pfs_group: self.dh_group(entry.pfs_group, &context),
        };
        self.out.ipsec_phase2_policies.insert(policy_name.clone(), policy);

        // Later peers are backups of the first.
        let destination = entry.peers.first().copied();
        let ike_key = destination
            .map(|peer| peer.to_string())
            .filter(|peer| self.out.ike_phase1_keys.contains_key(peer));
        if let Some(peer) = destination
            && ike_key.is_none()
            && !config.tunnel_groups.contains_key(&peer.to_string())
        {
            self.warnings.red_flag(
                "missing-tunnel-group",
                format!("{context}: no tunnel-group for peer {peer}"),
                None,
            );
        }

        for device in bound {
            let name = peer_config_name(map, entry.sequence, device);
            self.out.ipsec_peer_configs.insert(
                name.clone(),
                IpsecPeerConfig {
                    name,
                    source_interface: device.to_string(),
                    local_address: self.interface_ip(device),
                    destination_address: destination,
                    policy_access_list: entry.access_list.clone(),
                    ipsec_policy: policy_name.clone(),
                    ike_phase1_key: ike_key.clone(),
                    dynamic: entry.dynamic_map.is_some(),
                },
            );
        }
    }

    /// Transform-set names that resolve; unknown names are reported and dropped.
    fn phase2_proposals(&mut self, names: &[String], context: &str) -> Vec<String> {
        let config = self.config;
        names
            .iter()
            .filter(|name| {
                let known = config.transform_sets.contains_key(*name);
                if !known {
                    self.warnings.red_flag(
                        "undefined-reference",
                        format!("{context}: unknown transform set {name}"),
                        None,
                    );
                }
                known
            })
            .cloned()
            .collect()
    }

    fn dh_group(&mut self, group: Option<u32>, context: &str) -> Option<DiffieHellmanGroup> {
        let number = group?;
        let group = DiffieHellmanGroup::from_number(number);
        if group.is_none() {
            self.warnings.red_flag(
                "unsupported-dh-group",
                format!("{context}: DH group {number} is not supported"),
                None,
            );
        }
        group
    }
}

#[cfg(test)]
mod tests {
    use netcomp_ir::Warnings;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{
        FtdConfiguration, FtdCryptoMapSet, FtdInterface, FtdInterfaceAddress, FtdIpsecTransformSet,
        FtdTunnelGroup,
    };

    fn ip(text: &str) -> Ipv4Addr {
        text.parse().expect("ip")
    }

    #[test]
    fn ikev2_policy_expands_into_combined_proposals() {
        let mut config = FtdConfiguration::default();
        let mut policy = FtdIkev2Policy::new(10);
        policy.encryption = vec![IkeCipher::Aes256, IkeCipher::Aes128];
        policy.integrity = vec![IkeHash::Sha256];
        policy.groups = vec![14, 99];
        policy.lifetime_seconds = Some(86400);
        config.ikev2_policies.insert(10, policy);

        let mut warnings = Warnings::new();
        let lowered = super::super::lower(&config, &mut warnings).expect("lower");
        let policy = &lowered.ike_phase1_policies["10"];
        assert_eq!(
            policy.proposals,
            vec!["10:aes-256:sha256:group14", "10:aes:sha256:group14"]
        );
        let proposal = &lowered.ike_phase1_proposals["10:aes-256:sha256:group14"];
        assert_eq!(proposal.encryption, EncryptionAlgorithm::Aes256Cbc);
        assert_eq!(proposal.dh_group, DiffieHellmanGroup::Group14);
        assert_eq!(proposal.lifetime_seconds, Some(86400));
        assert!(warnings.has_code("unsupported-dh-group"));
    }

    #[test]
    fn crypto_map_entries_become_policies_and_peer_configs() {
        let mut config = FtdConfiguration::default();
        let mut outside = FtdInterface::new("Gi0/0");
        outside.nameif = Some("outside".into());
        outside.address = Some(FtdInterfaceAddress {
            ip: ip("203.0.113.2"),
            mask: ip("255.255.255.0"),
        });
        config.interfaces.insert("Gi0/0".into(), outside);
        config.transform_sets.insert(
            "TS".into(),
            FtdIpsecTransformSet {
                name: "TS".into(),
                ciphers: vec![IkeCipher::Aes256],
                hashes: vec![IkeHash::Sha1],
                mode: None,
                ikev2_proposal: false,
            },
        );
        let mut map = FtdCryptoMapSet::new("CMAP");
        let entry = map.entry_mut(10);
        entry.peers = vec![ip("198.51.100.9"), ip("198.51.100.10")];
        entry.access_list = Some("VPN_ACL".into());
        entry.transform_sets = vec!["TS".into(), "MISSING".into()];
        entry.pfs_group = Some(14);
        config.crypto_maps.insert("CMAP".into(), map);
        config.crypto_map_bindings.insert("outside".into(), "CMAP".into());
        let mut group = FtdTunnelGroup::new("198.51.100.9");
        group.remote_pre_shared_key = Some("secret".into());
        config.tunnel_groups.insert(group.name.clone(), group);

        let mut warnings = Warnings::new();
        let lowered = super::super::lower(&config, &mut warnings).expect("lower");

        let policy = &lowered.ipsec_phase2_policies["~IPSEC_PHASE2_POLICY:CMAP:10~"];
        assert_eq!(policy.proposals, vec!["TS".to_string()]);
        assert_eq!(policy.pfs_group, Some(DiffieHellmanGroup::Group14));
        assert!(warnings.has_code("undefined-reference"));

        let peer = &lowered.ipsec_peer_configs["~IPSEC_PEER_CONFIG:CMAP:10:Gi0/0~"];
        assert_eq!(peer.source_interface, "Gi0/0");
        assert_eq!(peer.local_address, Some(ip("203.0.113.2")));
        assert_eq!(peer.destination_address, Some(ip("198.51.100.9")));
        assert_eq!(peer.ike_phase1_key.as_deref(), Some("198.51.100.9"));
        assert!(!peer.dynamic);

        let key = &lowered.ike_phase1_keys["198.51.100.9"];
        assert_eq!(key.pre_shared_key, "secret");
        assert_eq!(key.remote_identity, Some(IpSpace::Ip(ip("198.51.100.9"))));

        let proposal = &lowered.ipsec_phase2_proposals["TS"];
        assert_eq!(proposal.mode, IpsecEncapsulationMode::Tunnel);
        assert_eq!(proposal.authentication, vec![IpsecAuthenticationAlgorithm::HmacSha1]);
    }
}
