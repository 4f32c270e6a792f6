//! Crypto maps, IKEv2 policies, IPsec proposals, tunnel groups and MPF.

use crate::ast::{
    ClassMapStanza, CryptoMapCommand, CryptoMapEntryStanza, IkeCipher, IkeHash,
    Ikev2PolicyCommand, Ikev2PolicyStanza, IpsecProfileStanza, PolicyMapClass, PolicyMapStanza,
    ServicePolicyStanza, Stanza, TransformMode, TransformSetStanza, TunnelGroupAttribute,
    TunnelGroupBody, TunnelGroupKind, TunnelGroupStanza,
};
use crate::keywords::Keyword;
use crate::validate;

use super::lines::{Cursor, LineResult, SyntaxError};
use super::{BodyLine, Dispatcher};

/// IKEv2 policy and ipsec-proposal cipher names.
fn ike_cipher(text: &str) -> Option<IkeCipher> {
    let cipher = match text.to_ascii_lowercase().as_str() {
        "des" => IkeCipher::Des,
        "3des" => IkeCipher::TripleDes,
        "aes" => IkeCipher::Aes128,
        "aes-192" => IkeCipher::Aes192,
        "aes-256" => IkeCipher::Aes256,
        "aes-gcm" => IkeCipher::AesGcm128,
        "aes-gcm-192" => IkeCipher::AesGcm192,
        "aes-gcm-256" => IkeCipher::AesGcm256,
        "null" => IkeCipher::Null,
        _ => return None,
    };
    Some(cipher)
}

/// Integrity/PRF names; `null` integrity (GCM) yields `None` and is skipped.
fn ike_hash(text: &str) -> Result<Option<IkeHash>, String> {
    let hash = match text.to_ascii_lowercase().as_str() {
        "md5" => IkeHash::Md5,
        "sha" | "sha-1" | "sha1" => IkeHash::Sha1,
        "sha256" | "sha-256" => IkeHash::Sha256,
        "sha384" | "sha-384" => IkeHash::Sha384,
        "sha512" | "sha-512" => IkeHash::Sha512,
        "null" => return Ok(None),
        _ => return Err(format!("unknown integrity algorithm: {text}")),
    };
    Ok(Some(hash))
}

/// IKEv1 transform names such as `esp-aes-256` or `esp-sha-hmac`.
enum Transform {
    Cipher(IkeCipher),
    Hash(IkeHash),
    None,
}

fn transform(text: &str) -> Option<Transform> {
    let transform = match text.to_ascii_lowercase().as_str() {
        "esp-des" => Transform::Cipher(IkeCipher::Des),
        "esp-3des" => Transform::Cipher(IkeCipher::TripleDes),
        "esp-aes" => Transform::Cipher(IkeCipher::Aes128),
        "esp-aes-192" => Transform::Cipher(IkeCipher::Aes192),
        "esp-aes-256" => Transform::Cipher(IkeCipher::Aes256),
        "esp-null" => Transform::Cipher(IkeCipher::Null),
        "esp-md5-hmac" => Transform::Hash(IkeHash::Md5),
        "esp-sha-hmac" => Transform::Hash(IkeHash::Sha1),
        "esp-sha256-hmac" => Transform::Hash(IkeHash::Sha256),
        "esp-sha384-hmac" => Transform::Hash(IkeHash::Sha384),
        "esp-sha512-hmac" => Transform::Hash(IkeHash::Sha512),
        "esp-none" => Transform::None,
        _ => return None,
    };
    Some(transform)
}

fn ciphers(cursor: &mut Cursor<'_, '_>) -> LineResult<Vec<IkeCipher>> {
    let mut out = Vec::new();
    while !cursor.is_done() {
        let span = cursor.here();
        let text = cursor.name("encryption algorithm")?;
        let cipher = ike_cipher(text).ok_or_else(|| SyntaxError {
            message: format!("unknown encryption algorithm: {text}"),
            span,
        })?;
        out.push(cipher);
    }
    if out.is_empty() {
        return Err(cursor.error("expected encryption algorithm"));
    }
    Ok(out)
}

fn hashes(cursor: &mut Cursor<'_, '_>) -> LineResult<Vec<IkeHash>> {
    let mut out = Vec::new();
    while !cursor.is_done() {
        let span = cursor.here();
        let text = cursor.name("integrity algorithm")?;
        if let Some(hash) = ike_hash(text).map_err(|message| SyntaxError { message, span })? {
            out.push(hash);
        }
    }
    Ok(out)
}

fn pfs_group(cursor: &mut Cursor<'_, '_>) -> LineResult<Option<u32>> {
    if cursor.is_done() {
        return Ok(None);
    }
    Ok(Some(cursor.value("pfs group", validate::dh_group)?))
}

/// `service-policy NAME global | interface IF`.
pub(super) fn service_policy<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<Stanza<'a>> {
    let policy_map = cursor.name("policy-map name")?;
    let interface = if cursor.eat(Keyword::Global) {
        None
    } else {
        cursor.expect(Keyword::Interface)?;
        Some(cursor.name("interface name")?)
    };
    cursor.finish()?;
    Ok(Stanza::ServicePolicy(ServicePolicyStanza {
        policy_map,
        interface,
    }))
}

fn crypto_map_command<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<CryptoMapCommand<'a>> {
    if cursor.eat(Keyword::Match) {
        cursor.expect(Keyword::Address)?;
        let acl = cursor.name("access-list name")?;
        cursor.finish()?;
        return Ok(CryptoMapCommand::MatchAddress(acl));
    }
    if cursor.eat(Keyword::IpsecIsakmp) {
        cursor.expect(Keyword::Dynamic)?;
        let map = cursor.name("dynamic-map name")?;
        cursor.finish()?;
        return Ok(CryptoMapCommand::DynamicMap(map));
    }
    cursor.expect(Keyword::Set)?;
    if cursor.eat(Keyword::Peer) {
        let mut peers = Vec::new();
        while !cursor.is_done() {
            peers.push(cursor.ipv4("peer address")?);
        }
        if peers.is_empty() {
            return Err(cursor.error("expected peer address"));
        }
        return Ok(CryptoMapCommand::SetPeer(peers));
    }
    if cursor.eat(Keyword::Ikev2) {
        if !cursor.eat(Keyword::IpsecProposal) {
            return Ok(CryptoMapCommand::Other);
        }
        return Ok(CryptoMapCommand::SetTransformSets(cursor.remaining()));
    }
    if cursor.eat(Keyword::Ikev1) {
        cursor.expect(Keyword::TransformSet)?;
        return Ok(CryptoMapCommand::SetTransformSets(cursor.remaining()));
    }
    if cursor.eat(Keyword::TransformSet) {
        return Ok(CryptoMapCommand::SetTransformSets(cursor.remaining()));
    }
    if cursor.eat(Keyword::Pfs) {
        let group = pfs_group(cursor)?;
        cursor.finish()?;
        return Ok(CryptoMapCommand::SetPfs(group));
    }
    if cursor.eat_text("isakmp-profile") {
        return Ok(CryptoMapCommand::IsakmpProfile(cursor.name("isakmp profile")?));
    }
    // security-association, nat-t-disable, reverse-route, ...
    cursor.remaining();
    Ok(CryptoMapCommand::Other)
}

fn ikev2_policy_line(cursor: &mut Cursor<'_, '_>) -> LineResult<BodyLine<Ikev2PolicyCommand>> {
    let command = if cursor.eat(Keyword::Encryption) {
        Ikev2PolicyCommand::Encryption(ciphers(cursor)?)
    } else if cursor.eat(Keyword::Integrity) {
        Ikev2PolicyCommand::Integrity(hashes(cursor)?)
    } else if cursor.eat(Keyword::Prf) {
        Ikev2PolicyCommand::Prf(hashes(cursor)?)
    } else if cursor.eat(Keyword::Group) {
        let mut groups = Vec::new();
        while !cursor.is_done() {
            groups.push(cursor.value("dh group", validate::dh_group)?);
        }
        Ikev2PolicyCommand::Group(groups)
    } else if cursor.eat(Keyword::Lifetime) {
        cursor.expect(Keyword::Seconds)?;
        Ikev2PolicyCommand::LifetimeSeconds(cursor.dec("lifetime", validate::ike_lifetime)?)
    } else {
        return Ok(BodyLine::Unknown);
    };
    cursor.finish()?;
    Ok(BodyLine::Command(command))
}

/// `protocol esp encryption ...` / `protocol esp integrity ...` inside an ipsec-proposal.
enum ProposalLine {
    Ciphers(Vec<IkeCipher>),
    Hashes(Vec<IkeHash>),
}

fn ipsec_proposal_line(cursor: &mut Cursor<'_, '_>) -> LineResult<BodyLine<ProposalLine>> {
    if !cursor.eat(Keyword::Protocol) {
        return Ok(BodyLine::Unknown);
    }
    cursor.expect(Keyword::Esp)?;
    if cursor.eat(Keyword::Encryption) {
        Ok(BodyLine::Command(ProposalLine::Ciphers(ciphers(cursor)?)))
    } else if cursor.eat(Keyword::Integrity) {
        Ok(BodyLine::Command(ProposalLine::Hashes(hashes(cursor)?)))
    } else {
        Err(cursor.error("expected encryption or integrity"))
    }
}

enum ProfileLine<'a> {
    TransformSets(Vec<&'a str>),
    Pfs(Option<u32>),
}

fn ipsec_profile_line<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<BodyLine<ProfileLine<'a>>> {
    if !cursor.eat(Keyword::Set) {
        return Ok(BodyLine::Unknown);
    }
    if cursor.eat(Keyword::Ikev2) {
        cursor.expect(Keyword::IpsecProposal)?;
        Ok(BodyLine::Command(ProfileLine::TransformSets(cursor.remaining())))
    } else if cursor.eat(Keyword::Ikev1) || cursor.at(Keyword::TransformSet) {
        cursor.expect(Keyword::TransformSet)?;
        Ok(BodyLine::Command(ProfileLine::TransformSets(cursor.remaining())))
    } else if cursor.eat(Keyword::Pfs) {
        Ok(BodyLine::Command(ProfileLine::Pfs(pfs_group(cursor)?)))
    } else {
        Ok(BodyLine::Ignored)
    }
}

fn tunnel_group_attribute<'a>(
    cursor: &mut Cursor<'_, 'a>,
) -> LineResult<BodyLine<TunnelGroupAttribute<'a>>> {
    let attribute = if cursor.eat(Keyword::Ikev2) {
        if cursor.eat(Keyword::RemoteAuthentication) {
            cursor.expect(Keyword::PreSharedKey)?;
            TunnelGroupAttribute::RemotePreSharedKey(secret(cursor)?)
        } else if cursor.eat(Keyword::LocalAuthentication) {
            cursor.expect(Keyword::PreSharedKey)?;
            TunnelGroupAttribute::LocalPreSharedKey(secret(cursor)?)
        } else {
            return Ok(BodyLine::Ignored);
        }
    } else if cursor.eat(Keyword::Ikev1) {
        if !cursor.eat(Keyword::PreSharedKey) {
            return Ok(BodyLine::Ignored);
        }
        TunnelGroupAttribute::Ikev1PreSharedKey(secret(cursor)?)
    } else if cursor.eat(Keyword::PreSharedKey) {
        TunnelGroupAttribute::Ikev1PreSharedKey(secret(cursor)?)
    } else if cursor.eat(Keyword::DefaultGroupPolicy) {
        TunnelGroupAttribute::DefaultGroupPolicy(cursor.name("group-policy name")?)
    } else {
        return Ok(BodyLine::Ignored);
    };
    cursor.finish()?;
    Ok(BodyLine::Command(attribute))
}

/// Key material, optionally preceded by an encryption-type digit.
fn secret<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<&'a str> {
    let key = cursor.name("pre-shared key")?;
    if !cursor.is_done() && key.len() == 1 && key.bytes().all(|b| b.is_ascii_digit()) {
        return cursor.name("pre-shared key");
    }
    Ok(key)
}

impl<'t, 'a> Dispatcher<'t, 'a, '_> {
    /// `crypto ...`; returns `None` for unknown crypto sub-commands.
    pub(super) fn crypto(
        &mut self,
        id: usize,
        cursor: &mut Cursor<'t, 'a>,
    ) -> LineResult<Option<Stanza<'a>>> {
        if cursor.eat(Keyword::Map) {
            let map = cursor.name("crypto map name")?;
            if cursor.eat(Keyword::Interface) {
                let nameif = cursor.name("interface name")?;
                cursor.finish()?;
                return Ok(Some(Stanza::CryptoMapInterface { map, nameif }));
            }
            let sequence = cursor.dec("crypto map sequence", validate::crypto_map_sequence)?;
            let command = crypto_map_command(cursor)?;
            return Ok(Some(Stanza::CryptoMapEntry(CryptoMapEntryStanza {
                map,
                sequence,
                command,
            })));
        }
        if cursor.eat(Keyword::Ikev2) {
            if !cursor.eat(Keyword::Policy) {
                return Ok(Some(Stanza::Ignored("crypto ikev2")));
            }
            let priority = cursor.dec("ikev2 policy priority", validate::ikev2_priority)?;
            cursor.finish()?;
            let commands = self.body(id, ikev2_policy_line);
            return Ok(Some(Stanza::Ikev2Policy(Ikev2PolicyStanza {
                priority,
                commands,
            })));
        }
        if cursor.eat(Keyword::Ipsec) {
            return self.crypto_ipsec(id, cursor).map(Some);
        }
        let ignored = [
            Keyword::Ikev1,
            Keyword::Isakmp,
            Keyword::DynamicMap,
        ]
        .into_iter()
        .any(|kw| cursor.at(kw))
            || cursor.at_text("ca")
            || cursor.at_text("key");
        Ok(ignored.then_some(Stanza::Ignored("crypto")))
    }

    fn crypto_ipsec(&mut self, id: usize, cursor: &mut Cursor<'t, 'a>) -> LineResult<Stanza<'a>> {
        if cursor.eat(Keyword::Ikev2) {
            if !cursor.eat(Keyword::IpsecProposal) {
                return Ok(Stanza::Ignored("crypto ipsec ikev2"));
            }
            let name = cursor.name("ipsec-proposal name")?;
            cursor.finish()?;
            let mut ciphers = Vec::new();
            let mut hashes = Vec::new();
            for line in self.body(id, ipsec_proposal_line) {
                match line {
                    ProposalLine::Ciphers(list) => ciphers.extend(list),
                    ProposalLine::Hashes(list) => hashes.extend(list),
                }
            }
            return Ok(Stanza::TransformSet(TransformSetStanza {
                name,
                ciphers,
                hashes,
                mode: None,
                ikev2_proposal: true,
            }));
        }
        if cursor.eat(Keyword::Ikev1) || cursor.at(Keyword::TransformSet) {
            cursor.expect(Keyword::TransformSet)?;
            let name = cursor.name("transform-set name")?;
            let mut set = TransformSetStanza {
                name,
                ciphers: Vec::new(),
                hashes: Vec::new(),
                mode: None,
                ikev2_proposal: false,
            };
            if cursor.eat(Keyword::Mode) {
                set.mode = Some(if cursor.eat_text("transport") {
                    TransformMode::Transport
                } else if cursor.eat_text("tunnel") {
                    TransformMode::Tunnel
                } else {
                    return Err(cursor.error("expected tunnel or transport"));
                });
                cursor.finish()?;
                return Ok(Stanza::TransformSet(set));
            }
            while !cursor.is_done() {
                let span = cursor.here();
                let text = cursor.name("transform")?;
                match transform(text) {
                    Some(Transform::Cipher(cipher)) => set.ciphers.push(cipher),
                    Some(Transform::Hash(hash)) => set.hashes.push(hash),
                    Some(Transform::None) => {}
                    None => {
                        return Err(SyntaxError {
                            message: format!("unknown transform: {text}"),
                            span,
                        });
                    }
                }
            }
            return Ok(Stanza::TransformSet(set));
        }
        if cursor.eat_text("profile") {
            let name = cursor.name("ipsec profile name")?;
            cursor.finish()?;
            let mut profile = IpsecProfileStanza {
                name,
                transform_sets: Vec::new(),
                pfs_group: None,
            };
            for line in self.body(id, ipsec_profile_line) {
                match line {
                    ProfileLine::TransformSets(sets) => profile.transform_sets.extend(sets),
                    ProfileLine::Pfs(group) => profile.pfs_group = group,
                }
            }
            return Ok(Stanza::IpsecProfile(profile));
        }
        // security-association, df-bit, fragmentation, ...
        Ok(Stanza::Ignored("crypto ipsec"))
    }

    pub(super) fn tunnel_group(
        &mut self,
        id: usize,
        cursor: &mut Cursor<'t, 'a>,
    ) -> LineResult<Stanza<'a>> {
        let name = cursor.name("tunnel-group name")?;
        let body = if cursor.eat(Keyword::Type) {
            let kind = if cursor.eat(Keyword::IpsecL2l) {
                TunnelGroupKind::IpsecL2l
            } else if cursor.eat(Keyword::RemoteAccess) {
                TunnelGroupKind::RemoteAccess
            } else {
                return Err(cursor.error("expected ipsec-l2l or remote-access"));
            };
            cursor.finish()?;
            TunnelGroupBody::Type(kind)
        } else if cursor.eat(Keyword::IpsecAttributes) {
            cursor.finish()?;
            TunnelGroupBody::IpsecAttributes(self.body(id, tunnel_group_attribute))
        } else if cursor.eat(Keyword::GeneralAttributes) {
            cursor.finish()?;
            TunnelGroupBody::GeneralAttributes(self.body(id, tunnel_group_attribute))
        } else {
            // webvpn-attributes, ppp-attributes
            return Ok(Stanza::Ignored("tunnel-group"));
        };
        Ok(Stanza::TunnelGroup(TunnelGroupStanza { name, body }))
    }

    /// `class-map [type T [PROTO]] [match-all|match-any] NAME`.
    pub(super) fn class_map(
        &mut self,
        id: usize,
        cursor: &mut Cursor<'t, 'a>,
    ) -> LineResult<Stanza<'a>> {
        let words = cursor.remaining();
        let Some((name, qualifiers)) = words.split_last() else {
            return Err(cursor.error("expected class-map name"));
        };
        let class_type = match qualifiers {
            [kind, class_type, ..] if kind.eq_ignore_ascii_case("type") => Some(*class_type),
            _ => None,
        };
        let mut access_lists = Vec::new();
        let match_lines = self.body(id, |line| {
            if line.eat(Keyword::Match) {
                let text = line.rest();
                if line.eat(Keyword::AccessList) {
                    access_lists.push(line.name("access-list name")?);
                }
                Ok(BodyLine::Command(text))
            } else if line.eat(Keyword::Description) {
                Ok(BodyLine::Ignored)
            } else {
                Ok(BodyLine::Unknown)
            }
        });
        Ok(Stanza::ClassMap(ClassMapStanza {
            name,
            class_type,
            match_lines,
            access_lists,
        }))
    }

    /// `policy-map [type T [PROTO]] NAME` with `class` and `parameters` sections.
    pub(super) fn policy_map(
        &mut self,
        id: usize,
        cursor: &mut Cursor<'t, 'a>,
    ) -> LineResult<Stanza<'a>> {
        let words = cursor.remaining();
        let Some((name, qualifiers)) = words.split_last() else {
            return Err(cursor.error("expected policy-map name"));
        };
        let policy_type = match qualifiers {
            [kind, policy_type, ..] if kind.eq_ignore_ascii_case("type") => Some(*policy_type),
            _ => None,
        };
        let mut policy = PolicyMapStanza {
            name,
            policy_type,
            classes: Vec::new(),
            parameters: Vec::new(),
        };

        let tree = self.tree;
        for (child_id, child) in tree.children(id) {
            let mut line = Cursor::new(&child.line);
            let nested = tree.children(child_id).map(|(_, n)| n.line.text);
            if line.eat(Keyword::Class) {
                match line.name("class-map name") {
                    Ok(class_map) => policy.classes.push(PolicyMapClass {
                        class_map,
                        actions: nested.collect(),
                    }),
                    Err(err) => self.invalid(err),
                }
            } else if line.eat(Keyword::Parameters) {
                policy.parameters.extend(nested);
            } else if !line.at(Keyword::Description) {
                // Direct action lines of inspect-type maps.
                policy.parameters.push(child.line.text);
            }
        }
        Ok(Stanza::PolicyMap(policy))
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use netcomp_ir::Warnings;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::StanzaNode;
    use crate::dispatcher::dispatch;
    use crate::options::ParseOptions;

    fn parse(input: &str) -> (Vec<StanzaNode<'_>>, Warnings) {
        let mut warnings = Warnings::new();
        let stanzas = dispatch(input, &ParseOptions::default(), &mut warnings);
        (stanzas, warnings)
    }

    #[test]
    fn ikev2_policy_body() {
        let (stanzas, warnings) = parse(
            "crypto ikev2 policy 10\n encryption aes-256 aes-gcm-256\n integrity sha256 null\n group 14 21\n prf sha256\n lifetime seconds 86400\n",
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(
            stanzas[0].stanza,
            Stanza::Ikev2Policy(Ikev2PolicyStanza {
                priority: 10,
                commands: vec![
                    Ikev2PolicyCommand::Encryption(vec![IkeCipher::Aes256, IkeCipher::AesGcm256]),
                    Ikev2PolicyCommand::Integrity(vec![IkeHash::Sha256]),
                    Ikev2PolicyCommand::Group(vec![14, 21]),
                    Ikev2PolicyCommand::Prf(vec![IkeHash::Sha256]),
                    Ikev2PolicyCommand::LifetimeSeconds(86400),
                ],
            })
        );
    }

    #[test]
    fn ikev2_policy_rejects_bad_group_and_lifetime() {
        let (stanzas, warnings) =
            parse("crypto ikev2 policy 10\n group 3\n lifetime seconds 0\n");
        assert_eq!(warnings.len(), 2);
        let Stanza::Ikev2Policy(policy) = &stanzas[0].stanza else {
            panic!("expected policy");
        };
        assert!(policy.commands.is_empty());
    }

    #[test]
    fn transform_sets_and_proposals() {
        let (stanzas, warnings) = parse(
            "crypto ipsec ikev1 transform-set TS esp-aes-256 esp-sha-hmac\ncrypto ipsec ikev1 transform-set TS mode transport\ncrypto ipsec ikev2 ipsec-proposal P1\n protocol esp encryption aes-256 aes\n protocol esp integrity sha-256\n",
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        let Stanza::TransformSet(ts) = &stanzas[0].stanza else {
            panic!("expected transform-set");
        };
        assert_eq!(ts.ciphers, vec![IkeCipher::Aes256]);
        assert_eq!(ts.hashes, vec![IkeHash::Sha1]);
        let Stanza::TransformSet(mode) = &stanzas[1].stanza else {
            panic!("expected transform-set");
        };
        assert_eq!(mode.mode, Some(TransformMode::Transport));
        let Stanza::TransformSet(proposal) = &stanzas[2].stanza else {
            panic!("expected proposal");
        };
        assert!(proposal.ikev2_proposal);
        assert_eq!(proposal.ciphers, vec![IkeCipher::Aes256, IkeCipher::Aes128]);
        assert_eq!(proposal.hashes, vec![IkeHash::Sha256]);
    }

    #[test]
    fn crypto_map_entries_and_binding() {
        let (stanzas, warnings) = parse(
            "crypto map CMAP 10 match address VPN_ACL\ncrypto map CMAP 10 set peer 198.51.100.1\ncrypto map CMAP 10 set ikev2 ipsec-proposal P1 P2\ncrypto map CMAP 10 set pfs group14\ncrypto map CMAP 10 set security-association lifetime seconds 28800\ncrypto map CMAP interface outside\n",
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        let commands: Vec<_> = stanzas
            .iter()
            .filter_map(|s| match &s.stanza {
                Stanza::CryptoMapEntry(entry) => Some(entry.command.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            commands,
            vec![
                CryptoMapCommand::MatchAddress("VPN_ACL"),
                CryptoMapCommand::SetPeer(vec![Ipv4Addr::new(198, 51, 100, 1)]),
                CryptoMapCommand::SetTransformSets(vec!["P1", "P2"]),
                CryptoMapCommand::SetPfs(Some(14)),
                CryptoMapCommand::Other,
            ]
        );
        assert_eq!(
            stanzas[5].stanza,
            Stanza::CryptoMapInterface {
                map: "CMAP",
                nameif: "outside"
            }
        );
    }

    #[test]
    fn tunnel_group_forms() {
        let (stanzas, warnings) = parse(
            "tunnel-group 198.51.100.1 type ipsec-l2l\ntunnel-group 198.51.100.1 ipsec-attributes\n ikev2 remote-authentication pre-shared-key secret1\n ikev2 local-authentication pre-shared-key 0 secret2\n isakmp keepalive threshold 10 retry 2\n",
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(
            stanzas[0].stanza,
            Stanza::TunnelGroup(TunnelGroupStanza {
                name: "198.51.100.1",
                body: TunnelGroupBody::Type(TunnelGroupKind::IpsecL2l),
            })
        );
        assert_eq!(
            stanzas[1].stanza,
            Stanza::TunnelGroup(TunnelGroupStanza {
                name: "198.51.100.1",
                body: TunnelGroupBody::IpsecAttributes(vec![
                    TunnelGroupAttribute::RemotePreSharedKey("secret1"),
                    TunnelGroupAttribute::LocalPreSharedKey("secret2"),
                ]),
            })
        );
    }

    #[test]
    fn mpf_maps_and_service_policy() {
        let (stanzas, warnings) = parse(
            "class-map inspection_default\n match default-inspection-traffic\nclass-map WEB\n match access-list WEB_ACL\npolicy-map global_policy\n class inspection_default\n  inspect dns\n  inspect ftp\npolicy-map type inspect dns preset_dns_map\n parameters\n  message-length maximum client auto\nservice-policy global_policy global\n",
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        let Stanza::ClassMap(web) = &stanzas[1].stanza else {
            panic!("expected class-map");
        };
        assert_eq!(web.access_lists, vec!["WEB_ACL"]);
        assert_eq!(web.match_lines, vec!["access-list WEB_ACL"]);
        let Stanza::PolicyMap(global) = &stanzas[2].stanza else {
            panic!("expected policy-map");
        };
        assert_eq!(global.classes[0].actions, vec!["inspect dns", "inspect ftp"]);
        let Stanza::PolicyMap(dns) = &stanzas[3].stanza else {
            panic!("expected policy-map");
        };
        assert_eq!((dns.name, dns.policy_type), ("preset_dns_map", Some("inspect")));
        assert_eq!(dns.parameters, vec!["message-length maximum client auto"]);
        assert_eq!(
            stanzas[4].stanza,
            Stanza::ServicePolicy(ServicePolicyStanza {
                policy_map: "global_policy",
                interface: None,
            })
        );
    }
}
