//! Extractor: walks dispatched stanzas in file order and fills an [`FtdConfiguration`].
//!
//! - Remark lines carrying `rule-id N` are buffered per access list and
//!   copied onto every later rule in that list with the same rule-id.
//! - `host NAME` addresses are substituted through the `name` table.
//! - `mtu` statements and `crypto map ... interface` bindings are applied
//!   after the pass, so they may precede the interface they name.
//! - References between entities stay as names; nothing is resolved here.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::LazyLock;

use netcomp_ir::{LineAction, Span, Warnings};
use regex::Regex;
use tracing::debug;

use crate::ast::{
    AccessGroupBinding, AccessListStanza, AclEntry, AclKind, AclRule, AclVerb, AddressRef,
    BgpCommand, BgpStanza, CryptoMapCommand, CryptoMapEntryStanza, HostRef, Ikev2PolicyCommand,
    InterfaceCommand, InterfaceStanza, NatAddressRef, NatServiceRef, NatStanza, NeighborCommand,
    NetworkObjectCommand, NetworkObjectStanza, OspfCommand, OspfStanza, PortRef, ProtocolRef,
    Stanza, StanzaNode, TunnelGroupAttribute, TunnelGroupBody,
};
use crate::ast;
use crate::model::{
    AccessGroupScope, AclProtocol, AclType, AddressSpecifier, FtdAccessGroup, FtdAccessList,
    FtdAccessListLine, FtdAclRule, FtdBgpProcess, FtdClassMap, FtdConfiguration,
    FtdCryptoMapSet, FtdIkev2Policy, FtdInterface, FtdInterfaceAddress, FtdIpsecProfile,
    FtdIpsecTransformSet, FtdNatRule, FtdNetworkObject, FtdNetworkObjectGroup, FtdOspfNetwork,
    FtdOspfProcess, FtdPolicyMap, FtdPolicyMapClass, FtdServiceObjectGroup, FtdServicePolicy,
    FtdStaticRoute, FtdTunnelGroup, NatAddress, NatDestination, NatPosition, NatService,
    NatSource, NetworkGroupMember, NetworkObjectValue, PortSpecifier, RuleRemarks,
    ServiceGroupMember, ServicePolicyScope,
};
use crate::options::ParseOptions;

static RULE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\brule-id\s+(\d+)\b").expect("rule-id pattern"));
static RULE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bRULE:\s*(.+)$").expect("rule name pattern"));
static PREFILTER_POLICY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bPREFILTER\s+POLICY:\s*(.+)$").expect("prefilter policy pattern")
});
static ACCESS_POLICY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bACCESS\s+POLICY:\s*(.+)$").expect("access policy pattern"));
static LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\brule-id\s+\d+:\s*([A-Z][A-Z0-9 _-]*[A-Z0-9]):\s*(.+)$").expect("label pattern")
});

/// Build the vendor model from dispatched stanzas.
pub(crate) fn extract(
    stanzas: Vec<StanzaNode<'_>>,
    options: &ParseOptions,
    warnings: &mut Warnings,
) -> FtdConfiguration {
    let mut extractor = Extractor {
        config: FtdConfiguration::new(options.default_hostname.clone()),
        warnings,
        remarks: BTreeMap::new(),
        nameif_owner: BTreeMap::new(),
        pending_mtu: Vec::new(),
        crypto_binding_spans: BTreeMap::new(),
    };
    for node in stanzas {
        extractor.stanza(node);
    }
    extractor.finish()
}

struct Extractor<'w> {
    config: FtdConfiguration,
    warnings: &'w mut Warnings,
    /// Access list name to rule-id to metadata seen so far.
    remarks: BTreeMap<String, BTreeMap<u64, RuleRemarks>>,
    /// nameif to device name of the interface that claimed it first.
    nameif_owner: BTreeMap<String, String>,
    pending_mtu: Vec<(String, u32, Span)>,
    crypto_binding_spans: BTreeMap<String, Span>,
}

impl Extractor<'_> {
    fn stanza(&mut self, node: StanzaNode<'_>) {
        let span = node.span;
        match node.stanza {
            Stanza::Hostname(name) => self.config.hostname = Some(name.to_string()),
            Stanza::Interface(stanza) => self.interface(stanza, span),
            Stanza::Mtu { nameif, mtu } => self.pending_mtu.push((nameif.to_string(), mtu, span)),
            Stanza::AccessList(stanza) => self.access_list(stanza, span),
            Stanza::AccessGroup(stanza) => {
                let scope = match stanza.binding {
                    AccessGroupBinding::In(nameif) => AccessGroupScope::In(nameif.to_string()),
                    AccessGroupBinding::Out(nameif) => AccessGroupScope::Out(nameif.to_string()),
                    AccessGroupBinding::Global => AccessGroupScope::Global,
                };
                self.config.access_groups.push(FtdAccessGroup {
                    access_list: stanza.acl.to_string(),
                    scope,
                });
            }
            Stanza::NetworkObject(stanza) => self.network_object(stanza, span),
            Stanza::NetworkObjectGroup(stanza) => {
                let mut group = FtdNetworkObjectGroup {
                    name: stanza.name.to_string(),
                    description: None,
                    members: Vec::new(),
                };
                for member in stanza.members {
                    let member = match member {
                        ast::NetworkGroupMember::Host(host) => match self.host(&host, span) {
                            Some(ip) => NetworkGroupMember::Host(ip),
                            None => continue,
                        },
                        ast::NetworkGroupMember::NetworkMask(ip, mask) => {
                            NetworkGroupMember::NetworkMask(ip, mask)
                        }
                        ast::NetworkGroupMember::Object(name) => {
                            NetworkGroupMember::Object(name.to_string())
                        }
                        ast::NetworkGroupMember::Group(name) => {
                            NetworkGroupMember::Group(name.to_string())
                        }
                        ast::NetworkGroupMember::Description(text) => {
                            group.description = Some(text.to_string());
                            continue;
                        }
                    };
                    group.members.push(member);
                }
                self.config
                    .network_object_groups
                    .insert(group.name.clone(), group);
            }
            Stanza::ServiceObjectGroup(stanza) => {
                let mut group = FtdServiceObjectGroup {
                    name: stanza.name.to_string(),
                    protocol: stanza.protocol.map(str::to_ascii_lowercase),
                    description: None,
                    members: Vec::new(),
                };
                for member in stanza.members {
                    let member = match member {
                        ast::ServiceGroupMember::Port(port) => {
                            ServiceGroupMember::Port(port_specifier(&port))
                        }
                        ast::ServiceGroupMember::Service {
                            protocol,
                            source,
                            destination,
                        } => ServiceGroupMember::Service {
                            protocol: protocol.to_ascii_lowercase(),
                            source: source.as_ref().map(port_specifier),
                            destination: destination.as_ref().map(port_specifier),
                        },
                        ast::ServiceGroupMember::Group(name) => {
                            ServiceGroupMember::Group(name.to_string())
                        }
                        ast::ServiceGroupMember::Description(text) => {
                            group.description = Some(text.to_string());
                            continue;
                        }
                    };
                    group.members.push(member);
                }
                self.config
                    .service_object_groups
                    .insert(group.name.clone(), group);
            }
            Stanza::Nat(stanza) => self.nat(stanza),
            Stanza::Route(route) => self.config.static_routes.push(FtdStaticRoute {
                interface: route.nameif.to_string(),
                network: route.network,
                mask: route.mask,
                gateway: route.gateway,
                metric: route.metric.unwrap_or(1),
                tunneled: route.tunneled,
            }),
            Stanza::RouterOspf(stanza) => self.router_ospf(stanza),
            Stanza::RouterBgp(stanza) => self.router_bgp(stanza, span),
            Stanza::Ikev2Policy(stanza) => {
                let policy = self
                    .config
                    .ikev2_policies
                    .entry(stanza.priority)
                    .or_insert_with(|| FtdIkev2Policy::new(stanza.priority));
                for command in stanza.commands {
                    match command {
                        Ikev2PolicyCommand::Encryption(ciphers) => policy.encryption = ciphers,
                        Ikev2PolicyCommand::Integrity(hashes) => policy.integrity = hashes,
                        Ikev2PolicyCommand::Prf(hashes) => policy.prf = hashes,
                        Ikev2PolicyCommand::Group(groups) => policy.groups = groups,
                        Ikev2PolicyCommand::LifetimeSeconds(seconds) => {
                            policy.lifetime_seconds = Some(seconds)
                        }
                    }
                }
            }
            Stanza::TransformSet(stanza) => {
                let set = FtdIpsecTransformSet {
                    name: stanza.name.to_string(),
                    ciphers: stanza.ciphers,
                    hashes: stanza.hashes,
                    mode: stanza.mode,
                    ikev2_proposal: stanza.ikev2_proposal,
                };
                self.config.transform_sets.insert(set.name.clone(), set);
            }
            Stanza::IpsecProfile(stanza) => {
                let profile = FtdIpsecProfile {
                    name: stanza.name.to_string(),
                    transform_sets: stanza.transform_sets.iter().map(|s| s.to_string()).collect(),
                    pfs_group: stanza.pfs_group,
                };
                self.config.ipsec_profiles.insert(profile.name.clone(), profile);
            }
            Stanza::CryptoMapEntry(stanza) => self.crypto_map_entry(stanza),
            Stanza::CryptoMapInterface { map, nameif } => {
                self.config
                    .crypto_map_bindings
                    .insert(nameif.to_string(), map.to_string());
                self.crypto_binding_spans.insert(nameif.to_string(), span);
            }
            Stanza::TunnelGroup(stanza) => {
                let group = self
                    .config
                    .tunnel_groups
                    .entry(stanza.name.to_string())
                    .or_insert_with(|| FtdTunnelGroup::new(stanza.name));
                let attributes = match stanza.body {
                    TunnelGroupBody::Type(kind) => {
                        group.kind = Some(kind);
                        Vec::new()
                    }
                    TunnelGroupBody::IpsecAttributes(attributes)
                    | TunnelGroupBody::GeneralAttributes(attributes) => attributes,
                };
                for attribute in attributes {
                    match attribute {
                        TunnelGroupAttribute::RemotePreSharedKey(key) => {
                            group.remote_pre_shared_key = Some(key.to_string())
                        }
                        TunnelGroupAttribute::LocalPreSharedKey(key) => {
                            group.local_pre_shared_key = Some(key.to_string())
                        }
                        TunnelGroupAttribute::Ikev1PreSharedKey(key) => {
                            group.ikev1_pre_shared_key = Some(key.to_string())
                        }
                        TunnelGroupAttribute::DefaultGroupPolicy(policy) => {
                            group.default_group_policy = Some(policy.to_string())
                        }
                    }
                }
            }
            Stanza::ClassMap(stanza) => {
                let class_map = FtdClassMap {
                    name: stanza.name.to_string(),
                    class_type: stanza.class_type.map(str::to_string),
                    match_lines: stanza.match_lines.iter().map(|s| s.to_string()).collect(),
                    access_lists: stanza.access_lists.iter().map(|s| s.to_string()).collect(),
                };
                self.config
                    .class_maps
                    .insert(class_map.name.clone(), class_map);
            }
            Stanza::PolicyMap(stanza) => {
                let policy_map = FtdPolicyMap {
                    name: stanza.name.to_string(),
                    policy_type: stanza.policy_type.map(str::to_string),
                    classes: stanza
                        .classes
                        .into_iter()
                        .map(|class| FtdPolicyMapClass {
                            class_map: class.class_map.to_string(),
                            actions: class.actions.iter().map(|s| s.to_string()).collect(),
                        })
                        .collect(),
                    parameters: stanza.parameters.iter().map(|s| s.to_string()).collect(),
                };
                self.config
                    .policy_maps
                    .insert(policy_map.name.clone(), policy_map);
            }
            Stanza::ServicePolicy(stanza) => {
                let scope = match stanza.interface {
                    Some(nameif) => ServicePolicyScope::Interface(nameif.to_string()),
                    None => ServicePolicyScope::Global,
                };
                self.config.service_policies.push(FtdServicePolicy {
                    policy_map: stanza.policy_map.to_string(),
                    scope,
                });
            }
            Stanza::Names { enabled } => self.config.names_enabled = enabled,
            Stanza::Name { ip, name } => {
                self.config.names.insert(name.to_string(), ip);
            }
            Stanza::ArpTimeout(timeout) => self.config.arp_timeout = Some(timeout),
            Stanza::Failover(text) => self.config.failover.push(text.to_string()),
            Stanza::Ignored(_) => {}
        }
    }

    fn interface(&mut self, stanza: InterfaceStanza<'_>, span: Span) {
        let name = stanza.name.to_string();
        let iface = self
            .config
            .interfaces
            .entry(name.clone())
            .or_insert_with(|| FtdInterface::new(stanza.name));
        for command in stanza.commands {
            match command {
                InterfaceCommand::Nameif(nameif) => {
                    let claimed_by = self
                        .nameif_owner
                        .get(nameif)
                        .filter(|owner| **owner != name)
                        .cloned();
                    if let Some(owner) = claimed_by {
                        self.warnings.red_flag(
                            "duplicate-nameif",
                            format!("nameif {nameif} on {name} is already used by {owner}; ignoring"),
                            Some(span),
                        );
                        continue;
                    }
                    if let Some(previous) = iface.nameif.take()
                        && previous != nameif
                    {
                        self.nameif_owner.remove(&previous);
                    }
                    self.nameif_owner.insert(nameif.to_string(), name.clone());
                    iface.nameif = Some(nameif.to_string());
                }
                InterfaceCommand::NoNameif => {
                    if let Some(previous) = iface.nameif.take() {
                        self.nameif_owner.remove(&previous);
                    }
                }
                InterfaceCommand::SecurityLevel(level) => iface.security_level = Some(level),
                InterfaceCommand::IpAddress { ip, mask, standby } => {
                    iface.address = Some(FtdInterfaceAddress { ip, mask });
                    iface.standby_address = standby;
                }
                InterfaceCommand::NoIpAddress => {
                    iface.address = None;
                    iface.standby_address = None;
                }
                InterfaceCommand::Vlan(vlan) => iface.vlan = Some(vlan),
                InterfaceCommand::Vrf(vrf) => {
                    iface.vrf = Some(vrf.to_string());
                    self.config.vrfs.insert(vrf.to_string());
                }
                InterfaceCommand::Description(text) => iface.description = Some(text.to_string()),
                InterfaceCommand::Shutdown(shutdown) => iface.active = !shutdown,
                InterfaceCommand::ManagementOnly => iface.management_only = true,
            }
        }
    }

    fn access_list(&mut self, stanza: AccessListStanza<'_>, span: Span) {
        let line = match stanza.entry {
            AclEntry::Remark(text) => {
                self.record_remark(stanza.name, text);
                FtdAccessListLine::Remark(text.to_string())
            }
            AclEntry::Rule(rule) => match self.acl_rule(stanza.name, rule, span) {
                Some(rule) => FtdAccessListLine::Rule(rule),
                None => return,
            },
        };
        self.config
            .access_lists
            .entry(stanza.name.to_string())
            .or_insert_with(|| FtdAccessList::new(stanza.name))
            .lines
            .push(line);
    }

    fn record_remark(&mut self, acl: &str, text: &str) {
        let Some(rule_id) = RULE_ID
            .captures(text)
            .and_then(|caps| caps[1].parse::<u64>().ok())
        else {
            return;
        };
        let meta = self
            .remarks
            .entry(acl.to_string())
            .or_default()
            .entry(rule_id)
            .or_default();
        if let Some(caps) = RULE_NAME.captures(text) {
            meta.rule_name = Some(caps[1].trim().to_string());
        }
        if let Some(caps) = PREFILTER_POLICY.captures(text) {
            meta.policy_name = Some(caps[1].trim().to_string());
        } else if let Some(caps) = ACCESS_POLICY.captures(text)
            && meta.policy_name.is_none()
        {
            meta.policy_name = Some(caps[1].trim().to_string());
        } else if let Some(caps) = LABEL.captures(text) {
            let label = caps[1].trim();
            if !label.ends_with("RULE") && !label.ends_with("POLICY") {
                meta.labels
                    .insert(label.to_string(), caps[2].trim().to_string());
            }
        }
    }

    fn acl_rule(&mut self, acl: &str, rule: AclRule<'_>, span: Span) -> Option<FtdAclRule> {
        let source = self.address(&rule.source, span)?;
        let destination = self.address(&rule.destination, span)?;
        let remarks = rule.rule_id.and_then(|id| {
            self.remarks
                .get(acl)
                .and_then(|by_id| by_id.get(&id))
                .cloned()
        });
        Some(FtdAclRule {
            acl_type: match rule.kind {
                AclKind::Extended => AclType::Extended,
                AclKind::Advanced => AclType::Advanced,
            },
            action: match rule.verb {
                AclVerb::Deny => LineAction::Deny,
                AclVerb::Permit | AclVerb::Trust => LineAction::Permit,
            },
            trust: rule.verb == AclVerb::Trust,
            protocol: match rule.protocol {
                ProtocolRef::Named(name) => AclProtocol::Named(name.to_ascii_lowercase()),
                ProtocolRef::Object(name) => AclProtocol::Object(name.to_string()),
                ProtocolRef::ObjectGroup(name) => AclProtocol::ObjectGroup(name.to_string()),
            },
            interface: rule.interface.map(str::to_string),
            destination_interface: rule.destination_interface.map(str::to_string),
            source,
            source_port: rule.source_port.as_ref().map(port_specifier),
            destination,
            destination_port: rule.destination_port.as_ref().map(port_specifier),
            rule_id: rule.rule_id,
            time_range: rule.time_range.map(str::to_string),
            inactive: rule.inactive,
            log: rule.log,
            remarks,
        })
    }

    fn address(&mut self, address: &AddressRef<'_>, span: Span) -> Option<AddressSpecifier> {
        Some(match address {
            AddressRef::Any => AddressSpecifier::Any,
            AddressRef::Any4 => AddressSpecifier::Any4,
            AddressRef::Any6 => AddressSpecifier::Any6,
            AddressRef::Host(host) => AddressSpecifier::Host(self.host(host, span)?),
            AddressRef::NetworkMask(ip, mask) => AddressSpecifier::NetworkMask(*ip, *mask),
            AddressRef::Object(name) => AddressSpecifier::Object(name.to_string()),
            AddressRef::ObjectGroup(name) => AddressSpecifier::ObjectGroup(name.to_string()),
        })
    }

    /// Resolve `host NAME` through the `name` table; reports and returns `None` on failure.
    fn host(&mut self, host: &HostRef<'_>, span: Span) -> Option<Ipv4Addr> {
        match host {
            HostRef::Ip(ip) => Some(*ip),
            HostRef::Name(name) => {
                let resolved = self
                    .config
                    .names_enabled
                    .then(|| self.config.names.get(*name).copied())
                    .flatten();
                if resolved.is_none() {
                    let reason = if self.config.names_enabled {
                        "is not defined"
                    } else {
                        "cannot be used while names are disabled"
                    };
                    self.warnings.red_flag(
                        "undefined-name",
                        format!("host name {name} {reason}; dropping line"),
                        Some(span),
                    );
                }
                resolved
            }
        }
    }

    fn network_object(&mut self, stanza: NetworkObjectStanza<'_>, span: Span) {
        let mut object = FtdNetworkObject {
            name: stanza.name.to_string(),
            value: None,
            description: None,
        };
        for command in stanza.commands {
            match command {
                NetworkObjectCommand::Host(host) => {
                    if let Some(ip) = self.host(&host, span) {
                        object.value = Some(NetworkObjectValue::Host(ip));
                    }
                }
                NetworkObjectCommand::Subnet(ip, mask) => {
                    object.value = Some(NetworkObjectValue::Subnet(ip, mask))
                }
                NetworkObjectCommand::Range(start, end) => {
                    object.value = Some(NetworkObjectValue::Range(start, end))
                }
                NetworkObjectCommand::Fqdn(fqdn) => {
                    object.value = Some(NetworkObjectValue::Fqdn(fqdn.to_string()))
                }
                NetworkObjectCommand::Description(text) => {
                    object.description = Some(text.to_string())
                }
                NetworkObjectCommand::Nat(nat) => self.config.nat_rules.push(FtdNatRule {
                    real_interface: nat.real_interface.to_string(),
                    mapped_interface: nat.mapped_interface.to_string(),
                    position: NatPosition::Auto,
                    source: Some(NatSource {
                        kind: nat.kind,
                        real: NatAddress::Object(stanza.name.to_string()),
                        mapped: nat_address(&nat.mapped),
                    }),
                    destination: None,
                    service: nat.service.as_ref().map(nat_service),
                    inactive: false,
                    description: None,
                    object_nat: true,
                }),
            }
        }
        self.config
            .network_objects
            .insert(object.name.clone(), object);
    }

    fn nat(&mut self, stanza: NatStanza<'_>) {
        self.config.nat_rules.push(FtdNatRule {
            real_interface: stanza.real_interface.to_string(),
            mapped_interface: stanza.mapped_interface.to_string(),
            position: stanza.order,
            source: stanza.source.map(|(kind, real, mapped)| NatSource {
                kind,
                real: nat_address(&real),
                mapped: nat_address(&mapped),
            }),
            destination: stanza.destination.map(|(real, mapped)| NatDestination {
                real: nat_address(&real),
                mapped: nat_address(&mapped),
            }),
            service: stanza.service.as_ref().map(nat_service),
            inactive: stanza.inactive,
            description: stanza.description.map(str::to_string),
            object_nat: false,
        });
    }

    fn router_ospf(&mut self, stanza: OspfStanza<'_>) {
        let process = self
            .config
            .ospf_processes
            .entry(stanza.process.to_string())
            .or_insert_with(|| FtdOspfProcess::new(stanza.process));
        for command in stanza.commands {
            match command {
                OspfCommand::Network { ip, mask, area } => {
                    process.networks.push(FtdOspfNetwork { ip, mask, area });
                    process.area_mut(area);
                }
                OspfCommand::RouterId(id) => process.router_id = Some(id),
                OspfCommand::PassiveInterface(nameif) => {
                    process.non_passive_interfaces.remove(nameif);
                    process.passive_interfaces.insert(nameif.to_string());
                }
                OspfCommand::PassiveDefault => process.passive_by_default = true,
                OspfCommand::NoPassiveInterface(nameif) => {
                    process.passive_interfaces.remove(nameif);
                    process.non_passive_interfaces.insert(nameif.to_string());
                }
                OspfCommand::AreaStub(area) => process.area_mut(area).stub = true,
                OspfCommand::AreaNssa(area) => process.area_mut(area).nssa = true,
                OspfCommand::AreaAuthentication(area) => {
                    process.area_mut(area).authentication = true
                }
            }
        }
    }

    fn router_bgp(&mut self, stanza: BgpStanza<'_>, span: Span) {
        let process = self
            .config
            .bgp_process
            .get_or_insert_with(|| FtdBgpProcess::new(stanza.asn));
        if process.asn != stanza.asn {
            self.warnings.red_flag(
                "bgp-asn-mismatch",
                format!(
                    "router bgp {} ignored; BGP process {} is already configured",
                    stanza.asn, process.asn
                ),
                Some(span),
            );
            return;
        }
        bgp_commands(process, stanza.commands, false);
    }

    fn crypto_map_entry(&mut self, stanza: CryptoMapEntryStanza<'_>) {
        let entry = self
            .config
            .crypto_maps
            .entry(stanza.map.to_string())
            .or_insert_with(|| FtdCryptoMapSet::new(stanza.map))
            .entry_mut(stanza.sequence);
        match stanza.command {
            CryptoMapCommand::MatchAddress(acl) => entry.access_list = Some(acl.to_string()),
            CryptoMapCommand::SetPeer(peers) => entry.peers = peers,
            CryptoMapCommand::SetTransformSets(sets) => {
                entry.transform_sets = sets.iter().map(|s| s.to_string()).collect()
            }
            CryptoMapCommand::SetPfs(group) => entry.pfs_group = group,
            CryptoMapCommand::DynamicMap(name) => entry.dynamic_map = Some(name.to_string()),
            CryptoMapCommand::IsakmpProfile(name) => entry.isakmp_profile = Some(name.to_string()),
            CryptoMapCommand::Other => {}
        }
    }

    fn finish(mut self) -> FtdConfiguration {
        for (nameif, mtu, span) in std::mem::take(&mut self.pending_mtu) {
            match self
                .config
                .interfaces
                .values_mut()
                .find(|iface| iface.nameif.as_deref() == Some(nameif.as_str()))
            {
                Some(iface) => iface.mtu = Some(mtu),
                None => self.warnings.red_flag(
                    "undefined-interface",
                    format!("mtu refers to unknown interface {nameif}"),
                    Some(span),
                ),
            }
        }
        for (nameif, map) in &self.config.crypto_map_bindings {
            match self
                .config
                .interfaces
                .values_mut()
                .find(|iface| iface.nameif.as_deref() == Some(nameif.as_str()))
            {
                Some(iface) => iface.crypto_map = Some(map.clone()),
                None => self.warnings.red_flag(
                    "undefined-interface",
                    format!("crypto map {map} is bound to unknown interface {nameif}"),
                    self.crypto_binding_spans.get(nameif).copied(),
                ),
            }
        }

        let config = self.config;
        debug!(
            interfaces = config.interfaces.len(),
            access_lists = config.access_lists.len(),
            objects = config.network_objects.len(),
            object_groups = config.network_object_groups.len() + config.service_object_groups.len(),
            nat_rules = config.nat_rules.len(),
            static_routes = config.static_routes.len(),
            crypto_maps = config.crypto_maps.len(),
            "extracted vendor model"
        );
        config
    }
}

fn bgp_commands(process: &mut FtdBgpProcess, commands: Vec<BgpCommand<'_>>, in_ipv4_family: bool) {
    for command in commands {
        match command {
            BgpCommand::RouterId(id) => process.router_id = Some(id),
            BgpCommand::AddressFamilyIpv4(body) => {
                process.ipv4_address_family_active = true;
                bgp_commands(process, body, true);
            }
            BgpCommand::Neighbor(ip, command) => {
                let neighbor = process.neighbor_mut(ip);
                match command {
                    NeighborCommand::RemoteAs(asn) => neighbor.remote_as = Some(asn),
                    NeighborCommand::Description(text) => {
                        neighbor.description = Some(text.to_string())
                    }
                    NeighborCommand::Timers { keepalive, hold } => {
                        neighbor.keepalive = Some(keepalive);
                        neighbor.hold_time = Some(hold);
                    }
                    NeighborCommand::RouteMapIn(map) => neighbor.route_map_in = Some(map.to_string()),
                    NeighborCommand::RouteMapOut(map) => {
                        neighbor.route_map_out = Some(map.to_string())
                    }
                    NeighborCommand::Activate => {
                        if in_ipv4_family {
                            neighbor.ipv4_unicast_active = true;
                        }
                    }
                    NeighborCommand::Shutdown => neighbor.shutdown = true,
                }
            }
        }
    }
}

fn port_specifier(port: &PortRef<'_>) -> PortSpecifier {
    match port {
        PortRef::Eq(p) => PortSpecifier::Eq(p.to_string()),
        PortRef::Gt(p) => PortSpecifier::Gt(p.to_string()),
        PortRef::Lt(p) => PortSpecifier::Lt(p.to_string()),
        PortRef::Neq(p) => PortSpecifier::Neq(p.to_string()),
        PortRef::Range(low, high) => PortSpecifier::Range(low.to_string(), high.to_string()),
        PortRef::ObjectGroup(name) => PortSpecifier::ObjectGroup(name.to_string()),
    }
}

fn nat_address(address: &NatAddressRef<'_>) -> NatAddress {
    match address {
        NatAddressRef::Any => NatAddress::Any,
        NatAddressRef::Interface => NatAddress::Interface,
        NatAddressRef::Ip(ip) => NatAddress::Ip(*ip),
        NatAddressRef::Name(name) => NatAddress::Object(name.to_string()),
    }
}

fn nat_service(service: &NatServiceRef<'_>) -> NatService {
    NatService {
        protocol: service.protocol.map(str::to_ascii_lowercase),
        real: service.real.to_string(),
        mapped: service.mapped.to_string(),
    }
}
