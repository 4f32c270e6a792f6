//! Access-list lines, address and port resolution.

use std::collections::{BTreeMap, BTreeSet};

use netcomp_ir::{
    AclLine, AclMatchExpr, HeaderSpace, IpAccessList, IpProtocol, IpSpace, LineAction, Prefix,
    SubRange,
};

use super::Lowering;
use crate::model::{
    AclProtocol, AclType, AddressSpecifier, FtdAclRule, NetworkGroupMember, NetworkObjectValue,
    PortSpecifier, ServiceGroupMember,
};
use crate::validate;

/// Protocols and ports contributed by a service object-group.
/// `ports` holds `port-object` members, which apply to whichever operand
/// names the group.
#[derive(Debug, Default)]
struct ServiceMatch {
    protocols: BTreeSet<IpProtocol>,
    ports: Vec<SubRange>,
    src_ports: Vec<SubRange>,
    dst_ports: Vec<SubRange>,
}

/// Which port operand of a line a service group stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PortSide {
    Source,
    Destination,
}

impl ServiceMatch {
    fn side_ports(self, side: PortSide) -> Vec<SubRange> {
        let mut ports = self.ports;
        ports.extend(match side {
            PortSide::Source => self.src_ports,
            PortSide::Destination => self.dst_ports,
        });
        ports
    }
}

impl Lowering<'_, '_> {
    pub(super) fn access_lists(&mut self) {
        let config = self.config;
        let mut lowered = BTreeMap::new();
        for acl in config.access_lists.values() {
            let lines = acl
                .rules()
                .filter(|rule| !rule.inactive)
                .filter_map(|rule| self.acl_line(&acl.name, rule))
                .collect();
            lowered.insert(acl.name.clone(), IpAccessList::new(&acl.name, lines));
        }
        self.out.ip_access_lists.extend(lowered);
    }

    fn acl_line(&mut self, acl: &str, rule: &FtdAclRule) -> Option<AclLine> {
        let name = line_name(rule);
        let mut header = HeaderSpace::default();

        match &rule.protocol {
            AclProtocol::Named(protocol) => header.ip_protocols = self.protocols(protocol, acl)?,
            AclProtocol::ObjectGroup(group) => {
                let mut service = self.service_group(group)?;
                header.ip_protocols = std::mem::take(&mut service.protocols);
                header.src_ports = std::mem::take(&mut service.src_ports);
                header.dst_ports = service.side_ports(PortSide::Destination);
            }
            AclProtocol::Object(object) => {
                self.warnings.unimplemented(
                    "service-object",
                    format!("{acl}: service object {object} matches any protocol"),
                    None,
                );
            }
        }

        header.src_ips = self.address_space(&rule.source);
        header.dst_ips = self.address_space(&rule.destination);

        if let Some(port) = &rule.source_port {
            header.src_ports =
                self.line_ports(port, PortSide::Source, &mut header.ip_protocols, acl)?;
        }
        if let Some(port) = &rule.destination_port {
            header.dst_ports =
                self.line_ports(port, PortSide::Destination, &mut header.ip_protocols, acl)?;
        }

        let interface = match (&rule.acl_type, &rule.interface) {
            (AclType::Advanced, Some(nameif)) => {
                let devices = self
                    .require_device(nameif, acl)
                    .map(str::to_string)
                    .into_iter()
                    .collect();
                AclMatchExpr::MatchSrcInterface(devices)
            }
            _ => AclMatchExpr::True,
        };

        Some(AclLine {
            name,
            action: rule.action,
            match_condition: AclMatchExpr::and(vec![interface, AclMatchExpr::HeaderSpace(header)]),
        })
    }

    /// Protocol set for a named protocol; empty means any.
    fn protocols(&mut self, protocol: &str, acl: &str) -> Option<BTreeSet<IpProtocol>> {
        match protocol {
            "ip" => Some(BTreeSet::new()),
            "tcp-udp" => Some(BTreeSet::from([IpProtocol::Tcp, IpProtocol::Udp])),
            other => match IpProtocol::from_name(other) {
                Some(protocol) => Some(BTreeSet::from([protocol])),
                None => {
                    self.warnings.red_flag(
                        "unknown-protocol",
                        format!("{acl}: line with unknown protocol {other} dropped"),
                        None,
                    );
                    None
                }
            },
        }
    }

    /// Port ranges for a line's port operand. A service group may narrow or
    /// supply the protocol set; `None` drops the line.
    fn line_ports(
        &mut self,
        port: &PortSpecifier,
        side: PortSide,
        protocols: &mut BTreeSet<IpProtocol>,
        acl: &str,
    ) -> Option<Vec<SubRange>> {
        let PortSpecifier::ObjectGroup(group) = port else {
            return self.port_ranges(port, acl);
        };
        let service = self.service_group(group)?;
        if !service.protocols.is_empty() {
            if protocols.is_empty() {
                protocols.clone_from(&service.protocols);
            } else if protocols.is_disjoint(&service.protocols) {
                self.warnings.red_flag(
                    "protocol-mismatch",
                    format!("{acl}: service object-group {group} shares no protocol with the line"),
                    None,
                );
                return None;
            }
        }
        Some(service.side_ports(side))
    }

    /// Ranges for a literal port operand; named ports are accepted.
    fn port_ranges(&mut self, port: &PortSpecifier, context: &str) -> Option<Vec<SubRange>> {
        let ranges = match port {
            PortSpecifier::Eq(value) => vec![SubRange::single(self.port(value, context)?)],
            PortSpecifier::Gt(value) => {
                let Some(low) = self.port(value, context)?.checked_add(1) else {
                    return self.empty_ports(context, port);
                };
                vec![SubRange::new(low, u16::MAX)]
            }
            PortSpecifier::Lt(value) => {
                let Some(high) = self.port(value, context)?.checked_sub(1) else {
                    return self.empty_ports(context, port);
                };
                vec![SubRange::new(0, high)]
            }
            PortSpecifier::Neq(value) => {
                let port = self.port(value, context)?;
                let below = port.checked_sub(1).map(|high| SubRange::new(0, high));
                let above = port.checked_add(1).map(|low| SubRange::new(low, u16::MAX));
                below.into_iter().chain(above).collect()
            }
            PortSpecifier::Range(low, high) => {
                let low = self.port(low, context)?;
                let high = self.port(high, context)?;
                if low > high {
                    return self.empty_ports(context, port);
                }
                vec![SubRange::new(low, high)]
            }
            PortSpecifier::ObjectGroup(group) => {
                return Some(self.service_group(group)?.side_ports(PortSide::Destination));
            }
        };
        Some(ranges)
    }

    fn empty_ports(&mut self, context: &str, port: &PortSpecifier) -> Option<Vec<SubRange>> {
        self.warnings.syntax(
            "invalid-port-range",
            format!("{context}: {port} matches no port"),
            None,
        );
        None
    }

    fn port(&mut self, text: &str, context: &str) -> Option<u16> {
        match validate::port(text) {
            Ok(port) => Some(port),
            Err(message) => {
                self.warnings.syntax("invalid-port", format!("{context}: {message}"), None);
                None
            }
        }
    }

    /// Resolve a service object-group; an unknown name drops the line.
    fn service_group(&mut self, name: &str) -> Option<ServiceMatch> {
        let config = self.config;
        if !config.service_object_groups.contains_key(name) {
            self.warnings.red_flag(
                "undefined-reference",
                format!("unknown service object-group {name}"),
                None,
            );
            return None;
        }
        let mut visited = BTreeSet::new();
        let mut service = ServiceMatch::default();
        self.collect_service_group(name, &mut visited, &mut service);
        Some(service)
    }

    fn collect_service_group(
        &mut self,
        name: &str,
        visited: &mut BTreeSet<String>,
        service: &mut ServiceMatch,
    ) {
        let config = self.config;
        if !visited.insert(name.to_string()) {
            return;
        }
        let Some(group) = config.service_object_groups.get(name) else {
            self.warnings.red_flag(
                "undefined-reference",
                format!("unknown service object-group {name}"),
                None,
            );
            return;
        };
        if let Some(protocol) = &group.protocol
            && let Some(protocols) = self.protocols(protocol, name)
        {
            service.protocols.extend(protocols);
        }
        for member in &group.members {
            match member {
                ServiceGroupMember::Port(port) => {
                    if let Some(ranges) = self.port_ranges(port, name) {
                        service.ports.extend(ranges);
                    }
                }
                ServiceGroupMember::Service {
                    protocol,
                    source,
                    destination,
                } => {
                    if let Some(protocols) = self.protocols(protocol, name) {
                        service.protocols.extend(protocols);
                    }
                    if let Some(port) = source
                        && let Some(ranges) = self.port_ranges(port, name)
                    {
                        service.src_ports.extend(ranges);
                    }
                    if let Some(port) = destination
                        && let Some(ranges) = self.port_ranges(port, name)
                    {
                        service.dst_ports.extend(ranges);
                    }
                }
                ServiceGroupMember::Group(inner) => {
                    self.collect_service_group(inner, visited, service);
                }
            }
        }
    }

    /// IP space of an address operand; `None` means any.
    pub(super) fn address_space(&mut self, address: &AddressSpecifier) -> Option<IpSpace> {
        let space = match address {
            AddressSpecifier::Any | AddressSpecifier::Any4 => return None,
            // IPv4 traffic never matches an IPv6-only operand.
            AddressSpecifier::Any6 => IpSpace::Empty,
            AddressSpecifier::Host(ip) => IpSpace::Ip(*ip),
            AddressSpecifier::NetworkMask(ip, mask) => self.masked(*ip, *mask),
            AddressSpecifier::Object(name) => self.object_space(name),
            AddressSpecifier::ObjectGroup(name) => self.group_space(name, &mut BTreeSet::new()),
        };
        Some(space)
    }

    fn masked(&mut self, ip: std::net::Ipv4Addr, mask: std::net::Ipv4Addr) -> IpSpace {
        match Prefix::from_mask(ip, mask) {
            Some(prefix) => IpSpace::Prefix(prefix),
            None => {
                self.warnings.red_flag(
                    "invalid-netmask",
                    format!("non-contiguous mask {mask} for {ip} matches nothing"),
                    None,
                );
                IpSpace::Empty
            }
        }
    }

    /// Space of a network object. FQDN and address-less objects are empty.
    pub(super) fn object_space(&mut self, name: &str) -> IpSpace {
        let config = self.config;
        let Some(object) = config.network_objects.get(name) else {
            self.warnings.red_flag(
                "undefined-reference",
                format!("unknown network object {name}"),
                None,
            );
            return IpSpace::Empty;
        };
        match &object.value {
            Some(NetworkObjectValue::Host(ip)) => IpSpace::Ip(*ip),
            Some(NetworkObjectValue::Subnet(ip, mask)) => self.masked(*ip, *mask),
            Some(NetworkObjectValue::Range(start, end)) => IpSpace::Range {
                start: *start,
                end: *end,
            },
            Some(NetworkObjectValue::Fqdn(_)) | None => IpSpace::Empty,
        }
    }

    /// Union of a network object-group's members; cycles contribute nothing.
    pub(super) fn group_space(&mut self, name: &str, visited: &mut BTreeSet<String>) -> IpSpace {
        let config = self.config;
        if !visited.insert(name.to_string()) {
            return IpSpace::Empty;
        }
        let Some(group) = config.network_object_groups.get(name) else {
            self.warnings.red_flag(
                "undefined-reference",
                format!("unknown network object-group {name}"),
                None,
            );
            return IpSpace::Empty;
        };
        let members = group
            .members
            .iter()
            .map(|member| match member {
                NetworkGroupMember::Host(ip) => IpSpace::Ip(*ip),
                NetworkGroupMember::NetworkMask(ip, mask) => self.masked(*ip, *mask),
                NetworkGroupMember::Object(object) => self.object_space(object),
                NetworkGroupMember::Group(inner) => self.group_space(inner, visited),
            })
            .collect();
        IpSpace::union(members)
    }
}

/// Human-readable line name:
/// `rule-id N[ | RULE][ | POLICY] :: [ifc IF ]ACTION PROTO SRC -> DST[ PORT]`.
pub(super) fn line_name(rule: &FtdAclRule) -> String {
    let mut name = String::new();
    if let Some(id) = rule.rule_id {
        name.push_str(&format!("rule-id {id}"));
        if let Some(remarks) = &rule.remarks {
            for part in [&remarks.rule_name, &remarks.policy_name].into_iter().flatten() {
                name.push_str(" | ");
                name.push_str(part);
            }
        }
        name.push_str(" :: ");
    }
    if let Some(interface) = &rule.interface {
        name.push_str(&format!("ifc {interface} "));
    }
    let action = match (rule.trust, rule.action) {
        (true, _) => "trust",
        (false, LineAction::Permit) => "PERMIT",
        (false, LineAction::Deny) => "DENY",
    };
    name.push_str(&format!(
        "{action} {} {} -> {}",
        rule.protocol, rule.source, rule.destination
    ));
    if let Some(port) = &rule.destination_port {
        name.push_str(&format!(" {port}"));
    }
    name.trim().to_string()
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use netcomp_ir::{Configuration, Warnings};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{
        FtdAccessList, FtdAccessListLine, FtdConfiguration, FtdInterface, FtdNetworkObject,
        FtdNetworkObjectGroup, FtdServiceObjectGroup, RuleRemarks,
    };

    fn rule(protocol: &str, destination_port: Option<PortSpecifier>) -> FtdAclRule {
        FtdAclRule {
            acl_type: AclType::Extended,
            action: LineAction::Permit,
            trust: false,
            protocol: AclProtocol::Named(protocol.into()),
            interface: None,
            destination_interface: None,
            source: AddressSpecifier::Any,
            source_port: None,
            destination: AddressSpecifier::Any,
            destination_port,
            rule_id: None,
            time_range: None,
            inactive: false,
            log: false,
            remarks: None,
        }
    }

    fn lower_one(config: &mut FtdConfiguration, rules: Vec<FtdAclRule>) -> (Configuration, Warnings) {
        let mut acl = FtdAccessList::new("A");
        acl.lines = rules.into_iter().map(FtdAccessListLine::Rule).collect();
        config.access_lists.insert("A".into(), acl);
        let mut warnings = Warnings::new();
        let lowered = super::super::lower(config, &mut warnings).expect("lower");
        (lowered, warnings)
    }

    fn header(line: &AclLine) -> &HeaderSpace {
        match &line.match_condition {
            AclMatchExpr::HeaderSpace(header) => header,
            AclMatchExpr::And(parts) => parts
                .iter()
                .find_map(|part| match part {
                    AclMatchExpr::HeaderSpace(header) => Some(header),
                    _ => None,
                })
                .expect("header space"),
            other => panic!("unexpected match {other:?}"),
        }
    }

    #[test]
    fn deny_tcp_eq_80_round_trips_through_the_name() {
        let mut deny = rule("tcp", Some(PortSpecifier::Eq("80".into())));
        deny.action = LineAction::Deny;
        let (lowered, _) = lower_one(&mut FtdConfiguration::default(), vec![deny]);
        let line = &lowered.ip_access_lists["A"].lines[0];
        assert_eq!(line.name, "DENY tcp any -> any eq 80");
        assert_eq!(line.action, LineAction::Deny);
        let header = header(line);
        assert_eq!(header.ip_protocols, BTreeSet::from([IpProtocol::Tcp]));
        assert_eq!(header.dst_ports, vec![SubRange::single(80)]);
        assert_eq!(header.src_ips, None);
    }

    #[test]
    fn remark_metadata_and_interface_are_part_of_the_name() {
        let mut advanced = rule("ip", None);
        advanced.acl_type = AclType::Advanced;
        advanced.trust = true;
        advanced.rule_id = Some(100);
        advanced.interface = Some("inside".into());
        advanced.remarks = Some(RuleRemarks {
            rule_name: Some("R".into()),
            policy_name: Some("P".into()),
            ..RuleRemarks::default()
        });
        let mut config = FtdConfiguration::default();
        let mut iface = FtdInterface::new("Gi0/1");
        iface.nameif = Some("inside".into());
        config.interfaces.insert("Gi0/1".into(), iface);

        let (lowered, _) = lower_one(&mut config, vec![advanced]);
        let line = &lowered.ip_access_lists["A"].lines[0];
        assert_eq!(line.name, "rule-id 100 | R | P :: ifc inside trust ip any -> any");
        assert_eq!(line.action, LineAction::Permit);
        assert_eq!(
            line.match_condition,
            AclMatchExpr::And(vec![
                AclMatchExpr::src_interface("Gi0/1"),
                AclMatchExpr::HeaderSpace(HeaderSpace::default()),
            ])
        );
    }

    #[test]
    fn inactive_lines_are_skipped() {
        let mut inactive = rule("ip", None);
        inactive.inactive = true;
        let (lowered, _) = lower_one(&mut FtdConfiguration::default(), vec![inactive, rule("udp", None)]);
        assert_eq!(lowered.ip_access_lists["A"].lines.len(), 1);
    }

    #[test]
    fn port_operators_expand_to_ranges() {
        let mut config = FtdConfiguration::default();
        let rules = vec![
            rule("tcp", Some(PortSpecifier::Gt("1023".into()))),
            rule("tcp", Some(PortSpecifier::Lt("https".into()))),
            rule("tcp", Some(PortSpecifier::Neq("22".into()))),
            rule("tcp", Some(PortSpecifier::Gt("65535".into()))),
        ];
        let (lowered, _) = lower_one(&mut config, rules);
        let lines = &lowered.ip_access_lists["A"].lines;
        assert_eq!(lines.len(), 3);
        assert_eq!(header(&lines[0]).dst_ports, vec![SubRange::new(1024, 65535)]);
        assert_eq!(header(&lines[1]).dst_ports, vec![SubRange::new(0, 442)]);
        assert_eq!(
            header(&lines[2]).dst_ports,
            vec![SubRange::new(0, 21), SubRange::new(23, 65535)]
        );
    }

    #[test]
    fn objects_resolve_and_unknown_names_match_nothing() {
        let mut config = FtdConfiguration::default();
        config.network_objects.insert(
            "WEB".into(),
            FtdNetworkObject {
                name: "WEB".into(),
                value: Some(NetworkObjectValue::Host(Ipv4Addr::new(10, 0, 0, 5))),
                description: None,
            },
        );
        config.network_objects.insert(
            "SITE".into(),
            FtdNetworkObject {
                name: "SITE".into(),
                value: Some(NetworkObjectValue::Fqdn("example.com".into())),
                description: None,
            },
        );
        config.network_object_groups.insert(
            "LOOP".into(),
            FtdNetworkObjectGroup {
                name: "LOOP".into(),
                description: None,
                members: vec![
                    NetworkGroupMember::Object("WEB".into()),
                    NetworkGroupMember::Group("LOOP".into()),
                ],
            },
        );
        let mut to_web = rule("ip", None);
        to_web.destination = AddressSpecifier::ObjectGroup("LOOP".into());
        let mut to_fqdn = rule("ip", None);
        to_fqdn.destination = AddressSpecifier::Object("SITE".into());
        let mut to_missing = rule("ip", None);
        to_missing.destination = AddressSpecifier::Object("NOPE".into());

        let (lowered, warnings) = lower_one(&mut config, vec![to_web, to_fqdn, to_missing]);
        let lines = &lowered.ip_access_lists["A"].lines;
        assert_eq!(header(&lines[0]).dst_ips, Some(IpSpace::Ip(Ipv4Addr::new(10, 0, 0, 5))));
        assert_eq!(header(&lines[1]).dst_ips, Some(IpSpace::Empty));
        assert_eq!(header(&lines[2]).dst_ips, Some(IpSpace::Empty));
        assert_eq!(warnings.len(), 1);
        assert!(warnings.has_code("undefined-reference"));
    }

    #[test]
    fn service_group_port_operand_narrows_or_supplies_protocols() {
        let mut config = FtdConfiguration::default();
        config.service_object_groups.insert(
            "WEB".into(),
            FtdServiceObjectGroup {
                name: "WEB".into(),
                protocol: Some("tcp".into()),
                description: None,
                members: vec![
                    ServiceGroupMember::Port(PortSpecifier::Eq("www".into())),
                    ServiceGroupMember::Port(PortSpecifier::Range("8000".into(), "8080".into())),
                ],
            },
        );
        let group = || Some(PortSpecifier::ObjectGroup("WEB".into()));
        let rules = vec![rule("tcp", group()), rule("udp", group()), rule("ip", group())];
        let (lowered, _) = lower_one(&mut config, rules);
        let lines = &lowered.ip_access_lists["A"].lines;
        assert_eq!(lines.len(), 2);
        for line in lines {
            assert_eq!(header(line).ip_protocols, BTreeSet::from([IpProtocol::Tcp]));
            assert_eq!(
                header(line).dst_ports,
                vec![SubRange::single(80), SubRange::new(8000, 8080)]
            );
        }
    }

    #[test]
    fn source_operand_group_contributes_source_ports() {
        let mut config = FtdConfiguration::default();
        config.service_object_groups.insert(
            "EPHEMERAL".into(),
            FtdServiceObjectGroup {
                name: "EPHEMERAL".into(),
                protocol: None,
                description: None,
                members: vec![
                    ServiceGroupMember::Port(PortSpecifier::Range("49152".into(), "65535".into())),
                    ServiceGroupMember::Service {
                        protocol: "tcp".into(),
                        source: Some(PortSpecifier::Eq("1024".into())),
                        destination: Some(PortSpecifier::Eq("22".into())),
                    },
                ],
            },
        );
        let mut line = rule("tcp", Some(PortSpecifier::Eq("80".into())));
        line.source_port = Some(PortSpecifier::ObjectGroup("EPHEMERAL".into()));

        let (lowered, warnings) = lower_one(&mut config, vec![line]);
        let header = header(&lowered.ip_access_lists["A"].lines[0]);
        assert_eq!(
            header.src_ports,
            vec![SubRange::new(49152, 65535), SubRange::single(1024)]
        );
        assert_eq!(header.dst_ports, vec![SubRange::single(80)]);
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn empty_port_operands_drop_the_line_with_a_warning() {
        let rules = vec![
            rule("tcp", Some(PortSpecifier::Range("9000".into(), "8000".into()))),
            rule("tcp", Some(PortSpecifier::Lt("0".into()))),
            rule("tcp", Some(PortSpecifier::Eq("443".into()))),
        ];
        let (lowered, warnings) = lower_one(&mut FtdConfiguration::default(), rules);
        let lines = &lowered.ip_access_lists["A"].lines;
        assert_eq!(lines.len(), 1);
        assert_eq!(header(&lines[0]).dst_ports, vec![SubRange::single(443)]);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.code == "invalid-port-range"));
        assert!(warnings.iter().any(|w| w.message.contains("range 9000 8000")));
    }
}
