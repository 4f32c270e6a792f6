//! Access lists, access groups, objects, object groups and NAT.

use crate::ast::{
    AccessGroupBinding, AccessGroupStanza, AccessListStanza, AclEntry, AclKind, AclRule, AclVerb,
    AddressRef, HostRef, NatAddressRef, NatKind, NatPosition, NatServiceRef, NatStanza,
    NetworkGroupMember, NetworkObjectCommand, NetworkObjectGroupStanza, NetworkObjectStanza,
    ObjectNat, PortRef, ProtocolRef, ServiceGroupMember, ServiceObjectGroupStanza, Stanza,
};
use crate::keywords::Keyword;
use crate::scanner::TokenKind;
use crate::validate;

use super::lines::{Cursor, LineResult, SyntaxError};
use super::{BodyLine, Dispatcher};

/// `access-list NAME [extended|advanced] ACTION ...` or `access-list NAME remark TEXT`.
pub(super) fn access_list<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<Stanza<'a>> {
    let name = cursor.name("access-list name")?;
    if cursor.eat(Keyword::Remark) {
        return Ok(Stanza::AccessList(AccessListStanza {
            name,
            entry: AclEntry::Remark(cursor.text().trim()),
        }));
    }
    for other in ["standard", "webtype", "ethertype"] {
        if cursor.at_text(other) {
            return Ok(Stanza::Ignored("access-list"));
        }
    }
    let kind = if cursor.eat(Keyword::Advanced) {
        AclKind::Advanced
    } else {
        cursor.eat(Keyword::Extended);
        AclKind::Extended
    };
    let rule = acl_rule(cursor, kind)?;
    Ok(Stanza::AccessList(AccessListStanza {
        name,
        entry: AclEntry::Rule(rule),
    }))
}

fn acl_rule<'a>(cursor: &mut Cursor<'_, 'a>, kind: AclKind) -> LineResult<AclRule<'a>> {
    let verb = if cursor.eat(Keyword::Deny) {
        AclVerb::Deny
    } else if cursor.eat(Keyword::Trust) {
        AclVerb::Trust
    } else if cursor.eat_text("permit") {
        AclVerb::Permit
    } else {
        return Err(cursor.error("expected permit, deny or trust"));
    };

    let protocol = if cursor.eat(Keyword::ObjectGroup) {
        ProtocolRef::ObjectGroup(cursor.name("protocol object-group")?)
    } else if cursor.eat(Keyword::Object) {
        ProtocolRef::Object(cursor.name("protocol object")?)
    } else {
        ProtocolRef::Named(cursor.name("protocol")?)
    };
    let is_icmp = matches!(protocol, ProtocolRef::Named(p) if p.eq_ignore_ascii_case("icmp") || p.eq_ignore_ascii_case("icmp6"));

    let interface = interface_clause(cursor)?;
    let source = address_ref(cursor)?;
    let source_port = if at_port_operator(cursor) {
        Some(port_ref(cursor)?)
    } else if !is_icmp && at_source_service_group(cursor) {
        cursor.expect(Keyword::ObjectGroup)?;
        Some(PortRef::ObjectGroup(cursor.name("service object-group")?))
    } else {
        None
    };
    let (destination_interface, destination, destination_port) = destination_tail(cursor)?;

    let mut rule = AclRule {
        kind,
        verb,
        protocol,
        interface,
        source,
        source_port,
        destination_interface,
        destination,
        destination_port,
        rule_id: None,
        time_range: None,
        inactive: false,
        log: false,
    };
    if is_icmp && !cursor.is_done() && !at_acl_option(cursor) {
        // ICMP type and optional code.
        cursor.bump();
        if cursor.at_dec() {
            cursor.bump();
        }
    }
    acl_options(cursor, &mut rule)?;
    Ok(rule)
}

type Destination<'a> = (Option<&'a str>, AddressRef<'a>, Option<PortRef<'a>>);

/// `[ifc IF] ADDRESS [PORT | object-group SERVICE]`.
fn destination_tail<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<Destination<'a>> {
    let interface = interface_clause(cursor)?;
    let address = address_ref(cursor)?;
    let port = if at_port_operator(cursor) {
        Some(port_ref(cursor)?)
    } else if cursor.eat(Keyword::ObjectGroup) {
        Some(PortRef::ObjectGroup(cursor.name("service object-group")?))
    } else {
        None
    };
    Ok((interface, address, port))
}

/// An `object-group` after the source address names a source service group
/// only when reading it as the destination leaves tokens that are not
/// options, while skipping it leaves a complete destination.
fn at_source_service_group(cursor: &Cursor<'_, '_>) -> bool {
    if !cursor.at(Keyword::ObjectGroup) {
        return false;
    }
    if completes_destination(cursor.clone()) {
        return false;
    }
    let mut skipped = cursor.clone();
    skipped.bump();
    skipped.bump();
    completes_destination(skipped)
}

fn completes_destination(mut trial: Cursor<'_, '_>) -> bool {
    destination_tail(&mut trial).is_ok() && (trial.is_done() || at_acl_option(&trial))
}

fn interface_clause<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<Option<&'a str>> {
    if cursor.eat(Keyword::Ifc) {
        Ok(Some(cursor.name("interface name")?))
    } else {
        Ok(None)
    }
}

fn at_acl_option(cursor: &Cursor<'_, '_>) -> bool {
    cursor.at(Keyword::RuleId)
        || cursor.at(Keyword::Log)
        || cursor.at(Keyword::Inactive)
        || cursor.at(Keyword::TimeRange)
        || cursor.at(Keyword::EventLog)
}

fn acl_options<'a>(cursor: &mut Cursor<'_, 'a>, rule: &mut AclRule<'a>) -> LineResult<()> {
    while !cursor.is_done() {
        if cursor.eat(Keyword::RuleId) {
            rule.rule_id = Some(cursor.dec("rule-id", validate::rule_id)?);
        } else if cursor.eat(Keyword::Inactive) {
            rule.inactive = true;
        } else if cursor.eat(Keyword::TimeRange) {
            rule.time_range = Some(cursor.name("time-range name")?);
        } else if cursor.eat(Keyword::EventLog) {
            cursor.name("event-log setting")?;
        } else if cursor.eat(Keyword::Log) {
            log_settings(cursor, rule);
        } else {
            return Err(cursor.error("unexpected access-list option"));
        }
    }
    Ok(())
}

/// `log [LEVEL] [interval SECS] | log disable | log default`.
fn log_settings(cursor: &mut Cursor<'_, '_>, rule: &mut AclRule<'_>) {
    if cursor.eat(Keyword::Disable) {
        return;
    }
    rule.log = true;
    if cursor.eat(Keyword::Default) {
        return;
    }
    const LEVELS: &[&str] = &[
        "emergencies",
        "alerts",
        "critical",
        "errors",
        "warnings",
        "notifications",
        "informational",
        "debugging",
    ];
    if cursor.at_dec() || LEVELS.iter().any(|level| cursor.at_text(level)) {
        cursor.bump();
    }
    if cursor.eat(Keyword::Interval) && cursor.at_dec() {
        cursor.bump();
    }
}

/// Address specifier in an ACL or object-group context.
pub(super) fn address_ref<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<AddressRef<'a>> {
    if cursor.eat(Keyword::Any) {
        Ok(AddressRef::Any)
    } else if cursor.eat(Keyword::Any4) {
        Ok(AddressRef::Any4)
    } else if cursor.eat(Keyword::Any6) {
        Ok(AddressRef::Any6)
    } else if cursor.eat(Keyword::Host) {
        Ok(AddressRef::Host(host_ref(cursor)?))
    } else if cursor.eat(Keyword::ObjectGroup) {
        Ok(AddressRef::ObjectGroup(cursor.name("object-group name")?))
    } else if cursor.eat(Keyword::Object) {
        Ok(AddressRef::Object(cursor.name("object name")?))
    } else if cursor.at_ipv4() {
        let ip = cursor.ipv4("network address")?;
        let mask = cursor.ipv4("netmask")?;
        Ok(AddressRef::NetworkMask(ip, mask))
    } else {
        Err(cursor.error("expected address specifier"))
    }
}

fn host_ref<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<HostRef<'a>> {
    if cursor.at_ipv4() {
        Ok(HostRef::Ip(cursor.ipv4("host address")?))
    } else if cursor.peek().is_some_and(|t| t.kind == TokenKind::Ipv6Address) {
        Err(cursor.error("ipv6 host addresses are not supported"))
    } else {
        Ok(HostRef::Name(cursor.name("host address")?))
    }
}

fn port<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<&'a str> {
    let span = cursor.here();
    let text = cursor.name("port")?;
    validate::port(text).map_err(|message| SyntaxError { message, span })?;
    Ok(text)
}

fn at_port_operator(cursor: &Cursor<'_, '_>) -> bool {
    cursor.at(Keyword::Eq)
        || cursor.at(Keyword::Gt)
        || cursor.at(Keyword::Lt)
        || cursor.at(Keyword::Neq)
        || cursor.at(Keyword::Range)
}

/// `eq P | gt P | lt P | neq P | range P P`, with ports checked early.
pub(super) fn port_ref<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<PortRef<'a>> {
    if cursor.eat(Keyword::Eq) {
        Ok(PortRef::Eq(port(cursor)?))
    } else if cursor.eat(Keyword::Gt) {
        Ok(PortRef::Gt(port(cursor)?))
    } else if cursor.eat(Keyword::Lt) {
        Ok(PortRef::Lt(port(cursor)?))
    } else if cursor.eat(Keyword::Neq) {
        Ok(PortRef::Neq(port(cursor)?))
    } else if cursor.eat(Keyword::Range) {
        let low = port(cursor)?;
        let high = port(cursor)?;
        Ok(PortRef::Range(low, high))
    } else {
        Err(cursor.error("expected port operator"))
    }
}

/// `access-group ACL in|out interface IF` or `access-group ACL global`.
pub(super) fn access_group<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<Stanza<'a>> {
    let acl = cursor.name("access-list name")?;
    let binding = if cursor.eat(Keyword::Global) {
        AccessGroupBinding::Global
    } else {
        let inbound = if cursor.eat(Keyword::In) {
            true
        } else if cursor.eat(Keyword::Out) {
            false
        } else {
            return Err(cursor.error("expected in, out or global"));
        };
        cursor.expect(Keyword::Interface)?;
        let nameif = cursor.name("interface name")?;
        if inbound {
            AccessGroupBinding::In(nameif)
        } else {
            AccessGroupBinding::Out(nameif)
        }
    };
    // Trailing `control-plane` and similar qualifiers are not modeled.
    Ok(Stanza::AccessGroup(AccessGroupStanza { acl, binding }))
}

/// `(REAL,MAPPED)` interface pair.
fn nat_interfaces<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<(&'a str, &'a str)> {
    expect_punct(cursor, TokenKind::LParen, "(")?;
    let real = cursor.name("real interface")?;
    expect_punct(cursor, TokenKind::Comma, ",")?;
    let mapped = cursor.name("mapped interface")?;
    expect_punct(cursor, TokenKind::RParen, ")")?;
    Ok((real, mapped))
}

fn expect_punct(cursor: &mut Cursor<'_, '_>, kind: TokenKind, text: &str) -> LineResult<()> {
    if cursor.peek().is_some_and(|t| t.kind == kind) {
        cursor.bump();
        Ok(())
    } else {
        Err(cursor.error(format!("expected '{text}'")))
    }
}

fn nat_address<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<NatAddressRef<'a>> {
    if cursor.eat(Keyword::Any) {
        Ok(NatAddressRef::Any)
    } else if cursor.eat(Keyword::Interface) {
        Ok(NatAddressRef::Interface)
    } else if cursor.at_ipv4() {
        Ok(NatAddressRef::Ip(cursor.ipv4("address")?))
    } else {
        Ok(NatAddressRef::Name(cursor.name("address or object name")?))
    }
}

fn nat_kind(cursor: &mut Cursor<'_, '_>) -> LineResult<NatKind> {
    if cursor.eat(Keyword::Static) {
        Ok(NatKind::Static)
    } else if cursor.eat(Keyword::Dynamic) {
        Ok(NatKind::Dynamic)
    } else {
        Err(cursor.error("expected static or dynamic"))
    }
}

/// `nat (REAL,MAPPED) [before-auto|after-auto|N] [source static|dynamic R M] [destination static R M] [service ...] ...`
pub(super) fn twice_nat<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<NatStanza<'a>> {
    let (real_interface, mapped_interface) = nat_interfaces(cursor)?;
    let mut order = NatPosition::Auto;
    if cursor.eat(Keyword::AfterAuto) || cursor.eat_text("after-object") {
        order = NatPosition::AfterAuto;
    } else if cursor.eat(Keyword::BeforeAuto) {
        order = NatPosition::BeforeAuto;
    }
    if cursor.at_dec() {
        // Explicit line number within the section.
        cursor.bump();
    }

    let mut nat = NatStanza {
        real_interface,
        mapped_interface,
        order,
        source: None,
        destination: None,
        service: None,
        inactive: false,
        description: None,
    };

    while !cursor.is_done() {
        if cursor.eat(Keyword::Source) {
            let kind = nat_kind(cursor)?;
            let real = nat_address(cursor)?;
            cursor.eat_text("pat-pool");
            let mapped = nat_address(cursor)?;
            nat.source = Some((kind, real, mapped));
        } else if cursor.eat(Keyword::Destination) {
            cursor.expect(Keyword::Static)?;
            let real = nat_address(cursor)?;
            let mapped = nat_address(cursor)?;
            nat.destination = Some((real, mapped));
        } else if cursor.eat(Keyword::Service) {
            nat.service = Some(nat_service(cursor)?);
        } else if cursor.eat(Keyword::Inactive) {
            nat.inactive = true;
        } else if cursor.eat(Keyword::Description) {
            nat.description = Some(cursor.text());
        } else {
            // Flags such as `no-proxy-arp`, `route-lookup`, `unidirectional`.
            cursor.bump();
        }
    }
    if nat.source.is_none() && nat.destination.is_none() {
        return Err(cursor.error("expected source or destination"));
    }
    Ok(nat)
}

/// `service PROTO REAL MAPPED` with literal ports, or `service REAL MAPPED` naming service objects.
fn nat_service<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<NatServiceRef<'a>> {
    let protocol = match cursor.peek().map(|token| token.text.to_ascii_lowercase()) {
        Some(word) if matches!(word.as_str(), "tcp" | "udp" | "sctp") => cursor.bump().map(|t| t.text),
        _ => None,
    };
    let real = cursor.name("real service")?;
    let mapped = cursor.name("mapped service")?;
    Ok(NatServiceRef {
        protocol,
        real,
        mapped,
    })
}

/// `nat (REAL,MAPPED) static|dynamic MAPPED [service PROTO REAL MAPPED] ...` inside `object network`.
fn object_nat<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<ObjectNat<'a>> {
    let (real_interface, mapped_interface) = nat_interfaces(cursor)?;
    let kind = nat_kind(cursor)?;
    if kind == NatKind::Dynamic {
        cursor.eat_text("pat-pool");
    }
    let mapped = nat_address(cursor)?;
    let mut service = None;
    while !cursor.is_done() {
        if cursor.eat(Keyword::Service) {
            service = Some(nat_service(cursor)?);
        } else {
            cursor.bump();
        }
    }
    Ok(ObjectNat {
        real_interface,
        mapped_interface,
        kind,
        mapped,
        service,
    })
}

impl<'t, 'a> Dispatcher<'t, 'a, '_> {
    /// `object network NAME` or `object service NAME`.
    pub(super) fn object(
        &mut self,
        id: usize,
        cursor: &mut Cursor<'t, 'a>,
    ) -> LineResult<Option<Stanza<'a>>> {
        if cursor.eat(Keyword::Service) {
            return Ok(Some(Stanza::Ignored("object service")));
        }
        if !cursor.eat(Keyword::Network) {
            return Ok(None);
        }
        let name = cursor.name("object name")?;
        cursor.finish()?;
        let commands = self.body(id, |line| {
            let command = if line.eat(Keyword::Host) {
                NetworkObjectCommand::Host(host_ref(line)?)
            } else if line.eat(Keyword::Subnet) {
                if line.peek().is_some_and(|t| t.kind == TokenKind::Ipv6Prefix) {
                    return Ok(BodyLine::Ignored);
                }
                let ip = line.ipv4("subnet address")?;
                let mask = line.ipv4("subnet mask")?;
                NetworkObjectCommand::Subnet(ip, mask)
            } else if line.eat(Keyword::Range) {
                let start = line.ipv4("range start")?;
                let end = line.ipv4("range end")?;
                NetworkObjectCommand::Range(start, end)
            } else if line.eat(Keyword::Fqdn) {
                if line.at_text("v4") || line.at_text("v6") {
                    line.bump();
                }
                NetworkObjectCommand::Fqdn(line.name("fqdn")?)
            } else if line.eat(Keyword::Description) {
                NetworkObjectCommand::Description(line.text())
            } else if line.eat(Keyword::Nat) {
                NetworkObjectCommand::Nat(object_nat(line)?)
            } else {
                return Ok(BodyLine::Unknown);
            };
            line.finish()?;
            Ok(BodyLine::Command(command))
        });
        Ok(Some(Stanza::NetworkObject(NetworkObjectStanza { name, commands })))
    }

    /// `object-group network NAME` or `object-group service NAME [tcp|udp|tcp-udp]`.
    pub(super) fn object_group(
        &mut self,
        id: usize,
        cursor: &mut Cursor<'t, 'a>,
    ) -> LineResult<Option<Stanza<'a>>> {
        if cursor.eat(Keyword::Network) {
            let name = cursor.name("object-group name")?;
            cursor.finish()?;
            let members = self.body(id, network_group_member);
            return Ok(Some(Stanza::NetworkObjectGroup(NetworkObjectGroupStanza {
                name,
                members,
            })));
        }
        if cursor.eat(Keyword::Service) {
            let first = cursor.name("object-group name")?;
            let (name, protocol) = match cursor.peek() {
                Some(_) if is_service_protocol(first) => (cursor.name("object-group name")?, Some(first)),
                Some(_) => (first, Some(cursor.name("service protocol")?)),
                None => (first, None),
            };
            cursor.finish()?;
            let members = self.body(id, service_group_member);
            return Ok(Some(Stanza::ServiceObjectGroup(ServiceObjectGroupStanza {
                name,
                protocol,
                members,
            })));
        }
        let known = ["protocol", "icmp-type", "user", "security", "network-service"]
            .iter()
            .any(|kind| cursor.at_text(kind));
        Ok(known.then_some(Stanza::Ignored("object-group")))
    }
}

fn is_service_protocol(text: &str) -> bool {
    ["tcp", "udp", "tcp-udp"]
        .iter()
        .any(|p| text.eq_ignore_ascii_case(p))
}

fn network_group_member<'a>(line: &mut Cursor<'_, 'a>) -> LineResult<BodyLine<NetworkGroupMember<'a>>> {
    let member = if line.eat(Keyword::NetworkObject) {
        if line.eat(Keyword::Host) {
            NetworkGroupMember::Host(host_ref(line)?)
        } else if line.eat(Keyword::Object) {
            NetworkGroupMember::Object(line.name("object name")?)
        } else if line.peek().is_some_and(|t| t.kind == TokenKind::Ipv6Prefix) {
            return Ok(BodyLine::Ignored);
        } else {
            let ip = line.ipv4("network address")?;
            let mask = line.ipv4("netmask")?;
            NetworkGroupMember::NetworkMask(ip, mask)
        }
    } else if line.eat(Keyword::GroupObject) {
        NetworkGroupMember::Group(line.name("object-group name")?)
    } else if line.eat(Keyword::Description) {
        NetworkGroupMember::Description(line.text())
    } else {
        return Ok(BodyLine::Unknown);
    };
    line.finish()?;
    Ok(BodyLine::Command(member))
}

fn service_group_member<'a>(line: &mut Cursor<'_, 'a>) -> LineResult<BodyLine<ServiceGroupMember<'a>>> {
    let member = if line.eat(Keyword::PortObject) {
        ServiceGroupMember::Port(port_ref(line)?)
    } else if line.eat(Keyword::ServiceObject) {
        if line.eat(Keyword::Object) {
            line.name("service object name")?;
            return Ok(BodyLine::Ignored);
        }
        let protocol = line.name("protocol")?;
        let mut source = None;
        let mut destination = None;
        while !line.is_done() {
            if line.eat(Keyword::Source) {
                source = Some(port_ref(line)?);
            } else if line.eat(Keyword::Destination) {
                destination = Some(port_ref(line)?);
            } else if at_port_operator(line) {
                destination = Some(port_ref(line)?);
            } else {
                // ICMP type after `service-object icmp`.
                line.bump();
            }
        }
        ServiceGroupMember::Service {
            protocol,
            source,
            destination,
        }
    } else if line.eat(Keyword::GroupObject) {
        ServiceGroupMember::Group(line.name("object-group name")?)
    } else if line.eat(Keyword::Description) {
        ServiceGroupMember::Description(line.text())
    } else {
        return Ok(BodyLine::Unknown);
    };
    line.finish()?;
    Ok(BodyLine::Command(member))
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use netcomp_ir::Warnings;

    use super::*;
    use crate::ast::StanzaNode;
    use crate::dispatcher::dispatch;
    use crate::options::ParseOptions;

    fn parse(input: &str) -> (Vec<StanzaNode<'_>>, Warnings) {
        let mut warnings = Warnings::new();
        let stanzas = dispatch(input, &ParseOptions::default(), &mut warnings);
        (stanzas, warnings)
    }

    fn rule(input: &str) -> AclRule<'_> {
        let (stanzas, warnings) = parse(input);
        assert!(warnings.is_empty(), "{warnings:?}");
        match stanzas.into_iter().next().map(|s| s.stanza) {
            Some(Stanza::AccessList(AccessListStanza {
                entry: AclEntry::Rule(rule),
                ..
            })) => rule,
            other => panic!("expected rule, got {other:?}"),
        }
    }

    #[test]
    fn advanced_trust_with_interfaces_and_options() {
        let rule = rule(
            "access-list CSM_FW_ACL_ advanced trust tcp ifc outside any ifc inside object-group WEB object-group HTTP rule-id 268434433 event-log both log\n",
        );
        assert_eq!(rule.kind, AclKind::Advanced);
        assert_eq!(rule.verb, AclVerb::Trust);
        assert_eq!(rule.interface, Some("outside"));
        assert_eq!(rule.destination_interface, Some("inside"));
        assert_eq!(rule.destination, AddressRef::ObjectGroup("WEB"));
        assert_eq!(rule.destination_port, Some(PortRef::ObjectGroup("HTTP")));
        assert_eq!(rule.rule_id, Some(268434433));
        assert!(rule.log);
    }

    #[test]
    fn network_mask_and_port_range() {
        let rule = rule(
            "access-list A extended permit udp 10.0.0.0 255.0.0.0 range 1024 65535 host 8.8.8.8 eq domain inactive\n",
        );
        assert_eq!(
            rule.source,
            AddressRef::NetworkMask(Ipv4Addr::new(10, 0, 0, 0), Ipv4Addr::new(255, 0, 0, 0))
        );
        assert_eq!(rule.source_port, Some(PortRef::Range("1024", "65535")));
        assert_eq!(rule.destination_port, Some(PortRef::Eq("domain")));
        assert!(rule.inactive);
    }

    #[test]
    fn object_group_after_source_is_a_service_group_when_a_destination_follows() {
        let single = rule(
            "access-list A extended permit tcp any object-group SRC_SVC any eq 80 rule-id 7\n",
        );
        assert_eq!(single.source, AddressRef::Any);
        assert_eq!(single.source_port, Some(PortRef::ObjectGroup("SRC_SVC")));
        assert_eq!(single.destination, AddressRef::Any);
        assert_eq!(single.destination_port, Some(PortRef::Eq("80")));
        assert_eq!(single.rule_id, Some(7));

        let both = rule(
            "access-list A extended permit tcp any object-group SRC_SVC object-group NET object-group DST_SVC\n",
        );
        assert_eq!(both.source_port, Some(PortRef::ObjectGroup("SRC_SVC")));
        assert_eq!(both.destination, AddressRef::ObjectGroup("NET"));
        assert_eq!(both.destination_port, Some(PortRef::ObjectGroup("DST_SVC")));
    }

    #[test]
    fn object_group_after_source_defaults_to_the_destination() {
        let rule = rule("access-list A extended permit tcp any object-group NET object-group SVC\n");
        assert_eq!(rule.source_port, None);
        assert_eq!(rule.destination, AddressRef::ObjectGroup("NET"));
        assert_eq!(rule.destination_port, Some(PortRef::ObjectGroup("SVC")));
    }

    #[test]
    fn icmp_type_is_skipped() {
        let rule = rule("access-list A extended permit icmp any any echo-reply log 6 interval 300\n");
        assert_eq!(rule.destination, AddressRef::Any);
        assert!(rule.log);
    }

    #[test]
    fn bad_port_and_trailing_garbage_are_errors() {
        let (stanzas, warnings) = parse(
            "access-list A extended permit tcp any any eq nosuch\naccess-list A extended permit ip any any frob\n",
        );
        assert!(stanzas.is_empty());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn access_group_bindings() {
        let (stanzas, _) = parse("access-group IN in interface outside\naccess-group G global\n");
        assert_eq!(
            stanzas[0].stanza,
            Stanza::AccessGroup(AccessGroupStanza {
                acl: "IN",
                binding: AccessGroupBinding::In("outside"),
            })
        );
        assert_eq!(
            stanzas[1].stanza,
            Stanza::AccessGroup(AccessGroupStanza {
                acl: "G",
                binding: AccessGroupBinding::Global,
            })
        );
    }

    #[test]
    fn twice_nat_positions_and_halves() {
        let (stanzas, warnings) = parse(
            "nat (inside,outside) after-auto source dynamic any interface\n\
             nat (inside,outside) source static WEB WEB_PUB destination static VPN VPN service HTTP HTTP8080 no-proxy-arp description web nat\n",
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        let Stanza::Nat(first) = &stanzas[0].stanza else {
            panic!("expected nat");
        };
        assert_eq!(first.order, NatPosition::AfterAuto);
        assert_eq!(
            first.source,
            Some((NatKind::Dynamic, NatAddressRef::Any, NatAddressRef::Interface))
        );
        let Stanza::Nat(second) = &stanzas[1].stanza else {
            panic!("expected nat");
        };
        assert_eq!(second.order, NatPosition::Auto);
        assert_eq!(
            second.destination,
            Some((NatAddressRef::Name("VPN"), NatAddressRef::Name("VPN")))
        );
        assert_eq!(second.service.as_ref().map(|s| s.mapped), Some("HTTP8080"));
        assert_eq!(second.description, Some("web nat"));
    }

    #[test]
    fn manual_nat_may_translate_only_the_destination() {
        let (stanzas, warnings) = parse(
            "nat (inside,outside) destination static REAL_SVC MAPPED_SVC service tcp 80 8080\n\
             nat (inside,outside) inactive\n",
        );
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        let Stanza::Nat(nat) = &stanzas[0].stanza else {
            panic!("expected nat");
        };
        assert_eq!(nat.source, None);
        assert_eq!(
            nat.destination,
            Some((NatAddressRef::Name("REAL_SVC"), NatAddressRef::Name("MAPPED_SVC")))
        );
        assert_eq!(
            nat.service,
            Some(NatServiceRef {
                protocol: Some("tcp"),
                real: "80",
                mapped: "8080",
            })
        );
    }

    #[test]
    fn network_object_with_object_nat() {
        let (stanzas, warnings) = parse(
            "object network WEB\n host 10.1.1.10\n nat (inside,outside) static 203.0.113.10 service tcp www 8080\n",
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        let Stanza::NetworkObject(object) = &stanzas[0].stanza else {
            panic!("expected object");
        };
        assert_eq!(object.name, "WEB");
        assert_eq!(
            object.commands[0],
            NetworkObjectCommand::Host(HostRef::Ip(Ipv4Addr::new(10, 1, 1, 10)))
        );
        let NetworkObjectCommand::Nat(nat) = &object.commands[1] else {
            panic!("expected object nat");
        };
        assert_eq!(nat.mapped, NatAddressRef::Ip(Ipv4Addr::new(203, 0, 113, 10)));
        assert_eq!(nat.service.as_ref().and_then(|s| s.protocol), Some("tcp"));
    }

    #[test]
    fn service_group_header_accepts_either_order() {
        let (stanzas, _) = parse(
            "object-group service WEB tcp\n port-object eq www\n port-object range 8000 8080\nobject-group service tcp MAIL\n service-object tcp destination eq smtp\n",
        );
        let Stanza::ServiceObjectGroup(web) = &stanzas[0].stanza else {
            panic!("expected service group");
        };
        assert_eq!((web.name, web.protocol), ("WEB", Some("tcp")));
        assert_eq!(web.members.len(), 2);
        let Stanza::ServiceObjectGroup(mail) = &stanzas[1].stanza else {
            panic!("expected service group");
        };
        assert_eq!((mail.name, mail.protocol), ("MAIL", Some("tcp")));
    }

    #[test]
    fn network_group_members() {
        let (stanzas, warnings) = parse(
            "object-group network SERVERS\n network-object host 10.0.0.1\n network-object 10.1.0.0 255.255.0.0\n network-object object WEB\n group-object OTHERS\n description core\n bogus\n",
        );
        assert!(warnings.has_code("unrecognized-line"));
        let Stanza::NetworkObjectGroup(group) = &stanzas[0].stanza else {
            panic!("expected group");
        };
        assert_eq!(group.members.len(), 5);
        assert_eq!(group.members[3], NetworkGroupMember::Group("OTHERS"));
    }
}
