//! NAT rules to per-interface transformation chains.
//!
//! Rules are evaluated in three buckets (before-auto, auto, after-auto),
//! keeping file order inside each bucket. Source translation lands on the
//! real interface's outgoing chain, destination translation on the mapped
//! interface's incoming chain.

use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use netcomp_ir::{
    AclMatchExpr, HeaderSpace, IpProtocol, IpSpace, Prefix, SubRange, Transformation,
    TransformationStep,
};
use tracing::debug;

use super::Lowering;
use crate::model::{
    FtdNatRule, NatAddress, NatDestination, NatKind, NatService, NatSource, NetworkObjectValue,
};
use crate::validate;

/// Resolved real or mapped NAT address.
#[derive(Debug, Clone)]
struct NatSpace {
    space: IpSpace,
    prefix: Option<Prefix>,
    range: Option<(Ipv4Addr, Ipv4Addr)>,
}

impl NatSpace {
    fn host(ip: Ipv4Addr) -> Self {
        Self {
            space: IpSpace::Ip(ip),
            prefix: Some(Prefix::host(ip)),
            range: Some((ip, ip)),
        }
    }

    fn prefix(prefix: Prefix) -> Self {
        Self {
            space: IpSpace::Prefix(prefix),
            prefix: Some(prefix),
            range: Some((prefix.first(), prefix.last())),
        }
    }

    /// Match constraint; `any` leaves the field unconstrained.
    fn constraint(&self) -> Option<IpSpace> {
        match self.space {
            IpSpace::Universe => None,
            _ => Some(self.space.clone()),
        }
    }

    fn same_width(&self, other: &NatSpace) -> Option<(Prefix, Prefix)> {
        match (self.prefix, other.prefix) {
            (Some(a), Some(b)) if a.length == b.length && a.length < 32 => Some((a, b)),
            _ => None,
        }
    }
}

/// Port translation of a NAT rule.
#[derive(Debug, Clone, Copy)]
struct PortTranslation {
    protocol: Option<IpProtocol>,
    real: u16,
    mapped: u16,
}

impl PortTranslation {
    fn protocols(&self) -> BTreeSet<IpProtocol> {
        self.protocol.into_iter().collect()
    }
}

/// Translate the source from `real` to `mapped`.
fn source_step(real: &NatSpace, mapped: &NatSpace, kind: NatKind) -> Option<TransformationStep> {
    if kind == NatKind::Static
        && let Some((_, mapped_prefix)) = real.same_width(mapped)
    {
        return Some(TransformationStep::ShiftSourceIp(mapped_prefix));
    }
    mapped
        .range
        .map(|(start, end)| TransformationStep::AssignSourceIp { start, end })
}

/// Translate the destination from `mapped` back to `real`.
fn destination_step(real: &NatSpace, mapped: &NatSpace) -> Option<TransformationStep> {
    if let Some((real_prefix, _)) = real.same_width(mapped) {
        return Some(TransformationStep::ShiftDestinationIp(real_prefix));
    }
    real.range
        .map(|(start, end)| TransformationStep::AssignDestinationIp { start, end })
}

/// Translate the destination from `real` to `mapped`.
fn forward_destination_step(real: &NatSpace, mapped: &NatSpace) -> Option<TransformationStep> {
    if let Some((_, mapped_prefix)) = real.same_width(mapped) {
        return Some(TransformationStep::ShiftDestinationIp(mapped_prefix));
    }
    mapped
        .range
        .map(|(start, end)| TransformationStep::AssignDestinationIp { start, end })
}

fn guard(device: &str, header: HeaderSpace) -> AclMatchExpr {
    AclMatchExpr::and(vec![
        AclMatchExpr::src_interface(device),
        AclMatchExpr::HeaderSpace(header),
    ])
}

#[derive(Default)]
struct Chains<'c> {
    incoming: BTreeMap<&'c str, Vec<Transformation>>,
    outgoing: BTreeMap<&'c str, Vec<Transformation>>,
}

impl<'c> Lowering<'c, '_> {
    pub(super) fn nat_rules(&mut self) {
        let config = self.config;
        let mut rules: Vec<&FtdNatRule> = config.nat_rules.iter().filter(|r| !r.inactive).collect();
        rules.sort_by_key(|rule| rule.position);

        let mut chains = Chains::default();
        for rule in rules {
            self.nat_rule(rule, &mut chains);
        }

        let (incoming, outgoing) = (chains.incoming.len(), chains.outgoing.len());
        for (device, rules) in chains.incoming {
            if let Some(iface) = self.out.interfaces.get_mut(device) {
                iface.incoming_transformation = Transformation::chain(rules);
            }
        }
        for (device, rules) in chains.outgoing {
            if let Some(iface) = self.out.interfaces.get_mut(device) {
                iface.outgoing_transformation = Transformation::chain(rules);
            }
        }
        debug!(incoming, outgoing, "lowered nat chains");
    }

    fn nat_rule(&mut self, rule: &'c FtdNatRule, chains: &mut Chains<'c>) {
        let Some(real_device) = self.require_device(&rule.real_interface, "nat") else {
            return;
        };
        let Some(mapped_device) = self.require_device(&rule.mapped_interface, "nat") else {
            return;
        };
        let service = rule.service.as_ref().and_then(|s| self.port_translation(s));

        match (&rule.source, &rule.destination) {
            (Some(source), Some(destination)) if !rule.object_nat => {
                if let Some(t) = self.twice_outgoing(source, destination, service, real_device, mapped_device) {
                    chains.outgoing.entry(real_device).or_default().push(t);
                }
                if let Some(t) = self.twice_incoming(source, destination, service, mapped_device) {
                    chains.incoming.entry(mapped_device).or_default().push(t);
                }
            }
            (source, destination) => {
                if let Some(source) = source
                    && let Some(t) = self.source_nat(source, service, real_device, mapped_device)
                {
                    chains.outgoing.entry(real_device).or_default().push(t);
                }
                if let Some(destination) = destination
                    && let Some(t) = self.destination_nat(destination, service, mapped_device)
                {
                    chains.incoming.entry(mapped_device).or_default().push(t);
                }
            }
        }
    }

    fn source_nat(
        &mut self,
        source: &NatSource,
        service: Option<PortTranslation>,
        real_device: &str,
        mapped_device: &str,
    ) -> Option<Transformation> {
        let real = self.nat_space(&source.real, mapped_device)?;
        let mapped = self.nat_space(&source.mapped, mapped_device)?;
        let mut steps = vec![source_step(&real, &mapped, source.kind)?];
        let mut header = HeaderSpace {
            src_ips: real.constraint(),
            ..HeaderSpace::default()
        };
        if let Some(ports) = service {
            header.ip_protocols = ports.protocols();
            header.src_ports = vec![SubRange::single(ports.real)];
            steps.push(TransformationStep::AssignSourcePort {
                start: ports.mapped,
                end: ports.mapped,
            });
        }
        Some(Transformation::new(guard(real_device, header), steps))
    }

    fn destination_nat(
        &mut self,
        destination: &NatDestination,
        service: Option<PortTranslation>,
        mapped_device: &str,
    ) -> Option<Transformation> {
        let real = self.nat_space(&destination.real, mapped_device)?;
        let mapped = self.nat_space(&destination.mapped, mapped_device)?;
        let mut steps = vec![destination_step(&real, &mapped)?];
        let mut header = HeaderSpace {
            dst_ips: mapped.constraint(),
            ..HeaderSpace::default()
        };
        if let Some(ports) = service {
            header.ip_protocols = ports.protocols();
            header.dst_ports = vec![SubRange::single(ports.mapped)];
            steps.push(TransformationStep::AssignDestinationPort {
                start: ports.real,
                end: ports.real,
            });
        }
        Some(Transformation::new(guard(mapped_device, header), steps))
    }

    fn twice_outgoing(
        &mut self,
        source: &NatSource,
        destination: &NatDestination,
        service: Option<PortTranslation>,
        real_device: &str,
        mapped_device: &str,
    ) -> Option<Transformation> {
        let src_real = self.nat_space(&source.real, mapped_device)?;
        let dst_real = self.nat_space(&destination.real, mapped_device)?;
        let src_mapped = self.nat_space(&source.mapped, mapped_device);
        let dst_mapped = self.nat_space(&destination.mapped, mapped_device);

        let mut steps: Vec<TransformationStep> = src_mapped
            .and_then(|mapped| source_step(&src_real, &mapped, source.kind))
            .into_iter()
            .chain(dst_mapped.and_then(|mapped| forward_destination_step(&dst_real, &mapped)))
            .collect();
        let mut header = HeaderSpace {
            src_ips: src_real.constraint(),
            dst_ips: dst_real.constraint(),
            ..HeaderSpace::default()
        };
        if let Some(ports) = service {
            header.ip_protocols = ports.protocols();
            header.dst_ports = vec![SubRange::single(ports.real)];
            steps.push(TransformationStep::AssignDestinationPort {
                start: ports.mapped,
                end: ports.mapped,
            });
        }
        if steps.is_empty() {
            return None;
        }
        Some(Transformation::new(guard(real_device, header), steps))
    }

    fn twice_incoming(
        &mut self,
        source: &NatSource,
        destination: &NatDestination,
        service: Option<PortTranslation>,
        mapped_device: &str,
    ) -> Option<Transformation> {
        let dst_real = self.nat_space(&destination.real, mapped_device)?;
        let dst_mapped = self.nat_space(&destination.mapped, mapped_device)?;
        let src_real = self.nat_space(&source.real, mapped_device);
        let src_mapped = self.nat_space(&source.mapped, mapped_device);

        let mut steps = Vec::new();
        if source.kind == NatKind::Static
            && let (Some(real), Some(mapped)) = (&src_real, &src_mapped)
            && let Some(step) = source_step(mapped, real, NatKind::Static)
        {
            steps.push(step);
        }
        steps.extend(destination_step(&dst_real, &dst_mapped));

        let mut header = HeaderSpace {
            dst_ips: dst_mapped.constraint(),
            src_ips: src_mapped.as_ref().and_then(NatSpace::constraint),
            ..HeaderSpace::default()
        };
        if let Some(ports) = service {
            header.ip_protocols = ports.protocols();
            header.dst_ports = vec![SubRange::single(ports.mapped)];
            steps.push(TransformationStep::AssignDestinationPort {
                start: ports.real,
                end: ports.real,
            });
        }
        if steps.is_empty() {
            return None;
        }
        Some(Transformation::new(guard(mapped_device, header), steps))
    }

    /// Ports of a `service` clause. Literal and well-known ports resolve;
    /// service object names do not.
    fn port_translation(&mut self, service: &NatService) -> Option<PortTranslation> {
        let protocol = service.protocol.as_deref().and_then(IpProtocol::from_name);
        match (validate::port(&service.real), validate::port(&service.mapped)) {
            (Ok(real), Ok(mapped)) => Some(PortTranslation {
                protocol,
                real,
                mapped,
            }),
            _ => {
                self.warnings.unimplemented(
                    "nat-service-object",
                    format!(
                        "nat service {} {} is not translated",
                        service.real, service.mapped
                    ),
                    None,
                );
                None
            }
        }
    }

    /// Resolve a NAT operand. `interface` means the address of `mapped_device`.
    fn nat_space(&mut self, address: &NatAddress, mapped_device: &str) -> Option<NatSpace> {
        let config = self.config;
        match address {
            NatAddress::Any => Some(NatSpace {
                space: IpSpace::Universe,
                prefix: None,
                range: None,
            }),
            NatAddress::Ip(ip) => Some(NatSpace::host(*ip)),
            NatAddress::Interface => match self.interface_ip(mapped_device) {
                Some(ip) => Some(NatSpace::host(ip)),
                None => {
                    self.warnings.red_flag(
                        "nat-interface-address",
                        format!("nat to interface {mapped_device} which has no address"),
                        None,
                    );
                    None
                }
            },
            NatAddress::Object(name) => {
                if let Some(object) = config.network_objects.get(name) {
                    return match &object.value {
                        Some(NetworkObjectValue::Host(ip)) => Some(NatSpace::host(*ip)),
                        Some(NetworkObjectValue::Subnet(ip, mask)) => {
                            Prefix::from_mask(*ip, *mask).map(NatSpace::prefix)
                        }
                        Some(NetworkObjectValue::Range(start, end)) => Some(NatSpace {
                            space: IpSpace::Range {
                                start: *start,
                                end: *end,
                            },
                            prefix: None,
                            range: Some((*start, *end)),
                        }),
                        Some(NetworkObjectValue::Fqdn(_)) | None => None,
                    };
                }
                if config.network_object_groups.contains_key(name) {
                    let space = self.group_space(name, &mut BTreeSet::new());
                    return Some(NatSpace {
                        space,
                        prefix: None,
                        range: None,
                    });
                }
                self.warnings.red_flag(
                    "undefined-reference",
                    format!("nat refers to unknown object {name}"),
                    None,
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use netcomp_ir::{Configuration, Warnings};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{FtdConfiguration, FtdInterface, FtdNetworkObject, NatPosition};

    fn ip(text: &str) -> Ipv4Addr {
        text.parse().expect("ip")
    }

    fn base() -> FtdConfiguration {
        let mut config = FtdConfiguration::default();
        for (name, nameif) in [("Ethernet0/0", "inside"), ("Ethernet0/1", "outside")] {
            let mut iface = FtdInterface::new(name);
            iface.nameif = Some(nameif.into());
            config.interfaces.insert(name.into(), iface);
        }
        config
    }

    fn object(config: &mut FtdConfiguration, name: &str, value: NetworkObjectValue) {
        config.network_objects.insert(
            name.into(),
            FtdNetworkObject {
                name: name.into(),
                value: Some(value),
                description: None,
            },
        );
    }

    fn rule(position: NatPosition) -> FtdNatRule {
        FtdNatRule {
            real_interface: "inside".into(),
            mapped_interface: "outside".into(),
            position,
            source: None,
            destination: None,
            service: None,
            inactive: false,
            description: None,
            object_nat: false,
        }
    }

    fn static_source(real: &str, mapped: &str) -> Option<NatSource> {
        Some(NatSource {
            kind: NatKind::Static,
            real: NatAddress::Object(real.into()),
            mapped: NatAddress::Object(mapped.into()),
        })
    }

    fn lower(config: &FtdConfiguration) -> (Configuration, Warnings) {
        let mut warnings = Warnings::new();
        let lowered = super::super::lower(config, &mut warnings).expect("lower");
        (lowered, warnings)
    }

    #[test]
    fn static_host_source_nat_assigns_the_mapped_address() {
        let mut config = base();
        object(&mut config, "REAL_ONE", NetworkObjectValue::Host(ip("10.0.0.1")));
        object(&mut config, "MAPPED_ONE", NetworkObjectValue::Host(ip("192.0.2.1")));
        let mut nat = rule(NatPosition::Auto);
        nat.source = static_source("REAL_ONE", "MAPPED_ONE");
        config.nat_rules.push(nat);

        let (lowered, _) = lower(&config);
        let expected = Transformation::new(
            guard(
                "Ethernet0/0",
                HeaderSpace {
                    src_ips: Some(IpSpace::Ip(ip("10.0.0.1"))),
                    ..HeaderSpace::default()
                },
            ),
            vec![TransformationStep::AssignSourceIp {
                start: ip("192.0.2.1"),
                end: ip("192.0.2.1"),
            }],
        );
        assert_eq!(
            lowered.interfaces["Ethernet0/0"].outgoing_transformation,
            Some(expected)
        );
        assert_eq!(lowered.interfaces["Ethernet0/1"].incoming_transformation, None);
    }

    #[test]
    fn static_subnets_of_equal_width_shift() {
        let mut config = base();
        let mask = ip("255.255.255.0");
        object(&mut config, "R", NetworkObjectValue::Subnet(ip("10.0.0.0"), mask));
        object(&mut config, "M", NetworkObjectValue::Subnet(ip("192.0.2.0"), mask));
        let mut nat = rule(NatPosition::Auto);
        nat.source = static_source("R", "M");
        config.nat_rules.push(nat);

        let (lowered, _) = lower(&config);
        let chain = lowered.interfaces["Ethernet0/0"]
            .outgoing_transformation
            .as_ref()
            .expect("chain");
        assert_eq!(
            chain.steps,
            vec![TransformationStep::ShiftSourceIp(Prefix::new(ip("192.0.2.0"), 24))]
        );
    }

    #[test]
    fn destination_nat_with_service_translates_ports() {
        let mut config = base();
        object(&mut config, "REAL_SVC", NetworkObjectValue::Host(ip("10.0.0.10")));
        object(&mut config, "MAPPED_SVC", NetworkObjectValue::Host(ip("192.0.2.10")));
        let mut nat = rule(NatPosition::Auto);
        nat.destination = Some(NatDestination {
            real: NatAddress::Object("REAL_SVC".into()),
            mapped: NatAddress::Object("MAPPED_SVC".into()),
        });
        nat.service = Some(NatService {
            protocol: Some("tcp".into()),
            real: "80".into(),
            mapped: "8080".into(),
        });
        config.nat_rules.push(nat);

        let (lowered, warnings) = lower(&config);
        assert!(warnings.is_empty(), "{warnings:?}");
        let expected = Transformation::new(
            guard(
                "Ethernet0/1",
                HeaderSpace {
                    ip_protocols: BTreeSet::from([IpProtocol::Tcp]),
                    dst_ips: Some(IpSpace::Ip(ip("192.0.2.10"))),
                    dst_ports: vec![SubRange::single(8080)],
                    ..HeaderSpace::default()
                },
            ),
            vec![
                TransformationStep::AssignDestinationIp {
                    start: ip("10.0.0.10"),
                    end: ip("10.0.0.10"),
                },
                TransformationStep::AssignDestinationPort { start: 80, end: 80 },
            ],
        );
        assert_eq!(
            lowered.interfaces["Ethernet0/1"].incoming_transformation,
            Some(expected)
        );
    }

    #[test]
    fn chain_follows_before_auto_then_after_order() {
        let mut config = base();
        for (last, position) in [
            (1, NatPosition::AfterAuto),
            (2, NatPosition::BeforeAuto),
            (3, NatPosition::Auto),
        ] {
            let mut nat = rule(position);
            nat.source = Some(NatSource {
                kind: NatKind::Dynamic,
                real: NatAddress::Any,
                mapped: NatAddress::Ip(Ipv4Addr::new(192, 0, 2, last)),
            });
            config.nat_rules.push(nat);
        }
        let (lowered, _) = lower(&config);
        let chain = lowered.interfaces["Ethernet0/0"]
            .outgoing_transformation
            .as_ref()
            .expect("chain");
        let order: Vec<u8> = chain
            .iter()
            .map(|t| match t.steps[0] {
                TransformationStep::AssignSourceIp { start, .. } => start.octets()[3],
                _ => 0,
            })
            .collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn twice_nat_builds_both_directions() {
        let mut config = base();
        object(&mut config, "SRC", NetworkObjectValue::Host(ip("10.0.0.5")));
        object(&mut config, "SRC_PUB", NetworkObjectValue::Host(ip("203.0.113.5")));
        object(&mut config, "DST", NetworkObjectValue::Host(ip("198.51.100.7")));
        object(&mut config, "DST_PUB", NetworkObjectValue::Host(ip("192.0.2.7")));
        let mut nat = rule(NatPosition::BeforeAuto);
        nat.source = static_source("SRC", "SRC_PUB");
        nat.destination = Some(NatDestination {
            real: NatAddress::Object("DST".into()),
            mapped: NatAddress::Object("DST_PUB".into()),
        });
        config.nat_rules.push(nat);

        let (lowered, _) = lower(&config);
        let outgoing = lowered.interfaces["Ethernet0/0"]
            .outgoing_transformation
            .as_ref()
            .expect("outgoing");
        assert_eq!(
            outgoing.steps,
            vec![
                TransformationStep::AssignSourceIp {
                    start: ip("203.0.113.5"),
                    end: ip("203.0.113.5"),
                },
                TransformationStep::AssignDestinationIp {
                    start: ip("192.0.2.7"),
                    end: ip("192.0.2.7"),
                },
            ]
        );
        let incoming = lowered.interfaces["Ethernet0/1"]
            .incoming_transformation
            .as_ref()
            .expect("incoming");
        assert_eq!(
            incoming.steps,
            vec![
                TransformationStep::AssignSourceIp {
                    start: ip("10.0.0.5"),
                    end: ip("10.0.0.5"),
                },
                TransformationStep::AssignDestinationIp {
                    start: ip("198.51.100.7"),
                    end: ip("198.51.100.7"),
                },
            ]
        );
    }

    #[test]
    fn unknown_objects_and_interfaces_skip_the_rule() {
        let mut config = base();
        let mut missing = rule(NatPosition::Auto);
        missing.source = static_source("NOPE", "NOPE2");
        let mut any_ifc = rule(NatPosition::Auto);
        any_ifc.real_interface = "any".into();
        config.nat_rules.extend([missing, any_ifc]);

        let (lowered, warnings) = lower(&config);
        assert!(lowered.interfaces.values().all(|i| i.outgoing_transformation.is_none()));
        assert!(warnings.has_code("undefined-reference"));
        assert!(warnings.has_code("undefined-interface"));
    }
}
