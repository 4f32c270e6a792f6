//! Interfaces, static routes, OSPF and BGP.

use std::net::Ipv4Addr;

use crate::ast::{
    BgpCommand, BgpStanza, InterfaceCommand, InterfaceStanza, NeighborCommand, OspfCommand,
    OspfStanza, RouteStanza, Stanza,
};
use crate::keywords::Keyword;
use crate::scanner::TokenKind;
use crate::validate;

use super::lines::{Cursor, Line, LineResult, SyntaxError};
use super::{BodyLine, Dispatcher};

/// Interface body lines accepted without a modeled effect.
const IGNORED_INTERFACE_LINES: &[&str] = &[
    "speed",
    "duplex",
    "ipv6",
    "delay",
    "mac-address",
    "channel-group",
    "ospf",
    "pppoe",
    "flowcontrol",
    "lacp",
    "nve-only",
    "member-interface",
    "mode",
    "authentication",
    "zone-member",
    "bfd",
    "pim",
    "igmp",
    "dhcp",
    "dhcprelay",
    "policy-route",
];

/// `route IF NETWORK MASK GATEWAY [METRIC] [track N] [tunneled]`.
///
/// `0` is accepted as shorthand for `0.0.0.0` in the network and mask slots.
pub(super) fn route<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<Stanza<'a>> {
    let nameif = cursor.name("interface name")?;
    let network = route_address(cursor, "route network")?;
    let mask_span = cursor.here();
    let mask = route_address(cursor, "route netmask")?;
    validate::netmask(mask).map_err(|message| SyntaxError {
        message,
        span: mask_span,
    })?;
    let gateway = cursor.ipv4("gateway")?;
    let metric = if cursor.at_dec() {
        Some(cursor.dec("route metric", validate::route_metric)?)
    } else {
        None
    };
    let mut tunneled = false;
    while !cursor.is_done() {
        if cursor.eat(Keyword::Tunneled) {
            tunneled = true;
        } else if cursor.eat_text("track") {
            cursor.name("track id")?;
        } else {
            return Err(cursor.error("unexpected route option"));
        }
    }
    Ok(Stanza::Route(RouteStanza {
        nameif,
        network,
        mask,
        gateway,
        metric,
        tunneled,
    }))
}

fn route_address(cursor: &mut Cursor<'_, '_>, what: &str) -> LineResult<Ipv4Addr> {
    if cursor.peek().is_some_and(|t| t.kind == TokenKind::Dec && t.text == "0") {
        cursor.bump();
        return Ok(Ipv4Addr::UNSPECIFIED);
    }
    cursor.ipv4(what)
}

fn neighbor_command<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<BodyLine<BgpCommand<'a>>> {
    let peer = cursor.ipv4("neighbor address")?;
    let command = if cursor.eat(Keyword::RemoteAs) {
        NeighborCommand::RemoteAs(cursor.dec("remote-as", validate::bgp_asn)?)
    } else if cursor.eat(Keyword::Description) {
        NeighborCommand::Description(cursor.text())
    } else if cursor.eat(Keyword::Timers) {
        let keepalive = cursor.dec("keepalive", validate::bgp_timer)?;
        let hold = cursor.dec("hold time", validate::bgp_timer)?;
        if cursor.at_dec() {
            // Minimum hold time is not modeled.
            cursor.bump();
        }
        NeighborCommand::Timers { keepalive, hold }
    } else if cursor.eat(Keyword::RouteMap) {
        let name = cursor.name("route-map name")?;
        if cursor.eat(Keyword::In) {
            NeighborCommand::RouteMapIn(name)
        } else if cursor.eat(Keyword::Out) {
            NeighborCommand::RouteMapOut(name)
        } else {
            return Err(cursor.error("expected in or out"));
        }
    } else if cursor.eat(Keyword::Activate) {
        NeighborCommand::Activate
    } else if cursor.eat(Keyword::Shutdown) {
        NeighborCommand::Shutdown
    } else {
        // password, update-source, next-hop-self, ...
        return Ok(BodyLine::Ignored);
    };
    cursor.finish()?;
    Ok(BodyLine::Command(BgpCommand::Neighbor(peer, command)))
}

/// One line of a `router bgp` block or of its ipv4 address family.
fn bgp_line<'a>(cursor: &mut Cursor<'_, 'a>) -> LineResult<BodyLine<BgpCommand<'a>>> {
    if cursor.eat(Keyword::Neighbor) {
        return neighbor_command(cursor);
    }
    if cursor.eat(Keyword::Bgp) {
        if cursor.eat(Keyword::RouterId) {
            let id = cursor.ipv4("router-id")?;
            cursor.finish()?;
            return Ok(BodyLine::Command(BgpCommand::RouterId(id)));
        }
        return Ok(BodyLine::Ignored);
    }
    const IGNORED: &[&str] = &[
        "network",
        "redistribute",
        "no",
        "timers",
        "auto-summary",
        "synchronization",
        "distance",
        "default-information",
        "maximum-paths",
        "aggregate-address",
        "table-map",
    ];
    if IGNORED.iter().any(|head| cursor.at_text(head)) {
        return Ok(BodyLine::Ignored);
    }
    Ok(BodyLine::Unknown)
}

impl<'t, 'a> Dispatcher<'t, 'a, '_> {
    pub(super) fn interface(
        &mut self,
        id: usize,
        cursor: &mut Cursor<'t, 'a>,
    ) -> LineResult<Stanza<'a>> {
        let name = cursor.name("interface name")?;
        cursor.finish()?;
        let commands = self.body(id, |line| {
            let command = if line.eat(Keyword::Nameif) {
                InterfaceCommand::Nameif(line.name("nameif")?)
            } else if line.eat(Keyword::SecurityLevel) {
                InterfaceCommand::SecurityLevel(line.dec("security-level", validate::security_level)?)
            } else if line.eat(Keyword::Ip) {
                if !line.eat(Keyword::Address) {
                    return Ok(BodyLine::Ignored);
                }
                if !line.at_ipv4() {
                    // dhcp, pppoe
                    return Ok(BodyLine::Ignored);
                }
                let ip = line.ipv4("interface address")?;
                let mask = line.netmask("interface netmask")?;
                let standby = if line.eat(Keyword::Standby) {
                    Some(line.ipv4("standby address")?)
                } else {
                    None
                };
                InterfaceCommand::IpAddress { ip, mask, standby }
            } else if line.eat(Keyword::Vlan) {
                InterfaceCommand::Vlan(line.dec("vlan", validate::vlan)?)
            } else if line.eat(Keyword::Vrf) {
                line.eat_text("forwarding");
                InterfaceCommand::Vrf(line.name("vrf name")?)
            } else if line.eat(Keyword::Description) {
                InterfaceCommand::Description(line.text())
            } else if line.eat(Keyword::Shutdown) {
                InterfaceCommand::Shutdown(true)
            } else if line.eat(Keyword::ManagementOnly) {
                InterfaceCommand::ManagementOnly
            } else if line.eat(Keyword::No) {
                if line.eat(Keyword::Shutdown) {
                    InterfaceCommand::Shutdown(false)
                } else if line.eat(Keyword::Nameif) {
                    InterfaceCommand::NoNameif
                } else if line.eat(Keyword::Ip) && line.eat(Keyword::Address) {
                    InterfaceCommand::NoIpAddress
                } else {
                    return Ok(BodyLine::Ignored);
                }
            } else if line.eat(Keyword::Mtu) {
                return Ok(BodyLine::Ignored);
            } else if IGNORED_INTERFACE_LINES.iter().any(|head| line.at_text(head)) {
                return Ok(BodyLine::Ignored);
            } else {
                return Ok(BodyLine::Unknown);
            };
            line.finish()?;
            Ok(BodyLine::Command(command))
        });
        Ok(Stanza::Interface(InterfaceStanza { name, commands }))
    }

    pub(super) fn router_ospf(
        &mut self,
        id: usize,
        cursor: &mut Cursor<'t, 'a>,
    ) -> LineResult<Stanza<'a>> {
        let process = cursor.name("ospf process id")?;
        let commands = self.body(id, |line| {
            let command = if line.eat(Keyword::Network) {
                let ip = line.ipv4("network address")?;
                let mask = line.ipv4("network mask")?;
                line.expect(Keyword::Area)?;
                let area = line.value("area id", validate::ospf_area)?;
                OspfCommand::Network { ip, mask, area }
            } else if line.eat(Keyword::RouterId) {
                OspfCommand::RouterId(line.ipv4("router-id")?)
            } else if line.eat(Keyword::PassiveInterface) {
                if line.at_text("default") {
                    line.bump();
                    OspfCommand::PassiveDefault
                } else {
                    OspfCommand::PassiveInterface(line.name("interface name")?)
                }
            } else if line.eat(Keyword::No) {
                if !line.eat(Keyword::PassiveInterface) {
                    return Ok(BodyLine::Ignored);
                }
                OspfCommand::NoPassiveInterface(line.name("interface name")?)
            } else if line.eat(Keyword::Area) {
                let area = line.value("area id", validate::ospf_area)?;
                if line.eat(Keyword::Stub) {
                    line.remaining();
                    OspfCommand::AreaStub(area)
                } else if line.eat(Keyword::Nssa) {
                    line.remaining();
                    OspfCommand::AreaNssa(area)
                } else if line.eat(Keyword::Authentication) {
                    line.eat(Keyword::MessageDigest);
                    OspfCommand::AreaAuthentication(area)
                } else {
                    // range, virtual-link, filter-list, default-cost
                    return Ok(BodyLine::Ignored);
                }
            } else if [
                "log-adjacency-changes",
                "redistribute",
                "default-information",
                "timers",
                "distance",
                "summary-address",
                "compatible",
                "neighbor",
                "auto-cost",
            ]
            .iter()
            .any(|head| line.at_text(head))
            {
                return Ok(BodyLine::Ignored);
            } else {
                return Ok(BodyLine::Unknown);
            };
            line.finish()?;
            Ok(BodyLine::Command(command))
        });
        Ok(Stanza::RouterOspf(OspfStanza { process, commands }))
    }

    /// `router bgp ASN` with its body.
    ///
    /// Address-family sections are recognized both as nested blocks and as
    /// same-level runs closed by `exit-address-family`.
    pub(super) fn router_bgp(
        &mut self,
        id: usize,
        cursor: &mut Cursor<'t, 'a>,
    ) -> LineResult<Stanza<'a>> {
        let asn = cursor.dec("bgp as-number", validate::bgp_asn)?;
        cursor.finish()?;

        let tree = self.tree;
        let mut commands = Vec::new();
        // `Some(true)` inside ipv4, `Some(false)` inside another family.
        let mut family: Option<bool> = None;
        let mut family_commands = Vec::new();

        for (child_id, child) in tree.children(id) {
            let mut line = Cursor::new(&child.line);
            if line.eat(Keyword::AddressFamily) {
                if family.take() == Some(true) {
                    commands.push(BgpCommand::AddressFamilyIpv4(std::mem::take(&mut family_commands)));
                }
                let ipv4 = line.eat(Keyword::Ipv4);
                family = Some(ipv4);
                family_commands.clear();
                for (_, nested) in tree.children(child_id) {
                    self.bgp_body_line(&nested.line, ipv4, &mut family_commands);
                }
                continue;
            }
            if line.eat(Keyword::ExitAddressFamily) {
                if family.take() == Some(true) {
                    commands.push(BgpCommand::AddressFamilyIpv4(std::mem::take(&mut family_commands)));
                }
                family_commands.clear();
                continue;
            }
            match family {
                Some(ipv4) => self.bgp_body_line(&child.line, ipv4, &mut family_commands),
                None => self.bgp_body_line(&child.line, true, &mut commands),
            }
        }
        if family == Some(true) {
            commands.push(BgpCommand::AddressFamilyIpv4(family_commands));
        }
        Ok(Stanza::RouterBgp(BgpStanza { asn, commands }))
    }

    fn bgp_body_line(
        &mut self,
        line: &'t Line<'a>,
        keep: bool,
        out: &mut Vec<BgpCommand<'a>>,
    ) {
        let mut cursor = Cursor::new(line);
        match bgp_line(&mut cursor) {
            Ok(BodyLine::Command(command)) => {
                if keep {
                    out.push(command);
                }
            }
            Ok(BodyLine::Ignored) => {}
            Ok(BodyLine::Unknown) => self.unknown_line(line),
            Err(err) => self.invalid(err),
        }
    }
}
