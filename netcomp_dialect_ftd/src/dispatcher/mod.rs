//! Stanza dispatcher: turns the indentation tree of lines into [`Stanza`] nodes.
//!
//! Each top-level line selects a production from its first one to three
//! tokens; block stanzas then parse their indented body lines. A line that
//! fails to parse is reported as a line-scoped warning and dropped, and an
//! unknown head is consumed together with its body.

mod acl;
mod crypto;
pub(crate) mod lines;
mod routing;

use netcomp_ir::Warnings;
use tracing::trace;

use crate::ast::{Stanza, StanzaNode};
use crate::keywords::Keyword;
use crate::options::ParseOptions;
use crate::scanner::Scanner;
use crate::validate;

use lines::{Cursor, Line, LineResult, LineTree, SyntaxError};

/// Outcome of parsing one body line.
#[derive(Debug)]
pub(crate) enum BodyLine<T> {
    Command(T),
    /// Recognized, with no modeled effect.
    Ignored,
    Unknown,
}

/// Heads accepted at top level without any modeled effect.
const IGNORED_HEADS: &[Keyword] = &[
    Keyword::Aaa,
    Keyword::AaaServer,
    Keyword::AccessControlConfig,
    Keyword::Asdm,
    Keyword::AuthPrompt,
    Keyword::Banner,
    Keyword::Boot,
    Keyword::CallHome,
    Keyword::Clock,
    Keyword::CommunityList,
    Keyword::Console,
    Keyword::Crashinfo,
    Keyword::Cts,
    Keyword::Dhcpd,
    Keyword::Dhcprelay,
    Keyword::Dns,
    Keyword::DomainName,
    Keyword::DynamicAccessPolicyRecord,
    Keyword::Enable,
    Keyword::Exit,
    Keyword::FlowOffload,
    Keyword::Ftp,
    Keyword::GroupPolicy,
    Keyword::Http,
    Keyword::Icmp,
    Keyword::Ipv6,
    Keyword::License,
    Keyword::Logging,
    Keyword::Manager,
    Keyword::MonitorInterface,
    Keyword::Ngfw,
    Keyword::Ntp,
    Keyword::Pager,
    Keyword::Passwd,
    Keyword::PolicyList,
    Keyword::PrefixList,
    Keyword::Prompt,
    Keyword::Quit,
    Keyword::RouteMap,
    Keyword::SameSecurityTraffic,
    Keyword::SnmpServer,
    Keyword::Snort,
    Keyword::Ssh,
    Keyword::Ssl,
    Keyword::Sysopt,
    Keyword::Telnet,
    Keyword::Terminal,
    Keyword::ThreatDetection,
    Keyword::TimeRange,
    Keyword::Timeout,
    Keyword::UserIdentity,
    Keyword::Username,
    Keyword::Vpdn,
    Keyword::Webvpn,
];

/// Parse `input` into stanzas, reporting recoverable problems to `warnings`.
pub(crate) fn dispatch<'a>(
    input: &'a str,
    options: &ParseOptions,
    warnings: &mut Warnings,
) -> Vec<StanzaNode<'a>> {
    let tree = LineTree::build(input, Scanner::new(input), warnings);
    let mut dispatcher = Dispatcher {
        tree: &tree,
        options,
        warnings,
    };
    tree.roots
        .iter()
        .filter_map(|root| dispatcher.dispatch_root(*root))
        .collect()
}

pub(crate) struct Dispatcher<'t, 'a, 'w> {
    pub(crate) tree: &'t LineTree<'a>,
    options: &'t ParseOptions,
    warnings: &'w mut Warnings,
}

impl<'t, 'a> Dispatcher<'t, 'a, '_> {
    fn dispatch_root(&mut self, id: usize) -> Option<StanzaNode<'a>> {
        let tree = self.tree;
        let line = &tree.node(id).line;
        let mut cursor = Cursor::new(line);
        match self.stanza(id, &mut cursor) {
            Ok(Some(stanza)) => {
                trace!(line = line.span.line, head = line.tokens[0].text, "dispatched stanza");
                Some(StanzaNode {
                    stanza,
                    span: line.span,
                })
            }
            Ok(None) => {
                if self.options.warn_unknown_stanzas {
                    self.warnings.syntax(
                        "unrecognized-stanza",
                        format!("unrecognized stanza: {}", line.text),
                        Some(line.span),
                    );
                }
                None
            }
            Err(err) => {
                self.invalid(err);
                None
            }
        }
    }

    fn stanza(&mut self, id: usize, cursor: &mut Cursor<'t, 'a>) -> LineResult<Option<Stanza<'a>>> {
        let Some(head) = cursor.bump() else {
            return Ok(None);
        };
        let Some(keyword) = head.keyword() else {
            let text = head.text;
            let ignored = text.eq_ignore_ascii_case("asa")
                || text.eq_ignore_ascii_case("end")
                || text.starts_with("Cryptochecksum");
            return Ok(ignored.then_some(Stanza::Ignored(text)));
        };

        let stanza = match keyword {
            Keyword::Hostname => {
                let name = cursor.name("hostname")?;
                cursor.finish()?;
                Stanza::Hostname(name)
            }
            Keyword::Interface => self.interface(id, cursor)?,
            Keyword::Mtu => {
                let nameif = cursor.name("interface name")?;
                let mtu = cursor.dec("mtu", validate::mtu)?;
                cursor.finish()?;
                Stanza::Mtu { nameif, mtu }
            }
            Keyword::AccessList => acl::access_list(cursor)?,
            Keyword::AccessGroup => acl::access_group(cursor)?,
            Keyword::Object => match self.object(id, cursor)? {
                Some(stanza) => stanza,
                None => return Ok(None),
            },
            Keyword::ObjectGroup => match self.object_group(id, cursor)? {
                Some(stanza) => stanza,
                None => return Ok(None),
            },
            Keyword::Nat => Stanza::Nat(acl::twice_nat(cursor)?),
            Keyword::Route => routing::route(cursor)?,
            Keyword::Router => {
                if cursor.eat(Keyword::Ospf) {
                    self.router_ospf(id, cursor)?
                } else if cursor.eat(Keyword::Bgp) {
                    self.router_bgp(id, cursor)?
                } else {
                    Stanza::Ignored(head.text)
                }
            }
            Keyword::Crypto => match self.crypto(id, cursor)? {
                Some(stanza) => stanza,
                None => return Ok(None),
            },
            Keyword::TunnelGroup => self.tunnel_group(id, cursor)?,
            Keyword::ClassMap => self.class_map(id, cursor)?,
            Keyword::PolicyMap => self.policy_map(id, cursor)?,
            Keyword::ServicePolicy => crypto::service_policy(cursor)?,
            Keyword::Names => {
                cursor.finish()?;
                Stanza::Names { enabled: true }
            }
            Keyword::Name => {
                let ip = cursor.ipv4("name address")?;
                let name = cursor.name("name")?;
                // Optional `description TEXT` is not modeled.
                Stanza::Name { ip, name }
            }
            Keyword::Arp => {
                if cursor.eat(Keyword::Timeout) {
                    let timeout = cursor.dec("arp timeout", validate::arp_timeout)?;
                    cursor.finish()?;
                    Stanza::ArpTimeout(timeout)
                } else {
                    Stanza::Ignored(head.text)
                }
            }
            Keyword::Failover => Stanza::Failover(cursor.rest()),
            Keyword::No => {
                if cursor.eat(Keyword::Names) {
                    cursor.finish()?;
                    Stanza::Names { enabled: false }
                } else {
                    Stanza::Ignored(head.text)
                }
            }
            kw if IGNORED_HEADS.contains(&kw) => Stanza::Ignored(head.text),
            _ => return Ok(None),
        };
        Ok(Some(stanza))
    }

    /// Walk the body of `parent`, reporting failed and unknown lines.
    pub(crate) fn body<T>(
        &mut self,
        parent: usize,
        mut parse: impl FnMut(&mut Cursor<'t, 'a>) -> LineResult<BodyLine<T>>,
    ) -> Vec<T> {
        let tree = self.tree;
        let mut out = Vec::new();
        for (_, child) in tree.children(parent) {
            let mut cursor = Cursor::new(&child.line);
            match parse(&mut cursor) {
                Ok(BodyLine::Command(command)) => out.push(command),
                Ok(BodyLine::Ignored) => {}
                Ok(BodyLine::Unknown) => self.unknown_line(&child.line),
                Err(err) => self.invalid(err),
            }
        }
        out
    }

    pub(crate) fn unknown_line(&mut self, line: &Line<'a>) {
        if self.options.warn_unknown_body_lines {
            self.warnings.syntax(
                "unrecognized-line",
                format!("unrecognized line: {}", line.text),
                Some(line.span),
            );
        }
    }

    pub(crate) fn invalid(&mut self, err: SyntaxError) {
        self.warnings.syntax("invalid-line", err.message, Some(err.span));
    }
}
