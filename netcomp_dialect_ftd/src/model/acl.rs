//! Access lists, network/service objects and NAT rules.

use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;

use netcomp_ir::LineAction;
use serde::{Deserialize, Serialize};

/// Line category of an access-list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AclType {
    Remark,
    Extended,
    Advanced,
}

/// Named access list; line order is evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdAccessList {
    pub name: String,
    pub lines: Vec<FtdAccessListLine>,
}

impl FtdAccessList {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    /// Lines that carry match/action semantics.
    pub fn rules(&self) -> impl Iterator<Item = &FtdAclRule> {
        self.lines.iter().filter_map(|line| match line {
            FtdAccessListLine::Rule(rule) => Some(rule),
            FtdAccessListLine::Remark(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FtdAccessListLine {
    Remark(String),
    Rule(FtdAclRule),
}

impl FtdAccessListLine {
    pub fn acl_type(&self) -> AclType {
        match self {
            FtdAccessListLine::Remark(_) => AclType::Remark,
            FtdAccessListLine::Rule(rule) => rule.acl_type,
        }
    }
}

/// Extended or advanced access-list entry.
///
/// `trust` lines keep `action == Permit`; the flag only changes the line name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdAclRule {
    pub acl_type: AclType,
    pub action: LineAction,
    pub trust: bool,
    pub protocol: AclProtocol,
    pub interface: Option<String>,
    pub destination_interface: Option<String>,
    pub source: AddressSpecifier,
    pub source_port: Option<PortSpecifier>,
    pub destination: AddressSpecifier,
    pub destination_port: Option<PortSpecifier>,
    pub rule_id: Option<u64>,
    pub time_range: Option<String>,
    pub inactive: bool,
    pub log: bool,
    /// Metadata from `remark rule-id N: ...` lines preceding this entry.
    pub remarks: Option<RuleRemarks>,
}

/// Firewall-manager metadata recovered from remark lines.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleRemarks {
    pub rule_name: Option<String>,
    pub policy_name: Option<String>,
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AclProtocol {
    Named(String),
    Object(String),
    ObjectGroup(String),
}

impl fmt::Display for AclProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AclProtocol::Named(name) => f.write_str(name),
            AclProtocol::Object(name) => write!(f, "object {name}"),
            AclProtocol::ObjectGroup(name) => write!(f, "object-group {name}"),
        }
    }
}

/// Source or destination address of an access-list entry.
///
/// Object and group names are resolved only during lowering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressSpecifier {
    Any,
    Any4,
    Any6,
    Host(Ipv4Addr),
    NetworkMask(Ipv4Addr, Ipv4Addr),
    Object(String),
    ObjectGroup(String),
}

impl fmt::Display for AddressSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressSpecifier::Any | AddressSpecifier::Any4 => f.write_str("any"),
            AddressSpecifier::Any6 => f.write_str("any6"),
            AddressSpecifier::Host(ip) => write!(f, "host {ip}"),
            AddressSpecifier::NetworkMask(ip, mask) => write!(f, "{ip} {mask}"),
            AddressSpecifier::Object(name) => write!(f, "object {name}"),
            AddressSpecifier::ObjectGroup(name) => write!(f, "object-group {name}"),
        }
    }
}

/// Port match as written (`eq 80`, `range 8000 9000`, `object-group WEB`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortSpecifier {
    Eq(String),
    Gt(String),
    Lt(String),
    Neq(String),
    Range(String, String),
    ObjectGroup(String),
}

impl fmt::Display for PortSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSpecifier::Eq(port) => write!(f, "eq {port}"),
            PortSpecifier::Gt(port) => write!(f, "gt {port}"),
            PortSpecifier::Lt(port) => write!(f, "lt {port}"),
            PortSpecifier::Neq(port) => write!(f, "neq {port}"),
            PortSpecifier::Range(low, high) => write!(f, "range {low} {high}"),
            PortSpecifier::ObjectGroup(name) => write!(f, "object-group {name}"),
        }
    }
}

/// Value of an `object network` definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkObjectValue {
    Host(Ipv4Addr),
    Subnet(Ipv4Addr, Ipv4Addr),
    Range(Ipv4Addr, Ipv4Addr),
    Fqdn(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdNetworkObject {
    pub name: String,
    pub value: Option<NetworkObjectValue>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkGroupMember {
    Host(Ipv4Addr),
    NetworkMask(Ipv4Addr, Ipv4Addr),
    Object(String),
    Group(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdNetworkObjectGroup {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<NetworkGroupMember>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceGroupMember {
    Port(PortSpecifier),
    Service {
        protocol: String,
        source: Option<PortSpecifier>,
        destination: Option<PortSpecifier>,
    },
    Group(String),
}

/// `object-group service NAME [tcp|udp|tcp-udp]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdServiceObjectGroup {
    pub name: String,
    pub protocol: Option<String>,
    pub description: Option<String>,
    pub members: Vec<ServiceGroupMember>,
}

/// NAT ordering section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NatPosition {
    BeforeAuto,
    Auto,
    AfterAuto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NatKind {
    Static,
    Dynamic,
}

/// Real or mapped address of a NAT rule. `Object` may name an object or a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NatAddress {
    Any,
    Interface,
    Ip(Ipv4Addr),
    Object(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatSource {
    pub kind: NatKind,
    pub real: NatAddress,
    pub mapped: NatAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatDestination {
    pub real: NatAddress,
    pub mapped: NatAddress,
}

/// Port translation; `protocol` is set for object NAT (`service tcp 80 8080`),
/// otherwise `real`/`mapped` name service objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatService {
    pub protocol: Option<String>,
    pub real: String,
    pub mapped: String,
}

/// Manual (twice) or object NAT rule, kept in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdNatRule {
    pub real_interface: String,
    pub mapped_interface: String,
    pub position: NatPosition,
    pub source: Option<NatSource>,
    pub destination: Option<NatDestination>,
    pub service: Option<NatService>,
    pub inactive: bool,
    pub description: Option<String>,
    /// Defined inside `object network`.
    pub object_nat: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessGroupScope {
    In(String),
    Out(String),
    Global,
}

/// `access-group ACL in|out interface IF` or `access-group ACL global`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtdAccessGroup {
    pub access_list: String,
    pub scope: AccessGroupScope,
}
