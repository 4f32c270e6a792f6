//! Parse tree produced by the dispatcher: one variant per stanza kind.
//!
//! Nodes borrow names from the input text. Sub-commands that failed to parse
//! are already reported and removed, so every node here is well-formed.

use std::net::Ipv4Addr;

use netcomp_ir::Span;

pub use crate::model::{
    IkeCipher, IkeHash, NatKind, NatPosition, TransformMode, TunnelGroupKind,
};

/// Top-level stanza with the span of its header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StanzaNode<'a> {
    pub stanza: Stanza<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stanza<'a> {
    Hostname(&'a str),
    Interface(InterfaceStanza<'a>),
    Mtu { nameif: &'a str, mtu: u32 },
    AccessList(AccessListStanza<'a>),
    AccessGroup(AccessGroupStanza<'a>),
    NetworkObject(NetworkObjectStanza<'a>),
    NetworkObjectGroup(NetworkObjectGroupStanza<'a>),
    ServiceObjectGroup(ServiceObjectGroupStanza<'a>),
    Nat(NatStanza<'a>),
    Route(RouteStanza<'a>),
    RouterOspf(OspfStanza<'a>),
    RouterBgp(BgpStanza<'a>),
    Ikev2Policy(Ikev2PolicyStanza),
    TransformSet(TransformSetStanza<'a>),
    IpsecProfile(IpsecProfileStanza<'a>),
    CryptoMapEntry(CryptoMapEntryStanza<'a>),
    CryptoMapInterface { map: &'a str, nameif: &'a str },
    TunnelGroup(TunnelGroupStanza<'a>),
    ClassMap(ClassMapStanza<'a>),
    PolicyMap(PolicyMapStanza<'a>),
    ServicePolicy(ServicePolicyStanza<'a>),
    Names { enabled: bool },
    Name { ip: Ipv4Addr, name: &'a str },
    ArpTimeout(u32),
    Failover(&'a str),
    /// Recognized stanza with no modeled effect.
    Ignored(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceStanza<'a> {
    pub name: &'a str,
    pub commands: Vec<InterfaceCommand<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceCommand<'a> {
    Nameif(&'a str),
    NoNameif,
    SecurityLevel(u8),
    IpAddress {
        ip: Ipv4Addr,
        mask: Ipv4Addr,
        standby: Option<Ipv4Addr>,
    },
    NoIpAddress,
    Vlan(u16),
    Vrf(&'a str),
    Description(&'a str),
    Shutdown(bool),
    ManagementOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessListStanza<'a> {
    pub name: &'a str,
    pub entry: AclEntry<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclEntry<'a> {
    Remark(&'a str),
    Rule(AclRule<'a>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclKind {
    Extended,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclVerb {
    Permit,
    Deny,
    Trust,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolRef<'a> {
    Named(&'a str),
    Object(&'a str),
    ObjectGroup(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRef<'a> {
    Ip(Ipv4Addr),
    Name(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressRef<'a> {
    Any,
    Any4,
    Any6,
    Host(HostRef<'a>),
    NetworkMask(Ipv4Addr, Ipv4Addr),
    Object(&'a str),
    ObjectGroup(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortRef<'a> {
    Eq(&'a str),
    Gt(&'a str),
    Lt(&'a str),
    Neq(&'a str),
    Range(&'a str, &'a str),
    ObjectGroup(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclRule<'a> {
    pub kind: AclKind,
    pub verb: AclVerb,
    pub protocol: ProtocolRef<'a>,
    pub interface: Option<&'a str>,
    pub source: AddressRef<'a>,
    pub source_port: Option<PortRef<'a>>,
    pub destination_interface: Option<&'a str>,
    pub destination: AddressRef<'a>,
    pub destination_port: Option<PortRef<'a>>,
    pub rule_id: Option<u64>,
    pub time_range: Option<&'a str>,
    pub inactive: bool,
    pub log: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessGroupBinding<'a> {
    In(&'a str),
    Out(&'a str),
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGroupStanza<'a> {
    pub acl: &'a str,
    pub binding: AccessGroupBinding<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkObjectStanza<'a> {
    pub name: &'a str,
    pub commands: Vec<NetworkObjectCommand<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkObjectCommand<'a> {
    Host(HostRef<'a>),
    Subnet(Ipv4Addr, Ipv4Addr),
    Range(Ipv4Addr, Ipv4Addr),
    Fqdn(&'a str),
    Description(&'a str),
    Nat(ObjectNat<'a>),
}

/// `nat (real,mapped) static|dynamic MAPPED [service PROTO REAL MAPPED]` inside an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectNat<'a> {
    pub real_interface: &'a str,
    pub mapped_interface: &'a str,
    pub kind: NatKind,
    pub mapped: NatAddressRef<'a>,
    pub service: Option<NatServiceRef<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkObjectGroupStanza<'a> {
    pub name: &'a str,
    pub members: Vec<NetworkGroupMember<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkGroupMember<'a> {
    Host(HostRef<'a>),
    NetworkMask(Ipv4Addr, Ipv4Addr),
    Object(&'a str),
    Group(&'a str),
    Description(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceObjectGroupStanza<'a> {
    pub name: &'a str,
    pub protocol: Option<&'a str>,
    pub members: Vec<ServiceGroupMember<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceGroupMember<'a> {
    Port(PortRef<'a>),
    Service {
        protocol: &'a str,
        source: Option<PortRef<'a>>,
        destination: Option<PortRef<'a>>,
    },
    Group(&'a str),
    Description(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NatAddressRef<'a> {
    Any,
    Interface,
    Ip(Ipv4Addr),
    Name(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatServiceRef<'a> {
    pub protocol: Option<&'a str>,
    pub real: &'a str,
    pub mapped: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatStanza<'a> {
    pub real_interface: &'a str,
    pub mapped_interface: &'a str,
    pub order: NatPosition,
    pub source: Option<(NatKind, NatAddressRef<'a>, NatAddressRef<'a>)>,
    pub destination: Option<(NatAddressRef<'a>, NatAddressRef<'a>)>,
    pub service: Option<NatServiceRef<'a>>,
    pub inactive: bool,
    pub description: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStanza<'a> {
    pub nameif: &'a str,
    pub network: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub metric: Option<u8>,
    pub tunneled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OspfStanza<'a> {
    pub process: &'a str,
    pub commands: Vec<OspfCommand<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OspfCommand<'a> {
    Network {
        ip: Ipv4Addr,
        mask: Ipv4Addr,
        area: u32,
    },
    RouterId(Ipv4Addr),
    PassiveInterface(&'a str),
    PassiveDefault,
    NoPassiveInterface(&'a str),
    AreaStub(u32),
    AreaNssa(u32),
    AreaAuthentication(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgpStanza<'a> {
    pub asn: u32,
    pub commands: Vec<BgpCommand<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BgpCommand<'a> {
    RouterId(Ipv4Addr),
    Neighbor(Ipv4Addr, NeighborCommand<'a>),
    /// `address-family ipv4 [unicast]` with its body.
    AddressFamilyIpv4(Vec<BgpCommand<'a>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeighborCommand<'a> {
    RemoteAs(u32),
    Description(&'a str),
    Timers { keepalive: u32, hold: u32 },
    RouteMapIn(&'a str),
    RouteMapOut(&'a str),
    Activate,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ikev2PolicyStanza {
    pub priority: u32,
    pub commands: Vec<Ikev2PolicyCommand>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ikev2PolicyCommand {
    Encryption(Vec<IkeCipher>),
    Integrity(Vec<IkeHash>),
    Prf(Vec<IkeHash>),
    Group(Vec<u32>),
    LifetimeSeconds(u32),
}

/// Either `crypto ipsec [ikev1] transform-set` or `crypto ipsec ikev2 ipsec-proposal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSetStanza<'a> {
    pub name: &'a str,
    pub ciphers: Vec<IkeCipher>,
    pub hashes: Vec<IkeHash>,
    pub mode: Option<TransformMode>,
    pub ikev2_proposal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpsecProfileStanza<'a> {
    pub name: &'a str,
    pub transform_sets: Vec<&'a str>,
    pub pfs_group: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CryptoMapEntryStanza<'a> {
    pub map: &'a str,
    pub sequence: u32,
    pub command: CryptoMapCommand<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoMapCommand<'a> {
    MatchAddress(&'a str),
    SetPeer(Vec<Ipv4Addr>),
    SetTransformSets(Vec<&'a str>),
    SetPfs(Option<u32>),
    DynamicMap(&'a str),
    IsakmpProfile(&'a str),
    /// Recognized `set` sub-command without a modeled effect.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelGroupStanza<'a> {
    pub name: &'a str,
    pub body: TunnelGroupBody<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TunnelGroupBody<'a> {
    Type(TunnelGroupKind),
    IpsecAttributes(Vec<TunnelGroupAttribute<'a>>),
    GeneralAttributes(Vec<TunnelGroupAttribute<'a>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TunnelGroupAttribute<'a> {
    RemotePreSharedKey(&'a str),
    LocalPreSharedKey(&'a str),
    Ikev1PreSharedKey(&'a str),
    DefaultGroupPolicy(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMapStanza<'a> {
    pub name: &'a str,
    pub class_type: Option<&'a str>,
    pub match_lines: Vec<&'a str>,
    pub access_lists: Vec<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyMapStanza<'a> {
    pub name: &'a str,
    pub policy_type: Option<&'a str>,
    pub classes: Vec<PolicyMapClass<'a>>,
    pub parameters: Vec<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyMapClass<'a> {
    pub class_map: &'a str,
    pub actions: Vec<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePolicyStanza<'a> {
    pub policy_map: &'a str,
    pub interface: Option<&'a str>,
}
