//! Reserved words of the FTD configuration language.
//!
//! The scanner cuts a generic word first and then consults [`lookup`], a
//! binary search over a static table sorted by keyword text. Matching is
//! ASCII case-insensitive and never allocates.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

macro_rules! keywords {
    ($($variant:ident => $text:literal,)*) => {
        /// Reserved keyword recognized by the scanner.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            /// Canonical lower-case spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }
        }

        // Sorted by byte order of the keyword text.
        static KEYWORD_TABLE: &[(&str, Keyword)] = &[
            $(($text, Keyword::$variant),)*
        ];
    };
}

keywords! {
    Aaa => "aaa",
    AaaServer => "aaa-server",
    AccessControlConfig => "access-control-config",
    AccessGroup => "access-group",
    AccessList => "access-list",
    Activate => "activate",
    Address => "address",
    AddressFamily => "address-family",
    Advanced => "advanced",
    AfterAuto => "after-auto",
    Ah => "ah",
    Any => "any",
    Any4 => "any4",
    Any6 => "any6",
    Area => "area",
    Arp => "arp",
    Asdm => "asdm",
    AuthPrompt => "auth-prompt",
    Authentication => "authentication",
    Auto => "auto",
    AutoSummary => "auto-summary",
    Banner => "banner",
    BeforeAuto => "before-auto",
    Bgp => "bgp",
    BgpCommunity => "bgp-community",
    Boot => "boot",
    Both => "both",
    CallHome => "call-home",
    Class => "class",
    ClassMap => "class-map",
    Clock => "clock",
    CommunityList => "community-list",
    Console => "console",
    Crashinfo => "crashinfo",
    Crypto => "crypto",
    Cts => "cts",
    Default => "default",
    DefaultGroupPolicy => "default-group-policy",
    DefaultInformation => "default-information",
    Deny => "deny",
    Description => "description",
    Destination => "destination",
    Dhcpd => "dhcpd",
    Dhcprelay => "dhcprelay",
    Disable => "disable",
    Distance => "distance",
    Dns => "dns",
    DomainName => "domain-name",
    Duplex => "duplex",
    Dynamic => "dynamic",
    DynamicAccessPolicyRecord => "dynamic-access-policy-record",
    DynamicMap => "dynamic-map",
    Enable => "enable",
    Encryption => "encryption",
    Eq => "eq",
    Esp => "esp",
    EventLog => "event-log",
    Exit => "exit",
    ExitAddressFamily => "exit-address-family",
    Extended => "extended",
    Failover => "failover",
    Firewall => "firewall",
    FlowEnd => "flow-end",
    FlowOffload => "flow-offload",
    FlowStart => "flow-start",
    Fqdn => "fqdn",
    Ftp => "ftp",
    GeneralAttributes => "general-attributes",
    Global => "global",
    Group => "group",
    GroupObject => "group-object",
    GroupPolicy => "group-policy",
    Gt => "gt",
    Holdtime => "holdtime",
    Host => "host",
    Hostname => "hostname",
    Http => "http",
    Icmp => "icmp",
    Icmp6 => "icmp6",
    Ifc => "ifc",
    Ikev1 => "ikev1",
    Ikev2 => "ikev2",
    In => "in",
    Inactive => "inactive",
    Inspect => "inspect",
    Integrity => "integrity",
    Interface => "interface",
    Interval => "interval",
    Ip => "ip",
    Ipsec => "ipsec",
    IpsecAttributes => "ipsec-attributes",
    IpsecIsakmp => "ipsec-isakmp",
    IpsecL2l => "ipsec-l2l",
    IpsecProposal => "ipsec-proposal",
    Ipv4 => "ipv4",
    Ipv6 => "ipv6",
    Isakmp => "isakmp",
    Keepalive => "keepalive",
    License => "license",
    Lifetime => "lifetime",
    LocalAuthentication => "local-authentication",
    Log => "log",
    LogAdjacencyChanges => "log-adjacency-changes",
    LogNeighborChanges => "log-neighbor-changes",
    Logging => "logging",
    Lt => "lt",
    ManagementOnly => "management-only",
    Manager => "manager",
    Map => "map",
    Mask => "mask",
    Match => "match",
    MessageDigest => "message-digest",
    Mode => "mode",
    MonitorInterface => "monitor-interface",
    Mtu => "mtu",
    Name => "name",
    Nameif => "nameif",
    Names => "names",
    Nat => "nat",
    Neighbor => "neighbor",
    Neq => "neq",
    Network => "network",
    NetworkObject => "network-object",
    Ngfw => "ngfw",
    No => "no",
    Nssa => "nssa",
    Ntp => "ntp",
    Object => "object",
    ObjectGroup => "object-group",
    Ospf => "ospf",
    Out => "out",
    Pager => "pager",
    Parameters => "parameters",
    PassiveInterface => "passive-interface",
    Passwd => "passwd",
    Peer => "peer",
    Pfs => "pfs",
    Policy => "policy",
    PolicyList => "policy-list",
    PolicyMap => "policy-map",
    PortObject => "port-object",
    PreSharedKey => "pre-shared-key",
    PrefixList => "prefix-list",
    Prf => "prf",
    Prompt => "prompt",
    Protocol => "protocol",
    Quit => "quit",
    Range => "range",
    Redistribute => "redistribute",
    Remark => "remark",
    RemoteAccess => "remote-access",
    RemoteAs => "remote-as",
    RemoteAuthentication => "remote-authentication",
    Route => "route",
    RouteMap => "route-map",
    Router => "router",
    RouterId => "router-id",
    RuleId => "rule-id",
    SameSecurityTraffic => "same-security-traffic",
    Seconds => "seconds",
    SecurityLevel => "security-level",
    Service => "service",
    ServiceObject => "service-object",
    ServicePolicy => "service-policy",
    Set => "set",
    Shutdown => "shutdown",
    SnmpServer => "snmp-server",
    Snort => "snort",
    Source => "source",
    Speed => "speed",
    Ssh => "ssh",
    Ssl => "ssl",
    Standby => "standby",
    Static => "static",
    Stub => "stub",
    Subnet => "subnet",
    Sysopt => "sysopt",
    Tcp => "tcp",
    TcpUdp => "tcp-udp",
    Telnet => "telnet",
    Terminal => "terminal",
    ThreatDetection => "threat-detection",
    TimeRange => "time-range",
    Timeout => "timeout",
    Timers => "timers",
    TransformSet => "transform-set",
    Trust => "trust",
    TunnelGroup => "tunnel-group",
    Tunneled => "tunneled",
    Type => "type",
    Udp => "udp",
    Unicast => "unicast",
    UserIdentity => "user-identity",
    Username => "username",
    Version => "version",
    Vlan => "vlan",
    Vpdn => "vpdn",
    Vrf => "vrf",
    Webvpn => "webvpn",
    Xlate => "xlate",
}

/// Look up `word` in the keyword table, ignoring ASCII case.
pub fn lookup(word: &str) -> Option<Keyword> {
    KEYWORD_TABLE
        .binary_search_by(|(text, _)| compare_ignore_case(text, word))
        .ok()
        .map(|idx| KEYWORD_TABLE[idx].1)
}

fn compare_ignore_case(table_text: &str, word: &str) -> Ordering {
    table_text
        .bytes()
        .cmp(word.bytes().map(|b| b.to_ascii_lowercase()))
}

impl Keyword {
    /// Whether the word following this keyword is always a free-form name.
    pub(crate) fn introduces_name(self) -> bool {
        matches!(
            self,
            Keyword::AccessList
                | Keyword::GroupObject
                | Keyword::Hostname
                | Keyword::Ifc
                | Keyword::Interface
                | Keyword::IpsecProposal
                | Keyword::Nameif
                | Keyword::PassiveInterface
                | Keyword::RouteMap
                | Keyword::ServicePolicy
                | Keyword::TimeRange
                | Keyword::TransformSet
                | Keyword::TunnelGroup
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_strictly_sorted() {
        for pair in KEYWORD_TABLE.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} !< {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn table_text_matches_canonical_spelling() {
        for (text, keyword) in KEYWORD_TABLE {
            assert_eq!(keyword.as_str(), *text);
            assert_eq!(text.to_ascii_lowercase(), *text);
        }
    }

    #[test]
    fn lookup_is_case_insensitive_and_exact() {
        assert_eq!(lookup("access-list"), Some(Keyword::AccessList));
        assert_eq!(lookup("NGFW"), Some(Keyword::Ngfw));
        assert_eq!(lookup("Version"), Some(Keyword::Version));
        assert_eq!(lookup("any4"), Some(Keyword::Any4));
        assert_eq!(lookup("Loopback0"), None);
        assert_eq!(lookup("access"), None);
        assert_eq!(lookup(""), None);
    }
}
