use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// IPv4 prefix with host bits cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Prefix {
    pub network: Ipv4Addr,
    pub length: u8,
}

impl Prefix {
    /// Build a prefix, masking `ip` down to its network address. Lengths over 32 clamp.
    pub fn new(ip: Ipv4Addr, length: u8) -> Self {
        let length = length.min(32);
        Self {
            network: Ipv4Addr::from(u32::from(ip) & length_to_bits(length)),
            length,
        }
    }

    /// Build a prefix from a dotted netmask; `None` when the mask is not contiguous.
    pub fn from_mask(ip: Ipv4Addr, mask: Ipv4Addr) -> Option<Self> {
        mask_to_prefix_length(mask).map(|length| Self::new(ip, length))
    }

    pub fn host(ip: Ipv4Addr) -> Self {
        Self::new(ip, 32)
    }

    pub fn first(&self) -> Ipv4Addr {
        self.network
    }

    pub fn last(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.network) | !length_to_bits(self.length))
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        u32::from(ip) & length_to_bits(self.length) == u32::from(self.network)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.length)
    }
}

fn length_to_bits(length: u8) -> u32 {
    if length == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(length.min(32)))
    }
}

/// Prefix length of a contiguous netmask such as `255.255.255.0`.
pub fn mask_to_prefix_length(mask: Ipv4Addr) -> Option<u8> {
    let bits = u32::from(mask);
    let ones = bits.leading_ones();
    if bits.checked_shl(ones).unwrap_or(0) == 0 {
        u8::try_from(ones).ok()
    } else {
        None
    }
}

/// Set of IPv4 addresses matched by a header-space field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IpSpace {
    Universe,
    Empty,
    Ip(Ipv4Addr),
    Prefix(Prefix),
    Range { start: Ipv4Addr, end: Ipv4Addr },
    Union(Vec<IpSpace>),
}

impl IpSpace {
    /// Union of `spaces`, collapsing the trivial zero- and one-member cases.
    pub fn union(mut spaces: Vec<IpSpace>) -> IpSpace {
        spaces.retain(|space| *space != IpSpace::Empty);
        if spaces.iter().any(|space| *space == IpSpace::Universe) {
            return IpSpace::Universe;
        }
        match spaces.len() {
            0 => IpSpace::Empty,
            1 => spaces.remove(0),
            _ => IpSpace::Union(spaces),
        }
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        match self {
            IpSpace::Universe => true,
            IpSpace::Empty => false,
            IpSpace::Ip(addr) => *addr == ip,
            IpSpace::Prefix(prefix) => prefix.contains(ip),
            IpSpace::Range { start, end } => *start <= ip && ip <= *end,
            IpSpace::Union(members) => members.iter().any(|m| m.contains(ip)),
        }
    }
}

/// Inclusive port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubRange {
    pub start: u16,
    pub end: u16,
}

impl SubRange {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn single(port: u16) -> Self {
        Self::new(port, port)
    }

    pub fn all_ports() -> Self {
        Self::new(0, u16::MAX)
    }

    pub fn contains(&self, port: u16) -> bool {
        self.start <= port && port <= self.end
    }
}

impl fmt::Display for SubRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// IP protocol matched by a header space. `ip` itself is the absence of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IpProtocol {
    Icmp,
    Tcp,
    Udp,
    Gre,
    Esp,
    Ah,
    Icmpv6,
    Ospf,
    Sctp,
    Number(u8),
}

impl IpProtocol {
    /// Resolve a protocol keyword or number. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<IpProtocol> {
        let lower = name.to_ascii_lowercase();
        let protocol = match lower.as_str() {
            "icmp" => IpProtocol::Icmp,
            "tcp" => IpProtocol::Tcp,
            "udp" => IpProtocol::Udp,
            "gre" => IpProtocol::Gre,
            "esp" => IpProtocol::Esp,
            "ah" => IpProtocol::Ah,
            "icmp6" | "icmpv6" => IpProtocol::Icmpv6,
            "ospf" => IpProtocol::Ospf,
            "sctp" => IpProtocol::Sctp,
            other => return other.parse::<u8>().ok().map(IpProtocol::from_number),
        };
        Some(protocol)
    }

    pub fn from_number(number: u8) -> IpProtocol {
        match number {
            1 => IpProtocol::Icmp,
            6 => IpProtocol::Tcp,
            17 => IpProtocol::Udp,
            47 => IpProtocol::Gre,
            50 => IpProtocol::Esp,
            51 => IpProtocol::Ah,
            58 => IpProtocol::Icmpv6,
            89 => IpProtocol::Ospf,
            132 => IpProtocol::Sctp,
            other => IpProtocol::Number(other),
        }
    }

    /// Whether the protocol carries port numbers.
    pub fn has_ports(&self) -> bool {
        matches!(self, IpProtocol::Tcp | IpProtocol::Udp | IpProtocol::Sctp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_conversion_rejects_non_contiguous_masks() {
        assert_eq!(mask_to_prefix_length(Ipv4Addr::new(255, 255, 255, 0)), Some(24));
        assert_eq!(mask_to_prefix_length(Ipv4Addr::new(255, 255, 255, 255)), Some(32));
        assert_eq!(mask_to_prefix_length(Ipv4Addr::new(0, 0, 0, 0)), Some(0));
        assert_eq!(mask_to_prefix_length(Ipv4Addr::new(255, 0, 255, 0)), None);
    }

    #[test]
    fn prefix_clears_host_bits_and_reports_bounds() {
        let prefix = Prefix::new(Ipv4Addr::new(10, 1, 2, 3), 24);
        assert_eq!(prefix.to_string(), "10.1.2.0/24");
        assert_eq!(prefix.last(), Ipv4Addr::new(10, 1, 2, 255));
        assert!(prefix.contains(Ipv4Addr::new(10, 1, 2, 200)));
        assert!(!prefix.contains(Ipv4Addr::new(10, 1, 3, 1)));
        assert_eq!(Prefix::new(Ipv4Addr::new(1, 2, 3, 4), 0).last(), Ipv4Addr::BROADCAST);
    }

    #[test]
    fn union_collapses_trivial_cases() {
        assert_eq!(IpSpace::union(vec![]), IpSpace::Empty);
        let ip = IpSpace::Ip(Ipv4Addr::new(1, 1, 1, 1));
        assert_eq!(IpSpace::union(vec![ip.clone(), IpSpace::Empty]), ip);
        assert_eq!(IpSpace::union(vec![ip, IpSpace::Universe]), IpSpace::Universe);
    }

    #[test]
    fn protocol_names_and_numbers_agree() {
        assert_eq!(IpProtocol::from_name("TCP"), Some(IpProtocol::Tcp));
        assert_eq!(IpProtocol::from_name("6"), Some(IpProtocol::Tcp));
        assert_eq!(IpProtocol::from_name("103"), Some(IpProtocol::Number(103)));
        assert_eq!(IpProtocol::from_name("bogus"), None);
    }
}
