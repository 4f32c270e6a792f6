//! Value checks applied by the dispatcher after a token is recognized.
//!
//! Each check returns the parsed value or a message suitable for a
//! line-scoped warning.

use std::net::Ipv4Addr;

use netcomp_ir::mask_to_prefix_length;

/// Parse a decimal and require `min..=max`.
pub fn bounded(field: &str, text: &str, min: u64, max: u64) -> Result<u64, String> {
    let value = text
        .parse::<u64>()
        .map_err(|_| format!("invalid {field} value: {text}"))?;
    if value < min || value > max {
        return Err(format!("{field} {value} out of valid range [{min}-{max}]"));
    }
    Ok(value)
}

fn narrow<T: TryFrom<u64>>(field: &str, value: u64) -> Result<T, String> {
    T::try_from(value).map_err(|_| format!("{field} {value} does not fit"))
}

pub fn security_level(text: &str) -> Result<u8, String> {
    narrow("security-level", bounded("security-level", text, 0, 100)?)
}

pub fn vlan(text: &str) -> Result<u16, String> {
    narrow("vlan", bounded("vlan", text, 0, 4095)?)
}

pub fn mtu(text: &str) -> Result<u32, String> {
    narrow("mtu", bounded("mtu", text, 68, 9000)?)
}

pub fn route_metric(text: &str) -> Result<u8, String> {
    narrow("route metric", bounded("route metric", text, 1, 255)?)
}

pub fn bgp_asn(text: &str) -> Result<u32, String> {
    narrow("bgp as-number", bounded("bgp as-number", text, 1, u64::from(u32::MAX))?)
}

pub fn crypto_map_sequence(text: &str) -> Result<u32, String> {
    narrow("crypto map sequence", bounded("crypto map sequence", text, 1, 65535)?)
}

pub fn ikev2_priority(text: &str) -> Result<u32, String> {
    narrow("ikev2 policy priority", bounded("ikev2 policy priority", text, 1, 65535)?)
}

pub fn ike_lifetime(text: &str) -> Result<u32, String> {
    narrow("lifetime", bounded("lifetime", text, 1, 86400)?)
}

pub fn arp_timeout(text: &str) -> Result<u32, String> {
    narrow("arp timeout", bounded("arp timeout", text, 60, 4_294_967)?)
}

pub fn bgp_timer(text: &str) -> Result<u32, String> {
    narrow("bgp timer", bounded("bgp timer", text, 0, 65535)?)
}

pub fn rule_id(text: &str) -> Result<u64, String> {
    bounded("rule-id", text, 0, u64::from(u32::MAX))
}

/// Diffie-Hellman group number, with or without a `group` prefix.
pub fn dh_group(text: &str) -> Result<u32, String> {
    let digits = text.strip_prefix("group").unwrap_or(text);
    let value = digits
        .parse::<u32>()
        .map_err(|_| format!("invalid dh group: {text}"))?;
    match value {
        1 | 2 | 5 | 14 | 15 | 16 | 19 | 20 | 21 | 24 => Ok(value),
        _ => Err(format!("unsupported dh group: {value}")),
    }
}

pub fn prefix_length(text: &str) -> Result<u8, String> {
    narrow("prefix length", bounded("prefix length", text, 0, 32)?)
}

/// Require a contiguous netmask.
pub fn netmask(mask: Ipv4Addr) -> Result<u8, String> {
    mask_to_prefix_length(mask).ok_or_else(|| format!("non-contiguous netmask {mask}"))
}

/// OSPF area in decimal or dotted form.
pub fn ospf_area(text: &str) -> Result<u32, String> {
    if let Ok(dotted) = text.parse::<Ipv4Addr>() {
        return Ok(u32::from(dotted));
    }
    text.parse::<u32>()
        .map_err(|_| format!("invalid ospf area: {text}"))
}

/// Numeric port or one of the well-known port names.
pub fn port(text: &str) -> Result<u16, String> {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        return narrow("port", bounded("port", text, 0, 65535)?);
    }
    named_port(text).ok_or_else(|| format!("unknown port name: {text}"))
}

/// Port number for a well-known service name.
pub fn named_port(name: &str) -> Option<u16> {
    let port = match name.to_ascii_lowercase().as_str() {
        "echo" => 7,
        "discard" => 9,
        "daytime" => 13,
        "chargen" => 19,
        "ftp-data" => 20,
        "ftp" => 21,
        "ssh" => 22,
        "telnet" => 23,
        "smtp" => 25,
        "time" => 37,
        "nameserver" => 42,
        "whois" => 43,
        "tacacs" => 49,
        "domain" | "dns" => 53,
        "bootps" => 67,
        "bootpc" => 68,
        "tftp" => 69,
        "gopher" => 70,
        "finger" => 79,
        "http" | "www" => 80,
        "kerberos" => 88,
        "hostname" => 101,
        "pop2" => 109,
        "pop3" => 110,
        "sunrpc" => 111,
        "ident" => 113,
        "nntp" => 119,
        "ntp" => 123,
        "netbios-ns" => 137,
        "netbios-dgm" => 138,
        "netbios-ssn" => 139,
        "imap4" => 143,
        "snmp" => 161,
        "snmptrap" => 162,
        "xdmcp" => 177,
        "bgp" => 179,
        "irc" => 194,
        "dnsix" => 195,
        "ldap" => 389,
        "mobile-ip" => 434,
        "https" => 443,
        "pim-auto-rp" => 496,
        "isakmp" => 500,
        "biff" | "exec" => 512,
        "login" | "who" => 513,
        "cmd" | "rsh" | "syslog" => 514,
        "lpd" => 515,
        "talk" => 517,
        "rip" => 520,
        "uucp" => 540,
        "klogin" => 543,
        "kshell" => 544,
        "rtsp" => 554,
        "ldaps" => 636,
        "lotusnotes" => 1352,
        "citrix-ica" => 1494,
        "sqlnet" => 1521,
        "radius" => 1645,
        "radius-acct" => 1646,
        "h323" => 1720,
        "pptp" => 1723,
        "nfs" => 2049,
        "ctiqbe" => 2748,
        "cifs" => 3020,
        "sip" => 5060,
        "aol" => 5190,
        "secureid-udp" => 5510,
        "pcanywhere-data" => 5631,
        _ => return None,
    };
    Some(port)
}
