use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ip::{IpProtocol, IpSpace, SubRange};

/// Verdict of a matching ACL line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineAction {
    Permit,
    Deny,
}

/// Packet header constraints. Empty collections and `None` mean "unconstrained".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeaderSpace {
    pub ip_protocols: BTreeSet<IpProtocol>,
    pub src_ips: Option<IpSpace>,
    pub dst_ips: Option<IpSpace>,
    pub src_ports: Vec<SubRange>,
    pub dst_ports: Vec<SubRange>,
}

impl HeaderSpace {
    pub fn is_unconstrained(&self) -> bool {
        self.ip_protocols.is_empty()
            && self.src_ips.is_none()
            && self.dst_ips.is_none()
            && self.src_ports.is_empty()
            && self.dst_ports.is_empty()
    }
}

/// Boolean match condition over a packet and its ingress context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AclMatchExpr {
    True,
    HeaderSpace(HeaderSpace),
    MatchSrcInterface(BTreeSet<String>),
    PermittedByAcl(String),
    And(Vec<AclMatchExpr>),
}

impl AclMatchExpr {
    /// Conjunction that drops `True` operands and flattens single-operand results.
    pub fn and(mut exprs: Vec<AclMatchExpr>) -> AclMatchExpr {
        exprs.retain(|expr| *expr != AclMatchExpr::True);
        match exprs.len() {
            0 => AclMatchExpr::True,
            1 => exprs.remove(0),
            _ => AclMatchExpr::And(exprs),
        }
    }

    pub fn src_interface(name: impl Into<String>) -> AclMatchExpr {
        AclMatchExpr::MatchSrcInterface(BTreeSet::from([name.into()]))
    }
}

/// One ordered line of a lowered access list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclLine {
    pub name: String,
    pub action: LineAction,
    pub match_condition: AclMatchExpr,
}

/// Named, ordered access list. First matching line wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAccessList {
    pub name: String,
    pub lines: Vec<AclLine>,
}

impl IpAccessList {
    pub fn new(name: impl Into<String>, lines: Vec<AclLine>) -> Self {
        Self {
            name: name.into(),
            lines,
        }
    }

    pub fn line_named(&self, name: &str) -> Option<&AclLine> {
        self.lines.iter().find(|line| line.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_simplifies_trivial_conjunctions() {
        assert_eq!(AclMatchExpr::and(vec![]), AclMatchExpr::True);
        let iface = AclMatchExpr::src_interface("outside");
        assert_eq!(
            AclMatchExpr::and(vec![AclMatchExpr::True, iface.clone()]),
            iface
        );
        let both = AclMatchExpr::and(vec![iface.clone(), AclMatchExpr::PermittedByAcl("A".into())]);
        assert!(matches!(both, AclMatchExpr::And(ref v) if v.len() == 2));
    }
}
