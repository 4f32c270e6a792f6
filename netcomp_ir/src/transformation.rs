use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::acl::AclMatchExpr;
use crate::ip::Prefix;

/// Packet rewrite applied when a transformation's guard matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformationStep {
    AssignSourceIp { start: Ipv4Addr, end: Ipv4Addr },
    AssignDestinationIp { start: Ipv4Addr, end: Ipv4Addr },
    ShiftSourceIp(Prefix),
    ShiftDestinationIp(Prefix),
    AssignSourcePort { start: u16, end: u16 },
    AssignDestinationPort { start: u16, end: u16 },
}

/// Guarded rewrite with an optional fallback evaluated when the guard misses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    pub guard: AclMatchExpr,
    pub steps: Vec<TransformationStep>,
    pub or_else: Option<Box<Transformation>>,
}

impl Transformation {
    pub fn new(guard: AclMatchExpr, steps: Vec<TransformationStep>) -> Self {
        Self {
            guard,
            steps,
            or_else: None,
        }
    }

    /// Link `rules` into one chain, first element evaluated first.
    pub fn chain(rules: Vec<Transformation>) -> Option<Transformation> {
        rules.into_iter().rev().fold(None, |tail, mut rule| {
            rule.or_else = tail.map(Box::new);
            Some(rule)
        })
    }

    /// Iterate the chain from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &Transformation> {
        std::iter::successors(Some(self), |t| t.or_else.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assign(last: u8) -> Transformation {
        let ip = Ipv4Addr::new(192, 0, 2, last);
        Transformation::new(
            AclMatchExpr::True,
            vec![TransformationStep::AssignSourceIp { start: ip, end: ip }],
        )
    }

    #[test]
    fn chain_preserves_order() {
        let chain = Transformation::chain(vec![assign(1), assign(2), assign(3)]).expect("chain");
        let order = chain
            .iter()
            .map(|t| match &t.steps[0] {
                TransformationStep::AssignSourceIp { start, .. } => start.octets()[3],
                _ => 0,
            })
            .collect::<Vec<_>>();
        assert_eq!(order, vec![1, 2, 3]);
        assert!(Transformation::chain(Vec::new()).is_none());
    }
}
