//! Modular policy framework lists and vendor-family metadata.

use std::collections::BTreeMap;

use netcomp_ir::{
    AclLine, AclMatchExpr, CiscoFamily, HeaderSpace, IpAccessList, LineAction, Service,
};

use super::Lowering;
use crate::model::ServicePolicyScope;

const DEFAULT_INSPECTION_TRAFFIC: &str = "default-inspection-traffic";

pub fn class_map_acl_name(class_map: &str) -> String {
    format!("~FTD_CLASS_MAP_ACL~{class_map}~")
}

pub fn policy_map_acl_name(policy_map: &str) -> String {
    format!("~FTD_POLICY_MAP_ACL~{policy_map}~")
}

fn permit(name: String, match_condition: AclMatchExpr) -> AclLine {
    AclLine {
        name,
        action: LineAction::Permit,
        match_condition,
    }
}

impl Lowering<'_, '_> {
    /// Class-maps match their access lists; policy-maps match their classes.
    pub(super) fn mpf_access_lists(&mut self) {
        let config = self.config;
        for class_map in config.class_maps.values() {
            let lines: Vec<AclLine> = if class_map.access_lists.is_empty() {
                class_map
                    .match_lines
                    .iter()
                    .filter(|line| line.as_str() == DEFAULT_INSPECTION_TRAFFIC)
                    .take(1)
                    .map(|_| {
                        permit(
                            format!("class-map {} match {DEFAULT_INSPECTION_TRAFFIC}", class_map.name),
                            AclMatchExpr::HeaderSpace(HeaderSpace::default()),
                        )
                    })
                    .collect()
            } else {
                class_map
                    .access_lists
                    .iter()
                    .filter(|acl| {
                        let known = config.access_lists.contains_key(*acl);
                        if !known {
                            self.warnings.red_flag(
                                "undefined-reference",
                                format!("class-map {} matches unknown access-list {acl}", class_map.name),
                                None,
                            );
                        }
                        known
                    })
                    .map(|acl| {
                        permit(
                            format!("class-map {} match access-list {acl}", class_map.name),
                            AclMatchExpr::PermittedByAcl(acl.clone()),
                        )
                    })
                    .collect()
            };
            self.insert_acl(class_map_acl_name(&class_map.name), lines);
        }

        for policy_map in config.policy_maps.values() {
            let lines = policy_map
                .classes
                .iter()
                .filter_map(|class| {
                    let acl = class_map_acl_name(&class.class_map);
                    self.out.ip_access_lists.contains_key(&acl).then(|| {
                        permit(
                            format!("policy-map {} class {}", policy_map.name, class.class_map),
                            AclMatchExpr::PermittedByAcl(acl),
                        )
                    })
                })
                .collect();
            self.insert_acl(policy_map_acl_name(&policy_map.name), lines);
        }
    }

    /// Lists without lines are not materialized.
    fn insert_acl(&mut self, name: String, lines: Vec<AclLine>) {
        if !lines.is_empty() {
            self.out
                .ip_access_lists
                .insert(name.clone(), IpAccessList::new(name, lines));
        }
    }

    pub(super) fn vendor_family(&mut self) {
        let config = self.config;
        let mut services = BTreeMap::new();

        if config.names_enabled && !config.names.is_empty() {
            let entries = config.names.iter().map(|(name, ip)| format!("{name}:{ip}"));
            services.insert("names".to_string(), Service::with_subservices(entries));
        }
        if let Some(timeout) = config.arp_timeout {
            services.insert(
                "arp".to_string(),
                Service::with_subservices([format!("timeout:{timeout}")]),
            );
        }

        let mut mpf = BTreeMap::new();
        if !config.class_maps.is_empty() {
            mpf.insert(
                "class-map".to_string(),
                Service::with_subservices(config.class_maps.keys().cloned()),
            );
        }
        if !config.policy_maps.is_empty() {
            mpf.insert(
                "policy-map".to_string(),
                Service::with_subservices(config.policy_maps.keys().cloned()),
            );
        }
        if !config.service_policies.is_empty() {
            let entries = config.service_policies.iter().map(|policy| match &policy.scope {
                ServicePolicyScope::Global => format!("{}:global", policy.policy_map),
                ServicePolicyScope::Interface(nameif) => {
                    format!("{}:interface:{nameif}", policy.policy_map)
                }
            });
            mpf.insert("service-policy".to_string(), Service::with_subservices(entries));
        }
        if !mpf.is_empty() {
            services.insert("mpf".to_string(), Service { subservices: mpf });
        }

        if !services.is_empty() {
            self.out.vendor_family.cisco = Some(CiscoFamily { services });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use netcomp_ir::Warnings;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{
        FtdAccessList, FtdClassMap, FtdConfiguration, FtdPolicyMap, FtdPolicyMapClass,
        FtdServicePolicy,
    };

    fn class_map(name: &str, match_lines: &[&str], access_lists: &[&str]) -> FtdClassMap {
        FtdClassMap {
            name: name.into(),
            class_type: None,
            match_lines: match_lines.iter().map(|s| s.to_string()).collect(),
            access_lists: access_lists.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn class_and_policy_maps_become_synthetic_lists() {
        let mut config = FtdConfiguration::default();
        config.access_lists.insert("VOICE".into(), FtdAccessList::new("VOICE"));
        config.class_maps.insert(
            "inspection_default".into(),
            class_map("inspection_default", &["default-inspection-traffic"], &[]),
        );
        config.class_maps.insert(
            "VOICE_CLASS".into(),
            class_map("VOICE_CLASS", &["access-list VOICE"], &["VOICE"]),
        );
        config.class_maps.insert("EMPTY".into(), class_map("EMPTY", &["any"], &[]));
        config.policy_maps.insert(
            "global_policy".into(),
            FtdPolicyMap {
                name: "global_policy".into(),
                policy_type: None,
                classes: vec![
                    FtdPolicyMapClass {
                        class_map: "inspection_default".into(),
                        actions: vec!["inspect ftp".into()],
                    },
                    FtdPolicyMapClass {
                        class_map: "EMPTY".into(),
                        actions: Vec::new(),
                    },
                ],
                parameters: Vec::new(),
            },
        );
        config.service_policies.push(FtdServicePolicy {
            policy_map: "global_policy".into(),
            scope: ServicePolicyScope::Global,
        });

        let lowered = super::super::lower(&config, &mut Warnings::new()).expect("lower");
        let inspection = &lowered.ip_access_lists["~FTD_CLASS_MAP_ACL~inspection_default~"];
        assert_eq!(
            inspection.lines[0].name,
            "class-map inspection_default match default-inspection-traffic"
        );
        let voice = &lowered.ip_access_lists["~FTD_CLASS_MAP_ACL~VOICE_CLASS~"];
        assert_eq!(
            voice.lines[0].match_condition,
            AclMatchExpr::PermittedByAcl("VOICE".into())
        );
        assert!(!lowered.ip_access_lists.contains_key("~FTD_CLASS_MAP_ACL~EMPTY~"));
        let policy = &lowered.ip_access_lists["~FTD_POLICY_MAP_ACL~global_policy~"];
        assert_eq!(policy.lines.len(), 1);
        assert_eq!(policy.lines[0].name, "policy-map global_policy class inspection_default");

        let cisco = lowered.vendor_family.cisco.expect("cisco family");
        let mpf = &cisco.services["mpf"].subservices;
        assert!(mpf["service-policy"].subservices.contains_key("global_policy:global"));
        assert_eq!(mpf["class-map"].subservices.len(), 3);
    }

    #[test]
    fn names_and_arp_are_recorded_when_configured() {
        let mut config = FtdConfiguration::default();
        config.names.insert("web".into(), Ipv4Addr::new(10, 0, 0, 80));
        config.arp_timeout = Some(3600);

        let lowered = super::super::lower(&config, &mut Warnings::new()).expect("lower");
        let services = &lowered.vendor_family.cisco.as_ref().expect("cisco").services;
        assert!(!services.contains_key("names"));
        assert!(services["arp"].subservices.contains_key("timeout:3600"));

        config.names_enabled = true;
        let lowered = super::super::lower(&config, &mut Warnings::new()).expect("lower");
        let services = &lowered.vendor_family.cisco.as_ref().expect("cisco").services;
        assert!(services["names"].subservices.contains_key("web:10.0.0.80"));
    }
}
