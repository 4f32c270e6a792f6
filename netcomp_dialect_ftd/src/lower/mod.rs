//! Lowering from [`FtdConfiguration`] into the vendor-independent model.
//!
//! Lowering reads the vendor model only. Unresolvable references become
//! empty spaces or skipped entities plus a warning; only structurally
//! invalid input (a non-contiguous netmask, two interfaces claiming one
//! zone) fails the whole conversion.
//!
//! Passes run in a fixed order:
//! - VRFs, interfaces and zones
//! - access lists, MPF synthetic lists, access-groups, security-level defaults
//! - NAT transformation chains
//! - static routes, OSPF and BGP
//! - IKE/IPsec objects and vendor-family metadata

mod acl;
mod mpf;
mod nat;
mod routing;
mod vpn;

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use netcomp_ir::{
    AclLine, AclMatchExpr, Configuration, ConfigurationFormat, ConversionError, DEFAULT_VRF_NAME,
    HeaderSpace, Interface, InterfaceAddress, IpAccessList, LineAction, Prefix,
    VendorConfiguration, Warnings, Zone, mask_to_prefix_length,
};
use tracing::{debug, instrument};

use crate::model::{AccessGroupScope, FtdConfiguration};

/// Lower a vendor model into a [`Configuration`].
#[instrument(skip_all, fields(hostname = config.effective_hostname()))]
pub fn lower(
    config: &FtdConfiguration,
    warnings: &mut Warnings,
) -> Result<Configuration, ConversionError> {
    Lowering::new(config, warnings).run()
}

impl VendorConfiguration for FtdConfiguration {
    fn hostname(&self) -> &str {
        self.effective_hostname()
    }

    fn format(&self) -> ConfigurationFormat {
        ConfigurationFormat::CiscoFtd
    }

    fn to_vendor_independent(
        &self,
        warnings: &mut Warnings,
    ) -> Result<Configuration, ConversionError> {
        lower(self, warnings)
    }
}

/// Name of the filter synthesized for an interface with a security level and no inbound ACL.
pub fn security_level_acl_name(interface: &str) -> String {
    format!("~SECURITY_LEVEL_DEFAULT~{interface}~")
}

struct Lowering<'c, 'w> {
    config: &'c FtdConfiguration,
    warnings: &'w mut Warnings,
    /// nameif to device name.
    nameifs: BTreeMap<&'c str, &'c str>,
    out: Configuration,
}

impl<'c, 'w> Lowering<'c, 'w> {
    fn new(config: &'c FtdConfiguration, warnings: &'w mut Warnings) -> Self {
        let nameifs = config
            .interfaces
            .values()
            .filter_map(|iface| Some((iface.nameif.as_deref()?, iface.name.as_str())))
            .collect();
        Self {
            config,
            warnings,
            nameifs,
            out: Configuration::new(config.effective_hostname(), ConfigurationFormat::CiscoFtd),
        }
    }

    fn run(mut self) -> Result<Configuration, ConversionError> {
        for vrf in &self.config.vrfs {
            self.out.vrf_mut(vrf);
        }
        self.interfaces()?;
        self.zones()?;
        self.access_lists();
        self.mpf_access_lists();
        self.access_groups();
        self.security_level_defaults();
        self.nat_rules();
        self.static_routes()?;
        self.ospf_processes();
        self.bgp_process();
        self.vpn();
        self.vendor_family();

        debug!(
            interfaces = self.out.interfaces.len(),
            zones = self.out.zones.len(),
            acls = self.out.ip_access_lists.len(),
            vrfs = self.out.vrfs.len(),
            "lowered configuration"
        );
        Ok(self.out)
    }

    /// Device name for an interface reference, which may be a nameif or a device name.
    fn device(&self, name: &str) -> Option<&'c str> {
        self.nameifs.get(name).copied().or_else(|| {
            self.config
                .interfaces
                .get_key_value(name)
                .map(|(key, _)| key.as_str())
        })
    }

    /// Like [`Self::device`], reporting an unknown interface.
    fn require_device(&mut self, name: &str, context: &str) -> Option<&'c str> {
        let device = self.device(name);
        if device.is_none() {
            self.warnings.red_flag(
                "undefined-interface",
                format!("{context} refers to unknown interface {name}"),
                None,
            );
        }
        device
    }

    /// Address of the interface with the given device name.
    fn interface_ip(&self, device: &str) -> Option<Ipv4Addr> {
        self.config
            .interfaces
            .get(device)
            .and_then(|iface| iface.address)
            .map(|address| address.ip)
    }

    fn vrf_of(&self, device: &str) -> &'c str {
        self.config
            .interfaces
            .get(device)
            .and_then(|iface| iface.vrf.as_deref())
            .unwrap_or(DEFAULT_VRF_NAME)
    }

    fn interfaces(&mut self) -> Result<(), ConversionError> {
        let config = self.config;
        for iface in config.interfaces.values() {
            let mut lowered = Interface::new(&iface.name);
            lowered.description = iface.description.clone();
            lowered.active = iface.active;
            lowered.mtu = iface.mtu;
            lowered.vlan = iface.vlan;
            lowered.zone = iface.nameif.clone();
            lowered.security_level = iface.security_level;
            lowered.crypto_map = iface.crypto_map.clone();
            if let Some(address) = iface.address {
                let prefix_length = mask_to_prefix_length(address.mask).ok_or_else(|| {
                    ConversionError::InvalidNetmask {
                        context: format!("interface {}", iface.name),
                        mask: address.mask,
                    }
                })?;
                lowered.address = Some(InterfaceAddress {
                    ip: address.ip,
                    prefix_length,
                });
            }
            if let Some(vrf) = &iface.vrf {
                lowered.vrf = vrf.clone();
            }
            self.out.vrf_mut(&lowered.vrf.clone());
            self.out.interfaces.insert(iface.name.clone(), lowered);
        }
        Ok(())
    }

    fn zones(&mut self) -> Result<(), ConversionError> {
        let config = self.config;
        for iface in config.interfaces.values() {
            let Some(nameif) = &iface.nameif else {
                continue;
            };
            if let Some(existing) = self.out.zones.get(nameif) {
                let first = existing.interfaces.iter().next().cloned().unwrap_or_default();
                return Err(ConversionError::DuplicateZone {
                    zone: nameif.clone(),
                    first,
                    second: iface.name.clone(),
                });
            }
            self.out.zones.insert(
                nameif.clone(),
                Zone {
                    name: nameif.clone(),
                    interfaces: [iface.name.clone()].into(),
                },
            );
        }
        Ok(())
    }

    fn access_groups(&mut self) {
        let config = self.config;
        let mut global = None;
        for group in &config.access_groups {
            if !config.access_lists.contains_key(&group.access_list) {
                self.warnings.red_flag(
                    "undefined-reference",
                    format!("access-group refers to unknown access-list {}", group.access_list),
                    None,
                );
                continue;
            }
            let (nameif, inbound) = match &group.scope {
                AccessGroupScope::In(nameif) => (nameif, true),
                AccessGroupScope::Out(nameif) => (nameif, false),
                AccessGroupScope::Global => {
                    global = Some(group.access_list.clone());
                    continue;
                }
            };
            let Some(device) = self.require_device(nameif, "access-group") else {
                continue;
            };
            if let Some(iface) = self.out.interfaces.get_mut(device) {
                let slot = if inbound {
                    &mut iface.incoming_filter
                } else {
                    &mut iface.outgoing_filter
                };
                *slot = Some(group.access_list.clone());
            }
        }
        if let Some(acl) = global {
            for iface in self.out.interfaces.values_mut() {
                if iface.zone.is_some() && iface.incoming_filter.is_none() {
                    iface.incoming_filter = Some(acl.clone());
                }
            }
        }
    }

    fn security_level_defaults(&mut self) {
        let config = self.config;
        for iface in config.interfaces.values() {
            let Some(level) = iface.security_level else {
                continue;
            };
            let Some(lowered) = self.out.interfaces.get_mut(&iface.name) else {
                continue;
            };
            if lowered.incoming_filter.is_some() {
                continue;
            }
            let name = security_level_acl_name(&iface.name);
            let action = if level > 0 {
                LineAction::Permit
            } else {
                LineAction::Deny
            };
            let line = AclLine {
                name: format!("security-level {level} default"),
                action,
                match_condition: AclMatchExpr::HeaderSpace(HeaderSpace::default()),
            };
            lowered.incoming_filter = Some(name.clone());
            self.out
                .ip_access_lists
                .insert(name.clone(), IpAccessList::new(name, vec![line]));
        }
    }
}

/// Prefix for `ip`/`mask`, or `InvalidNetmask` naming `context`.
fn prefix(ip: Ipv4Addr, mask: Ipv4Addr, context: impl FnOnce() -> String) -> Result<Prefix, ConversionError> {
    Prefix::from_mask(ip, mask).ok_or_else(|| ConversionError::InvalidNetmask {
        context: context(),
        mask,
    })
}
