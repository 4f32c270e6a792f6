//! Static routes, OSPF and BGP.

use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use netcomp_ir::{
    BgpActivePeerConfig, BgpProcess, ConversionError, DEFAULT_VRF_NAME, OspfArea, OspfProcess,
    Prefix, StaticRoute,
};

use super::{Lowering, prefix};
use crate::model::{FtdBgpNeighbor, FtdOspfProcess};

const EBGP_ADMIN_COST: u8 = 20;
const IBGP_ADMIN_COST: u8 = 200;

impl Lowering<'_, '_> {
    pub(super) fn static_routes(&mut self) -> Result<(), ConversionError> {
        let config = self.config;
        for route in &config.static_routes {
            let network = prefix(route.network, route.mask, || {
                format!("route {} {} {}", route.interface, route.network, route.mask)
            })?;
            let device = self.require_device(&route.interface, "route");
            let vrf = device.map_or(DEFAULT_VRF_NAME, |device| self.vrf_of(device));
            self.out.vrf_mut(vrf).static_routes.push(StaticRoute {
                network,
                next_hop_ip: route.gateway,
                next_hop_interface: Some(device.unwrap_or(&route.interface).to_string()),
                admin_cost: route.metric,
                tunneled: route.tunneled,
            });
        }
        Ok(())
    }

    pub(super) fn ospf_processes(&mut self) {
        let config = self.config;
        for process in config.ospf_processes.values() {
            let lowered = self.ospf_process(process);
            let owners: BTreeSet<String> = lowered
                .areas
                .values()
                .flat_map(|area| area.interfaces.iter().cloned())
                .collect();
            let vrf = self.owning_vrf(&owners, &format!("router ospf {}", process.process_id));
            self.out
                .vrf_mut(&vrf)
                .ospf_processes
                .insert(lowered.process_id.clone(), lowered);
        }
    }

    fn ospf_process(&mut self, process: &FtdOspfProcess) -> OspfProcess {
        let context = format!("router ospf {}", process.process_id);
        let mut areas = process
            .areas
            .values()
            .map(|area| {
                (
                    area.id,
                    OspfArea {
                        area_id: area.id,
                        stub: area.stub,
                        nssa: area.nssa,
                        authentication: area.authentication,
                        ..OspfArea::default()
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        let mut covered = BTreeSet::new();
        for network in &process.networks {
            let Some(network_prefix) = Prefix::from_mask(network.ip, network.mask) else {
                self.warnings.red_flag(
                    "invalid-netmask",
                    format!("{context}: network {} {} ignored", network.ip, network.mask),
                    None,
                );
                continue;
            };
            let area = areas.entry(network.area).or_insert_with(|| OspfArea {
                area_id: network.area,
                ..OspfArea::default()
            });
            area.networks.push(network_prefix);
            for iface in self.out.interfaces.values() {
                if let Some(address) = &iface.address
                    && network_prefix.contains(address.ip)
                {
                    area.interfaces.insert(iface.name.clone());
                    covered.insert(iface.name.clone());
                }
            }
        }

        let mut passive_interfaces: BTreeSet<String> = process
            .passive_interfaces
            .iter()
            .filter_map(|nameif| self.require_device(nameif, &context))
            .map(str::to_string)
            .collect();
        if process.passive_by_default {
            let active: BTreeSet<&str> = process
                .non_passive_interfaces
                .iter()
                .filter_map(|nameif| self.device(nameif))
                .collect();
            passive_interfaces.extend(
                covered
                    .iter()
                    .filter(|device| !active.contains(device.as_str()))
                    .cloned(),
            );
        }

        OspfProcess {
            process_id: process.process_id.clone(),
            router_id: self.router_id(process.router_id, &context),
            areas,
            passive_interfaces,
            passive_by_default: process.passive_by_default,
        }
    }

    pub(super) fn bgp_process(&mut self) {
        let config = self.config;
        let Some(process) = &config.bgp_process else {
            return;
        };
        let context = format!("router bgp {}", process.asn);
        let owners: BTreeSet<String> = self
            .out
            .interfaces
            .values()
            .filter(|iface| {
                iface.address.is_some_and(|address| {
                    let connected = address.connected_prefix();
                    process.neighbors.keys().any(|peer| connected.contains(*peer))
                })
            })
            .map(|iface| iface.name.clone())
            .collect();
        let vrf = self.owning_vrf(&owners, &context);

        let active_neighbors = process
            .neighbors
            .values()
            .filter_map(|neighbor| Some((neighbor.ip, active_peer(process.asn, neighbor)?)))
            .collect();
        let lowered = BgpProcess {
            local_as: process.asn,
            router_id: self.router_id(process.router_id, &context),
            ebgp_admin_cost: EBGP_ADMIN_COST,
            ibgp_admin_cost: IBGP_ADMIN_COST,
            active_neighbors,
        };
        self.out.vrf_mut(&vrf).bgp_process = Some(lowered);
    }

    /// Explicit router-id, else the highest interface address.
    fn router_id(&mut self, explicit: Option<Ipv4Addr>, context: &str) -> Ipv4Addr {
        if let Some(id) = explicit {
            return id;
        }
        let highest = self
            .out
            .interfaces
            .values()
            .filter_map(|iface| iface.address.map(|address| address.ip))
            .max();
        highest.unwrap_or_else(|| {
            self.warnings.red_flag(
                "missing-router-id",
                format!("{context}: no router-id and no interface address; using 0.0.0.0"),
                None,
            );
            Ipv4Addr::UNSPECIFIED
        })
    }

    /// VRF shared by `owners`, or the default VRF.
    fn owning_vrf(&mut self, owners: &BTreeSet<String>, context: &str) -> String {
        let vrfs: BTreeSet<&str> = owners
            .iter()
            .filter_map(|device| self.out.interfaces.get(device))
            .map(|iface| iface.vrf.as_str())
            .collect();
        match vrfs.len() {
            0 => DEFAULT_VRF_NAME.to_string(),
            1 => vrfs.into_iter().next().unwrap_or(DEFAULT_VRF_NAME).to_string(),
            _ => {
                let names = vrfs.into_iter().collect::<Vec<_>>().join(", ");
                self.warnings.red_flag(
                    "ambiguous-vrf",
                    format!("{context}: interfaces span VRFs {names}; using {DEFAULT_VRF_NAME}"),
                    None,
                );
                DEFAULT_VRF_NAME.to_string()
            }
        }
    }
}

/// Active peers need `remote-as`, an explicit `activate`, and no `shutdown`.
fn active_peer(local_as: u32, neighbor: &FtdBgpNeighbor) -> Option<BgpActivePeerConfig> {
    let remote_as = neighbor.remote_as?;
    if !neighbor.ipv4_unicast_active || neighbor.shutdown {
        return None;
    }
    Some(BgpActivePeerConfig {
        peer_address: neighbor.ip,
        local_as,
        remote_as,
        description: neighbor.description.clone(),
        import_policy: neighbor.route_map_in.clone(),
        export_policy: neighbor.route_map_out.clone(),
        keepalive: neighbor.keepalive,
        hold_time: neighbor.hold_time,
    })
}

#[cfg(test)]
mod tests {
    use netcomp_ir::{Configuration, Warnings};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{
        FtdBgpProcess, FtdConfiguration, FtdInterface, FtdInterfaceAddress, FtdOspfNetwork,
        FtdStaticRoute,
    };

    fn ip(text: &str) -> Ipv4Addr {
        text.parse().expect("ip")
    }

    fn iface(name: &str, nameif: &str, address: &str, vrf: Option<&str>) -> FtdInterface {
        let mut iface = FtdInterface::new(name);
        iface.nameif = Some(nameif.into());
        iface.address = Some(FtdInterfaceAddress {
            ip: ip(address),
            mask: ip("255.255.255.0"),
        });
        iface.vrf = vrf.map(str::to_string);
        iface
    }

    fn lower(config: &FtdConfiguration) -> (Configuration, Warnings) {
        let mut warnings = Warnings::new();
        let lowered = super::super::lower(config, &mut warnings).expect("lower");
        (lowered, warnings)
    }

    #[test]
    fn static_routes_follow_the_egress_interface_vrf() {
        let mut config = FtdConfiguration::default();
        config
            .interfaces
            .insert("Gi0/0".into(), iface("Gi0/0", "outside", "203.0.113.2", Some("RED")));
        config.static_routes.push(FtdStaticRoute {
            interface: "outside".into(),
            network: ip("0.0.0.0"),
            mask: ip("0.0.0.0"),
            gateway: ip("203.0.113.1"),
            metric: 1,
            tunneled: false,
        });
        let (lowered, _) = lower(&config);
        let routes = &lowered.vrfs["RED"].static_routes;
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].network, Prefix::new(ip("0.0.0.0"), 0));
        assert_eq!(routes[0].next_hop_interface.as_deref(), Some("Gi0/0"));
        assert!(lowered.vrfs["default"].static_routes.is_empty());
    }

    #[test]
    fn bad_route_mask_is_a_conversion_error() {
        let mut config = FtdConfiguration::default();
        config.static_routes.push(FtdStaticRoute {
            interface: "outside".into(),
            network: ip("10.0.0.0"),
            mask: ip("255.0.255.0"),
            gateway: ip("10.0.0.1"),
            metric: 1,
            tunneled: false,
        });
        let err = super::super::lower(&config, &mut Warnings::new()).expect_err("bad mask");
        assert!(matches!(err, ConversionError::InvalidNetmask { .. }));
    }

    #[test]
    fn ospf_areas_collect_covered_interfaces_and_passive_defaults() {
        let mut config = FtdConfiguration::default();
        config
            .interfaces
            .insert("Gi0/0".into(), iface("Gi0/0", "inside", "10.1.0.1", Some("BLUE")));
        config
            .interfaces
            .insert("Gi0/1".into(), iface("Gi0/1", "dmz", "10.2.0.1", Some("BLUE")));
        let mut process = FtdOspfProcess::new("1");
        process.networks.push(FtdOspfNetwork {
            ip: ip("10.0.0.0"),
            mask: ip("255.0.0.0"),
            area: 0,
        });
        process.area_mut(0).authentication = true;
        process.passive_by_default = true;
        process.non_passive_interfaces.insert("inside".into());
        config.ospf_processes.insert("1".into(), process);

        let (lowered, warnings) = lower(&config);
        assert!(warnings.is_empty(), "{warnings:?}");
        let ospf = &lowered.vrfs["BLUE"].ospf_processes["1"];
        assert_eq!(ospf.router_id, ip("10.2.0.1"));
        let area = &ospf.areas[&0];
        assert!(area.authentication);
        assert_eq!(area.interfaces, BTreeSet::from(["Gi0/0".to_string(), "Gi0/1".to_string()]));
        assert_eq!(ospf.passive_interfaces, BTreeSet::from(["Gi0/1".to_string()]));
    }

    #[test]
    fn bgp_needs_activate_and_lands_in_the_neighbor_vrf() {
        let mut config = FtdConfiguration::default();
        config
            .interfaces
            .insert("Gi0/0".into(), iface("Gi0/0", "outside", "198.51.100.1", Some("EDGE")));
        let mut process = FtdBgpProcess::new(65000);
        process.router_id = Some(ip("1.1.1.1"));
        let active = process.neighbor_mut(ip("198.51.100.2"));
        active.remote_as = Some(65001);
        active.ipv4_unicast_active = true;
        process.neighbor_mut(ip("198.51.100.3")).remote_as = Some(65002);
        config.bgp_process = Some(process);

        let (lowered, _) = lower(&config);
        let bgp = lowered.vrfs["EDGE"].bgp_process.as_ref().expect("bgp");
        assert_eq!(bgp.router_id, ip("1.1.1.1"));
        assert_eq!(bgp.active_neighbors.len(), 1);
        assert_eq!(bgp.active_neighbors[&ip("198.51.100.2")].remote_as, 65001);
        assert!(lowered.vrfs["default"].bgp_process.is_none());
    }

    #[test]
    fn processes_spanning_vrfs_fall_back_to_default() {
        let mut config = FtdConfiguration::default();
        config
            .interfaces
            .insert("Gi0/0".into(), iface("Gi0/0", "a", "10.1.0.1", Some("A")));
        config
            .interfaces
            .insert("Gi0/1".into(), iface("Gi0/1", "b", "10.2.0.1", Some("B")));
        let mut process = FtdOspfProcess::new("7");
        process.networks.push(FtdOspfNetwork {
            ip: ip("10.0.0.0"),
            mask: ip("255.0.0.0"),
            area: 0,
        });
        config.ospf_processes.insert("7".into(), process);

        let (lowered, warnings) = lower(&config);
        assert!(lowered.vrfs["default"].ospf_processes.contains_key("7"));
        assert!(warnings.has_code("ambiguous-vrf"));
    }
}
