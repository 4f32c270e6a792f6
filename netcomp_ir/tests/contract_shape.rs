use std::net::Ipv4Addr;

use netcomp_ir::{
    AclLine, AclMatchExpr, Configuration, ConfigurationFormat, HeaderSpace, Interface,
    IpAccessList, LineAction, Warnings,
};
use pretty_assertions::assert_eq;
use serde_json::Value;

#[test]
fn configuration_json_shape_contract() {
    let mut cfg = Configuration::new("fw-1", ConfigurationFormat::CiscoFtd);
    cfg.interfaces
        .insert("GigabitEthernet0/0".into(), Interface::new("GigabitEthernet0/0"));
    cfg.ip_access_lists.insert(
        "OUTSIDE_IN".into(),
        IpAccessList::new(
            "OUTSIDE_IN",
            vec![AclLine {
                name: "PERMIT ip any -> any".into(),
                action: LineAction::Permit,
                match_condition: AclMatchExpr::HeaderSpace(HeaderSpace::default()),
            }],
        ),
    );

    let value = serde_json::to_value(&cfg).expect("serialize configuration");
    let obj = value.as_object().expect("configuration should be object");
    for key in [
        "hostname",
        "format",
        "interfaces",
        "ip_access_lists",
        "zones",
        "vrfs",
        "ike_phase1_policies",
        "ipsec_peer_configs",
        "vendor_family",
    ] {
        assert!(obj.contains_key(key), "missing key {key}");
    }
    assert_eq!(obj["format"], "cisco-ftd");
    assert_eq!(obj["default_cross_zone_action"], "permit");
    assert!(obj["vrfs"].get("default").is_some());

    let line = &obj["ip_access_lists"]["OUTSIDE_IN"]["lines"][0];
    assert_eq!(line["action"], "permit");
    assert!(line["match_condition"].get("header-space").is_some());
}

#[test]
fn configuration_round_trips_through_json() {
    let mut cfg = Configuration::new("fw-2", ConfigurationFormat::CiscoFtd);
    let mut iface = Interface::new("Port-channel1.320");
    iface.address = Some(netcomp_ir::InterfaceAddress {
        ip: Ipv4Addr::new(10, 0, 0, 1),
        prefix_length: 24,
    });
    cfg.interfaces.insert(iface.name.clone(), iface);

    let text = serde_json::to_string(&cfg).expect("serialize");
    let back: Configuration = serde_json::from_str(&text).expect("deserialize");
    assert_eq!(back, cfg);
}

#[test]
fn warnings_serialize_with_kind_and_code() {
    let mut warnings = Warnings::new();
    warnings.unimplemented("bgp-route-map", "route-map not supported", None);
    let value: Value = serde_json::to_value(&warnings).expect("serialize warnings");
    let entry = &value["entries"][0];
    assert_eq!(entry["kind"], "unimplemented");
    assert_eq!(entry["code"], "bgp-route-map");
}
