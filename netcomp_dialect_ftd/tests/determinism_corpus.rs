use std::fs;
use std::path::{Path, PathBuf};

use netcomp_dialect_ftd::compile;

fn corpus() -> Vec<(PathBuf, String)> {
    let testdata = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata");
    let mut samples = Vec::new();
    for entry in fs::read_dir(&testdata).expect("read testdata") {
        let path = entry.expect("entry").path();
        if path.extension().is_some_and(|ext| ext == "cfg") {
            let text = fs::read_to_string(&path).expect("read sample");
            samples.push((path, text));
        }
    }
    samples.sort();
    samples
}

#[test]
fn compile_is_deterministic_for_corpus() {
    let samples = corpus();
    assert!(!samples.is_empty());

    for (path, text) in &samples {
        let one = compile(text).unwrap_or_else(|err| panic!("{}: {err}", path.display()));
        let two = compile(text).expect("second compile");

        let one_json = serde_json::to_string_pretty(&one).expect("serialize first");
        let two_json = serde_json::to_string_pretty(&two).expect("serialize second");
        assert_eq!(one_json, two_json, "flapping output for {}", path.display());
    }
}

#[test]
fn corpus_samples_populate_the_model() {
    for (path, text) in corpus() {
        let compiled = compile(&text).expect("compile");
        let cfg = &compiled.configuration;
        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        assert!(!cfg.zones.is_empty(), "{name}: no zones");
        assert!(!cfg.ip_access_lists.is_empty(), "{name}: no access lists");
        match name {
            "edge_ftd" => {
                assert_eq!(cfg.hostname, "edge-ftd");
                assert!(cfg.zones.contains_key("diagnostic"));
                assert!(cfg.vendor_family.cisco.is_some());
                let outside = &cfg.interfaces["GigabitEthernet0/0"];
                assert_eq!(outside.incoming_filter.as_deref(), Some("OUTSIDE_IN"));
            }
            "dc_routing" => {
                let default = &cfg.vrfs["default"];
                assert!(default.ospf_processes.contains_key("1"));
                assert_eq!(default.static_routes.len(), 2);
                let bgp = default.bgp_process.as_ref().expect("bgp");
                assert_eq!(bgp.active_neighbors.len(), 2);
            }
            "vpn_hub" => {
                assert!(!cfg.ipsec_peer_configs.is_empty());
                assert!(!cfg.ipsec_phase2_proposals.is_empty());
            }
            _ => {}
        }
    }
}
