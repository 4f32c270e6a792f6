use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named optional service, possibly with nested sub-services.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Service {
    pub subservices: BTreeMap<String, Service>,
}

impl Service {
    pub fn with_subservices<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subservices: names
                .into_iter()
                .map(|name| (name.into(), Service::default()))
                .collect(),
        }
    }
}

/// Cisco-family metadata: which optional services were configured.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CiscoFamily {
    pub services: BTreeMap<String, Service>,
}

/// Vendor-specific metadata bag carried alongside the lowered model.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VendorFamily {
    pub cisco: Option<CiscoFamily>,
}
