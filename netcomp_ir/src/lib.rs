//! Vendor-independent configuration model for network config compilers.
//!
//! Dialect crates parse device text into their own vendor model and lower it
//! into the types defined here. This crate provides:
//! - the lowered model (`Configuration`, `Interface`, `IpAccessList`, `Vrf`, …)
//! - address and port spaces (`Prefix`, `IpSpace`, `SubRange`)
//! - the per-parse diagnostics sink (`Warnings`)
//! - the [`VendorConfiguration`] trait implemented by every dialect
//!
//! # Example
//!
//! ```rust
//! use netcomp_ir::{Configuration, ConfigurationFormat, Warnings};
//!
//! let mut warnings = Warnings::new();
//! warnings.red_flag("example-code", "something looked odd", None);
//! let cfg = Configuration::new("edge-1", ConfigurationFormat::CiscoFtd);
//! assert_eq!(cfg.hostname, "edge-1");
//! assert_eq!(warnings.len(), 1);
//! ```

mod acl;
mod configuration;
mod error;
mod interface;
mod ip;
mod routing;
mod transformation;
mod vendor_family;
mod vpn;
mod warnings;

pub use acl::{AclLine, AclMatchExpr, HeaderSpace, IpAccessList, LineAction};
pub use configuration::{Configuration, ConfigurationFormat};
pub use error::ConversionError;
pub use interface::{Interface, InterfaceAddress, Zone};
pub use ip::{IpProtocol, IpSpace, Prefix, SubRange, mask_to_prefix_length};
pub use routing::{
    BgpActivePeerConfig, BgpProcess, DEFAULT_VRF_NAME, OspfArea, OspfProcess, StaticRoute, Vrf,
};
pub use transformation::{Transformation, TransformationStep};
pub use vendor_family::{CiscoFamily, Service, VendorFamily};
pub use vpn::{
    DiffieHellmanGroup, EncryptionAlgorithm, IkeHashingAlgorithm, IkePhase1Key, IkePhase1Policy,
    IkePhase1Proposal, IpsecAuthenticationAlgorithm, IpsecEncapsulationMode, IpsecPeerConfig,
    IpsecPhase2Policy, IpsecPhase2Proposal, IpsecProtocol,
};
pub use warnings::{Warning, WarningKind, Warnings};

use serde::{Deserialize, Serialize};

/// Source span pointing to a single line and byte range in the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Span {
    /// Smallest span covering both `self` and `other` (which must not precede `self`).
    pub fn to(self, other: Span) -> Span {
        Span {
            line: self.line,
            column: self.column,
            start_byte: self.start_byte,
            end_byte: other.end_byte.max(self.end_byte),
        }
    }
}

/// Extension point implemented by every dialect's vendor model.
///
/// Lowering is read-only over the vendor model; recoverable problems are
/// appended to `warnings`, unrecoverable ones are returned as errors.
pub trait VendorConfiguration {
    /// Hostname used for the lowered configuration.
    fn hostname(&self) -> &str;
    /// Source format tag for the lowered configuration.
    fn format(&self) -> ConfigurationFormat;
    /// Lower into the vendor-independent model.
    fn to_vendor_independent(
        &self,
        warnings: &mut Warnings,
    ) -> Result<Configuration, ConversionError>;
}
