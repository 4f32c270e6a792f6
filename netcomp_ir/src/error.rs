use std::net::Ipv4Addr;

use thiserror::Error;

/// Failure lowering one vendor configuration.
///
/// Scoped to a single lowering call; the vendor model is never modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// A mask that must describe a prefix has non-contiguous bits.
    #[error("invalid netmask {mask} for {context}")]
    InvalidNetmask { context: String, mask: Ipv4Addr },
    /// Two interfaces claim the same zone name.
    #[error("zone {zone} is claimed by both {first} and {second}")]
    DuplicateZone {
        zone: String,
        first: String,
        second: String,
    },
}
