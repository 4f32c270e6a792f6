//! Cisco FTD/ASA dialect for `netcomp_ir`.
//!
//! The pipeline runs on one call stack per file:
//! - [`scan`] splits text into classified tokens (keywords, names, literals)
//! - the dispatcher groups lines into stanzas and parses each one
//! - the extractor folds stanzas into an [`model::FtdConfiguration`]
//! - [`lower()`] converts that model into a [`netcomp_ir::Configuration`]
//!
//! Recoverable problems from every stage go to one [`Warnings`] sink that is
//! returned with the result.
//!
//! # Example
//!
//! ```rust
//! use netcomp_dialect_ftd::{compile, parse_ftd};
//!
//! let cfg = "hostname edge-1\n\
//!            interface GigabitEthernet0/0\n \
//!            nameif outside\n \
//!            ip address 192.0.2.1 255.255.255.0\n\
//!            access-list ACL1 extended deny tcp any any eq 80\n";
//!
//! let parsed = parse_ftd(cfg).unwrap();
//! assert_eq!(parsed.configuration.access_lists["ACL1"].lines.len(), 1);
//!
//! let compiled = compile(cfg).unwrap();
//! assert_eq!(compiled.configuration.hostname, "edge-1");
//! assert!(compiled.configuration.zones.contains_key("outside"));
//! ```

mod ast;
mod dispatcher;
mod error;
mod extractor;
mod keywords;
mod lower;
pub mod model;
mod options;
mod scanner;
mod validate;

use netcomp_ir::{Configuration, Warnings};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub use error::{CompileError, FatalError};
pub use keywords::{Keyword, lookup as lookup_keyword};
pub use lower::{lower, security_level_acl_name};
pub use model::FtdConfiguration;
pub use options::{DEFAULT_HOSTNAME, ParseOptions};
pub use scanner::{Scanner, ScannerState, Token, TokenKind, scan};

/// Vendor model plus every warning raised while building it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFtd {
    pub configuration: FtdConfiguration,
    pub warnings: Warnings,
}

/// Lowered model plus the warnings of both parsing and lowering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compiled {
    pub configuration: Configuration,
    pub warnings: Warnings,
}

/// Parse text using [`ParseOptions::default`].
pub fn parse_ftd(input: &str) -> Result<ParsedFtd, FatalError> {
    parse_ftd_with_options(input, &ParseOptions::default())
}

/// Parse text using explicit [`ParseOptions`].
#[instrument(skip_all, fields(bytes = input.len()))]
pub fn parse_ftd_with_options(
    input: &str,
    options: &ParseOptions,
) -> Result<ParsedFtd, FatalError> {
    if let Some(offset) = input.bytes().position(|b| b == 0) {
        return Err(FatalError::BinaryInput { offset });
    }

    let mut warnings = Warnings::new();
    let stanzas = dispatcher::dispatch(input, options, &mut warnings);
    debug!(stanzas = stanzas.len(), warnings = warnings.len(), "dispatched");

    let configuration = extractor::extract(stanzas, options, &mut warnings);
    debug!(
        interfaces = configuration.interfaces.len(),
        access_lists = configuration.access_lists.len(),
        nat_rules = configuration.nat_rules.len(),
        warnings = warnings.len(),
        "extracted"
    );

    Ok(ParsedFtd {
        configuration,
        warnings,
    })
}

/// Parse raw bytes, rejecting input that is not UTF-8 text.
pub fn parse_ftd_bytes(input: &[u8]) -> Result<ParsedFtd, FatalError> {
    parse_ftd_bytes_with_options(input, &ParseOptions::default())
}

/// Parse raw bytes using explicit [`ParseOptions`].
pub fn parse_ftd_bytes_with_options(
    input: &[u8],
    options: &ParseOptions,
) -> Result<ParsedFtd, FatalError> {
    let text = std::str::from_utf8(input).map_err(|err| FatalError::NotUtf8 {
        valid_up_to: err.valid_up_to(),
    })?;
    parse_ftd_with_options(text, options)
}

/// Parse and lower in one step.
pub fn compile(input: &str) -> Result<Compiled, CompileError> {
    compile_with_options(input, &ParseOptions::default())
}

/// Parse and lower in one step using explicit [`ParseOptions`].
pub fn compile_with_options(
    input: &str,
    options: &ParseOptions,
) -> Result<Compiled, CompileError> {
    let ParsedFtd {
        configuration,
        mut warnings,
    } = parse_ftd_with_options(input, options)?;
    let configuration = lower(&configuration, &mut warnings)?;
    Ok(Compiled {
        configuration,
        warnings,
    })
}
