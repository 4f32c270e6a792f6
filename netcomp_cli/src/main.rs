use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use netcomp_dialect_ftd::{
    Compiled, DEFAULT_HOSTNAME, ParseOptions, ParsedFtd, lower, parse_ftd_bytes_with_options,
};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,netcomp_dialect_ftd=info";

#[derive(Debug, Parser)]
#[command(name = "ftd-compile")]
#[command(about = "Compile Cisco FTD/ASA configurations into the vendor-independent model")]
struct Cli {
    #[arg(required = true)]
    files: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Hostname used when a file has no `hostname` line.
    #[arg(long, default_value = DEFAULT_HOSTNAME)]
    hostname_default: String,

    /// Do not warn about unrecognized stanzas and body lines.
    #[arg(long)]
    quiet_unknown: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Lowered model and warnings as JSON, keyed by file.
    Json,
    /// Vendor model before lowering as JSON, keyed by file.
    Vendor,
    /// One line of counts per file followed by its warnings.
    Summary,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Report {
    Parsed(ParsedFtd),
    Compiled(Compiled),
    Failed { error: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = ParseOptions::new()
        .with_default_hostname(&cli.hostname_default)
        .with_unknown_warnings(!cli.quiet_unknown);

    let mut reports = BTreeMap::new();
    let mut failed = 0usize;
    for path in &cli.files {
        let file = path.display().to_string();
        let report = compile_file(path, &options, cli.format).unwrap_or_else(|err| {
            error!(%file, %err, "compile failed");
            failed += 1;
            Report::Failed { error: err }
        });
        reports.insert(file, report);
    }

    match cli.format {
        OutputFormat::Json | OutputFormat::Vendor => {
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        OutputFormat::Summary => {
            for (file, report) in &reports {
                print_summary(file, report);
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} files failed", cli.files.len()).into());
    }
    Ok(())
}

fn compile_file(path: &Path, options: &ParseOptions, format: OutputFormat) -> Result<Report, String> {
    let bytes = fs::read(path).map_err(|err| err.to_string())?;
    let parsed = parse_ftd_bytes_with_options(&bytes, options).map_err(|err| err.to_string())?;
    if format == OutputFormat::Vendor {
        return Ok(Report::Parsed(parsed));
    }

    let mut warnings = parsed.warnings;
    let configuration =
        lower(&parsed.configuration, &mut warnings).map_err(|err| err.to_string())?;
    info!(
        file = %path.display(),
        hostname = %configuration.hostname,
        warnings = warnings.len(),
        "compiled"
    );
    Ok(Report::Compiled(Compiled {
        configuration,
        warnings,
    }))
}

fn print_summary(file: &str, report: &Report) {
    let Report::Compiled(Compiled {
        configuration: cfg,
        warnings,
    }) = report
    else {
        if let Report::Failed { error } = report {
            println!("{file}: error: {error}");
        }
        return;
    };

    let translated = cfg
        .interfaces
        .values()
        .filter(|i| i.incoming_transformation.is_some() || i.outgoing_transformation.is_some())
        .count();
    println!(
        "{file}: hostname {}, {} interfaces, {} zones, {} access lists, {} vrfs, {} interfaces with nat, {} ipsec peers, {} warnings",
        cfg.hostname,
        cfg.interfaces.len(),
        cfg.zones.len(),
        cfg.ip_access_lists.len(),
        cfg.vrfs.len(),
        translated,
        cfg.ipsec_peer_configs.len(),
        warnings.len(),
    );
    for warning in warnings.iter() {
        println!("  warning: {warning}");
    }
}
