//! TIFF Stream - Print the directory structure of a TIFF, DNG or EXIF file.
//!
//! This binary opens a local file, walks its directory chains with
//! positional reads and prints every entry with a short decoded value.

use std::collections::{HashSet, VecDeque};
use std::fmt::Display;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiff_stream::{
    config::Config,
    format::tiff::{
        read_header, DirectoryChain, DirectoryEntry, DirectoryReference, TiffHeader, Value,
        ValueReader,
    },
    io::{RangeReader, StreamReader},
    TiffError,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let file = match tokio::fs::File::open(&config.path).await {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to open {}: {}", config.path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let reader = match StreamReader::new(file, config.path.display().to_string()).await {
        Ok(reader) => reader,
        Err(e) => {
            error!("Failed to read {}: {}", config.path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match inspect(&reader, &config).await {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            error!("{} entries could not be decoded", failures);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}: {}", reader.identifier(), e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "tiff_stream=debug"
    } else {
        "tiff_stream=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Inspection
// =============================================================================

/// A directory chain waiting to be walked.
struct PendingChain {
    label: String,
    start: DirectoryReference,
}

/// Print the header and every reachable directory.
///
/// Structural errors abort the walk. Entries whose values cannot be decoded
/// are reported inline and counted in the returned total.
async fn inspect<R: RangeReader + ?Sized>(reader: &R, config: &Config) -> Result<usize, TiffError> {
    let header = read_header(reader).await?;
    print_header(reader, &header);

    let values = ValueReader::from_header(reader, &header);
    let mut visited = HashSet::new();
    let mut failures = 0;

    let mut pending = VecDeque::from([PendingChain {
        label: "IFD".to_string(),
        start: header.first_directory,
    }]);

    while let Some(chain_start) = pending.pop_front() {
        if visited.contains(&chain_start.start) {
            debug!(offset = chain_start.start.0, "Skipping already visited chain");
            continue;
        }

        let mut chain = DirectoryChain::new(reader, header.byte_order, chain_start.start);
        let mut index = 0;

        while index < config.max_directories {
            let Some(directory) = chain.next_directory().await else {
                break;
            };
            let directory = directory?;

            if !visited.insert(directory.offset) {
                break;
            }

            println!();
            println!(
                "{}{} at {} ({} entries)",
                chain_start.label,
                index,
                directory.offset,
                directory.len()
            );

            for entry in &directory {
                match describe_entry(&values, entry, config.max_values).await {
                    Ok(text) => println!("  {}", text),
                    Err(e) => {
                        failures += 1;
                        println!("  {} <{}>", entry_prefix(entry), e);
                    }
                }

                if config.follows(entry.tag) {
                    match values.read_directory_reference_array(entry).await {
                        Ok(refs) => {
                            for (n, start) in refs.into_iter().enumerate() {
                                pending.push_back(PendingChain {
                                    label: format!(
                                        "{}{}/{}[{}].",
                                        chain_start.label, index, entry.tag, n
                                    ),
                                    start,
                                });
                            }
                        }
                        Err(e) => {
                            debug!(
                                tag = entry.tag,
                                error = %e,
                                "Follow tag is not a directory reference"
                            );
                        }
                    }
                }
            }

            index += 1;
        }
    }

    Ok(failures)
}

fn print_header<R: RangeReader + ?Sized>(reader: &R, header: &TiffHeader) {
    let marker = header.byte_order.marker();
    println!("{}", reader.identifier());
    println!("  size:        {} bytes", reader.size());
    println!(
        "  byte order:  {} ({:?})",
        String::from_utf8_lossy(&marker),
        header.byte_order
    );
    println!("  magic:       {}", header.magic());
    println!("  first IFD:   {}", header.first_directory);
}

fn entry_prefix(entry: &DirectoryEntry) -> String {
    format!(
        "{:5} {:<18} x{:<6}",
        entry.tag,
        format!("{:?}", entry.field_type),
        entry.count
    )
}

async fn describe_entry<R: RangeReader + ?Sized>(
    values: &ValueReader<'_, R>,
    entry: &DirectoryEntry,
    max_values: usize,
) -> Result<String, TiffError> {
    let value = values.read_value(entry).await?;
    Ok(format!(
        "{} {}",
        entry_prefix(entry),
        format_value(&value, max_values)
    ))
}

/// Short, single-line rendering of a decoded value.
fn format_value(value: &Value, max_values: usize) -> String {
    match value {
        Value::Unsigned(v) => join_limited(v, max_values),
        Value::Signed(v) => join_limited(v, max_values),
        Value::Rational(v) => join_limited(v, max_values),
        Value::SignedRational(v) => join_limited(v, max_values),
        Value::Float(v) => join_limited(v, max_values),
        Value::Double(v) => join_limited(v, max_values),
        Value::DirectoryReferences(v) => join_limited(v, max_values),
        Value::Ascii(s) => {
            let limit = max_values * 8;
            if s.chars().count() > limit {
                let head: String = s.chars().take(limit).collect();
                format!("{:?}...", head)
            } else {
                format!("{:?}", s)
            }
        }
        Value::Undefined(bytes) => {
            let hex: Vec<String> = bytes
                .iter()
                .take(max_values)
                .map(|b| format!("{:02X}", b))
                .collect();
            if bytes.len() > max_values {
                format!("<{} ...> ({} bytes)", hex.join(" "), bytes.len())
            } else {
                format!("<{}>", hex.join(" "))
            }
        }
    }
}

fn join_limited<T: Display>(items: &[T], max_values: usize) -> String {
    let shown: Vec<String> = items.iter().take(max_values).map(|v| v.to_string()).collect();
    if items.len() > max_values {
        format!("[{}, ... ({} total)]", shown.join(", "), items.len())
    } else {
        format!("[{}]", shown.join(", "))
    }
}
