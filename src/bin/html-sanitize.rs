//! Command-line front end for the HTML sanitizer
//!
//! Reads markup from a file (or stdin), removes everything outside the
//! allow-list and writes the result to stdout or `--output`.
//!
//! The allow-list comes from `--whitelist`, then `--config`, then the
//! `HTML_SANITIZER_WHITELIST` environment variable (a `.env` file in the
//! working directory is loaded first). Logging goes to stderr and is
//! controlled with `RUST_LOG`.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use html_sanitizer::{Sanitizer, SanitizerConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser, Debug)]
#[command(
    version,
    name = "html-sanitize",
    about = "Remove script vectors and non-allowed elements from HTML."
)]
struct CmdArgs {
    /// input file; reads stdin when omitted or "-"
    input: Option<PathBuf>,
    /// pipe-delimited element names to keep, e.g. "b|i|p"
    #[arg(short, long, value_name = "LIST")]
    whitelist: Option<String>,
    /// JSON configuration file with a "whitelist" field
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Content-Type header value used to detect the input charset
    #[arg(long, value_name = "CT")]
    content_type: Option<String>,
    /// output file; writes stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let args = CmdArgs::parse();
    let config = load_config(&args)?;
    let sanitizer = Sanitizer::new(&config);
    debug!(allowed = sanitizer.allow_list().len(), "allow-list loaded");

    let html = read_input(args.input.as_ref())?;
    let clean = sanitizer
        .sanitize_bytes(&html, args.content_type.as_deref())
        .context("failed to sanitize input")?;

    match &args.output {
        Some(path) => fs::write(path, clean.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(clean.as_bytes())?;
            stdout.flush()?;
        }
    }

    info!(input_bytes = html.len(), output_bytes = clean.len(), "done");
    Ok(())
}

fn load_config(args: &CmdArgs) -> Result<SanitizerConfig> {
    if let Some(whitelist) = &args.whitelist {
        return Ok(SanitizerConfig::with_whitelist(whitelist.as_str()));
    }
    if let Some(path) = &args.config {
        return SanitizerConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    Ok(SanitizerConfig::from_env())
}

fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}
