use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::process::ExitCode;
use tracing::Level;

use xfscan::cli::{Cli, EXIT_FATAL, EXIT_USAGE};
use xfscan::report::{
    write_inode_report, write_inode_report_json, write_shortform_record,
    write_shortform_record_json,
};
use serde_json::json;
use xfscan::{ScanMode, ScanOutcome, ScanSession};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_USAGE),
            };
        }
    };

    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let options = cli.scan_options();
    let image_path = options.image_path.clone();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let mut session = ScanSession::open(options)
        .with_context(|| format!("Failed to open image: {}", image_path.display()))?;

    if !cli.json {
        writeln!(
            out,
            "Checking if '{}' is an XFS filesystem...",
            image_path.display()
        )?;
    }

    let is_xfs = session.is_xfs().context("Failed to read superblock")?;
    let shortform = cli.mode() == ScanMode::Shortform;
    if is_xfs && !cli.json {
        writeln!(out, "XFS filesystem detected.\n")?;
        if shortform {
            writeln!(out, "Scanning for short-form directory inodes...\n")?;
        }
    }

    let outcome = if shortform {
        let json = cli.json;
        session
            .locate_shortform(|record| {
                if json {
                    write_shortform_record_json(&mut out, record)
                } else {
                    write_shortform_record(&mut out, record)
                }
            })
            .context("Short-form scan failed")?
    } else {
        let resolver = session.default_resolver();
        session
            .inspect_inodes(resolver.as_ref())
            .context("Inode scan failed")?
    };

    match outcome {
        ScanOutcome::NotXfs => {
            if cli.json {
                serde_json::to_writer(&mut out, &json!({ "xfs": false }))?;
                writeln!(out)?;
            } else {
                writeln!(out, "Not an XFS filesystem (magic 'XFSB' not found).")?;
            }
        }
        ScanOutcome::Inodes(report) if cli.json => write_inode_report_json(&mut out, &report)?,
        ScanOutcome::Inodes(report) => write_inode_report(&mut out, &report)?,
        ScanOutcome::Shortform(0) if !cli.json => {
            writeln!(out, "No short-form directory inodes found.")?;
        }
        ScanOutcome::Shortform(_) => {}
    }

    out.flush()?;
    Ok(())
}
