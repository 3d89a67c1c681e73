//! buildaudit: audit a project's build state against its plan
//!
//! Usage:
//!   buildaudit audit [path]       Run the whole pipeline
//!   buildaudit schema [path]      Extract schema facts from migrations
//!   buildaudit inventory [path]   Inventory the source tree
//!   buildaudit extract [path]     Extract features from planning documents
//!   buildaudit report [path]      Render the report from saved facts

use std::env;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use buildaudit::cli::{
    audit_command, extract_command, inventory_command, report_command, resolve_config,
    schema_command,
};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    let config_file = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .cloned();

    let mut positional = Vec::new();
    let mut skip_next = false;
    for arg in &args {
        if skip_next {
            skip_next = false;
            continue;
        }
        match arg.as_str() {
            "--config" => skip_next = true,
            "--verbose" | "-v" => {}
            _ => positional.push(arg.as_str()),
        }
    }

    let Some(&command) = positional.first() else {
        print_usage();
        return Ok(());
    };
    let path = positional.get(1).copied();

    match command {
        "audit" | "schema" | "inventory" | "extract" | "report" => {
            if verbose {
                setup_debug_logging();
            } else {
                setup_logging();
            }
            let config = resolve_config(path, config_file.as_deref())?;
            match command {
                "audit" => audit_command(&config)?,
                "schema" => schema_command(&config)?,
                "inventory" => inventory_command(&config)?,
                "extract" => extract_command(&config)?,
                _ => report_command(&config)?,
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "--version" | "-V" | "version" => {
            print_version();
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
        }
    }

    Ok(())
}

fn print_usage() {
    println!(
        r#"buildaudit: Audit a project's build state against its planning documents

USAGE:
    buildaudit <COMMAND> [path] [OPTIONS]

COMMANDS:
    audit [path]           Run every stage and write all artifacts
    schema [path]          Extract schema facts into database_analysis.json
    inventory [path]       Inventory the source tree into implementation_analysis.json
    extract [path]         Extract planned features into extracted_specifications.json
    report [path]          Reconcile saved facts into PROGRESS_REPORT.md
    help                   Show this help message

OPTIONS:
    --config <FILE>        JSON configuration (locations, phases, patterns)
    -v, --verbose          Debug logging

ENVIRONMENT:
    BUILDAUDIT_ROOT        Project root when no path is given

EXAMPLES:
    buildaudit audit                      # Audit the current directory
    buildaudit audit ~/projects/b2bplus   # Audit a specific project
    buildaudit schema && buildaudit report
"#
    );
}

fn print_version() {
    println!("buildaudit {}", env!("CARGO_PKG_VERSION"));
}

fn setup_logging() {
    install_subscriber(Level::INFO);
}

fn setup_debug_logging() {
    install_subscriber(Level::DEBUG);
}

/// `RUST_LOG` overrides the default level
fn install_subscriber(level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}
