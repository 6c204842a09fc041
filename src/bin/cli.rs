use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use terraguard::config::Config;
use terraguard::output::OutputFormat;
use terraguard::rules::{registry, Severity};
use terraguard::ScanOptions;

#[derive(Parser)]
#[command(
    name = "terraguard",
    about = "Static analysis security scanner for Terraform configurations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a directory (or single file) of Terraform configuration
    Scan {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (console, json)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Minimum severity to fail (low, medium, high, critical)
        #[arg(long)]
        fail_on: Option<String>,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List all registered rules
    ListRules {
        /// Output format (table, json)
        #[arg(long, short = 'f', default_value = "table")]
        format: String,
    },

    /// Generate a starter .terraguard.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan {
            path,
            config,
            format,
            fail_on,
            output,
        } => cmd_scan(path, config, format, fail_on, output),
        Commands::ListRules { format } => cmd_list_rules(format),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn cmd_scan(
    path: PathBuf,
    config: Option<PathBuf>,
    format_str: String,
    fail_on_str: Option<String>,
    output_path: Option<PathBuf>,
) -> Result<i32, terraguard::error::GuardError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    });

    let fail_on = fail_on_str.and_then(|s| {
        let sev = Severity::from_str_lenient(&s);
        if sev.is_none() {
            eprintln!("Warning: unknown severity '{}', using config default", s);
        }
        sev
    });

    let options = ScanOptions {
        config_path: config,
        format,
        fail_on_override: fail_on,
    };

    let report = terraguard::scan(&path, &options)?;
    let rendered = terraguard::render_report(&report, format)?;

    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = pass, 1 = findings above threshold
    Ok(if report.verdict.pass { 0 } else { 1 })
}

#[derive(Serialize)]
struct RuleInfo {
    id: String,
    legacy_id: Option<&'static str>,
    severity: Severity,
    provider: String,
    service: &'static str,
    summary: &'static str,
}

fn cmd_list_rules(format_str: String) -> Result<i32, terraguard::error::GuardError> {
    let rules: Vec<RuleInfo> = registry()
        .rules()
        .iter()
        .map(|r| RuleInfo {
            id: r.id(),
            legacy_id: r.legacy_id,
            severity: r.default_severity,
            provider: r.provider.to_string(),
            service: r.service,
            summary: r.docs.summary,
        })
        .collect();

    match format_str.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&rules)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "{:<42} {:<8} {:<10} SUMMARY",
                "ID", "LEGACY", "SEVERITY"
            );
            println!("{}", "-".repeat(100));
            for rule in &rules {
                println!(
                    "{:<42} {:<8} {:<10} {}",
                    rule.id,
                    rule.legacy_id.unwrap_or("-"),
                    rule.severity.to_string(),
                    rule.summary,
                );
            }
        }
    }

    Ok(0)
}

fn cmd_init(force: bool) -> Result<i32, terraguard::error::GuardError> {
    let path = PathBuf::from(".terraguard.toml");

    if path.exists() && !force {
        eprintln!(".terraguard.toml already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created .terraguard.toml");

    Ok(0)
}
