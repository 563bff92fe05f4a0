//! Shield CLI binary.
//!
//! Diagnostic front end for the input-threat library.
//!
//! # Commands
//!
//! - `scan` - Detect threats in a value
//! - `sanitize` - Clean a value with a chosen strategy
//! - `validate` - Validate a value against a preset or config file
//! - `presets` - Show the built-in presets

use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shield::{
    detect, domain, validate, ProtectionOptions, RiskLevel, SanitizeMode, SecurityPreset,
    ShieldConfig, ValidationOptions, VERSION,
};

#[derive(Parser)]
#[command(name = "shield")]
#[command(version = VERSION)]
#[command(about = "Shield - input threat detection and sanitization", long_about = None)]
struct Cli {
    /// Enable info-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect threats in a value
    Scan {
        /// Value to scan (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sanitize a value
    Sanitize {
        /// Value to sanitize (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Strategy (sql, escape, html, text, input, search, email, phone)
        #[arg(short, long, default_value = "input")]
        mode: String,
    },

    /// Validate a value
    Validate {
        /// Value to validate (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Preset (strict, moderate, lenient)
        #[arg(short, long)]
        preset: Option<String>,

        /// Force strict mode
        #[arg(long)]
        strict: bool,

        /// Maximum length in characters
        #[arg(long)]
        max_length: Option<usize>,

        /// TOML config file (default: user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the built-in presets
    Presets,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Scan { input, file, json } => cmd_scan(input, file, json),

        Commands::Sanitize { input, file, mode } => cmd_sanitize(input, file, &mode),

        Commands::Validate {
            input,
            file,
            preset,
            strict,
            max_length,
            config,
            json,
        } => cmd_validate(input, file, preset, strict, max_length, config, json),

        Commands::Presets => {
            cmd_presets();
            Ok(())
        },
    }
}

fn cmd_scan(input: Option<String>, file: Option<PathBuf>, json_output: bool) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let result = detect(&content);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.is_safe {
        println!("SAFE (risk: {})", result.risk_level);
    } else {
        println!("UNSAFE (risk: {})", result.risk_level);
    }

    if !json_output && !result.threats.is_empty() {
        println!();
        println!("Findings:");
        for threat in &result.threats {
            println!(
                "  - {} [{}] {:?}",
                threat.description,
                threat.severity,
                shield::escape_sql(&threat.matched_text)
            );
        }
    }

    if result.risk_level == RiskLevel::High {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_sanitize(input: Option<String>, file: Option<PathBuf>, mode: &str) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let content = content.trim_end_matches(['\r', '\n']);

    let output = match mode.to_lowercase().as_str() {
        "search" => domain::sanitize_search_query(content),
        "email" => domain::sanitize_email(content)
            .ok_or_else(|| anyhow::anyhow!("Rejected: not a valid email address"))?,
        "phone" => domain::sanitize_phone(content)
            .ok_or_else(|| anyhow::anyhow!("Rejected: not a valid phone number"))?,
        other => other
            .parse::<SanitizeMode>()
            .map_err(|e| anyhow::anyhow!("{e}. Use: sql, escape, html, text, input, search, email, phone"))?
            .apply(content),
    };

    println!("{output}");
    Ok(())
}

fn cmd_validate(
    input: Option<String>,
    file: Option<PathBuf>,
    preset: Option<String>,
    strict: bool,
    max_length: Option<usize>,
    config_path: Option<PathBuf>,
    json_output: bool,
) -> anyhow::Result<()> {
    let content = read_input(input, file)?;
    let content = content.trim_end_matches(['\r', '\n']);

    let file_config = match config_path {
        Some(path) => ShieldConfig::from_file(path)?,
        None => match ShieldConfig::default_path().filter(|p| p.exists()) {
            Some(path) => ShieldConfig::from_file(path)?,
            None => ShieldConfig::default(),
        },
    };
    let mut config = file_config.merge(ShieldConfig::from_env());

    if let Some(preset) = preset {
        config.preset = preset.parse()?;
    }
    if strict {
        config.overrides.strict_mode = Some(true);
    }
    if let Some(max) = max_length {
        config.overrides.max_length = Some(max);
    }

    let options: ProtectionOptions = config.protection_options();
    tracing::info!(preset = %config.preset, ?options, "validating input");

    let result = validate(content, &ValidationOptions::from(&options));

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.is_valid {
        println!("VALID (risk: {})", result.detection.risk_level);
    } else {
        println!("INVALID (risk: {})", result.detection.risk_level);
        println!();
        println!("Errors:");
        for error in &result.errors {
            println!("  - {error}");
        }
        println!();
        println!("Sanitized: {}", result.sanitized_input);
    }

    if !result.is_valid {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_presets() {
    println!(
        "{:<10} {:>7} {:>11} {:>14} {:>6} {:>4} {:>6}",
        "PRESET", "STRICT", "MAX_LENGTH", "SPECIAL_CHARS", "BLOCK", "LOG", "STRIP"
    );
    println!("{}", "-".repeat(64));
    for preset in SecurityPreset::ALL {
        let o = ProtectionOptions::preset(preset);
        println!(
            "{:<10} {:>7} {:>11} {:>14} {:>6} {:>4} {:>6}",
            preset.to_string(),
            yes_no(o.strict_mode),
            o.max_length,
            yes_no(o.allow_special_chars),
            yes_no(o.block_submission),
            yes_no(o.log_threats),
            yes_no(o.strip_markup),
        );
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn read_input(input: Option<String>, file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(path) = file {
        Ok(std::fs::read_to_string(path)?)
    } else if let Some(s) = input {
        if s == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        } else {
            Ok(s)
        }
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}
