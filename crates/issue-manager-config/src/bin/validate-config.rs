//! Config validation CLI tool
//!
//! Validates an issue-manager policy file and reports any errors.

use issue_manager_util::format_delay;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: validate-config <config-file>");
            eprintln!();
            eprintln!("Validates an issue-manager policy file (.json or .toml).");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config .github/issue-manager.json");
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match issue_manager_config::load_config(&config_path) {
        Ok(policy_set) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Policies ({}), in evaluation order:", policy_set.len());
            for policy in policy_set.iter() {
                let reminder = match &policy.reminder {
                    Some(r) => format!(", reminder {} before", format_delay(r.delay)),
                    None => String::new(),
                };
                println!(
                    "  - {}: close after {}{}",
                    policy.keyword,
                    format_delay(policy.delay),
                    reminder
                );
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                issue_manager_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                issue_manager_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                issue_manager_config::ConfigError::JsonError(parse_err) => {
                    eprintln!("JSON parse error:");
                    eprintln!("  {}", parse_err);
                }
                issue_manager_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
            }
            ExitCode::from(1)
        }
    }
}
