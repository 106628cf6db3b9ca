//! Validate command implementation
//!
//! Validates a build config file.

use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;
use std::time::Instant;

use super::json_output::{error_codes, JsonError, ValidateOutput, ValidateResult};
use super::reporting;

/// Run the validate command
///
/// # Arguments
/// * `config_path` - Path to the JSON config file
/// * `json_output` - Whether to output machine-readable JSON diagnostics
///
/// # Returns
/// Exit code: 0 if valid, 1 if invalid
pub fn run(config_path: &str, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(config_path)
    } else {
        run_human(config_path)
    }
}

/// Run validate with human-readable (colored) output
fn run_human(config_path: &str) -> Result<ExitCode> {
    let start = Instant::now();

    println!("{} {}", "Validating:".cyan().bold(), config_path);

    let (config, result) = reporting::load_config(config_path)?;
    reporting::print_validation_results(&result);

    let duration_ms = start.elapsed().as_millis() as u64;

    match config {
        Some(config) if result.is_ok() => {
            println!(
                "{} {} CSP directive(s), {} prerender entr{}",
                "Config:".dimmed(),
                config.csp.directives.len(),
                config.prerender.entries.len(),
                if config.prerender.entries.len() == 1 { "y" } else { "ies" }
            );
            println!(
                "\n{} Config is valid ({}ms)",
                "SUCCESS".green().bold(),
                duration_ms
            );
            Ok(ExitCode::SUCCESS)
        }
        _ => {
            println!(
                "\n{} Config has {} error(s) ({}ms)",
                "FAILED".red().bold(),
                result.errors.len(),
                duration_ms
            );
            Ok(ExitCode::from(1))
        }
    }
}

/// Run validate with machine-readable JSON output
fn run_json(config_path: &str) -> Result<ExitCode> {
    let output = validate_output(config_path);
    reporting::print_json(&output)?;

    if output.success {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

/// Builds the JSON report for a config file.
pub fn validate_output(config_path: &str) -> ValidateOutput {
    let (config, result) = match reporting::load_config(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            let error = JsonError::new(error_codes::FILE_READ, format!("{:#}", e));
            return ValidateOutput::failure(vec![error], vec![]);
        }
    };

    let warnings = reporting::json_warnings(&result);
    match config {
        Some(config) if result.is_ok() => ValidateOutput::success(
            ValidateResult {
                config_path: config_path.to_string(),
                csp_directives: config.csp.directives.len(),
                csp_report_only_directives: config.csp.report_only.len(),
                prerender_entries: config.prerender.entries.clone(),
            },
            warnings,
        ),
        _ => ValidateOutput::failure(reporting::json_errors(&result), warnings),
    }
}
