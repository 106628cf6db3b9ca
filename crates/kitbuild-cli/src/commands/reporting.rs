//! Shared console and JSON reporting for commands.

use anyhow::{Context, Result};
use colored::Colorize;
use kitbuild_types::{KitConfig, ValidationResult};
use std::path::Path;

use super::json_output::{JsonError, JsonWarning};

/// Reads a config file and validates it.
pub(crate) fn load_config(path: &str) -> Result<(Option<KitConfig>, ValidationResult)> {
    let content = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("Failed to read config file: {}", path))?;
    tracing::debug!(path, bytes = content.len(), "loaded config");
    Ok(kitbuild_types::validate_config_json(&content))
}

/// Print validation results to the console
pub(crate) fn print_validation_results(result: &ValidationResult) {
    if !result.errors.is_empty() {
        println!("\n{}", "Errors:".red().bold());
        for error in &result.errors {
            let path_info = error
                .path
                .as_ref()
                .map(|p| format!(" at {}", p))
                .unwrap_or_default();
            println!(
                "  {} [{}]{}: {}",
                "x".red(),
                error.code.to_string().red(),
                path_info.dimmed(),
                error.message
            );
        }
    }

    if !result.warnings.is_empty() {
        println!("\n{}", "Warnings:".yellow().bold());
        for warning in &result.warnings {
            let path_info = warning
                .path
                .as_ref()
                .map(|p| format!(" at {}", p))
                .unwrap_or_default();
            println!(
                "  {} [{}]{}: {}",
                "!".yellow(),
                warning.code.to_string().yellow(),
                path_info.dimmed(),
                warning.message
            );
        }
    }
}

pub(crate) fn json_errors(result: &ValidationResult) -> Vec<JsonError> {
    result.errors.iter().map(JsonError::from).collect()
}

pub(crate) fn json_warnings(result: &ValidationResult) -> Vec<JsonWarning> {
    result.warnings.iter().map(JsonWarning::from).collect()
}

/// Pretty-prints a JSON output value.
pub(crate) fn print_json<T: serde::Serialize>(output: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(output)?;
    println!("{}", json);
    Ok(())
}
