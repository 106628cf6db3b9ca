//! CSP command implementation
//!
//! Renders the CSP headers a config produces for one response.

use anyhow::Result;
use colored::Colorize;
use kitbuild_types::CspHeaderBuilder;
use std::process::ExitCode;

use super::json_output::{error_codes, CspOutput, JsonError, JsonHeader};
use super::reporting;

/// Inline content registered with the header builder.
#[derive(Debug, Clone, Default)]
pub struct InlineContent {
    /// Files holding inline `<script>` bodies
    pub scripts: Vec<String>,
    /// Files holding inline `<style>` bodies
    pub styles: Vec<String>,
}

/// Run the csp command
///
/// # Arguments
/// * `config_path` - Path to the JSON config file
/// * `prerender` - Render headers for a prerendered page
/// * `inline` - Inline script and style files to allow
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 on success, 1 if the config is invalid
pub fn run(
    config_path: &str,
    prerender: bool,
    inline: &InlineContent,
    json_output: bool,
) -> Result<ExitCode> {
    let output = csp_output(config_path, prerender, inline);

    if json_output {
        reporting::print_json(&output)?;
    } else {
        print_human(config_path, prerender, &output);
    }

    if output.success {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn print_human(config_path: &str, prerender: bool, output: &CspOutput) {
    println!(
        "{} {}{}",
        "CSP for:".cyan().bold(),
        config_path,
        if prerender { " (prerendered)" } else { "" }
    );

    for error in &output.errors {
        let path_info = error
            .path
            .as_ref()
            .map(|p| format!(" at {}", p))
            .unwrap_or_default();
        println!(
            "  {} [{}]{}: {}",
            "x".red(),
            error.code.red(),
            path_info.dimmed(),
            error.message
        );
    }
    for warning in &output.warnings {
        println!(
            "  {} [{}]: {}",
            "!".yellow(),
            warning.code.yellow(),
            warning.message
        );
    }

    if !output.success {
        println!("\n{} Could not build CSP headers", "FAILED".red().bold());
        return;
    }

    if output.headers.is_empty() {
        println!("{}", "No CSP directives configured".dimmed());
    }
    for header in &output.headers {
        println!("{}: {}", header.name.bold(), header.value);
    }
    if let Some(meta) = &output.meta {
        println!("{} {}", "Meta:".dimmed(), meta);
    }
    if let Some(nonce) = &output.nonce {
        println!("{} {}", "Nonce:".dimmed(), nonce);
    }
}

/// Loads a config and renders its headers.
pub fn csp_output(config_path: &str, prerender: bool, inline: &InlineContent) -> CspOutput {
    let (config, result) = match reporting::load_config(config_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            let error = JsonError::new(error_codes::FILE_READ, format!("{:#}", e));
            return CspOutput::failure(vec![error], vec![]);
        }
    };

    let warnings = reporting::json_warnings(&result);
    let config = match config {
        Some(config) if result.is_ok() => config,
        _ => return CspOutput::failure(reporting::json_errors(&result), warnings),
    };

    let mut builder = match CspHeaderBuilder::new(&config.csp, prerender) {
        Ok(builder) => builder,
        Err(e) => {
            let error = JsonError::new(error_codes::CSP_BUILD, e.to_string());
            return CspOutput::failure(vec![error], warnings);
        }
    };

    for (files, is_script) in [(&inline.scripts, true), (&inline.styles, false)] {
        for file in files {
            let content = match std::fs::read_to_string(file) {
                Ok(c) => c,
                Err(e) => {
                    let error = JsonError::new(
                        error_codes::INLINE_READ,
                        format!("Failed to read inline content {}: {}", file, e),
                    );
                    return CspOutput::failure(vec![error], warnings);
                }
            };
            if is_script {
                builder.add_script(&content);
            } else {
                builder.add_style(&content);
            }
        }
    }
    tracing::debug!(
        scripts = inline.scripts.len(),
        styles = inline.styles.len(),
        prerender,
        "registered inline content"
    );

    let headers = [builder.header(), builder.report_only_header()]
        .into_iter()
        .flatten()
        .map(|(name, value)| JsonHeader {
            name: name.to_string(),
            value,
        })
        .collect();

    let needs_nonce = builder.script_needs_nonce() || builder.style_needs_nonce();

    CspOutput {
        success: true,
        errors: Vec::new(),
        warnings,
        headers,
        meta: if prerender { builder.meta_tag() } else { None },
        nonce: needs_nonce.then(|| builder.nonce().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn temp_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_nonce_headers() {
        let config = temp_file(
            r#"{"csp": {"mode": "auto", "directives": {"script-src": ["self"]}}}"#,
        );
        let script = temp_file("boot()");
        let inline = InlineContent {
            scripts: vec![script.path().to_str().unwrap().to_string()],
            styles: vec![],
        };

        let output = csp_output(config.path().to_str().unwrap(), false, &inline);
        assert!(output.success);
        let nonce = output.nonce.clone().unwrap();
        assert_eq!(output.headers.len(), 1);
        assert_eq!(output.headers[0].name, "content-security-policy");
        assert_eq!(
            output.headers[0].value,
            format!("script-src 'self' 'nonce-{}'", nonce)
        );
        assert_eq!(output.meta, None);
    }

    #[test]
    fn test_prerender_uses_hashes_and_meta() {
        let config = temp_file(
            r#"{"csp": {"directives": {"style-src": ["self"], "frame-ancestors": ["none"]}}}"#,
        );
        let style = temp_file("body{margin:0}");
        let inline = InlineContent {
            scripts: vec![],
            styles: vec![style.path().to_str().unwrap().to_string()],
        };

        let output = csp_output(config.path().to_str().unwrap(), true, &inline);
        assert!(output.success);
        assert_eq!(output.nonce, None);
        let hash = kitbuild_types::csp::sha256_base64("body{margin:0}");
        assert_eq!(
            output.headers[0].value,
            format!("style-src 'self' 'sha256-{}'; frame-ancestors 'none'", hash)
        );
        let meta = output.meta.unwrap();
        assert!(!meta.contains("frame-ancestors"));
    }

    #[test]
    fn test_invalid_config_fails() {
        let config = temp_file(r#"{"csp": {"directives": {"font-src": ["nonce-"]}}}"#);
        let output = csp_output(config.path().to_str().unwrap(), false, &InlineContent::default());
        assert!(!output.success);
        assert!(output.headers.is_empty());
        assert_eq!(output.errors[0].code, "E001");
    }

    #[test]
    fn test_missing_inline_file_fails() {
        let config = temp_file(r#"{"csp": {"directives": {"script-src": ["self"]}}}"#);
        let inline = InlineContent {
            scripts: vec!["/no/such/script.js".to_string()],
            styles: vec![],
        };
        let output = csp_output(config.path().to_str().unwrap(), false, &inline);
        assert!(!output.success);
        assert_eq!(output.errors[0].code, error_codes::INLINE_READ);
    }
}
