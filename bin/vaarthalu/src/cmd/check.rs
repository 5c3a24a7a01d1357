//! Check command - validate a runtime configuration

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use vaarthalu_core::Config;

const PUBLISHER_PLACEHOLDER: &str = "YOUR_PUBLISHER_ID";

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Loads the file (which runs the hard validation rules) and then looks for
/// values that are legal but almost certainly not meant for production.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    match Config::load(config_path) {
        Ok(config) => {
            println!("  ✓ Configuration valid");
            println!("\nChecking configuration values...");
            check_config_values(&config, &mut result);
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e}"));
            println!("  ✗ Configuration invalid: {e}");
        }
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Check configuration values for common deployment mistakes.
fn check_config_values(config: &Config, result: &mut ValidationResult) {
    if !config.site.base_url.starts_with("http") {
        result.add_warning("site.base_url should start with http:// or https://");
    } else if config.site.base_url.ends_with('/') {
        result.add_warning("site.base_url should not have a trailing slash");
    }

    if config.ads.script_src.contains(PUBLISHER_PLACEHOLDER) {
        result.add_warning(format!(
            "ads.script_src still contains the {PUBLISHER_PLACEHOLDER} placeholder"
        ));
    }

    if !config.ads.script_src.starts_with("https://") {
        result.add_warning("ads.script_src should be loaded over https://");
    }

    match config.push.vapid_public_key.as_deref() {
        None => result.add_warning(
            "push.vapid_public_key is not set; push subscriptions will be skipped",
        ),
        Some(key) if key.trim().is_empty() => {
            result.add_error("push.vapid_public_key is set but empty");
        }
        Some(_) => {}
    }

    if !config.worker.script_url.starts_with('/') {
        result.add_warning(format!(
            "worker.script_url should be an absolute path: {}",
            config.worker.script_url
        ));
    }

    if config.push.flag_key == config.exit_intent.flag_key {
        result.add_error(format!(
            "push.flag_key and exit_intent.flag_key share the key '{}'",
            config.push.flag_key
        ));
    }

    if config.progress.milestones.is_empty() {
        result.add_warning("progress.milestones is empty; no reading milestones will be reported");
    }

    println!("  ✓ Configuration values checked");
}
