//! Export command - resolve the configuration for the browser runtime

use std::{fs, path::Path};

use color_eyre::eyre::{Result, WrapErr};
use vaarthalu_core::Config;

/// Output shape of the exported configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Plain JSON object, for `startPage(await (await fetch(..)).json())`.
    #[default]
    Json,
    /// Script assigning `self.VAARTHALU_CONFIG`, loadable by the page and by `sw.js`.
    Script,
}

/// Global the script format assigns.
pub const CONFIG_GLOBAL: &str = "VAARTHALU_CONFIG";

/// Run the export command.
///
/// Environment overrides (`VAARTHALU__SECTION__KEY`) are applied before
/// export, so one file can serve several deployments.
pub fn run(config_path: &Path, output: Option<&Path>, format: Format) -> Result<()> {
    tracing::info!(?config_path, ?output, ?format, "Exporting configuration");

    let config = Config::load_with_env(config_path)
        .wrap_err_with(|| format!("Failed to load {}", config_path.display()))?;
    let rendered = render(&config, format)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, &rendered)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Configuration exported to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

/// Render the configuration in the requested format.
pub fn render(config: &Config, format: Format) -> Result<String> {
    let json = serde_json::to_string_pretty(config).wrap_err("Failed to serialize configuration")?;
    Ok(match format {
        Format::Json => format!("{json}\n"),
        Format::Script => format!("self.{CONFIG_GLOBAL} = {json};\n"),
    })
}
