use crate::cli::ConfigOverrides;
use crate::error::{CliError, CliResult};
use skosgen_core::GeneratorConfig;
use std::fs;
use std::path::Path;

/// Config file picked up from the working directory when `--config` is absent.
pub const CONFIG_FILE: &str = "skosgen.toml";

/// Load the generator configuration.
///
/// An explicit `--config` path must exist. Without one, `./skosgen.toml` is
/// used when present and the built-in defaults otherwise.
pub fn load(explicit: Option<&Path>) -> CliResult<GeneratorConfig> {
    let path = match explicit {
        Some(p) => {
            if !p.is_file() {
                return Err(CliError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p.to_path_buf()
        }
        None => {
            let local = Path::new(CONFIG_FILE);
            if !local.is_file() {
                tracing::debug!("no {CONFIG_FILE} found, using defaults");
                return Ok(GeneratorConfig::default());
            }
            local.to_path_buf()
        }
    };

    let text = fs::read_to_string(&path).map_err(|e| {
        CliError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    let config = GeneratorConfig::from_toml_str(&text)
        .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Apply command-line overrides on top of a loaded config.
pub fn apply_overrides(config: &mut GeneratorConfig, overrides: &ConfigOverrides) {
    if let Some(base) = &overrides.base_uri {
        config.base_uri = base.clone();
    }
    if let Some(locale) = &overrides.locale {
        config.locale_tag = locale.clone();
    }
}

/// Read a whole input file.
pub fn read_input(path: &Path) -> CliResult<Vec<u8>> {
    fs::read(path).map_err(|e| CliError::Input(format!("cannot read {}: {e}", path.display())))
}

/// Write an output file, replacing any existing one.
pub fn write_output(path: &Path, contents: &str) -> CliResult<()> {
    fs::write(path, contents)
        .map_err(|e| CliError::Input(format!("cannot write {}: {e}", path.display())))
}
