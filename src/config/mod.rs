pub mod merge;
pub mod schema;

pub use schema::*;

use crate::cli::Cli;
use anyhow::Context;
use std::path::Path;

/// Load configuration by merging global, workspace, and CLI sources.
/// Precedence: CLI > workspace config > global config > defaults.
///
/// Missing config files are handled gracefully (defaults apply).
pub fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    // Layer 1: Global config (~/.config/swarmgate/swarmgate.toml or platform equivalent)
    let global = load_global_config();

    // Layer 2: Workspace config (./swarmgate.toml)
    let workspace = load_toml_file(Path::new("swarmgate.toml")).unwrap_or_default();

    // Layer 3: CLI args
    let cli_partial = PartialConfig {
        base_url: cli.api_url.clone(),
        ..Default::default()
    };

    // Merge: CLI > workspace > global > defaults
    Ok(cli_partial
        .with_fallback(workspace)
        .with_fallback(global)
        .finalize())
}

/// Load global config from the platform-specific config directory.
/// Returns empty PartialConfig if file not found.
fn load_global_config() -> PartialConfig {
    match global_config_path() {
        Some(p) => load_toml_file(&p).unwrap_or_default(),
        None => {
            tracing::debug!("Could not determine global config directory");
            PartialConfig::default()
        }
    }
}

/// Load and parse a TOML config file into a PartialConfig.
/// Returns None on file-not-found; logs parse errors without aborting.
fn load_toml_file(path: &Path) -> Option<PartialConfig> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            match toml::from_str::<ConfigFile>(&contents)
                .context(format!("Failed to parse {}", path.display()))
            {
                Ok(config_file) => {
                    tracing::info!("Loaded config from {}", path.display());
                    Some(config_file.to_partial())
                }
                Err(e) => {
                    tracing::warn!("Config parse error: {:#}", e);
                    None
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            None
        }
        Err(e) => {
            tracing::warn!("Failed to read config at {}: {}", path.display(), e);
            None
        }
    }
}

/// Resolve the platform-specific global config path.
/// Linux: ~/.config/swarmgate/swarmgate.toml
fn global_config_path() -> Option<std::path::PathBuf> {
    directories::ProjectDirs::from("", "", "swarmgate")
        .map(|dirs| dirs.config_dir().join("swarmgate.toml"))
}
