//! # Config Commands
//!
//! Shows the effective client configuration (file, then `CRM_*` overrides,
//! then command-line flags) and optionally writes it back.

use std::path::PathBuf;
use tracing::debug;

use crm_transport::ClientConfig;

use crate::commands::Output;
use crate::error::{CliError, CliResult};

/// Prints the configuration as TOML; with `save`, also writes it to
/// `path` (or the default location).
pub fn show(config: &ClientConfig, save: bool, path: Option<PathBuf>) -> CliResult<Output> {
    debug!(save, "config command");

    let mut text = toml::to_string_pretty(config).map_err(|e| {
        tracing::error!("Config rendering failed: {}", e);
        CliError::internal("Failed to render config")
    })?;
    if save {
        config.save(path)?;
        text.push_str("\n# saved");
    }

    Output::new(config, text.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_and_save() {
        let dir = std::env::temp_dir().join(format!("crm-cli-config-{}", std::process::id()));
        let path = dir.join("client.toml");
        let config = ClientConfig::default();

        let output = show(&config, false, Some(path.clone())).unwrap();
        assert!(output.text.contains("backend = \"mock\""));
        assert_eq!(output.json["store"]["page_size"], 10);
        assert!(!path.exists());

        show(&config, true, Some(path.clone())).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(dir);
    }
}
