//! Configuration file discovery and loading

use super::docweave_config::DocweaveConfig;
use crate::error::DocweaveError;
use crate::result::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names in discovery priority order
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".docweaverc.toml",
    ".docweaverc.json",
    "docweave.toml",
    "docweave.json",
    "docweave.yaml",
    "docweave.yml",
];

/// Configuration loader for discovering and loading config files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Auto-discover a config file by traversing upward from `start_path`
    ///
    /// Each directory is checked for the names in [`CONFIG_FILE_NAMES`], in
    /// order, until a file is found or the filesystem root is reached.
    pub fn auto_discover(start_path: &Path) -> Result<Option<PathBuf>> {
        let mut current = start_path
            .canonicalize()
            .map_err(|e| DocweaveError::config_error(format!("Invalid path: {e}")))?;

        loop {
            for filename in CONFIG_FILE_NAMES {
                let config_path = current.join(filename);
                if config_path.is_file() {
                    tracing::debug!("Found config: {}", config_path.display());
                    return Ok(Some(config_path));
                }
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    ///
    /// The format follows the extension: `.toml`, `.json`, `.yaml`/`.yml`.
    /// Relative `input`/`output` paths are resolved against the file's
    /// directory.
    pub fn load_from_file(path: &Path) -> Result<DocweaveConfig> {
        let content =
            fs::read_to_string(path).map_err(|e| DocweaveError::io_error(path, e))?;

        let mut config = Self::parse(path, &content).map_err(|message| {
            DocweaveError::config_error(format!(
                "Failed to load config from '{}': {message}",
                path.display()
            ))
        })?;

        if let Some(base) = path.parent() {
            config.input = config.input.map(|p| resolve(base, p));
            config.output = config.output.map(|p| resolve(base, p));
        }
        Ok(config)
    }

    fn parse(path: &Path, content: &str) -> std::result::Result<DocweaveConfig, String> {
        match extension(path).as_deref() {
            Some("toml") => toml::from_str(content).map_err(|e| e.to_string()),
            Some("json") => serde_json::from_str(content).map_err(|e| e.to_string()),
            Some("yaml") | Some("yml") => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            _ => Err("unsupported file extension (expected .toml, .json, .yaml or .yml)".into()),
        }
    }

    /// Load config from `custom_path`, or auto-discover one
    ///
    /// An explicit path must exist. When discovery finds nothing the default
    /// (empty) configuration is returned; flags and environment variables
    /// may still supply every setting.
    pub fn load(custom_path: Option<&Path>, start_dir: Option<&Path>) -> Result<DocweaveConfig> {
        if let Some(path) = custom_path {
            if !path.exists() {
                return Err(DocweaveError::config_error(format!(
                    "Config file not found: {}. Run 'docweave config init' to create one.",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        let search_dir = start_dir.unwrap_or_else(|| Path::new("."));
        match Self::auto_discover(search_dir)? {
            Some(found) => Self::load_from_file(&found),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(DocweaveConfig::default())
            }
        }
    }

    /// Serialize `config` in the format matching `path`'s extension
    pub fn render(config: &DocweaveConfig, path: &Path) -> Result<String> {
        let rendered = match extension(path).as_deref() {
            Some("toml") => toml::to_string_pretty(config).map_err(|e| e.to_string()),
            Some("json") => serde_json::to_string_pretty(config).map_err(|e| e.to_string()),
            Some("yaml") | Some("yml") => serde_yaml::to_string(config).map_err(|e| e.to_string()),
            _ => Err(format!(
                "unsupported config extension for '{}'",
                path.display()
            )),
        };
        rendered.map_err(DocweaveError::config_error)
    }

    /// Write `config` to `path`, refusing to overwrite unless `force`
    pub fn save(config: &DocweaveConfig, path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(DocweaveError::config_error(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }
        let content = Self::render(config, path)?;
        fs::write(path, content).map_err(|e| DocweaveError::io_error(path, e))?;
        tracing::info!("Wrote config: {}", path.display());
        Ok(())
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() || path.as_os_str().is_empty() {
        path
    } else {
        base.join(path)
    }
}
