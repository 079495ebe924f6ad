//! Configuration system for docweave
//!
//! Settings come from four layers, highest precedence first: command-line
//! flags, environment variables (`DOCWEAVE_ENDPOINT`, `DOCWEAVE_API_KEY`,
//! `DOCWEAVE_DEPLOYMENT`), a config file, and built-in defaults. This module
//! owns the file layer and validation; the CLI applies the upper layers on
//! top of the loaded [`DocweaveConfig`].
//!
//! ## Configuration Files
//!
//! - `.docweaverc.toml` / `docweave.toml`
//! - `.docweaverc.json` / `docweave.json`
//! - `docweave.yaml` / `docweave.yml`
//!
//! When no explicit path is given the loader searches from the working
//! directory upward until a file is found or the filesystem root is reached.

mod docweave_config;
mod loader;

pub use docweave_config::{
    DEFAULT_API_VERSION, DEFAULT_MAX_TOKENS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TEMPERATURE,
    DocweaveConfig, GenerationConfig, ServiceConfig, is_placeholder,
};
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
