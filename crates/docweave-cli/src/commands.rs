//! CLI command implementations

use std::ffi::OsString;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use docweave_core::{
    ConfigLoader, DocPipeline, DocweaveConfig, DocweaveError, ProgressHook, list_targets,
};
use tracing::{debug, error, info, warn};

use crate::client::AzureOpenAiClient;
use crate::output::{self, print_report, print_targets};
use crate::{ConfigFormat, DocumentArgs, ListFormat};

/// Document command implementation
pub async fn document_command(args: DocumentArgs, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = ConfigLoader::load(config_path.as_deref(), None)?;
    args.apply_to(&mut config);
    config.validate()?;

    // validate() guarantees both paths are set
    let (Some(input), Some(output_path)) = (config.input.clone(), config.output.clone()) else {
        return Err(DocweaveError::configuration_missing(["input", "output"]).into());
    };
    debug!("Documenting {} -> {}", input.display(), output_path.display());

    let source = read_source(&input)?;
    let client = AzureOpenAiClient::from_config(&config.service)?;
    let mut pipeline = DocPipeline::from_config(Arc::new(client), &config.generation);

    let bar = (!args.quiet && std::io::stderr().is_terminal()).then(output::progress_bar);
    if let Some(bar) = &bar {
        let bar = bar.clone();
        let hook: ProgressHook = Arc::new(move |settled, total| {
            bar.set_length(total as u64);
            bar.set_position(settled as u64);
        });
        pipeline = pipeline.with_progress(hook);
    }

    let started = Instant::now();
    let result = pipeline.document_source(&source).await;
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    let report = match result {
        Ok(report) => report,
        Err(e @ DocweaveError::RewriteInconsistency { .. }) => {
            // The input is carried through untouched rather than half-documented
            error!("{e}; writing the input unchanged");
            write_output(&output_path, &source, args.backup)?;
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    for failure in &report.failures {
        warn!("{}", failure.to_error());
    }
    write_output(&output_path, &report.output, args.backup)?;
    info!(
        documented = report.documented,
        placeholders = report.placeholders,
        failed = report.failures.len(),
        "Wrote {}",
        output_path.display()
    );

    if !args.quiet {
        print_report(&report, &output_path, started.elapsed());
    }
    Ok(())
}

/// List command implementation
///
/// Parses and collects only; the generation service is never contacted.
pub async fn list_command(
    input: Option<PathBuf>,
    format: ListFormat,
    config_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let input = match input {
        Some(input) => input,
        None => {
            let config = ConfigLoader::load(config_path.as_deref(), None)?;
            config.validate_input()?;
            config
                .input
                .ok_or_else(|| DocweaveError::configuration_missing(["input"]))?
        }
    };

    let source = read_source(&input)?;
    let targets = list_targets(&source)?;
    debug!("{} undocumented declarations in {}", targets.len(), input.display());
    print_targets(&targets, format)
}

/// Config init command implementation
pub fn config_init_command(format: ConfigFormat, force: bool) -> anyhow::Result<()> {
    let path = Path::new(format.file_name());
    ConfigLoader::save(&DocweaveConfig::template(), path, force)?;
    println!("Created {}", path.display());
    println!("Fill in the input/output paths and the service settings, then run 'docweave config validate'.");
    Ok(())
}

/// Config validate command implementation
pub fn config_validate_command(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = ConfigLoader::load(config_path.as_deref(), None)?;
    config.validate()?;
    println!("Configuration is valid");
    Ok(())
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path)
        .map_err(|e| DocweaveError::io_error(path, e))
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn write_output(path: &Path, content: &str, backup: bool) -> anyhow::Result<()> {
    if backup && path.exists() {
        let backup_path = backup_path(path);
        fs::copy(path, &backup_path)
            .map_err(|e| DocweaveError::io_error(&backup_path, e))?;
        debug!("Backed up {} to {}", path.display(), backup_path.display());
    }
    fs::write(path, content).map_err(|e| DocweaveError::io_error(path, e))?;
    Ok(())
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}
