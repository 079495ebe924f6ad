//! Console reporting
//!
//! Human output is colored with `colored`; whether colors are emitted at all
//! is decided once in `main`.

use std::path::Path;
use std::time::Duration;

use colored::*;
use docweave_core::{DocRequest, PipelineReport, RunSummary};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::ListFormat;

/// One row of `docweave list --format json`
#[derive(Debug, Serialize)]
struct TargetRow<'a> {
    id: u32,
    kind: &'a str,
    name: &'a str,
}

/// Print the undocumented declarations of a file
pub fn print_targets(targets: &[DocRequest], format: ListFormat) -> anyhow::Result<()> {
    match format {
        ListFormat::Human => {
            if targets.is_empty() {
                println!("{} Every declaration is documented", "✓".green());
                return Ok(());
            }
            for target in targets {
                println!(
                    "{:>8}  {:<9}  {}",
                    target.id.to_string().dimmed(),
                    target.kind.as_str().cyan(),
                    target.name.bold()
                );
            }
            println!(
                "\n{} undocumented declaration{}",
                targets.len().to_string().yellow(),
                if targets.len() == 1 { "" } else { "s" }
            );
        }
        ListFormat::Json => {
            let rows: Vec<TargetRow<'_>> = targets
                .iter()
                .map(|target| TargetRow {
                    id: target.id.offset(),
                    kind: target.kind.as_str(),
                    name: &target.name,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}

/// Print a finished run: the documented source on stdout, the summary on
/// stderr
pub fn print_report(report: &PipelineReport, output_path: &Path, elapsed: Duration) {
    print!("{}", report.output);
    if !report.output.is_empty() && !report.output.ends_with('\n') {
        println!();
    }
    print_summary(&report.summary(), output_path, elapsed);

    for failure in &report.failures {
        eprintln!(
            "  {} {} ({}): {}",
            "✗".red(),
            failure.name.bold(),
            failure.id.to_string().dimmed(),
            failure.error
        );
    }
}

fn print_summary(summary: &RunSummary, output_path: &Path, elapsed: Duration) {
    eprintln!("\n{}", "Summary:".bold());
    eprintln!("  Undocumented declarations: {}", summary.targets);
    eprintln!(
        "  Documented: {}",
        summary.documented.to_string().green()
    );
    if summary.placeholders > 0 {
        eprintln!(
            "  Fallback comments: {}",
            summary.placeholders.to_string().yellow()
        );
    }
    if summary.failed > 0 {
        eprintln!("  Failed: {}", summary.failed.to_string().red());
    }
    if summary.timed_out {
        eprintln!("  {}", "Generation deadline reached".yellow());
    }
    eprintln!("  Written to: {}", output_path.display());
    eprintln!("  Time: {}", utils::format_duration(elapsed));
}

/// Progress bar for generation requests
pub fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    let style = ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message("generating documentation");
    bar
}

/// Utility functions for output formatting
pub mod utils {
    /// Format duration in human-readable format
    pub fn format_duration(duration: std::time::Duration) -> String {
        let total_ms = duration.as_millis();

        if total_ms < 1000 {
            format!("{total_ms}ms")
        } else if total_ms < 60_000 {
            format!("{:.1}s", total_ms as f64 / 1000.0)
        } else {
            let minutes = total_ms / 60_000;
            let seconds = (total_ms % 60_000) as f64 / 1000.0;
            format!("{minutes}m {seconds:.1}s")
        }
    }

}
