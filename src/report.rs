// src/report.rs
//
// Run summary rendering, text and JSON.

use std::fmt::Write;

use anyhow::Result;
use clap::ValueEnum;

use crate::batch::{FileError, RunStats};
use crate::slug::RenameStats;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn push_errors(out: &mut String, errors: &[FileError]) {
    if errors.is_empty() {
        return;
    }
    out.push_str("errors:\n");
    for e in errors {
        let _ = writeln!(out, "  {}: {}", e.path, e.message);
    }
}

/// Render the expand-pass summary.
pub fn render_expand(stats: &RunStats, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(stats)?),
        OutputFormat::Text => {
            let mut out = String::new();
            let verb = if stats.dry_run { "would modify" } else { "modified" };
            let _ = writeln!(
                out,
                "scanned {} file(s), {} {}",
                stats.files_scanned, verb, stats.files_modified
            );
            if stats.rule_totals.is_empty() {
                out.push_str("no changes needed\n");
            } else {
                for (rule, count) in &stats.rule_totals {
                    let _ = writeln!(out, "  {rule:<16} {count}");
                }
            }
            push_errors(&mut out, &stats.errors);
            Ok(out)
        }
    }
}

/// Render the rename-pass summary.
pub fn render_rename(stats: &RenameStats, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(stats)?),
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "{} file(s) seen, {} renamed, {} unchanged",
                stats.files_seen, stats.renamed, stats.unchanged
            );
            push_errors(&mut out, &stats.errors);
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_summary_lists_rule_totals() {
        let mut stats = RunStats::default();
        stats.files_scanned = 3;
        stats.files_modified = 1;
        stats.rule_totals.insert("details-open".to_string(), 2);

        let text = render_expand(&stats, OutputFormat::Text).unwrap();
        assert!(text.contains("scanned 3 file(s), modified 1"));
        assert!(text.contains("details-open"));
    }

    #[test]
    fn dry_run_summary_uses_conditional_wording() {
        let stats = RunStats {
            dry_run: true,
            ..RunStats::default()
        };
        let text = render_expand(&stats, OutputFormat::Text).unwrap();
        assert!(text.contains("would modify"));
    }

    #[test]
    fn json_summary_is_machine_readable() {
        let stats = RunStats::default();
        let json = render_expand(&stats, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["files_scanned"], 0);
        assert!(value["rule_totals"].is_object());
    }
}
