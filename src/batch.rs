// src/batch.rs
//
// Directory traversal and per-file processing for the expand pass. Files are
// independent: any per-file failure is recorded and the batch continues.
// A file is written back only when at least one mutation occurred, so
// untouched files keep their modification time.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::engine::{apply_rules, FileOutcome};
use crate::rules::Rule;

const EXTENSIONS: &[&str] = &["html", "htm"];

/// Version-control and dependency directories never worth descending into.
const SKIP_DIRS: &[&str] = &[".git", ".hg", ".svn", "node_modules"];

/// One per-file failure, kept for the batch summary.
#[derive(Clone, Debug, Serialize)]
pub struct FileError {
    pub path: String,
    pub message: String,
}

/// Batch aggregate across all processed documents.
#[derive(Debug, Default, Serialize)]
pub struct RunStats {
    pub files_scanned: u64,
    pub files_modified: u64,
    pub rule_totals: BTreeMap<String, u64>,
    pub errors: Vec<FileError>,
    pub dry_run: bool,
}

impl RunStats {
    fn merge(&mut self, outcome: &FileOutcome) {
        for (name, count) in &outcome.counts {
            *self.rule_totals.entry((*name).to_string()).or_insert(0) += count;
        }
        if outcome.changed {
            self.files_modified += 1;
        }
    }
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

fn process_file(path: &Path, rules: &[Rule], dry_run: bool) -> Result<FileOutcome> {
    let src = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let (out, outcome) = apply_rules(&src, rules);
    if outcome.changed && !dry_run {
        fs::write(path, out).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(outcome)
}

/// Run the rule table over every HTML file under `root`. Hidden files,
/// hidden directories, and the directories in SKIP_DIRS are skipped.
pub fn expand_tree(root: &Path, rules: &[Rule], dry_run: bool) -> Result<RunStats> {
    if !root.is_dir() {
        bail!("not a directory: {}", root.display());
    }

    let mut stats = RunStats {
        dry_run,
        ..RunStats::default()
    };

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_str().unwrap_or("");
            if e.file_type().is_dir() {
                // depth 0 is the root itself, which may be "." or a dotdir.
                e.depth() == 0 || (!SKIP_DIRS.contains(&name) && !name.starts_with('.'))
            } else {
                !name.starts_with('.')
            }
        });

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                stats.errors.push(FileError {
                    path: err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                    message: err.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_html(entry.path()) {
            continue;
        }

        stats.files_scanned += 1;
        match process_file(entry.path(), rules, dry_run) {
            Ok(outcome) => {
                if outcome.changed {
                    debug!(
                        "{}: {} mutation(s)",
                        entry.path().display(),
                        outcome.total()
                    );
                }
                stats.merge(&outcome);
            }
            Err(err) => stats.errors.push(FileError {
                path: entry.path().display().to_string(),
                message: format!("{err:#}"),
            }),
        }
    }

    info!(
        "scanned {} file(s), modified {}, {} error(s)",
        stats.files_scanned,
        stats.files_modified,
        stats.errors.len()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::DEFAULT_RULES;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn tree_is_processed_and_second_run_is_clean() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.html", "<details><summary>Q</summary></details>");
        write(dir.path(), "sub/b.htm", "<div class=\"ac-panel\">A</div>");
        write(dir.path(), "sub/c.css", "details { display: block }");
        write(dir.path(), ".git/d.html", "<details></details>");
        write(dir.path(), ".hidden.html", "<details></details>");

        let stats = expand_tree(dir.path(), DEFAULT_RULES, false).unwrap();
        assert_eq!(stats.files_scanned, 2);
        assert_eq!(stats.files_modified, 2);
        assert_eq!(stats.rule_totals["details-open"], 1);
        assert_eq!(stats.rule_totals["panel-show"], 1);

        // Skipped files are untouched.
        let skipped = fs::read_to_string(dir.path().join(".git/d.html")).unwrap();
        assert_eq!(skipped, "<details></details>");

        let again = expand_tree(dir.path(), DEFAULT_RULES, false).unwrap();
        assert_eq!(again.files_modified, 0);
        assert!(again.rule_totals.is_empty());
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.html", "<details></details>");

        let stats = expand_tree(dir.path(), DEFAULT_RULES, true).unwrap();
        assert_eq!(stats.files_modified, 1);
        assert_eq!(stats.rule_totals["details-open"], 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("a.html")).unwrap(),
            "<details></details>"
        );
    }

    #[test]
    fn unreadable_file_is_an_error_not_an_abort() {
        let dir = TempDir::new().unwrap();
        // Invalid UTF-8 makes read_to_string fail.
        fs::write(dir.path().join("bad.html"), [0xff, 0xfe, 0x00]).unwrap();
        write(dir.path(), "good.html", "<details></details>");

        let stats = expand_tree(dir.path(), DEFAULT_RULES, false).unwrap();
        assert_eq!(stats.files_scanned, 2);
        assert_eq!(stats.files_modified, 1);
        assert_eq!(stats.errors.len(), 1);
        assert!(stats.errors[0].path.ends_with("bad.html"));
    }

    #[test]
    fn missing_root_fails_up_front() {
        assert!(expand_tree(Path::new("/nonexistent/root"), DEFAULT_RULES, false).is_err());
    }
}
