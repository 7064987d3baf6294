// src/slug.rs
//
// Filename normalization for one designated folder (non-recursive):
// lowercase, spaces to '-', anything outside [a-z0-9-] dropped, runs of '-'
// collapsed, leading/trailing '-' trimmed, extension lowercased.

use std::fs;
use std::path::Path;

use anyhow::{bail, Result};
use same_file::is_same_file;
use serde::Serialize;
use tracing::{debug, info};

use crate::batch::FileError;

pub const SEPARATOR: char = '-';

const EXTENSIONS: &[&str] = &["html", "htm"];

/// Canonical slug of a filename stem.
pub fn slug_stem(stem: &str) -> String {
    let mut filtered = String::with_capacity(stem.len());
    for c in stem.chars() {
        let c = c.to_ascii_lowercase();
        if c == ' ' {
            filtered.push(SEPARATOR);
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() || c == SEPARATOR {
            filtered.push(c);
        }
        // everything else is dropped
    }

    let mut out = String::with_capacity(filtered.len());
    let mut prev_sep = false;
    for c in filtered.chars() {
        if c == SEPARATOR {
            if !prev_sep {
                out.push(c);
            }
            prev_sep = true;
        } else {
            out.push(c);
            prev_sep = false;
        }
    }
    out.trim_matches(SEPARATOR).to_string()
}

/// Outcome of one rename pass.
#[derive(Debug, Default, Serialize)]
pub struct RenameStats {
    pub files_seen: u64,
    pub renamed: u64,
    pub unchanged: u64,
    pub errors: Vec<FileError>,
}

/// Rename every `.html`/`.htm` file directly inside `dir` to its slug form.
///
/// A file whose slug target already exists as a *different* file is skipped
/// and recorded as an error rather than silently overwritten. Dotfiles are
/// ignored.
pub fn rename_folder(dir: &Path, dry_run: bool) -> Result<RenameStats> {
    if !dir.is_dir() {
        bail!("not a directory: {}", dir.display());
    }

    let mut stats = RenameStats::default();

    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                stats.errors.push(FileError {
                    path: dir.display().to_string(),
                    message: err.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let path = Path::new(&name);
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        stats.files_seen += 1;

        let slug = slug_stem(stem);
        if slug.is_empty() {
            stats.errors.push(FileError {
                path: name.clone(),
                message: "name slugs to nothing".to_string(),
            });
            continue;
        }

        let new_name = format!("{}.{}", slug, ext.to_ascii_lowercase());
        if new_name == name {
            debug!("unchanged: {name}");
            stats.unchanged += 1;
            continue;
        }

        let target = dir.join(&new_name);
        // A case-only rename on a case-insensitive filesystem makes the
        // target "exist" already; only a genuinely distinct file is a clash.
        if target.exists() && !is_same_file(entry.path(), &target).unwrap_or(false) {
            stats.errors.push(FileError {
                path: name.clone(),
                message: format!("target already exists: {new_name}"),
            });
            continue;
        }

        if !dry_run {
            if let Err(err) = fs::rename(entry.path(), &target) {
                stats.errors.push(FileError {
                    path: name.clone(),
                    message: err.to_string(),
                });
                continue;
            }
        }
        debug!("renamed: {name} -> {new_name}");
        stats.renamed += 1;
    }

    info!(
        "rename pass over {}: {} seen, {} renamed, {} unchanged, {} errors",
        dir.display(),
        stats.files_seen,
        stats.renamed,
        stats.unchanged,
        stats.errors.len()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn slug_examples() {
        assert_eq!(slug_stem("My Photo!!  2024"), "my-photo-2024");
        assert_eq!(slug_stem("---leading---"), "leading");
        assert_eq!(slug_stem("already-canonical"), "already-canonical");
        assert_eq!(slug_stem("!!!"), "");
    }

    #[test]
    fn rename_pass_renames_and_reports_unchanged() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("My Photo!!  2024.HTML")).unwrap();
        File::create(dir.path().join("already-canonical.html")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();

        let stats = rename_folder(dir.path(), false).unwrap();
        assert_eq!(stats.files_seen, 2);
        assert_eq!(stats.renamed, 1);
        assert_eq!(stats.unchanged, 1);
        assert!(stats.errors.is_empty());
        assert!(dir.path().join("my-photo-2024.html").exists());
        assert!(!dir.path().join("My Photo!!  2024.HTML").exists());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn slug_collision_is_flagged_not_overwritten() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("My Page.html"), "one").unwrap();
        std::fs::write(dir.path().join("my-page.html"), "two").unwrap();

        let stats = rename_folder(dir.path(), false).unwrap();
        assert_eq!(stats.errors.len(), 1);
        assert!(stats.errors[0].message.contains("already exists"));
        // The survivor keeps its content.
        assert_eq!(
            std::fs::read_to_string(dir.path().join("my-page.html")).unwrap(),
            "two"
        );
    }

    #[test]
    fn case_variant_of_existing_file_is_flagged_not_clobbered() {
        // On a case-sensitive filesystem these are two distinct files; the
        // case-only rename of the first must not overwrite the second.
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Photo.html"), "one").unwrap();
        std::fs::write(dir.path().join("photo.html"), "two").unwrap();

        let stats = rename_folder(dir.path(), false).unwrap();
        assert_eq!(stats.errors.len(), 1);
        assert!(stats.errors[0].message.contains("already exists"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("photo.html")).unwrap(),
            "two"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Photo.html")).unwrap(),
            "one"
        );
    }

    #[test]
    fn dry_run_touches_nothing() {
        let dir = TempDir::new().unwrap();
        File::create(dir.path().join("My Page.html")).unwrap();

        let stats = rename_folder(dir.path(), true).unwrap();
        assert_eq!(stats.renamed, 1);
        assert!(dir.path().join("My Page.html").exists());
        assert!(!dir.path().join("my-page.html").exists());
    }

    #[test]
    fn subdirectories_are_not_entered() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        File::create(dir.path().join("sub").join("My Page.html")).unwrap();

        let stats = rename_folder(dir.path(), false).unwrap();
        assert_eq!(stats.files_seen, 0);
        assert!(dir.path().join("sub").join("My Page.html").exists());
    }
}
