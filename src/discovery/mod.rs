use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub mod triplet;
pub use triplet::{BandFileSet, BandLists, Pairing, search_band_triplet};

// fnmatch semantics: `*` also matches leading dots and separators never occur in a name.
const NAME_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// One directory walk selecting files by name pattern and extension.
#[derive(Debug, Clone)]
pub struct DiscoveryQuery {
    pub root: PathBuf,
    pub patterns: Vec<String>,
    pub extension: String,
    pub recurse: bool,
}

impl DiscoveryQuery {
    pub fn new<P: AsRef<Path>>(root: P, patterns: &[&str], extension: &str, recurse: bool) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            extension: extension.to_string(),
            recurse,
        }
    }

    /// Sorted absolute paths of the matching regular files. Errors are logged and
    /// yield an empty list.
    pub fn run(&self) -> Vec<PathBuf> {
        match self.try_run() {
            Ok(files) => {
                debug!(
                    "{} file(s) found that match {:?} .{} in {}",
                    files.len(),
                    self.patterns,
                    self.extension,
                    self.root.display()
                );
                files
            }
            Err(e) => {
                warn!("error while listing {}: {}", self.root.display(), e);
                Vec::new()
            }
        }
    }

    fn try_run(&self) -> Result<Vec<PathBuf>, String> {
        let root = std::path::absolute(&self.root).map_err(|e| e.to_string())?;
        if !root.is_dir() {
            return Err("not a directory".to_string());
        }

        // The pattern describes the name without its extension.
        let patterns = self
            .patterns
            .iter()
            .map(|p| Pattern::new(&format!("{}.{}", p, self.extension)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid pattern: {}", e))?;
        let extension = self.extension.to_lowercase();

        let max_depth = if self.recurse { usize::MAX } else { 1 };
        let mut files = Vec::new();

        for entry in WalkDir::new(&root).min_depth(1).max_depth(max_depth) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(e.to_string()),
                Err(e) => {
                    warn!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            // Symlinked band files count, symlinked directories are not entered.
            if !entry.path().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if !name.to_lowercase().ends_with(&extension) {
                continue;
            }
            if patterns.iter().any(|p| p.matches_with(&name, NAME_MATCH)) {
                files.push(entry.into_path());
            }
        }

        files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        Ok(files)
    }
}

/// Lists files under `directory` whose name matches any of `patterns` once
/// `.{extension}` is appended.
pub fn list_files<P: AsRef<Path>>(
    patterns: &[&str],
    directory: P,
    extension: &str,
    recurse: bool,
) -> Vec<PathBuf> {
    DiscoveryQuery::new(directory, patterns, extension, recurse).run()
}
