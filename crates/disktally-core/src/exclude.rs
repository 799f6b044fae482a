/// Exclusion patterns given with `--exclude` and `--exclude-from`.
///
/// A pattern matches a path when it matches the whole path or any suffix
/// that starts right after a `/`. So `*.tmp` excludes `/a/b/x.tmp` and
/// `node_modules` excludes every directory of that name.
use std::fs;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<String>,
}

impl ExcludeSet {
    pub fn add(&mut self, pattern: impl Into<String>) {
        self.patterns.push(pattern.into());
    }

    /// Add one pattern per non-empty line of `path`.
    pub fn add_from_file(&mut self, path: &Path) -> io::Result<()> {
        let contents = fs::read_to_string(path)?;
        let before = self.patterns.len();
        for line in contents.lines() {
            let line = line.trim_end_matches('\r');
            if !line.is_empty() {
                self.patterns.push(line.to_string());
            }
        }
        tracing::debug!(
            "Loaded {} exclude patterns from {}",
            self.patterns.len() - before,
            path.display()
        );
        Ok(())
    }

    pub fn clear(&mut self) {
        self.patterns.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether `path` (absolute, `/`-separated) is excluded.
    pub fn matches(&self, path: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let mut suffixes = std::iter::once(path).chain(
            path.match_indices('/')
                .map(|(i, _)| &path[i + 1..])
                .filter(|s| !s.is_empty()),
        );
        suffixes.any(|candidate| self.patterns.iter().any(|p| glob_match::glob_match(p, candidate)))
    }
}
