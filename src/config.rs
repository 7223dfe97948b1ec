//! Resolved run settings.
//!
//! The CLI fills a [`Config`] from flags and environment variables; the rest
//! of a run reads its choices from here.

use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::thread;

use crate::export::ExportFormat;
use crate::git::{default_cache_dir, DefaultGitClient, GitResult};
use crate::source::GoModSource;

/// Base name of the output document when none is given.
pub const DEFAULT_OUTPUT_STEM: &str = "output";

/// Stack reserved for the thread doing a run.
///
/// Building, exporting, reading and dropping a forest all recurse once per
/// tree level.
pub const WORKER_STACK_SIZE: usize = 512 * 1024 * 1024;

/// Runs `f` on a thread with a [`WORKER_STACK_SIZE`] stack and waits for it.
///
/// A panic on the worker is resumed on the caller.
pub fn run_on_worker<F, T>(f: F) -> io::Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let handle = thread::Builder::new()
        .name("dtree-worker".to_string())
        .stack_size(WORKER_STACK_SIZE)
        .spawn(f)?;

    match handle.join() {
        Ok(value) => Ok(value),
        Err(payload) => panic::resume_unwind(payload),
    }
}

/// Settings for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Checkout cache; `~/.dtree` when unset
    pub cache_dir: Option<PathBuf>,
    /// Output path; derived from the format when unset
    pub output: Option<PathBuf>,
    /// Output format
    pub format: ExportFormat,
    /// Run `go mod tidy` before `go mod graph`
    pub tidy: bool,
    /// Debug logging
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: None,
            output: None,
            format: ExportFormat::Json,
            tidy: true,
            verbose: false,
        }
    }
}

impl Config {
    /// Checkout cache directory, falling back to `~/.dtree`.
    pub fn cache_dir(&self) -> GitResult<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_cache_dir(),
        }
    }

    /// Where the output document goes.
    ///
    /// # Example
    ///
    /// ```
    /// use dtree::config::Config;
    /// use dtree::export::ExportFormat;
    /// use std::path::PathBuf;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.output_path(), PathBuf::from("output.json"));
    ///
    /// let config = Config { format: ExportFormat::Markdown, ..Config::default() };
    /// assert_eq!(config.output_path(), PathBuf::from("output.md"));
    /// ```
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => PathBuf::from(DEFAULT_OUTPUT_STEM).with_extension(extension(self.format)),
        }
    }

    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "dtree=debug"
        } else {
            "dtree=info"
        }
    }

    /// Git client rooted at the configured cache directory.
    pub fn git_client(&self) -> GitResult<DefaultGitClient> {
        DefaultGitClient::new(self.cache_dir()?)
    }

    /// Module graph source for a checkout.
    pub fn graph_source(&self, checkout: &Path) -> GoModSource {
        GoModSource::new(checkout).with_tidy(self.tidy)
    }
}

fn extension(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Json => "json",
        ExportFormat::Csv => "csv",
        ExportFormat::Markdown => "md",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::json::read_forest;
    use crate::parser::parse_mod_graph;
    use crate::tree::build_forest;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.tidy);
        assert!(!config.verbose);
        assert_eq!(config.format, ExportFormat::Json);
        assert_eq!(config.log_directive(), "dtree=info");
    }

    #[test]
    fn test_explicit_output_wins() {
        let config = Config {
            output: Some(PathBuf::from("forest.json")),
            format: ExportFormat::Csv,
            ..Config::default()
        };
        assert_eq!(config.output_path(), PathBuf::from("forest.json"));
    }

    #[test]
    fn test_output_follows_format() {
        let config = Config {
            format: ExportFormat::Csv,
            ..Config::default()
        };
        assert_eq!(config.output_path(), PathBuf::from("output.csv"));
    }

    #[test]
    fn test_verbose_directive() {
        let config = Config {
            verbose: true,
            ..Config::default()
        };
        assert_eq!(config.log_directive(), "dtree=debug");
    }

    #[test]
    fn test_explicit_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            cache_dir: Some(dir.path().join("cache")),
            ..Config::default()
        };

        assert_eq!(config.cache_dir().unwrap(), dir.path().join("cache"));
        let client = config.git_client().unwrap();
        assert!(client.cache_dir().is_dir());
    }

    #[test]
    fn test_worker_handles_very_deep_chain() {
        let depth = run_on_worker(|| {
            let edges: String = (0..50_000).map(|i| format!("m{} m{}\n", i, i + 1)).collect();
            let forest = build_forest(&parse_mod_graph(&edges)).unwrap();

            let json = serde_json::to_string(&forest).unwrap();
            let restored = read_forest(&json).unwrap();
            assert_eq!(restored, forest);

            let mut depth = 0;
            let mut node = &restored[0];
            while let Some(next) = node.dependencies.first() {
                node = next;
                depth += 1;
            }
            depth
        })
        .unwrap();

        assert_eq!(depth, 50_000);
    }

    #[test]
    #[should_panic(expected = "worker failed")]
    fn test_worker_panic_reaches_caller() {
        let _ = run_on_worker(|| panic!("worker failed"));
    }

    #[test]
    fn test_graph_source_points_at_checkout() {
        let config = Config::default();
        let source = config.graph_source(Path::new("/tmp/checkout"));
        assert_eq!(source.repo_path(), Path::new("/tmp/checkout"));
    }
}
