//! Shallow repository checkouts for module graph generation.
//!
//! Checkouts live under a cache directory as `<repo-name>-<reference>`. A
//! checkout that already exists is refreshed with `git fetch` instead of
//! being cloned again.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

/// Name of the cache directory created under the user's home directory.
pub const DEFAULT_CACHE_DIR_NAME: &str = ".dtree";

/// Errors that can occur while obtaining a checkout.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// No cache directory was configured and the home directory is unknown.
    #[error("cannot determine home directory for the checkout cache")]
    NoHomeDir,

    /// The cache directory could not be created.
    #[error("failed to create cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `git` could not be started.
    #[error("failed to run git: {0}")]
    Spawn(#[source] io::Error),

    /// `git clone` exited unsuccessfully.
    #[error("git clone of {url} at {reference} failed")]
    CloneFailed { url: String, reference: String },

    /// `git fetch` exited unsuccessfully.
    #[error("git fetch of {reference} in {path} failed")]
    FetchFailed { path: PathBuf, reference: String },
}

/// Result type alias for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Obtains a local checkout of a repository at a tag or branch.
pub trait GitClient {
    /// Returns the path of a checkout of `repo` at `reference`.
    fn clone_at(&self, repo: &str, reference: &str) -> GitResult<PathBuf>;
}

/// [`GitClient`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct DefaultGitClient {
    cache_dir: PathBuf,
}

impl DefaultGitClient {
    /// Creates a client caching checkouts in `cache_dir`, creating it if needed.
    pub fn new(cache_dir: impl Into<PathBuf>) -> GitResult<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir).map_err(|source| GitError::CacheDir {
            path: cache_dir.clone(),
            source,
        })?;
        Ok(Self { cache_dir })
    }

    /// Directory holding the checkouts.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Where the checkout of `repo` at `reference` lives.
    pub fn checkout_path(&self, repo: &str, reference: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}-{}", repo_dir_name(repo), reference))
    }

    fn fetch(&self, path: &Path, reference: &str) -> GitResult<()> {
        debug!(path = %path.display(), reference, "checkout exists, fetching");
        let status = Command::new("git")
            .arg("-C")
            .arg(path)
            .args(["fetch", "origin", reference])
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(GitError::Spawn)?;

        if !status.success() {
            return Err(GitError::FetchFailed {
                path: path.to_path_buf(),
                reference: reference.to_string(),
            });
        }
        Ok(())
    }

    fn clone_shallow(&self, url: &str, reference: &str, dest: &Path) -> GitResult<()> {
        info!(url, reference, dest = %dest.display(), "cloning repository");
        let status = Command::new("git")
            .args(["clone", "--depth", "1", "--branch", reference, url])
            .arg(dest)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(GitError::Spawn)?;

        if !status.success() {
            return Err(GitError::CloneFailed {
                url: url.to_string(),
                reference: reference.to_string(),
            });
        }
        Ok(())
    }
}

impl GitClient for DefaultGitClient {
    fn clone_at(&self, repo: &str, reference: &str) -> GitResult<PathBuf> {
        let dest = self.checkout_path(repo, reference);

        if dest.exists() {
            self.fetch(&dest, reference)?;
        } else {
            self.clone_shallow(&normalize_git_url(repo), reference, &dest)?;
        }

        Ok(dest)
    }
}

/// Returns `~/.dtree`.
pub fn default_cache_dir() -> GitResult<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_CACHE_DIR_NAME))
        .ok_or(GitError::NoHomeDir)
}

/// Turns a bare repository path into a clonable HTTPS URL.
///
/// Inputs that already look like a URL (`http://`, `https://`) or end in
/// `.git` are returned unchanged.
///
/// # Example
///
/// ```
/// use dtree::git::normalize_git_url;
///
/// assert_eq!(normalize_git_url("github.com/etcd-io/etcd"), "https://github.com/etcd-io/etcd.git");
/// assert_eq!(normalize_git_url("https://github.com/etcd-io/etcd"), "https://github.com/etcd-io/etcd");
/// ```
pub fn normalize_git_url(input: &str) -> String {
    if input.starts_with("http://") || input.starts_with("https://") || input.ends_with(".git") {
        input.to_string()
    } else {
        format!("https://{}.git", input)
    }
}

/// Last path segment of a repository reference, without a `.git` suffix.
pub fn repo_dir_name(repo: &str) -> &str {
    let trimmed = repo.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last)
}
