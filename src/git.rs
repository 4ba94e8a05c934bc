//! Git repository fetching for the published distribution.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::Duration;

use git2::build::CheckoutBuilder;
use git2::{FetchOptions, Repository};

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum GitError {
    #[error("failed to clone repository {url}: {source}")]
    CloneFailed { url: String, source: git2::Error },

    #[error("failed to fetch from repository {url}: {source}")]
    FetchFailed { url: String, source: git2::Error },

    #[error("failed to checkout ref '{git_ref}' in {url}: {source}")]
    CheckoutFailed {
        url: String,
        git_ref: String,
        source: git2::Error,
    },

    #[error("ref '{git_ref}' not found in {url}")]
    RefNotFound { url: String, git_ref: String },

    #[error("failed to create cache directory: {0}")]
    CacheDir(std::io::Error),

    #[error("failed to open cached repository: {0}")]
    OpenRepo(git2::Error),

    #[error("giving up on {url} after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        url: String,
        attempts: usize,
        last: Box<GitError>,
    },
}

// =============================================================================
// Repository location
// =============================================================================

/// A repository URL (or local path) and the ref to check out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    pub url: String,
    /// Branch, tag, or commit; `None` follows the remote's default branch
    pub git_ref: Option<String>,
}

// =============================================================================
// GitFetcher
// =============================================================================

/// Fetches and caches git repositories.
pub struct GitFetcher {
    cache_dir: PathBuf,
}

impl GitFetcher {
    /// Create a new GitFetcher that caches repositories in the given directory.
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Fetch a repository, retrying with a pause before each attempt.
    ///
    /// One attempt is made per entry of `delays_secs`, after sleeping that
    /// many seconds. An empty list still makes a single attempt.
    pub fn fetch_with_retry(
        &self,
        location: &RepoLocation,
        delays_secs: &[u64],
    ) -> Result<PathBuf, GitError> {
        let attempts = delays_secs.len().max(1);
        let mut attempt = 0;

        loop {
            let delay = delays_secs.get(attempt).copied().unwrap_or(0);
            if delay > 0 {
                tracing::info!(
                    "Retrying in {delay} seconds... (attempt {}/{attempts})",
                    attempt + 1
                );
                std::thread::sleep(Duration::from_secs(delay));
            }

            match self.fetch(location) {
                Ok(path) => return Ok(path),
                Err(e) if attempt + 1 < attempts => {
                    tracing::warn!(attempt = attempt + 1, error = %e, "fetch failed");
                    attempt += 1;
                }
                Err(e) => {
                    return Err(GitError::RetriesExhausted {
                        url: location.url.clone(),
                        attempts,
                        last: Box::new(e),
                    });
                }
            }
        }
    }

    /// Fetch a repository and return the local path to the checkout.
    ///
    /// If the repository is already cached, it will be updated (fetch + checkout).
    /// Otherwise, a fresh clone will be performed.
    pub fn fetch(&self, location: &RepoLocation) -> Result<PathBuf, GitError> {
        // Ensure cache directory exists
        std::fs::create_dir_all(&self.cache_dir).map_err(GitError::CacheDir)?;

        let repo_cache_dir = self.cache_dir.join(cache_key(location));

        if repo_cache_dir.exists() {
            self.update_repo(&repo_cache_dir, &location.url, location.git_ref.as_deref())?;
        } else {
            self.clone_repo(&repo_cache_dir, &location.url, location.git_ref.as_deref())?;
        }

        Ok(repo_cache_dir)
    }

    /// Clone a repository into the cache directory.
    fn clone_repo(
        &self,
        target_dir: &Path,
        url: &str,
        git_ref: Option<&str>,
    ) -> Result<(), GitError> {
        tracing::info!("Cloning {}...", url);

        let repo = match Repository::clone(url, target_dir) {
            Ok(repo) => repo,
            Err(e) => {
                // A half-written clone would be mistaken for a cached one next time
                let _ = std::fs::remove_dir_all(target_dir);
                return Err(GitError::CloneFailed {
                    url: url.to_string(),
                    source: e,
                });
            }
        };

        if let Some(git_ref) = git_ref {
            self.checkout_ref(&repo, url, git_ref)?;
        }

        Ok(())
    }

    /// Update an existing cached repository.
    fn update_repo(
        &self,
        repo_dir: &Path,
        url: &str,
        git_ref: Option<&str>,
    ) -> Result<(), GitError> {
        tracing::info!("Updating cached repository for {}...", url);

        let repo = Repository::open(repo_dir).map_err(GitError::OpenRepo)?;

        let mut remote = repo
            .find_remote("origin")
            .map_err(|e| GitError::FetchFailed {
                url: url.to_string(),
                source: e,
            })?;

        let mut fetch_options = FetchOptions::new();
        remote
            .fetch(&[] as &[&str], Some(&mut fetch_options), None)
            .map_err(|e| GitError::FetchFailed {
                url: url.to_string(),
                source: e,
            })?;

        match git_ref {
            Some(git_ref) => self.checkout_ref(&repo, url, git_ref),
            None => self.checkout_remote_head(&repo, url),
        }
    }

    /// Check out whatever the remote's default branch points at.
    fn checkout_remote_head(&self, repo: &Repository, url: &str) -> Result<(), GitError> {
        let object = ["origin/HEAD", "HEAD"]
            .iter()
            .find_map(|spec| repo.revparse_single(spec).ok())
            .ok_or_else(|| GitError::RefNotFound {
                url: url.to_string(),
                git_ref: "origin/HEAD".to_string(),
            })?;

        let checkout_failed = |e| GitError::CheckoutFailed {
            url: url.to_string(),
            git_ref: "origin/HEAD".to_string(),
            source: e,
        };
        repo.checkout_tree(&object, Some(CheckoutBuilder::new().force()))
            .map_err(checkout_failed)?;
        repo.set_head_detached(object.id()).map_err(checkout_failed)?;

        Ok(())
    }

    /// Checkout a specific ref (branch, tag, or commit).
    fn checkout_ref(&self, repo: &Repository, url: &str, git_ref: &str) -> Result<(), GitError> {
        let object = self.resolve_ref(repo, url, git_ref)?;

        let checkout_failed = |e| GitError::CheckoutFailed {
            url: url.to_string(),
            git_ref: git_ref.to_string(),
            source: e,
        };

        repo.checkout_tree(&object, Some(CheckoutBuilder::new().force()))
            .map_err(checkout_failed)?;

        // The pulled files are only read, so a detached HEAD is enough
        repo.set_head_detached(object.id()).map_err(checkout_failed)?;

        Ok(())
    }

    /// Resolve a ref string to a git object.
    ///
    /// Tries the following in order:
    /// 1. Remote branch (origin/ref), so updates see freshly fetched commits
    /// 2. Local branch
    /// 3. Tag
    /// 4. Commit SHA (full or abbreviated)
    fn resolve_ref<'a>(
        &self,
        repo: &'a Repository,
        url: &str,
        git_ref: &str,
    ) -> Result<git2::Object<'a>, GitError> {
        let remote_ref = format!("origin/{}", git_ref);
        if let Ok(branch) = repo.find_branch(&remote_ref, git2::BranchType::Remote)
            && let Some(target) = branch.get().target()
            && let Ok(obj) = repo.find_object(target, None)
        {
            return Ok(obj);
        }

        if let Ok(branch) = repo.find_branch(git_ref, git2::BranchType::Local)
            && let Some(target) = branch.get().target()
            && let Ok(obj) = repo.find_object(target, None)
        {
            return Ok(obj);
        }

        if let Ok(reference) = repo.find_reference(&format!("refs/tags/{}", git_ref))
            && let Ok(obj) = reference.peel(git2::ObjectType::Any)
        {
            return Ok(obj);
        }

        // revparse handles partial SHAs too
        if let Ok(obj) = repo.revparse_single(git_ref) {
            return Ok(obj);
        }

        Err(GitError::RefNotFound {
            url: url.to_string(),
            git_ref: git_ref.to_string(),
        })
    }
}

/// Generate a cache key (directory name) from a location.
///
/// Uses a hash of the URL and ref to create a short, filesystem-safe name.
fn cache_key(location: &RepoLocation) -> String {
    let mut hasher = DefaultHasher::new();
    location.url.hash(&mut hasher);
    if let Some(git_ref) = &location.git_ref {
        git_ref.hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;

    /// Create a repository at `dir` with one commit holding `files`.
    pub(crate) fn init_repo(dir: &Path, files: &[(&str, &str)]) {
        let repo = Repository::init(dir).unwrap();
        for (name, content) in files {
            std::fs::write(dir.join(name), content).unwrap();
        }

        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let signature = git2::Signature::now("distprep", "distprep@example.com").unwrap();
        repo.commit(Some("HEAD"), &signature, &signature, "publish", &tree, &[])
            .unwrap();
    }

    fn location(path: &Path) -> RepoLocation {
        RepoLocation {
            url: path.to_string_lossy().into_owned(),
            git_ref: None,
        }
    }

    #[test]
    fn test_cache_key_depends_on_ref() {
        let main = RepoLocation {
            url: "https://github.com/example/dist".to_string(),
            git_ref: Some("main".to_string()),
        };
        let release = RepoLocation {
            git_ref: Some("release".to_string()),
            ..main.clone()
        };

        assert_eq!(cache_key(&main), cache_key(&main.clone()));
        assert_ne!(cache_key(&main), cache_key(&release));
        assert_eq!(cache_key(&main).len(), 16);
    }

    #[test]
    fn test_clone_then_update() {
        let dir = TempDir::new().unwrap();
        let origin = dir.path().join("origin");
        std::fs::create_dir(&origin).unwrap();
        init_repo(&origin, &[("main.js", "v1")]);

        let fetcher = GitFetcher::new(dir.path().join("cache"));
        let checkout = fetcher.fetch(&location(&origin)).unwrap();
        assert_eq!(std::fs::read_to_string(checkout.join("main.js")).unwrap(), "v1");

        // Second fetch goes through the update path and lands in the same place
        let again = fetcher.fetch(&location(&origin)).unwrap();
        assert_eq!(again, checkout);
        assert!(again.join("main.js").exists());
    }

    #[test]
    fn test_retries_are_exhausted() {
        let dir = TempDir::new().unwrap();
        let fetcher = GitFetcher::new(dir.path().join("cache"));
        let missing = location(&dir.path().join("no-such-repo"));

        let result = fetcher.fetch_with_retry(&missing, &[0, 0]);

        assert!(matches!(
            result,
            Err(GitError::RetriesExhausted { attempts: 2, .. })
        ));
    }
}
