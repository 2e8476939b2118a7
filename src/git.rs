use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use tracing::info;

use crate::checkout::PendingCheckoutRequest;
use crate::models::{Host, ItemKey};

/// Walk up from `start` to the enclosing git repository root.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(d) = dir {
        if d.join(".git").exists() {
            return Some(d.to_path_buf());
        }
        dir = d.parent();
    }
    None
}

/// Whether git tracks `path` (repo-relative or absolute).
pub fn is_tracked(root: &Path, path: &Path) -> bool {
    Command::new("git")
        .arg("-C")
        .arg(root)
        .arg("ls-files")
        .arg("--error-unmatch")
        .arg("--")
        .arg(path)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Captured result of one external checkout invocation.
#[derive(Debug, Clone)]
pub struct CheckoutOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Run the confirmed checkout. Blocking; callers put this on a worker
/// thread. Any non-empty stderr is treated as an error to surface,
/// independent of the exit status.
pub fn run_checkout(req: &PendingCheckoutRequest, revision: &str) -> Result<CheckoutOutput> {
    let args = req.command_args(revision);
    info!(workdir = %req.workdir.display(), command = %req.display_command(revision), "running git");
    let output = Command::new("git")
        .arg("-C")
        .arg(&req.workdir)
        .args(&args)
        .output()?;
    Ok(CheckoutOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
    })
}

/// Host-side persistence queries backed by the enclosing git repository.
/// Tracked-state answers are memoized per path: the query spawns a child
/// process, and cursoring through a large tree would otherwise fork git
/// once per row on the UI thread.
pub struct GitHost {
    root: PathBuf,
    tracked: RefCell<HashMap<String, bool>>,
}

impl GitHost {
    pub fn new(root: PathBuf) -> Self {
        GitHost {
            root,
            tracked: RefCell::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Host for GitHost {
    fn is_persisted(&self, key: &ItemKey) -> bool {
        if let Some(&hit) = self.tracked.borrow().get(key.as_str()) {
            return hit;
        }
        let tracked = is_tracked(&self.root, Path::new(key.as_str()));
        self.tracked.borrow_mut().insert(key.as_str().to_string(), tracked);
        tracked
    }

    fn resolve_path(&self, key: &ItemKey) -> Option<PathBuf> {
        let path = PathBuf::from(key.as_str());
        path.exists().then_some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn repo_root_found_from_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git")).unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        let root = find_repo_root(&dir.path().join("a/b")).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn no_repo_root_outside_a_repo() {
        let dir = tempfile::tempdir().unwrap();
        // tempdirs may live under a repo-free tree; guard with a subdir only
        if find_repo_root(dir.path()).is_none() {
            assert!(find_repo_root(&dir.path().join("x")).is_none());
        }
    }

    #[test]
    fn persistence_lookups_are_memoized() {
        let dir = tempfile::tempdir().unwrap();
        let host = GitHost::new(dir.path().to_path_buf());
        let key = ItemKey::new("ghost.txt");
        assert!(!host.is_persisted(&key));
        // a cached answer wins over what git would report
        host.tracked.borrow_mut().insert("ghost.txt".to_string(), true);
        assert!(host.is_persisted(&key));
    }

    #[test]
    fn resolve_path_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, b"x").unwrap();
        let host = GitHost::new(dir.path().to_path_buf());
        let key = ItemKey::from(file.as_path());
        assert!(host.resolve_path(&key).is_some());
        assert!(host.resolve_path(&ItemKey::new("/nonexistent/zzz")).is_none());
    }
}
