use std::path::{Path, PathBuf};

use tracing::debug;

use crate::models::Item;

/// Suffix of the optional metadata sidecar kept next to a file.
pub const SIDECAR_SUFFIX: &str = ".meta";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutMode {
    /// Restore from the remote default branch; the revision is fixed.
    MainBranch,
    /// Restore from a commit the user types into the confirmation popup.
    Sha,
}

/// A user-confirmable description of one checkout invocation. Exists only
/// between the menu action and the popup's confirm/dismiss; it never runs
/// anything itself.
#[derive(Debug, Clone)]
pub struct PendingCheckoutRequest {
    pub mode: CheckoutMode,
    pub workdir: PathBuf,
    /// Repo-relative paths, unquoted. First the file, then its sidecar when
    /// one exists on disk.
    pub paths: Vec<String>,
    /// `Some` in main-branch mode, `None` in SHA mode until the popup
    /// collects the revision.
    pub revision: Option<String>,
}

impl PendingCheckoutRequest {
    /// Argument vector for the external git invocation.
    pub fn command_args(&self, revision: &str) -> Vec<String> {
        let mut args = vec!["checkout".to_string(), revision.to_string(), "--".to_string()];
        args.extend(self.paths.iter().cloned());
        args
    }

    /// The literal command line shown to the user before confirmation.
    pub fn display_command(&self, revision: &str) -> String {
        let quoted: Vec<String> = self.paths.iter().map(|p| format!("\"{p}\"")).collect();
        format!("checkout {} -- {}", revision, quoted.join(" "))
    }
}

fn relative_to(path: &Path, workdir: &Path) -> String {
    path.strip_prefix(workdir)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

fn collect_paths(item_path: &Path, workdir: &Path) -> Vec<String> {
    let rel = relative_to(item_path, workdir);
    let mut paths = vec![rel.clone()];
    let sidecar = format!("{rel}{SIDECAR_SUFFIX}");
    if workdir.join(&sidecar).exists() {
        paths.push(sidecar);
    }
    paths
}

/// Build a checkout-from-default-branch request for a path-backed item.
/// Returns `None` when the item has no resolvable path; callers disable the
/// menu entry in that case, so this is belt and braces.
pub fn begin_main_checkout(
    item: &Item,
    workdir: &Path,
    default_branch: &str,
) -> Option<PendingCheckoutRequest> {
    let path = item.path.as_deref()?;
    debug!(key = item.key.as_str(), "main-branch checkout requested");
    Some(PendingCheckoutRequest {
        mode: CheckoutMode::MainBranch,
        workdir: workdir.to_path_buf(),
        paths: collect_paths(path, workdir),
        revision: Some(default_branch.to_string()),
    })
}

/// Build a checkout-from-SHA request; the revision stays open until the
/// confirmation popup collects it.
pub fn begin_sha_checkout(item: &Item, workdir: &Path) -> Option<PendingCheckoutRequest> {
    let path = item.path.as_deref()?;
    debug!(key = item.key.as_str(), "sha checkout requested");
    Some(PendingCheckoutRequest {
        mode: CheckoutMode::Sha,
        workdir: workdir.to_path_buf(),
        paths: collect_paths(path, workdir),
        revision: None,
    })
}

/// Handle to a queued confirmation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmToken(u64);

/// Two-phase hand-off between a menu action and the popup shown on a later
/// frame: `request` parks the pending request and returns a token, `show`
/// redeems the token exactly once. A newer request invalidates older tokens,
/// so a popup can never surface a stale file list.
#[derive(Default)]
pub struct ConfirmationQueue {
    next: u64,
    slot: Option<(u64, PendingCheckoutRequest)>,
}

impl ConfirmationQueue {
    pub fn request(&mut self, pending: PendingCheckoutRequest) -> ConfirmToken {
        self.next += 1;
        self.slot = Some((self.next, pending));
        ConfirmToken(self.next)
    }

    pub fn show(&mut self, token: ConfirmToken) -> Option<PendingCheckoutRequest> {
        match &self.slot {
            Some((id, _)) if *id == token.0 => self.slot.take().map(|(_, req)| req),
            _ => None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.slot.is_some()
    }
}
