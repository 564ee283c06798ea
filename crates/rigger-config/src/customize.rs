//! File-staging and source-repository configuration for apps.

use rigger_core::{
    BASE_DIR_TOKEN, DEFAULT_BRANCH, DEFAULT_FILE_MODE, Customization, Downloader, Error,
    Repository, Result,
};
use tracing::{debug, info};

/// Resolve a customization's source, mode and destination for an app.
///
/// HTTP sources are downloaded, relative sources are tagged with
/// [`BASE_DIR_TOKEN`] for the caller to resolve, and relative destinations
/// are placed under `app_dest`.
pub fn configure_customization<D: Downloader>(
    custom: &mut Customization,
    suffix: &str,
    app_dest: &str,
    downloader: &D,
) -> Result<()> {
    if custom.src.starts_with("http") {
        info!(url = %custom.src, "Downloading customization source");
        let local = downloader.download(&custom.src, suffix)?;
        custom.src = local.to_string_lossy().into_owned();
    } else if !custom.src.starts_with('/') && !custom.src.starts_with(BASE_DIR_TOKEN) {
        custom.src = format!("{}/{}", BASE_DIR_TOKEN, custom.src);
    }

    if custom.mode == 0 {
        custom.mode = DEFAULT_FILE_MODE;
    }

    if !custom.dest.starts_with('/') && !custom.dest.starts_with('~') {
        custom.dest = format!("{}/{}", app_dest.trim_end_matches('/'), custom.dest);
    }
    custom.dest_folder = custom
        .dest
        .rfind('/')
        .map(|i| custom.dest[..i].to_string())
        .unwrap_or_default();

    debug!(src = %custom.src, dest = %custom.dest, mode = custom.mode, "Configured customization");
    Ok(())
}

/// Validate a repository's SSH URL and default its branch.
///
/// Only alias-style URLs (`ssh://host/org/repo.git`, or a `~/.ssh/config`
/// host alias) are accepted; URLs embedding a login (`git@...`) are rejected.
pub fn configure_repository(repo: &mut Repository) -> Result<()> {
    if repo.ssh_url.contains('@') || !repo.ssh_url.contains(".git") {
        return Err(Error::InvalidRepository(repo.ssh_url.clone()));
    }
    if repo.branch.is_empty() {
        repo.branch = DEFAULT_BRANCH.to_string();
    }
    Ok(())
}
