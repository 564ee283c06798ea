//! Download collaborator used for HTTP-sourced customizations.

use std::path::PathBuf;

use crate::Result;

/// Materializes a remote file locally.
///
/// Implementations fail fast; retry policy belongs to the caller.
pub trait Downloader {
    /// Fetch `url` into a local file namespaced by `suffix` and return its path.
    fn download(&self, url: &str, suffix: &str) -> Result<PathBuf>;
}

impl<D: Downloader + ?Sized> Downloader for &D {
    fn download(&self, url: &str, suffix: &str) -> Result<PathBuf> {
        (**self).download(url, suffix)
    }
}
