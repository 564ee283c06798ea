//! HTTP downloads of customization sources.

use crate::ScratchDir;
use rigger_core::{Downloader, Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Downloads a URL into a scratch file named for the scenario suffix.
///
/// Uses a blocking client; call it from a blocking context.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: reqwest::blocking::Client,
    scratch: ScratchDir,
}

impl HttpDownloader {
    pub fn new(scratch: ScratchDir) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            scratch,
        }
    }

    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, String> {
        let response = self.client.get(url).send().map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("unexpected status {}", status));
        }
        let body = response.bytes().map_err(|e| e.to_string())?;
        Ok(body.to_vec())
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, suffix: &str) -> Result<PathBuf> {
        info!(url, "Downloading file");
        let download_error = |message: String| Error::Download {
            url: url.to_string(),
            message,
        };

        let body = self.fetch(url).map_err(download_error)?;
        let path = self
            .scratch
            .write(suffix, "", &body)
            .map_err(|e| download_error(e.to_string()))?;
        info!(url, path = %path.display(), bytes = body.len(), "Downloaded file");
        Ok(path)
    }
}
