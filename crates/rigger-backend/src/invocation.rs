//! Caller-supplied settings applied to compiled actions before they run.

use rigger_core::{Action, BASE_DIR_TOKEN};
use std::path::{Path, PathBuf};

/// Values that come from the command line rather than the scenario.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Directory of the scenario file; resolves `@BASEDIR` sources.
    pub base_dir: PathBuf,
    /// SSH key for repository checkouts that do not name one.
    pub git_key: String,
    pub private_key: String,
    /// Inventory file passed to the backend.
    pub inventory: String,
    /// Directory holding the backend's plays.
    pub playbook_path: String,
    pub debug: u8,
}

impl Invocation {
    /// Fill in the caller-side fields of `action`.
    pub fn prepare(&self, action: &mut Action) -> std::io::Result<()> {
        if let Some(repo) = action.repository.as_mut() {
            if repo.ssh_key.is_empty() {
                repo.ssh_key = self.git_key.clone();
            }
        }

        if !self.playbook_path.is_empty() {
            action.play = format!(
                "{}/{}",
                self.playbook_path.trim_end_matches('/'),
                action.play
            );
        }

        action.inventory_file = self.inventory.clone();
        action.private_key = self.private_key.clone();
        action.debug = self.debug;

        for file in &mut action.files {
            if let Some(rest) = file.src.strip_prefix(BASE_DIR_TOKEN) {
                let resolved = self.base_dir.join(rest.trim_start_matches('/'));
                file.src = std::path::absolute(&resolved)?
                    .to_string_lossy()
                    .into_owned();
            }
        }
        Ok(())
    }

    /// Directory of the scenario file at `config_path`, `.` when it has none.
    pub fn base_dir_of(config_path: &Path) -> PathBuf {
        match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
