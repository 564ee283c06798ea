//! Playbook defaults and container finalization.

use regex::Regex;
use rigger_core::{Container, DEFAULT_APP_STATE, Error, Playbook, Result};
use std::sync::LazyLock;

static NAME_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)--name\s+(\S+)").expect("valid name regex"));

/// A copy of `playbook` with its defaults applied, or the first missing required field.
pub fn with_defaults(playbook: &Playbook, default_play: &str) -> Result<Playbook> {
    if playbook.inventory.is_empty() {
        return Err(Error::MissingField(format!(
            "inventory for playbook '{}'",
            playbook.name
        )));
    }
    if playbook.containers.is_empty() {
        return Err(Error::MissingField(format!(
            "containers for playbook '{}'",
            playbook.name
        )));
    }

    let mut playbook = playbook.clone();
    if playbook.state.is_empty() {
        playbook.state = DEFAULT_APP_STATE.to_string();
    }
    if playbook.play.is_empty() {
        playbook.play = default_play.to_string();
    }
    Ok(playbook)
}

/// Settle a rendered container's name and state.
///
/// An explicit `--name` in the params wins; otherwise `name` is used and
/// prepended as `--name {name} `. A container with neither has no name.
pub fn finalize_container(
    container: &mut Container,
    name: &str,
    playbook_state: &str,
) -> Result<()> {
    match NAME_FLAG.captures(&container.params) {
        Some(caps) => container.name = caps[1].to_string(),
        None if name.is_empty() => {
            return Err(Error::MissingField(format!(
                "container name for params '{}'",
                container.params
            )));
        }
        None => {
            container.name = name.to_string();
            container.params = format!("--name {} {}", name, container.params);
        }
    }
    if container.state.is_empty() {
        container.state = playbook_state.to_string();
    }
    Ok(())
}
