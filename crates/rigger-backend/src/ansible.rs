//! Ansible backend.
//!
//! Ansible templates use the same `{{ }}` delimiters as scenario templates.
//! Placeholders for Ansible facts (`{{ ansible_... }}`) are masked into an
//! inert `@ANSIBLE.` sentinel before scenario expansion and restored after.
//! Text that already contains `@ANSIBLE` is escaped to `@ANSIBLE~` first so
//! that unmasking only restores what masking produced.

use crate::{BackendError, BackendResult, Invocation, ScratchDir};
use regex::Regex;
use rigger_core::{Action, Container, Customization, Repository};
use serde::Serialize;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

pub const DEFAULT_PLAY: &str = "rigger.yml";

const PROGRAM: &str = "ansible-playbook";

static MASK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\s*)ansible_").expect("valid mask regex"));

static UNMASK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@ANSIBLE(?:~|(\s*)\.)").expect("valid unmask regex"));

const SENTINEL: &str = "@ANSIBLE";
const ESCAPED_SENTINEL: &str = "@ANSIBLE~";

pub fn mask(input: &str) -> String {
    let escaped = input.replace(SENTINEL, ESCAPED_SENTINEL);
    MASK_REGEX
        .replace_all(&escaped, "@ANSIBLE${1}.")
        .into_owned()
}

pub fn unmask(input: &str) -> String {
    UNMASK_REGEX
        .replace_all(input, |caps: &regex::Captures| match caps.get(1) {
            Some(ws) => format!("{{{{{}ansible_", ws.as_str()),
            None => SENTINEL.to_string(),
        })
        .into_owned()
}

pub fn validate(invocation: &Invocation) -> BackendResult<()> {
    if invocation.inventory.is_empty() {
        return Err(BackendError::InvalidParams(
            "--inventory is required for ansible backend".to_string(),
        ));
    }
    if invocation.playbook_path.is_empty() {
        return Err(BackendError::InvalidParams(
            "--playbook-path is required for ansible backend".to_string(),
        ));
    }
    Ok(())
}

/// Extra vars handed to the play.
#[derive(Debug, Serialize)]
struct Payload<'a> {
    dest: &'a str,
    play: &'a str,
    inventory: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    ansible_python_interpreter: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    repository: Option<&'a Repository>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    files: &'a [Customization],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    containers: &'a [Container],
}

impl<'a> From<&'a Action> for Payload<'a> {
    fn from(action: &'a Action) -> Self {
        Self {
            dest: &action.dest,
            play: &action.play,
            inventory: &action.inventory,
            ansible_python_interpreter: &action.python_interpreter,
            repository: action.repository.as_ref(),
            files: &action.files,
            containers: &action.containers,
        }
    }
}

/// Command-line arguments for `ansible-playbook`, given the extra-vars file.
pub fn command_args(action: &Action, vars_file: &str) -> Vec<String> {
    let mut args = vec![
        action.play.clone(),
        "-i".to_string(),
        action.inventory_file.clone(),
        "-u".to_string(),
        action.user.clone(),
    ];
    if !action.private_key.is_empty() {
        args.push("--private-key".to_string());
        args.push(action.private_key.clone());
    }
    args.push("--extra-vars".to_string());
    args.push(format!("@{}", vars_file));
    match action.debug {
        0 => {}
        1 => args.push("-v".to_string()),
        2 => args.push("-vv".to_string()),
        _ => args.push("-vvv".to_string()),
    }
    args
}

/// Write the payload for `action` and run the play, streaming its output.
pub async fn run(action: &Action, scratch: &ScratchDir) -> BackendResult<()> {
    let payload = serde_json::to_vec(&Payload::from(action))?;
    let vars_file = scratch.write(&action.suffix, "json", &payload)?;
    let args = command_args(action, &vars_file.to_string_lossy());

    info!(action = %action.name, play = %action.play, "Running {}", PROGRAM);
    debug!(args = ?args, "Command line");

    let mut child = Command::new(PROGRAM)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stderr_task = child.stderr.take().map(|stderr| {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!(target: "rigger::ansible", "{}", line);
            }
        })
    });

    if let Some(stdout) = child.stdout.take() {
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            info!(target: "rigger::ansible", "{}", line);
        }
    }

    let status = child.wait().await?;
    if let Some(task) = stderr_task {
        if let Err(e) = task.await {
            warn!(error = %e, "stderr reader failed");
        }
    }

    if !status.success() {
        return Err(BackendError::CommandFailed {
            command: PROGRAM.to_string(),
            status: status.to_string(),
        });
    }
    info!(action = %action.name, "Play completed");
    Ok(())
}
