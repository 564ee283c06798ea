//! Compiled actions.
//!
//! An `Action` is everything an execution backend needs to run one
//! (playbook, app) pairing. Actions own all their data; nothing points back
//! into the scenario they were compiled from.

use serde::{Deserialize, Serialize};

use crate::scenario::{Container, Customization, Repository};
use crate::DEFAULT_APP_STATE;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Resolved app name, or the rendered playbook name for app-less playbooks.
    pub name: String,
    pub dest: String,
    pub play: String,
    pub inventory: String,
    pub user: String,
    pub python_interpreter: String,
    pub repository: Option<Repository>,
    pub files: Vec<Customization>,
    pub containers: Vec<Container>,

    // Backend invocation metadata, filled in by the caller.
    pub private_key: String,
    pub inventory_file: String,
    pub suffix: String,
    pub debug: u8,
}

impl Action {
    /// The first container state that is not the default, else the default.
    pub fn state(&self) -> &str {
        self.containers
            .iter()
            .map(|c| c.state.as_str())
            .find(|s| *s != DEFAULT_APP_STATE)
            .unwrap_or(DEFAULT_APP_STATE)
    }

    /// Whether this action should run for the given trigger.
    ///
    /// Running actions always run; others only when their name ends with the trigger.
    pub fn matches_trigger(&self, trigger: &str) -> bool {
        trigger.is_empty() || self.state() == DEFAULT_APP_STATE || self.name.ends_with(trigger)
    }
}
