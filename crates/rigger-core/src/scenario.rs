//! Scenario document records.
//!
//! These mirror the JSON scenario document field for field. Defaulting and
//! derivation happen during normalization in `rigger-config`; the records
//! here only carry data.

use serde::{Deserialize, Serialize};

/// The root declarative document describing a deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScenarioDocument {
    pub id: String,
    pub env: String,
    pub description: String,
    /// Base destination path for derived app destinations.
    pub dest: String,
    pub oses: Vec<Os>,
    pub apps: Vec<App>,
    pub playbooks: Vec<Playbook>,
}

/// One execution identity the backend can assume.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Os {
    pub user: String,
    pub python_interpreter: String,
}

/// One deployable application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct App {
    pub name: String,
    #[serde(rename = "type")]
    pub app_type: String,
    pub image: String,
    pub host: String,
    pub ports: Vec<i64>,
    /// Resolved deployment path.
    pub dest: String,
    pub cred: Option<Cred>,
    pub customizations: Vec<Customization>,
    pub repository: Option<Repository>,
}

/// Credentials exposed to templates as `.App.Cred`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cred {
    pub db_name: String,
    pub username: String,
    pub password: String,
}

/// Source repository checked out next to an app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Repository {
    pub branch: String,
    pub ssh_url: String,
    pub ssh_key: String,
    pub folder: String,
}

/// A file-staging rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customization {
    pub src: String,
    pub dest: String,
    pub dest_folder: String,
    pub mode: u32,
}

/// One deployment procedure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Playbook {
    pub name: String,
    pub play: String,
    pub state: String,
    pub inventory: String,
    pub user: String,
    /// App-reference templates, e.g. `{{index .Apps 0}}`.
    pub apps: Vec<String>,
    #[serde(alias = "actions")]
    pub containers: Vec<Container>,
}

/// One runtime unit to be materialized by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Container {
    pub params: String,
    pub name: String,
    pub state: String,
}
