//! Scenario compilation for Rigger.
//!
//! Turns a normalized scenario into the ordered list of actions an
//! execution backend runs: one action per (playbook, app) pair, or one per
//! playbook that targets no apps.

pub mod apps;
pub mod assemble;
pub mod os;

pub use apps::find_app;
pub use assemble::{finalize_container, with_defaults};
pub use os::resolve_os;

use rigger_backend::BackendKind;
use rigger_config::{EnvContext, Scenario, expand};
use rigger_core::{Action, Container, Playbook, Result};
use serde_json::Value;
use tracing::{debug, info};

/// Compiles scenarios for one backend.
#[derive(Debug, Clone)]
pub struct Compiler {
    backend: BackendKind,
    env: EnvContext,
}

impl Compiler {
    pub fn new(backend: BackendKind, env: EnvContext) -> Self {
        Self { backend, env }
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Compile every playbook in order. Any failure aborts the whole compilation.
    pub fn compile(&self, scenario: &Scenario) -> Result<Vec<Action>> {
        let expected = scenario
            .playbooks()
            .iter()
            .map(|p| p.apps.len().max(1))
            .sum();
        let mut actions = Vec::with_capacity(expected);

        for playbook in scenario.playbooks() {
            let playbook = with_defaults(playbook, self.backend.default_play())?;
            let os = resolve_os(scenario.oses(), &playbook.user)?;
            let base = Action {
                play: playbook.play.clone(),
                inventory: playbook.inventory.clone(),
                user: os.user.clone(),
                python_interpreter: os.python_interpreter.clone(),
                suffix: scenario.suffix().to_string(),
                ..Default::default()
            };

            if playbook.apps.is_empty() {
                let rendered = expand(&playbook.name, scenario.context(), "");
                let containers =
                    self.render_containers(&playbook, scenario.context(), "", &rendered)?;
                let name = if rendered.is_empty() {
                    containers
                        .first()
                        .map(|c| c.name.clone())
                        .unwrap_or_default()
                } else {
                    rendered
                };
                info!(action = %name, user = %base.user, play = %base.play, "Compiled action");
                actions.push(Action {
                    name,
                    containers,
                    ..base
                });
                continue;
            }

            for reference in &playbook.apps {
                let app = find_app(scenario, reference)?;
                let containers =
                    self.render_containers(&playbook, scenario.context(), reference, &app.name)?;

                info!(action = %app.name, user = %base.user, play = %base.play, "Compiled action");
                actions.push(Action {
                    name: app.name.clone(),
                    dest: app.dest.clone(),
                    repository: app.repository.clone(),
                    files: app.customizations.clone(),
                    containers,
                    ..base.clone()
                });
            }
        }

        debug!(count = actions.len(), "Compilation finished");
        Ok(actions)
    }

    fn render_containers(
        &self,
        playbook: &Playbook,
        root: &Value,
        app_scope: &str,
        name: &str,
    ) -> Result<Vec<Container>> {
        playbook
            .containers
            .iter()
            .map(|container| {
                let masked = self.backend.mask(&container.params);
                let expanded = expand(&masked, root, app_scope);
                let params = self.env.substitute(&self.backend.unmask(&expanded));

                let mut rendered = Container {
                    params,
                    ..container.clone()
                };
                finalize_container(&mut rendered, name, &playbook.state)?;
                Ok(rendered)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigger_config::{EnvContextBuilder, parse_scenario};
    use rigger_core::{Downloader, Error, ErrorKind};
    use std::path::PathBuf;

    struct NoDownloads;

    impl Downloader for NoDownloads {
        fn download(&self, url: &str, _suffix: &str) -> Result<PathBuf> {
            Err(Error::Download {
                url: url.into(),
                message: "offline".into(),
            })
        }
    }

    fn compiler() -> Compiler {
        let env = EnvContextBuilder::new()
            .with_var("MONGO_ROOT", "/srv/mongo")
            .build();
        Compiler::new(BackendKind::Ansible, env)
    }

    fn compile(json: &str) -> Result<Vec<Action>> {
        let scenario = parse_scenario(json, &NoDownloads).map_err(|e| match e {
            rigger_config::ConfigError::Scenario(e) => e,
            other => panic!("scenario failed to load: {other}"),
        })?;
        compiler().compile(&scenario)
    }

    const MONGO: &str = r#"{
        "id": "0",
        "env": "test",
        "dest": "/data",
        "oses": [{"user": "core", "pythonInterpreter": "PATH=/home/core/bin:$PATH python"}],
        "apps": [{"name": "mongo", "type": "db", "image": "aminjam/mongodb:latest", "ports": [27017]}],
        "playbooks": [{
            "inventory": "tag_App_mongo",
            "apps": ["{{index .Apps 0}}"],
            "containers": [{"params": "-v {{.App.Dest}}:/home/app -p 9990:{{index .App.Ports 0}} -d {{.App.Image}} /run.sh"}]
        }]
    }"#;

    #[test]
    fn test_end_to_end_single_app() {
        let actions = compile(MONGO).unwrap();
        assert_eq!(actions.len(), 1);

        let action = &actions[0];
        assert_eq!(action.user, "core");
        assert_eq!(action.name, "0-db-mongo");
        assert_eq!(action.dest, "/data/0-test/db/0-db-mongo");
        assert_eq!(action.play, "rigger.yml");
        assert_eq!(action.inventory, "tag_App_mongo");
        assert_eq!(action.suffix, "0-test");
        assert_eq!(action.python_interpreter, "PATH=/home/core/bin:$PATH python");

        let container = &action.containers[0];
        assert!(container.params.contains("27017"));
        assert_eq!(container.name, "0-db-mongo");
        assert_eq!(container.state, "running");
        assert_eq!(
            container.params,
            "--name 0-db-mongo -v /data/0-test/db/0-db-mongo:/home/app -p 9990:27017 -d aminjam/mongodb:latest /run.sh"
        );
    }

    #[test]
    fn test_one_action_per_app_and_per_appless_playbook() {
        let json = r#"{
            "id": "1", "env": "prod", "dest": "/data",
            "oses": [{"user": "core"}],
            "apps": [
                {"name": "api", "type": "web", "repository": {"sshUrl": "ssh://git.example.com/org/api.git"}},
                {"name": "admin", "type": "web", "customizations": [{"src": "/etc/admin.conf", "dest": "admin.conf"}]}
            ],
            "playbooks": [
                {"inventory": "tag_web", "apps": ["{{index .Apps 0}}", "{{index .Apps 1}}"],
                 "containers": [{"params": "-d {{.App.Name}}"}]},
                {"name": "cleanup-{{.Env}}", "inventory": "all", "state": "stopped",
                 "containers": [{"params": "-d busybox"}]}
            ]
        }"#;
        let actions = compile(json).unwrap();
        assert_eq!(actions.len(), 3);

        assert_eq!(actions[0].name, "1-web-api");
        assert_eq!(actions[0].containers[0].params, "--name 1-web-api -d 1-web-api");
        assert_eq!(actions[0].repository.as_ref().unwrap().branch, "master");
        assert!(actions[0].files.is_empty());

        assert_eq!(actions[1].name, "1-web-admin");
        assert!(actions[1].repository.is_none());
        assert_eq!(actions[1].files[0].dest, "/data/1-prod/web/1-web-admin/admin.conf");

        let appless = &actions[2];
        assert_eq!(appless.name, "cleanup-prod");
        assert_eq!(appless.dest, "");
        assert_eq!(appless.containers[0].name, "cleanup-prod");
        assert_eq!(appless.containers[0].state, "stopped");
        assert_eq!(appless.state(), "stopped");
    }

    #[test]
    fn test_backend_placeholders_and_env_survive() {
        let json = r#"{
            "id": "0", "env": "test", "dest": "/data",
            "oses": [{"user": "core"}],
            "apps": [{"name": "mongo", "type": "db"}],
            "playbooks": [{
                "name": "{{.App.Name}}-svc",
                "inventory": "tag_db",
                "play": "mongo.yml",
                "apps": ["{{index .Apps 0}}"],
                "containers": [{"params": "-e IP={{ ansible_default_ipv4.address }} -v $MONGO_ROOT:/data -e T=$UNSET_TOKEN -d mongo"}]
            }]
        }"#;
        let actions = compile(json).unwrap();
        let container = &actions[0].containers[0];
        assert_eq!(
            container.params,
            "--name 0-db-mongo -e IP={{ ansible_default_ipv4.address }} -v /srv/mongo:/data -e T= -d mongo"
        );
        assert_eq!(container.name, "0-db-mongo");
        assert_eq!(actions[0].name, "0-db-mongo");
        assert_eq!(actions[0].play, "mongo.yml");
    }

    #[test]
    fn test_explicit_container_name() {
        let json = MONGO.replace("-v {{.App.Dest}}", "--name mongo-primary -v {{.App.Dest}}");
        let actions = compile(&json).unwrap();
        assert_eq!(actions[0].containers[0].name, "mongo-primary");
        assert!(actions[0].containers[0].params.starts_with("--name mongo-primary -v"));
    }

    #[test]
    fn test_os_selection_by_playbook_user() {
        let json = r#"{
            "id": "0", "env": "test", "dest": "/data",
            "oses": [{"user": "core"}, {"user": "ops", "pythonInterpreter": "/usr/bin/python3"}],
            "playbooks": [{"name": "tools", "user": "ops", "inventory": "all", "containers": [{"params": "-d tools"}]}]
        }"#;
        let actions = compile(json).unwrap();
        assert_eq!(actions[0].user, "ops");
        assert_eq!(actions[0].python_interpreter, "/usr/bin/python3");

        let ambiguous = json.replace(r#""user": "ops", "inventory""#, r#""inventory""#);
        let err = compile(&ambiguous).unwrap_err();
        assert!(matches!(err, Error::UnknownOs(_)));
    }

    #[test]
    fn test_failures_abort_compilation() {
        let missing_inventory = MONGO.replace(r#""inventory": "tag_App_mongo","#, "");
        assert_eq!(
            compile(&missing_inventory).unwrap_err().kind(),
            ErrorKind::Configuration
        );

        let bad_reference = MONGO.replace("{{index .Apps 0}}", "{{index .Apps 4}}");
        assert!(matches!(
            compile(&bad_reference),
            Err(Error::AppNotFound(_))
        ));

        let no_os = MONGO.replace(
            r#""oses": [{"user": "core", "pythonInterpreter": "PATH=/home/core/bin:$PATH python"}],"#,
            "",
        );
        assert_eq!(compile(&no_os).unwrap_err().kind(), ErrorKind::Resolution);
    }

    #[test]
    fn test_unnamed_appless_playbook_uses_container_names() {
        let json = r#"{
            "id": "0", "env": "test", "dest": "/data",
            "oses": [{"user": "core"}],
            "playbooks": [{"inventory": "all", "containers": [
                {"params": "--name tools -d tools"},
                {"params": "--name sidecar -d busybox"}
            ]}]
        }"#;
        let actions = compile(json).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].name, "tools");
        assert_eq!(actions[0].containers[1].name, "sidecar");
        assert_eq!(actions[0].containers[0].params, "--name tools -d tools");
    }

    #[test]
    fn test_unnamed_container_needs_a_name() {
        let json = r#"{
            "id": "0", "env": "test", "dest": "/data",
            "oses": [{"user": "core"}],
            "playbooks": [{"inventory": "all", "containers": [
                {"params": "--name tools -d tools"},
                {"params": "-d busybox"}
            ]}]
        }"#;
        let err = compile(json).unwrap_err();
        assert!(matches!(err, Error::MissingField(_)));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_literal_playbook_name_does_not_leak_into_app_containers() {
        let json = r#"{
            "id": "0", "env": "test", "dest": "/data",
            "oses": [{"user": "core"}],
            "apps": [{"name": "a", "type": "web"}, {"name": "b", "type": "web"}],
            "playbooks": [{"name": "web", "inventory": "tag_web",
                "apps": ["{{index .Apps 0}}", "{{index .Apps 1}}"],
                "containers": [{"params": "-d nginx"}]}]
        }"#;
        let actions = compile(json).unwrap();
        let names: Vec<_> = actions
            .iter()
            .map(|a| (a.name.as_str(), a.containers[0].name.as_str()))
            .collect();
        assert_eq!(names, vec![("0-web-a", "0-web-a"), ("0-web-b", "0-web-b")]);
        assert_eq!(actions[1].containers[0].params, "--name 0-web-b -d nginx");
    }

    #[test]
    fn test_action_matches_the_selected_app() {
        let json = r#"{
            "id": "0", "env": "test", "dest": "/data",
            "oses": [{"user": "core"}],
            "apps": [
                {"name": "mongo-replica", "type": "db", "image": "r"},
                {"name": "mongo", "type": "db", "image": "m"}
            ],
            "playbooks": [{"inventory": "tag_db", "apps": ["{{index .Apps 1}}"],
                "containers": [{"params": "-d {{.App.Image}}"}]}]
        }"#;
        let actions = compile(json).unwrap();
        assert_eq!(actions[0].name, "0-db-mongo");
        assert_eq!(actions[0].dest, "/data/0-test/db/0-db-mongo");
        assert_eq!(actions[0].containers[0].params, "--name 0-db-mongo -d m");
    }

    #[test]
    fn test_empty_scenario_compiles_to_nothing() {
        let json = r#"{"id": "0", "env": "test", "dest": "/data"}"#;
        assert!(compile(json).unwrap().is_empty());
    }
}
