//! Scenario decoding and normalization.
//!
//! Normalization runs exactly once per scenario: it validates the base
//! destination, computes the suffix, qualifies app names, derives app
//! destinations and configures each app's customizations and repository.
//! The resulting [`Scenario`] is read-only.

use crate::customize::{configure_customization, configure_repository};
use crate::{ConfigError, ConfigResult};
use rigger_core::{
    App, DEFAULT_APP_TYPE, Downloader, Error, Os, Playbook, ScenarioDocument, Suffix,
};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// A normalized scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    document: ScenarioDocument,
    suffix: Suffix,
    context: Value,
}

/// Decode and normalize a scenario from JSON text.
pub fn parse_scenario<D: Downloader>(json: &str, downloader: &D) -> ConfigResult<Scenario> {
    let document: ScenarioDocument = serde_json::from_str(json)?;
    Scenario::normalize(document, downloader)
}

/// Read, decode and normalize a scenario file.
pub fn load_scenario<D: Downloader>(path: &Path, downloader: &D) -> ConfigResult<Scenario> {
    let content = std::fs::read_to_string(path)?;
    parse_scenario(&content, downloader)
}

/// `{id}-{type}-{name}` for typed apps. Names that already carry the prefix are returned as-is.
pub fn qualify_name(id: &str, app_type: &str, name: &str) -> String {
    if app_type.is_empty() || app_type == DEFAULT_APP_TYPE {
        return name.to_string();
    }
    let prefix = format!("{}-{}-", id, app_type);
    if name.starts_with(&prefix) {
        name.to_string()
    } else {
        format!("{}{}", prefix, name)
    }
}

impl Scenario {
    pub fn normalize<D: Downloader>(
        mut document: ScenarioDocument,
        downloader: &D,
    ) -> ConfigResult<Self> {
        document.dest = document.dest.trim_end_matches('/').to_string();
        if document.dest.is_empty() {
            return Err(Error::MissingField("dest".to_string()).into());
        }

        let suffix = Suffix::new(&document.id, &document.env);
        for app in &mut document.apps {
            normalize_app(
                app,
                &document.id,
                &document.env,
                &document.dest,
                &suffix,
                downloader,
            )?;
        }

        let mut context = serde_json::to_value(&document)?;
        if let Value::Object(map) = &mut context {
            map.insert("suffix".to_string(), Value::String(suffix.to_string()));
        }

        debug!(%suffix, apps = document.apps.len(), playbooks = document.playbooks.len(), "Normalized scenario");
        Ok(Self {
            document,
            suffix,
            context,
        })
    }

    pub fn id(&self) -> &str {
        &self.document.id
    }

    pub fn env(&self) -> &str {
        &self.document.env
    }

    pub fn description(&self) -> &str {
        &self.document.description
    }

    pub fn dest(&self) -> &str {
        &self.document.dest
    }

    pub fn suffix(&self) -> &Suffix {
        &self.suffix
    }

    pub fn oses(&self) -> &[Os] {
        &self.document.oses
    }

    pub fn apps(&self) -> &[App] {
        &self.document.apps
    }

    pub fn playbooks(&self) -> &[Playbook] {
        &self.document.playbooks
    }

    /// The template root: the normalized document plus `suffix`.
    pub fn context(&self) -> &Value {
        &self.context
    }

    pub fn document(&self) -> &ScenarioDocument {
        &self.document
    }
}

fn normalize_app<D: Downloader>(
    app: &mut App,
    id: &str,
    env: &str,
    base_dest: &str,
    suffix: &Suffix,
    downloader: &D,
) -> Result<(), ConfigError> {
    if app.app_type.is_empty() {
        app.app_type = DEFAULT_APP_TYPE.to_string();
    }
    app.name = qualify_name(id, &app.app_type, &app.name);

    if app.dest.is_empty() {
        app.dest = format!(
            "{}/{}-{}/{}/{}",
            base_dest, id, env, app.app_type, app.name
        );
    }
    app.dest = app.dest.trim_end_matches('/').to_string();

    for custom in &mut app.customizations {
        configure_customization(custom, suffix.as_str(), &app.dest, downloader)?;
    }

    if app.repository.as_ref().is_some_and(|r| r.ssh_url.is_empty()) {
        app.repository = None;
    }
    if let Some(repo) = app.repository.as_mut() {
        configure_repository(repo)?;
    }

    debug!(app = %app.name, dest = %app.dest, "Normalized app");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigger_core::{ErrorKind, Result as CoreResult};
    use std::path::PathBuf;

    struct NoDownloads;

    impl Downloader for NoDownloads {
        fn download(&self, url: &str, _suffix: &str) -> CoreResult<PathBuf> {
            Err(Error::Download {
                url: url.to_string(),
                message: "offline".to_string(),
            })
        }
    }

    const SCENARIO: &str = r#"{
        "id": "0",
        "env": "test",
        "dest": "/data/",
        "oses": [{"user": "core", "pythonInterpreter": "PATH=/home/core/bin:$PATH python"}],
        "apps": [
            {"name": "mongo", "type": "db", "image": "aminjam/mongodb:latest", "ports": [27017],
             "customizations": [{"src": "conf/mongod.conf", "dest": "etc/mongod.conf"}]},
            {"name": "nginx", "image": "nginx", "dest": "/srv/nginx/",
             "repository": {"sshUrl": "ssh://git.example.com/org/site.git"}},
            {"name": "worker", "repository": {}}
        ],
        "playbooks": []
    }"#;

    #[test]
    fn test_destination_derivation() {
        let scenario = parse_scenario(SCENARIO, &NoDownloads).unwrap();
        let mongo = &scenario.apps()[0];
        assert_eq!(mongo.name, "0-db-mongo");
        assert_eq!(mongo.dest, "/data/0-test/db/0-db-mongo");
        assert_eq!(
            mongo.customizations[0].dest,
            "/data/0-test/db/0-db-mongo/etc/mongod.conf"
        );
        assert_eq!(mongo.customizations[0].src, "@BASEDIR/conf/mongod.conf");
    }

    #[test]
    fn test_generic_apps_keep_name() {
        let scenario = parse_scenario(SCENARIO, &NoDownloads).unwrap();
        let nginx = &scenario.apps()[1];
        assert_eq!(nginx.app_type, "generic");
        assert_eq!(nginx.name, "nginx");
        assert_eq!(nginx.dest, "/srv/nginx");
        assert_eq!(nginx.repository.as_ref().unwrap().branch, "master");

        let worker = &scenario.apps()[2];
        assert_eq!(worker.dest, "/data/0-test/generic/worker");
        assert!(worker.repository.is_none());
    }

    #[test]
    fn test_suffix_and_context() {
        let scenario = parse_scenario(SCENARIO, &NoDownloads).unwrap();
        assert_eq!(scenario.suffix().as_str(), "0-test");
        assert_eq!(scenario.dest(), "/data");
        assert_eq!(scenario.context()["suffix"], "0-test");
        assert_eq!(scenario.context()["apps"][0]["name"], "0-db-mongo");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = parse_scenario(SCENARIO, &NoDownloads).unwrap();
        let twice = Scenario::normalize(once.document().clone(), &NoDownloads).unwrap();
        assert_eq!(once.document(), twice.document());
        assert_eq!(twice.apps()[0].name, "0-db-mongo");
    }

    #[test]
    fn test_qualify_name() {
        assert_eq!(qualify_name("0", "db", "mongo"), "0-db-mongo");
        assert_eq!(qualify_name("0", "db", "0-db-mongo"), "0-db-mongo");
        assert_eq!(qualify_name("0", "generic", "mongo"), "mongo");
    }

    #[test]
    fn test_missing_dest() {
        for dest in [r#""""#, r#""/""#] {
            let json = format!(r#"{{"id": "0", "env": "test", "dest": {dest}}}"#);
            let err = parse_scenario(&json, &NoDownloads).unwrap_err();
            match err {
                ConfigError::Scenario(e) => assert_eq!(e.kind(), ErrorKind::Configuration),
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn test_invalid_repository_fails_scenario() {
        let json = r#"{"id": "0", "env": "test", "dest": "/data",
            "apps": [{"name": "api", "repository": {"sshUrl": "git@github.com:org/api.git"}}]}"#;
        let err = parse_scenario(json, &NoDownloads).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Scenario(Error::InvalidRepository(_))
        ));
    }

    #[test]
    fn test_download_failure_fails_scenario() {
        let json = r#"{"id": "0", "env": "test", "dest": "/data",
            "apps": [{"name": "api", "customizations": [{"src": "http://example.com/a", "dest": "a"}]}]}"#;
        let err = parse_scenario(json, &NoDownloads).unwrap_err();
        assert!(matches!(err, ConfigError::Scenario(Error::Download { .. })));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_scenario("{", &NoDownloads),
            Err(ConfigError::Parse(_))
        ));
    }
}
