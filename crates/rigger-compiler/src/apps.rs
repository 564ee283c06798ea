//! App lookup for playbook app references.

use rigger_config::{Scenario, template::APP_ROOT, try_expand};
use rigger_core::{App, Error, Result};
use tracing::debug;

/// Resolve a playbook app reference such as `{{index .Apps 0}}` to its app.
///
/// The reference is rendered to a name. An app with exactly that name wins;
/// otherwise the first app whose name contains it is returned.
pub fn find_app<'a>(scenario: &'a Scenario, reference: &str) -> Result<&'a App> {
    let name_template = format!("{{{{.{}.Name}}}}", APP_ROOT);
    let name = try_expand(&name_template, scenario.context(), reference).map_err(|e| {
        debug!(reference, error = %e, "App reference did not resolve");
        Error::AppNotFound(reference.to_string())
    })?;
    if name.is_empty() {
        return Err(Error::AppNotFound(reference.to_string()));
    }

    let apps = scenario.apps();
    apps.iter()
        .find(|app| app.name == name)
        .or_else(|| apps.iter().find(|app| app.name.contains(&name)))
        .ok_or(Error::AppNotFound(name))
}
