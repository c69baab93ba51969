//! Pure edits applied to a [`ComposeDocument`] between load and store.

use serde_json::Value;

use crate::compose::document::DocumentError;
use crate::compose::model::{ComposeDocument, Environment};

const STACK_VERSION_LABEL: &str = "co.elastic.apm.stack-version";

/// Everything the setup pipeline needs to know about the target environment.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationEdit {
    pub stack_version: String,
    pub agent_service: String,
    pub agent_env: Vec<(String, String)>,
    pub kibana_service: String,
    pub kibana_volume: String,
}

/// Turn `co.elastic.apm.stack-version=<version>` into its `-SNAPSHOT` form on
/// every service. Only exact matches are rewritten.
pub fn rewrite_stack_version_labels(doc: &mut ComposeDocument, version: &str) {
    let from = format!("{}={}", STACK_VERSION_LABEL, version);
    let to = format!("{}-SNAPSHOT", from);
    for labels in doc.services.values_mut().filter_map(|s| s.labels.as_mut()) {
        for label in labels.iter_mut().filter(|l| **l == from) {
            label.clone_from(&to);
        }
    }
}

pub fn inject_environment(
    doc: &mut ComposeDocument,
    service: &str,
    vars: &[(String, String)],
) -> Result<(), DocumentError> {
    let spec = doc
        .services
        .get_mut(service)
        .ok_or_else(|| missing(service))?;
    spec.environment
        .get_or_insert_with(Environment::default)
        .merge(vars.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    Ok(())
}

/// Discard the service's mounts and leave `volume` as the only one.
pub fn replace_volumes(
    doc: &mut ComposeDocument,
    service: &str,
    volume: &str,
) -> Result<(), DocumentError> {
    let spec = doc
        .services
        .get_mut(service)
        .ok_or_else(|| missing(service))?;
    spec.volumes = Some(vec![Value::String(volume.to_string())]);
    Ok(())
}

pub fn replace_environment_values(doc: &mut ComposeDocument, pattern: &str, replacement: &str) {
    for env in doc.services.values_mut().filter_map(|s| s.environment.as_mut()) {
        env.replace_in_values(pattern, replacement);
    }
}

/// The full setup pipeline: label rewrite, agent environment, kibana mount.
/// Both required services are checked before anything is touched.
pub fn apply_migration_edit(
    mut doc: ComposeDocument,
    edit: &MigrationEdit,
) -> Result<ComposeDocument, DocumentError> {
    for required in [&edit.agent_service, &edit.kibana_service] {
        if !doc.services.contains_key(required.as_str()) {
            return Err(missing(required));
        }
    }

    rewrite_stack_version_labels(&mut doc, &edit.stack_version);
    inject_environment(&mut doc, &edit.agent_service, &edit.agent_env)?;
    replace_volumes(&mut doc, &edit.kibana_service, &edit.kibana_volume)?;
    Ok(doc)
}

fn missing(service: &str) -> DocumentError {
    DocumentError::MissingService {
        service: service.to_string(),
    }
}
