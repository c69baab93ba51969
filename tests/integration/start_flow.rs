use fleet_migration::compose::document::load_document;
use fleet_migration::config::model::MigrationSettings;
use fleet_migration::config::resolve::Workspace;
use fleet_migration::orchestrator::Migration;
use serde_json::json;

use crate::common::{FakeKibana, RecordingRunner, TestProject, GENERATED_COMPOSE};

fn settings_for(kibana: &FakeKibana) -> MigrationSettings {
    let mut settings = MigrationSettings::default();
    settings.kibana.url = kibana.url();
    settings.kibana.poll_interval = "20ms".to_string();
    settings.kibana.max_wait = Some("30s".to_string());
    settings
}

#[tokio::test]
async fn start_waits_for_kibana_then_pushes_settings() {
    let project = TestProject::new();
    let kibana = FakeKibana::start(3).await;
    let settings = settings_for(&kibana);
    let workspace = Workspace::from_settings(&settings, project.root());
    let runner = RecordingRunner::new(workspace.compose_file.clone(), GENERATED_COMPOSE);
    let migration = Migration::new(settings, workspace, runner).unwrap();

    migration.start().await.unwrap();

    // Three 503s, then the 200 that ends the wait.
    assert_eq!(kibana.status_calls(), 4);

    let requests = kibana.requests();
    assert_eq!(requests.len(), 2);

    let fleet = &requests[0];
    assert_eq!(fleet.method, "PUT");
    assert_eq!(fleet.path, "/api/fleet/settings");
    assert_eq!(fleet.body, json!({ "fleet_server_hosts": ["http://elastic-agent:8220"] }));
    assert_eq!(fleet.authorization.as_deref(), Some("Basic YWRtaW46Y2hhbmdlbWU="));
    assert_eq!(fleet.xsrf.as_deref(), Some("true"));
    assert_eq!(fleet.content_type.as_deref(), Some("application/json"));

    let schema = &requests[1];
    assert_eq!(schema.method, "POST");
    assert_eq!(schema.path, "/api/apm/fleet/apm_server_schema");
    assert_eq!(schema.authorization.as_deref(), Some("Basic YWRtaW46Y2hhbmdlbWU="));
    assert_eq!(
        schema.body,
        json!({
            "schema": {
                "apm-server.host": "0.0.0.0:8200",
                "apm-server.read_timeout": 3600,
                "apm-server.register.ingest.pipeline.enabled": true,
                "apm-server.rum.enabled": true,
                "apm-server.rum.rate_limit": 10,
                "apm-server.shutdown_timeout": "30s",
                "logging.level": "error",
                "logging.metrics.enabled": false,
                "queue.mem.events": 2000,
                "queue.mem.flush.min_events": 267,
                "queue.mem.flush.timeout": "1s",
                "setup.template.settings.index.auto_expand_replicas": "0-1",
                "setup.template.settings.index.number_of_replicas": 1,
                "setup.template.settings.index.number_of_shards": 1
            }
        })
    );
}

#[tokio::test]
async fn start_runs_generator_then_compose_up() {
    let project = TestProject::new();
    let kibana = FakeKibana::start(0).await;
    let settings = settings_for(&kibana);
    let workspace = Workspace::from_settings(&settings, project.root());
    let runner = RecordingRunner::new(workspace.compose_file.clone(), GENERATED_COMPOSE);
    let migration = Migration::new(settings, workspace.clone(), runner).unwrap();

    migration.start().await.unwrap();

    let doc = load_document(&workspace.compose_file).unwrap();
    assert_eq!(
        doc.services["apm-server"].labels.as_deref().unwrap(),
        [
            "co.elastic.apm.stack-version=7.14.0-SNAPSHOT",
            "co.elastic.apm.stack-version=7.13.0"
        ]
    );
    let agent_env = doc.services["elastic-agent"].environment.as_ref().unwrap();
    assert_eq!(agent_env.get("FLEET_SERVER_ENABLE"), Some("1"));
    assert_eq!(agent_env.get("FLEET_SERVER_POLICY_ID"), Some("policy-elastic-agent-on-cloud"));
    assert_eq!(kibana.status_calls(), 1);

    let commands = migration.runner().commands();
    assert_eq!(commands.len(), 2);
    assert!(commands[0].ends_with("generate_docker_compose.sh"), "{:?}", commands);
    assert_eq!(commands[1], "docker-compose up --detach");
}

#[tokio::test]
async fn start_gives_up_at_deadline() {
    let project = TestProject::new();
    let kibana = FakeKibana::start(usize::MAX).await;
    let mut settings = settings_for(&kibana);
    settings.kibana.max_wait = Some("200ms".to_string());
    let workspace = Workspace::from_settings(&settings, project.root());
    let runner = RecordingRunner::new(workspace.compose_file.clone(), GENERATED_COMPOSE);
    let migration = Migration::new(settings, workspace, runner).unwrap();

    let err = migration.start().await.unwrap_err();

    assert!(format!("{:#}", err).contains("kibana was not ready after"), "{:#}", err);
    assert!(kibana.requests().is_empty());
}
