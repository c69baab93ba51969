use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::cli::MigrationCommand;
use crate::compose::document::update_document;
use crate::compose::lifecycle;
use crate::compose::transform::{self, MigrationEdit};
use crate::config::model::MigrationSettings;
use crate::config::resolve::Workspace;
use crate::kibana::ready::{self, PollPolicy};
use crate::kibana::{KibanaClient, ResponseEnvelope};
use crate::process::CommandRunner;

/// Drives the migration environment. Every procedure runs its steps strictly
/// one after another and stops at the first failure; nothing is rolled back.
pub struct Migration<R> {
    settings: MigrationSettings,
    workspace: Workspace,
    runner: R,
    kibana: KibanaClient,
}

impl<R: CommandRunner> Migration<R> {
    pub fn new(settings: MigrationSettings, workspace: Workspace, runner: R) -> Result<Self> {
        let kibana = KibanaClient::new(&settings.kibana).context("configuring Kibana client")?;
        Ok(Self {
            settings,
            workspace,
            runner,
            kibana,
        })
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub async fn run(&self, command: MigrationCommand) -> Result<()> {
        match command {
            MigrationCommand::Setup => self.setup().await,
            MigrationCommand::Start => self.start().await,
            MigrationCommand::FleetApm => self.point_to_fleet_apm().await,
            MigrationCommand::StandaloneApm => self.point_to_standalone_apm().await,
            MigrationCommand::Down => self.down().await,
        }
    }

    /// Generate the compose document and apply the migration edits to it.
    pub async fn setup(&self) -> Result<()> {
        self.create_compose_document().await?;
        println!("Created docker-compose.yml for Fleet migration on Cloud.");
        Ok(())
    }

    /// Set up, bring every service up, wait for Kibana, then push the Fleet
    /// Server host and the APM Server schema.
    pub async fn start(&self) -> Result<()> {
        self.setup().await?;
        self.compose_up().await?;

        let policy = PollPolicy {
            interval: self.settings.kibana.poll_interval()?,
            max_wait: self.settings.kibana.max_wait()?,
        };
        ready::wait_until_ready(&self.kibana, "kibana", policy)
            .await
            .context("waiting for Kibana")?;

        println!("Updating Fleet with Elastic Agent host URL.");
        let hosts = [self.settings.fleet.server_host.clone()];
        let response = self
            .kibana
            .update_fleet_server_hosts(&hosts)
            .await
            .context("updating Fleet Server hosts")?;
        report("fleet settings", &response);

        println!("Saving APM Server schema configuration to Kibana.");
        let response = self
            .kibana
            .save_apm_server_schema()
            .await
            .context("saving APM Server schema")?;
        report("APM Server schema", &response);

        println!("Done.");
        Ok(())
    }

    /// Point every service at the Fleet-managed APM Server.
    pub async fn point_to_fleet_apm(&self) -> Result<()> {
        println!("Reconfiguring services to send events to the Fleet-managed APM Server.");
        let fleet = &self.settings.fleet;
        self.swap_apm_endpoint(&fleet.standalone_apm_url, &fleet.managed_apm_url)
            .await
    }

    /// Point every service back at the standalone APM Server.
    pub async fn point_to_standalone_apm(&self) -> Result<()> {
        println!("Reconfiguring services to send events to the standalone APM Server.");
        let fleet = &self.settings.fleet;
        self.swap_apm_endpoint(&fleet.managed_apm_url, &fleet.standalone_apm_url)
            .await
    }

    /// Stop every service and remove its volumes.
    pub async fn down(&self) -> Result<()> {
        let cmd = lifecycle::down_command(&self.settings.compose_command, &self.workspace.root)?;
        lifecycle::run_traced(&self.runner, &cmd)
            .await
            .context("stopping services")?;
        println!("Done.");
        Ok(())
    }

    async fn create_compose_document(&self) -> Result<()> {
        lifecycle::generate(&self.runner, &self.workspace.generator, &self.workspace.root)
            .await
            .context("generating docker-compose.yml")?;

        let edit = self.migration_edit();
        update_document(&self.workspace.compose_file, |doc| {
            transform::apply_migration_edit(doc, &edit)
        })
        .with_context(|| format!("updating {}", self.workspace.compose_file.display()))?;
        Ok(())
    }

    async fn swap_apm_endpoint(&self, from: &str, to: &str) -> Result<()> {
        debug!(from, to, "replacing APM Server URL in service environments");
        update_document(&self.workspace.compose_file, |mut doc| {
            transform::replace_environment_values(&mut doc, from, to);
            Ok(doc)
        })
        .with_context(|| format!("updating {}", self.workspace.compose_file.display()))?;

        self.compose_up().await?;
        println!("Done.");
        Ok(())
    }

    async fn compose_up(&self) -> Result<()> {
        let cmd = lifecycle::up_command(&self.settings.compose_command, &self.workspace.root)?;
        lifecycle::run_traced(&self.runner, &cmd)
            .await
            .context("starting services")?;
        Ok(())
    }

    fn migration_edit(&self) -> MigrationEdit {
        let fleet = &self.settings.fleet;
        MigrationEdit {
            stack_version: self.settings.stack_version.clone(),
            agent_service: fleet.agent_service.clone(),
            agent_env: vec![
                (
                    "ELASTICSEARCH_USERNAME".to_string(),
                    fleet.elasticsearch_username.clone(),
                ),
                (
                    "ELASTICSEARCH_PASSWORD".to_string(),
                    fleet.elasticsearch_password.clone(),
                ),
                ("FLEET_SERVER_POLICY_ID".to_string(), fleet.policy_id.clone()),
            ],
            kibana_service: fleet.kibana_service.clone(),
            kibana_volume: format!(
                "{}:{}",
                self.workspace.kibana_config_from_root(),
                self.settings.kibana.config_mount
            ),
        }
    }
}

fn report(what: &str, response: &ResponseEnvelope) {
    if response.is_success() {
        debug!(status = response.status, "{} accepted", what);
    } else {
        warn!(
            status = response.status,
            body = %response.body,
            "Kibana rejected {}",
            what
        );
    }
}
