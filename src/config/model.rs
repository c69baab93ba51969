use serde::Deserialize;

/// Top-level `fleet-migration.toml`. Every key is optional; the defaults are
/// the values the migration environment was built around.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MigrationSettings {
    /// Project root, relative to the settings file's directory.
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default = "default_compose_file")]
    pub compose_file: String,
    #[serde(default = "default_generator")]
    pub generator: String,
    #[serde(default = "default_kibana_config")]
    pub kibana_config: String,
    /// Program and leading arguments used to drive the orchestration runtime.
    #[serde(default = "default_compose_command")]
    pub compose_command: Vec<String>,
    #[serde(default = "default_stack_version")]
    pub stack_version: String,
    #[serde(default)]
    pub kibana: KibanaSettings,
    #[serde(default)]
    pub fleet: FleetSettings,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            root: default_root(),
            compose_file: default_compose_file(),
            generator: default_generator(),
            kibana_config: default_kibana_config(),
            compose_command: default_compose_command(),
            stack_version: default_stack_version(),
            kibana: KibanaSettings::default(),
            fleet: FleetSettings::default(),
        }
    }
}

fn default_root() -> String {
    ".".to_string()
}

fn default_compose_file() -> String {
    "docker-compose.yml".to_string()
}

fn default_generator() -> String {
    "scripts/fleet-migration/generate_docker_compose.sh".to_string()
}

fn default_kibana_config() -> String {
    "scripts/fleet-migration/kibana.yml".to_string()
}

fn default_compose_command() -> Vec<String> {
    vec!["docker-compose".to_string()]
}

fn default_stack_version() -> String {
    "7.14.0".to_string()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct KibanaSettings {
    #[serde(default = "default_kibana_url")]
    pub url: String,
    #[serde(default = "default_credential")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
    /// In-container path the local kibana.yml is bind-mounted to.
    #[serde(default = "default_config_mount")]
    pub config_mount: String,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
    /// Overall readiness deadline. Absent means wait forever.
    #[serde(default)]
    pub max_wait: Option<String>,
}

impl Default for KibanaSettings {
    fn default() -> Self {
        Self {
            url: default_kibana_url(),
            username: default_credential(),
            password: default_password(),
            config_mount: default_config_mount(),
            poll_timeout: default_poll_timeout(),
            poll_interval: default_poll_interval(),
            max_wait: None,
        }
    }
}

fn default_kibana_url() -> String {
    "http://localhost:5601".to_string()
}

fn default_credential() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "changeme".to_string()
}

fn default_config_mount() -> String {
    "/usr/share/kibana/config/kibana.yml".to_string()
}

fn default_poll_timeout() -> String {
    "1500ms".to_string()
}

fn default_poll_interval() -> String {
    "1s".to_string()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FleetSettings {
    #[serde(default = "default_agent_service")]
    pub agent_service: String,
    #[serde(default = "default_kibana_service")]
    pub kibana_service: String,
    #[serde(default = "default_server_host")]
    pub server_host: String,
    #[serde(default = "default_credential")]
    pub elasticsearch_username: String,
    #[serde(default = "default_password")]
    pub elasticsearch_password: String,
    #[serde(default = "default_policy_id")]
    pub policy_id: String,
    #[serde(default = "default_standalone_apm_url")]
    pub standalone_apm_url: String,
    #[serde(default = "default_managed_apm_url")]
    pub managed_apm_url: String,
}

impl Default for FleetSettings {
    fn default() -> Self {
        Self {
            agent_service: default_agent_service(),
            kibana_service: default_kibana_service(),
            server_host: default_server_host(),
            elasticsearch_username: default_credential(),
            elasticsearch_password: default_password(),
            policy_id: default_policy_id(),
            standalone_apm_url: default_standalone_apm_url(),
            managed_apm_url: default_managed_apm_url(),
        }
    }
}

fn default_agent_service() -> String {
    "elastic-agent".to_string()
}

fn default_kibana_service() -> String {
    "kibana".to_string()
}

fn default_server_host() -> String {
    "http://elastic-agent:8220".to_string()
}

fn default_policy_id() -> String {
    "policy-elastic-agent-on-cloud".to_string()
}

fn default_standalone_apm_url() -> String {
    "http://apm-server:8200".to_string()
}

fn default_managed_apm_url() -> String {
    "http://elastic-agent:8200".to_string()
}
