use serde_json::{json, Value};

/// APM Server settings stored in Kibana for the Fleet-managed APM integration.
/// Key names and values are what the dashboard expects and must not drift.
pub fn apm_server_schema() -> Value {
    json!({
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
        "setup.template.settings.index.number_of_shards": 1,
    })
}
