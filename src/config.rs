use crate::dispatcher::DispatcherConfig;
use crate::stream::{generate_client_id, StreamConfig};
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub dispatcher: DispatcherSettings,
    pub stream: StreamSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub base_url: String,
    pub source: String,
}

#[derive(Debug, Deserialize)]
pub struct DispatcherSettings {
    pub request_timeout_ms: u64,
    pub health_timeout_ms: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct StreamSettings {
    pub reconnect_delay_ms: u64,
    pub offline_notice_delay_ms: u64,
}

impl Config {
    /// Load defaults, then the optional file at `path` (any extension the
    /// `config` crate understands), then `ROBOT_MOUTH__*` environment
    /// variables.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "robot-mouth")?
            .set_default("service.base_url", "http://localhost:3000")?
            .set_default("service.source", "chat-widget")?
            .set_default("dispatcher.request_timeout_ms", 5000)?
            .set_default("dispatcher.health_timeout_ms", 5000)?
            .set_default("dispatcher.max_retries", 3)?
            .set_default("dispatcher.backoff_base_ms", 1000)?
            .set_default("stream.reconnect_delay_ms", 5000)?
            .set_default("stream.offline_notice_delay_ms", 1000)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("ROBOT_MOUTH")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            base_url: self.service.base_url.clone(),
            source: self.service.source.clone(),
            request_timeout: Duration::from_millis(self.dispatcher.request_timeout_ms),
            health_timeout: Duration::from_millis(self.dispatcher.health_timeout_ms),
            max_retries: self.dispatcher.max_retries,
            backoff_base: Duration::from_millis(self.dispatcher.backoff_base_ms),
        }
    }

    /// Stream settings with a freshly generated client ID
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            base_url: self.service.base_url.clone(),
            client_id: generate_client_id(),
            reconnect_delay: Duration::from_millis(self.stream.reconnect_delay_ms),
            offline_notice_delay: Duration::from_millis(self.stream.offline_notice_delay_ms),
        }
    }
}
