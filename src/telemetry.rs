//! Process-wide logging and metrics.
//!
//! [`Telemetry::init`] installs the tracing subscriber and, when enabled, the
//! Prometheus recorder. Call [`Telemetry::shutdown`] once the work is done.

use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

pub struct Telemetry {
    prometheus_handle: Option<PrometheusHandle>,
    started: Instant,
}

impl Telemetry {
    /// `RUST_LOG` takes precedence over `general.log_level`.
    pub fn init(config: &Config) -> anyhow::Result<Self> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

        let registry = tracing_subscriber::registry().with(env_filter);

        if config.general.log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()
                .context("Failed to install JSON log subscriber")?;
        } else {
            registry
                .with(tracing_subscriber::fmt::layer())
                .try_init()
                .context("Failed to install log subscriber")?;
        }

        let prometheus_handle = if config.observability.metrics_enabled {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .context("Failed to install Prometheus recorder")?;
            info!("Prometheus metrics recorder initialized");
            Some(handle)
        } else {
            None
        };

        Ok(Self {
            prometheus_handle,
            started: Instant::now(),
        })
    }

    #[must_use]
    pub fn prometheus_handle(&self) -> Option<PrometheusHandle> {
        self.prometheus_handle.clone()
    }

    pub fn shutdown(self) {
        info!(
            uptime_secs = self.started.elapsed().as_secs(),
            "Telemetry shut down"
        );
    }
}
