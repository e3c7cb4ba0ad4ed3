//! Prometheus metrics.

use crate::config::MetricsSettings;
use crate::{Error, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::thread;

/// Metrics configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,
    /// Address to bind the metrics exporter.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self::from_settings_with(&MetricsSettings::default(), |_| None)
    }
}

impl MetricsConfig {
    /// Builds metrics configuration from config settings with env overrides.
    #[must_use]
    pub fn from_settings(settings: &MetricsSettings) -> Self {
        Self::from_settings_with(settings, |key| std::env::var(key).ok())
    }

    /// [`Self::from_settings`] with an injectable environment.
    #[must_use]
    pub fn from_settings_with<F>(settings: &MetricsSettings, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            enabled: settings.enabled,
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), settings.port),
        };

        if let Some(enabled) = lookup("NEWSFLOW_METRICS_ENABLED").and_then(|v| parse_bool(&v)) {
            config.enabled = enabled;
        }
        if let Some(port) = lookup("NEWSFLOW_METRICS_PORT").and_then(|v| v.trim().parse().ok()) {
            config.listen_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
        }

        config
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Installs the Prometheus recorder, plus the HTTP listener when `expose`.
///
/// Returns `None` when metrics are disabled; every `metrics::counter!` call
/// is then a no-op.
///
/// # Errors
///
/// Returns [`Error::Observability`] if a recorder is already installed or
/// the listener cannot be started.
pub fn install_prometheus(config: &MetricsConfig, expose: bool) -> Result<Option<PrometheusHandle>> {
    if !config.enabled {
        return Ok(None);
    }

    let builder = PrometheusBuilder::new();
    let handle = if expose {
        install_listener(builder.with_http_listener(config.listen_addr))?
    } else {
        builder
            .install_recorder()
            .map_err(|e| Error::Observability(format!("metrics recorder: {e}")))?
    };
    tracing::debug!(expose, addr = %config.listen_addr, "metrics recorder installed");
    Ok(Some(handle))
}

fn install_listener(builder: PrometheusBuilder) -> Result<PrometheusHandle> {
    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        return install_with_runtime(builder, &handle);
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Observability(format!("metrics runtime: {e}")))?;
    let handle = runtime.handle().clone();
    let prometheus = install_with_runtime(builder, &handle)?;
    thread::Builder::new()
        .name("metrics-exporter-prometheus-http".to_string())
        .spawn(move || runtime.block_on(async { std::future::pending::<()>().await }))
        .map_err(|e| Error::Observability(format!("metrics thread: {e}")))?;
    Ok(prometheus)
}

fn install_with_runtime(
    builder: PrometheusBuilder,
    runtime_handle: &tokio::runtime::Handle,
) -> Result<PrometheusHandle> {
    let (recorder, exporter) = {
        let _guard = runtime_handle.enter();
        builder
            .build()
            .map_err(|e| Error::Observability(format!("metrics exporter: {e}")))?
    };
    let handle = recorder.handle();
    set_global_recorder(recorder)?;
    runtime_handle.spawn(exporter);
    Ok(handle)
}

fn set_global_recorder(recorder: PrometheusRecorder) -> Result<()> {
    metrics::set_global_recorder(recorder)
        .map_err(|e| Error::Observability(format!("metrics recorder: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_and_env() {
        let settings = MetricsSettings {
            enabled: false,
            port: 9100,
        };
        let config = MetricsConfig::from_settings_with(&settings, |_| None);
        assert!(!config.enabled);
        assert_eq!(config.listen_addr.port(), 9100);

        let config = MetricsConfig::from_settings_with(&settings, |k| match k {
            "NEWSFLOW_METRICS_ENABLED" => Some("yes".to_string()),
            "NEWSFLOW_METRICS_PORT" => Some("9300".to_string()),
            _ => None,
        });
        assert!(config.enabled);
        assert_eq!(config.listen_addr.port(), 9300);
    }

    #[test]
    fn test_bad_env_values_ignored() {
        let config = MetricsConfig::from_settings_with(&MetricsSettings::default(), |k| match k {
            "NEWSFLOW_METRICS_ENABLED" => Some("maybe".to_string()),
            "NEWSFLOW_METRICS_PORT" => Some("http".to_string()),
            _ => None,
        });
        assert_eq!(config, MetricsConfig::default());
    }

    #[test]
    fn test_disabled_installs_nothing() {
        let config = MetricsConfig::default();
        assert!(install_prometheus(&config, false).unwrap().is_none());
    }
}
