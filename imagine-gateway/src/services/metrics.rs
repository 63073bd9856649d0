use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder once per process and return its handle.
///
/// If another recorder is already installed, a detached handle is returned
/// so `/metrics` still renders.
pub fn init_metrics() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(error = %e, "Prometheus recorder not installed");
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

pub fn get_metrics() -> String {
    init_metrics().render()
}
