use admission_sim::config::AdmissionConfig;
use admission_sim::workflows::enrollment::{
    AdmissionService, InMemorySessionStore, SharedCodePolicy,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type InMemoryAdmissionService = AdmissionService<InMemorySessionStore, SharedCodePolicy>;

pub(crate) fn in_memory_admission_service(config: &AdmissionConfig) -> InMemoryAdmissionService {
    let store = Arc::new(InMemorySessionStore::default());
    let policy = Arc::new(SharedCodePolicy::from(config));
    AdmissionService::new(store, policy)
}
