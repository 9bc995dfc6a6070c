use metrics_exporter_prometheus::PrometheusHandle;
use risk_advisor::config::AdvisorConfig;
use risk_advisor::error::AppError;
use risk_advisor::workflows::cases::{
    AccessControl, AccessSettings, AdvisoryService, AnalysisConfig, CaseStore, CommentNotice,
    CommentNotifier, NotifyError,
};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Delivers owner notifications to the service log.
#[derive(Default, Clone)]
pub(crate) struct LogCommentNotifier;

impl CommentNotifier for LogCommentNotifier {
    fn notify(&self, notice: CommentNotice) -> Result<(), NotifyError> {
        info!(
            case_id = %notice.case_id,
            employee_id = %notice.employee_id,
            "{}",
            notice.message()
        );
        Ok(())
    }
}

/// Keeps notices in memory so the CLI demo can print them.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCommentNotifier {
    notices: Arc<Mutex<Vec<CommentNotice>>>,
}

impl CommentNotifier for InMemoryCommentNotifier {
    fn notify(&self, notice: CommentNotice) -> Result<(), NotifyError> {
        let mut guard = self
            .notices
            .lock()
            .map_err(|_| NotifyError::Transport("notice buffer poisoned".to_string()))?;
        guard.push(notice);
        Ok(())
    }
}

impl InMemoryCommentNotifier {
    pub(crate) fn notices(&self) -> Vec<CommentNotice> {
        self.notices
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

pub(crate) fn open_case_store(config: &AdvisorConfig) -> CaseStore {
    match &config.case_store {
        Some(path) => CaseStore::open(path),
        None => CaseStore::new(),
    }
}

/// Resolves access secrets. A saved access file overrides the configured
/// reviewer code; the admin passcode always comes from configuration.
pub(crate) fn load_access_control(config: &AdvisorConfig) -> Result<AccessControl, AppError> {
    let mut settings = AccessSettings {
        admin_passcode: config.admin_passcode.clone(),
        reviewer_code: config.reviewer_code.clone(),
    };

    if let Some(path) = &config.access_file {
        match AccessSettings::load(path)? {
            Some(saved) => settings.reviewer_code = saved.reviewer_code,
            None => warn!(path = %path.display(), "no saved access settings; using configured reviewer code"),
        }
    }

    Ok(AccessControl::new(settings))
}

pub(crate) fn build_advisory_service<N>(
    config: &AdvisorConfig,
    notifier: Arc<N>,
) -> Result<AdvisoryService<CaseStore, N>, AppError>
where
    N: CommentNotifier + 'static,
{
    let store = Arc::new(open_case_store(config));
    let access = load_access_control(config)?;
    let service = AdvisoryService::new(store, notifier, AnalysisConfig::default(), access);

    Ok(match &config.access_file {
        Some(path) => service.with_access_file(path.clone()),
        None => service,
    })
}
