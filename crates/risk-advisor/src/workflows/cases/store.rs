use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::analysis::RiskFinding;
use super::domain::{CaseComment, CaseId, CaseRecord, CustomerProfile};
use super::repository::{CaseRepository, PurgeScope, RepositoryError};

/// In-process case store, newest case first.
///
/// When opened with a snapshot path the whole collection is rewritten to that
/// JSON file after every mutation.
#[derive(Debug, Default)]
pub struct CaseStore {
    state: Mutex<StoreState>,
    snapshot: Option<PathBuf>,
}

#[derive(Debug, Default)]
struct StoreState {
    cases: Vec<CaseRecord>,
    sequence: u64,
}

impl CaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, ordering records newest first by creation time.
    pub fn with_records(mut records: Vec<CaseRecord>) -> Self {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self {
            state: Mutex::new(StoreState {
                cases: records,
                sequence: 0,
            }),
            snapshot: None,
        }
    }

    /// Opens a store backed by a JSON snapshot file.
    ///
    /// A missing file starts an empty store. An unreadable or corrupt file is
    /// logged and also starts empty; the next mutation overwrites it.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let records = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<CaseRecord>>(&raw) {
                Ok(records) => records,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "case snapshot is corrupt; starting empty");
                    Vec::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "case snapshot unreadable; starting empty");
                Vec::new()
            }
        };

        debug!(path = %path.display(), cases = records.len(), "case store opened");
        let mut store = Self::with_records(records);
        store.snapshot = Some(path);
        store
    }

    pub fn len(&self) -> usize {
        self.lock().map(|state| state.cases.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("case store mutex poisoned".to_string()))
    }

    /// Saves `staged` and only then makes it the live collection, so a failed
    /// write leaves memory as it was.
    fn commit(
        &self,
        state: &mut StoreState,
        staged: Vec<CaseRecord>,
    ) -> Result<(), RepositoryError> {
        self.persist(&staged)?;
        state.cases = staged;
        Ok(())
    }

    fn persist(&self, cases: &[CaseRecord]) -> Result<(), RepositoryError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let payload = serde_json::to_vec_pretty(cases)
            .map_err(|err| RepositoryError::Unavailable(format!("encode snapshot: {err}")))?;
        fs::write(path, payload).map_err(|err| {
            RepositoryError::Unavailable(format!("write {}: {err}", path.display()))
        })?;

        debug!(path = %path.display(), cases = cases.len(), "case snapshot saved");
        Ok(())
    }
}

fn next_case_id(created_at: DateTime<Utc>, sequence: u64) -> CaseId {
    CaseId(format!("case-{}-{sequence:04}", created_at.timestamp_millis()))
}

impl CaseRepository for CaseStore {
    fn append(
        &self,
        profile: CustomerProfile,
        findings: Vec<RiskFinding>,
    ) -> Result<CaseRecord, RepositoryError> {
        let mut state = self.lock()?;
        state.sequence += 1;

        let created_at = Utc::now();
        let record = CaseRecord {
            id: next_case_id(created_at, state.sequence),
            created_at,
            profile,
            findings,
            comments: Vec::new(),
        };

        let mut staged = Vec::with_capacity(state.cases.len() + 1);
        staged.push(record.clone());
        staged.extend(state.cases.iter().cloned());
        self.commit(&mut state, staged)?;
        Ok(record)
    }

    fn find_by_id(&self, id: &CaseId) -> Result<Option<CaseRecord>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.cases.iter().find(|record| &record.id == id).cloned())
    }

    fn append_comment(&self, id: &CaseId, comment: CaseComment) -> Result<bool, RepositoryError> {
        let mut state = self.lock()?;
        let Some(index) = state.cases.iter().position(|record| &record.id == id) else {
            return Ok(false);
        };

        let mut staged = state.cases.clone();
        staged[index].comments.push(comment);
        self.commit(&mut state, staged)?;
        Ok(true)
    }

    fn list(&self) -> Result<Vec<CaseRecord>, RepositoryError> {
        Ok(self.lock()?.cases.clone())
    }

    fn purge(&self, scope: PurgeScope, now: DateTime<Utc>) -> Result<usize, RepositoryError> {
        let mut state = self.lock()?;
        let staged: Vec<CaseRecord> = state
            .cases
            .iter()
            .filter(|record| !scope.removes(record, now))
            .cloned()
            .collect();
        let removed = state.cases.len() - staged.len();

        self.commit(&mut state, staged)?;
        Ok(removed)
    }
}
