use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::CaseRecord;

pub const DEFAULT_ADMIN_PASSCODE: &str = "0229";
pub const DEFAULT_REVIEWER_CODE: &str = "1111";

/// Returns true for exactly four ASCII digits.
pub fn is_four_digit_code(code: &str) -> bool {
    code.len() == 4 && code.bytes().all(|byte| byte.is_ascii_digit())
}

/// Secrets backing case visibility and admin gating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessSettings {
    pub admin_passcode: String,
    pub reviewer_code: String,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            admin_passcode: DEFAULT_ADMIN_PASSCODE.to_string(),
            reviewer_code: DEFAULT_REVIEWER_CODE.to_string(),
        }
    }
}

impl AccessSettings {
    /// Loads settings saved by [`AccessSettings::save`].
    ///
    /// A missing file yields `Ok(None)` so callers fall back to configured defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, AccessSettingsError> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AccessSettingsError::Io(err)),
        };

        let settings: Self = serde_json::from_str(&raw)?;
        if !is_four_digit_code(&settings.reviewer_code) {
            return Err(AccessSettingsError::InvalidReviewerCode);
        }
        Ok(Some(settings))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AccessSettingsError> {
        let payload = serde_json::to_vec_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AccessSettingsError {
    #[error("access settings io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("access settings are not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
    #[error("stored reviewer code must be exactly 4 digits")]
    InvalidReviewerCode,
}

/// Two unrelated checks: case visibility (owner or reviewer) and admin unlock.
#[derive(Debug, Clone, Default)]
pub struct AccessControl {
    settings: AccessSettings,
}

impl AccessControl {
    pub fn new(settings: AccessSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AccessSettings {
        &self.settings
    }

    /// True when the requester owns the case or presents the reviewer code.
    pub fn can_view(&self, record: &CaseRecord, requester_id: &str) -> bool {
        record.owner_id() == requester_id || self.is_reviewer(requester_id)
    }

    pub fn is_reviewer(&self, requester_id: &str) -> bool {
        requester_id == self.settings.reviewer_code
    }

    pub fn is_admin(&self, passcode: &str) -> bool {
        passcode == self.settings.admin_passcode
    }

    /// Replaces the reviewer code. Anything but 4 digits is rejected and the
    /// previous code kept.
    pub fn update_reviewer_code(&mut self, code: &str) -> bool {
        if !is_four_digit_code(code) {
            return false;
        }
        self.settings.reviewer_code = code.to_string();
        true
    }
}
