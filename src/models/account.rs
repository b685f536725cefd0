use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants;

/// A broker CLI account whose password this engine owns.
///
/// `password` and `last_rotated` are written only by the rotation service.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedAccount {
    /// Name of the [`Target`](super::target::Target) this account lives on.
    pub target: String,
    pub remote_username: String,
    /// Zero disables automatic rotation.
    #[serde(default)]
    pub rotation_period_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_rotated: Option<DateTime<Utc>>,
}

impl ManagedAccount {
    #[must_use]
    pub fn effective_password_length(&self) -> usize {
        self.password_length.unwrap_or(constants::password::DEFAULT_LENGTH)
    }

    #[must_use]
    pub fn rotation_period(&self) -> Option<Duration> {
        if self.rotation_period_secs == 0 {
            return None;
        }
        i64::try_from(self.rotation_period_secs)
            .ok()
            .and_then(Duration::try_seconds)
    }

    /// Whether the periodic sweep should rotate this account at `now`.
    ///
    /// Accounts that were never rotated are never due: the first rotation is
    /// always manual.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        let (Some(period), Some(last)) = (self.rotation_period(), self.last_rotated) else {
            return false;
        };
        last.checked_add_signed(period).is_some_and(|next| now >= next)
    }

    /// Time left before another rotation is allowed, if any.
    #[must_use]
    pub fn cooldown_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let last = self.last_rotated?;
        let cooldown = Duration::seconds(constants::rotation::MIN_ROTATION_COOLDOWN_SECS);
        let elapsed = now.signed_duration_since(last);
        (elapsed < cooldown).then(|| cooldown - elapsed)
    }

    #[must_use]
    pub const fn is_rotated(&self) -> bool {
        self.last_rotated.is_some()
    }
}

impl fmt::Debug for ManagedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedAccount")
            .field("target", &self.target)
            .field("remote_username", &self.remote_username)
            .field("rotation_period_secs", &self.rotation_period_secs)
            .field("password_length", &self.password_length)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("last_rotated", &self.last_rotated)
            .finish()
    }
}

/// Read view of an account. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountView {
    pub name: String,
    pub target: String,
    pub remote_username: String,
    pub rotation_period_secs: u64,
    pub password_length: usize,
    pub last_rotated: Option<DateTime<Utc>>,
}

impl AccountView {
    #[must_use]
    pub fn new(name: &str, account: &ManagedAccount) -> Self {
        Self {
            name: name.to_string(),
            target: account.target.clone(),
            remote_username: account.remote_username.clone(),
            rotation_period_secs: account.rotation_period_secs,
            password_length: account.effective_password_length(),
            last_rotated: account.last_rotated,
        }
    }
}

/// Current credentials for a rotated account.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub remote_username: String,
    pub password: String,
    pub target: String,
    pub last_rotated: DateTime<Utc>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("remote_username", &self.remote_username)
            .field("password", &"<redacted>")
            .field("target", &self.target)
            .field("last_rotated", &self.last_rotated)
            .finish()
    }
}
