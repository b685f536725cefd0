use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection details for a broker's SEMP v1 management interface.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub semp_url: String,
    pub admin_username: String,
    pub admin_password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semp_version: Option<String>,
    #[serde(default)]
    pub tls_skip_verify: bool,
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("semp_url", &self.semp_url)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field("semp_version", &self.semp_version)
            .field("tls_skip_verify", &self.tls_skip_verify)
            .finish()
    }
}

/// Read view of a target. Never carries the admin password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetView {
    pub name: String,
    pub semp_url: String,
    pub admin_username: String,
    pub semp_version: Option<String>,
    pub tls_skip_verify: bool,
}

impl TargetView {
    #[must_use]
    pub fn new(name: &str, target: &Target) -> Self {
        Self {
            name: name.to_string(),
            semp_url: target.semp_url.clone(),
            admin_username: target.admin_username.clone(),
            semp_version: target.semp_version.clone(),
            tls_skip_verify: target.tls_skip_verify,
        }
    }
}
