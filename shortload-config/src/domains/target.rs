//! Target service endpoints

use crate::error::ConfigResult;
use crate::validation::{validate_url, Validatable};
use serde::{Deserialize, Serialize};

/// Where the workload sends its traffic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Token-issuance endpoint, receives one POST per provisioned token
    #[serde(default = "default_admin_endpoint")]
    pub admin_endpoint: String,

    /// Base URL of the redirect service; iterations GET `{base}/{token}`
    #[serde(default = "default_redirect_base_url")]
    pub redirect_base_url: String,

    /// URL each provisioned token should redirect to, sent verbatim
    #[serde(default = "default_target_url")]
    pub target_url: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            admin_endpoint: default_admin_endpoint(),
            redirect_base_url: default_redirect_base_url(),
            target_url: default_target_url(),
        }
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.admin_endpoint, "admin_endpoint", self.domain_name())?;
        validate_url(&self.redirect_base_url, "redirect_base_url", self.domain_name())?;
        validate_url(&self.target_url, "target_url", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

fn default_admin_endpoint() -> String {
    "http://localhost:8080/admin/tokens".to_string()
}

fn default_redirect_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_target_url() -> String {
    "http://example.com".to_string()
}
