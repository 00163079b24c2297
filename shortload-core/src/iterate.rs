//! Load phase: one sampled redirect request per iteration

use crate::checks::{CheckOutcome, CheckRecorder, CheckStats, STATUS_IS_307};
use crate::error::{Result, WorkloadError};
use crate::token::{Token, TokenPool};
use shortload_http::{HttpClient, HttpRequest};
use std::sync::Arc;
use tracing::{debug, trace};

/// Samples a token and checks the redirect endpoint answers 307
///
/// Cheap to construct; every VU builds its own from the shared pool.
pub struct WorkloadIterator {
    client: Arc<dyn HttpClient>,
    pool: Arc<TokenPool>,
    redirect_base_url: String,
    check: Arc<CheckStats>,
}

impl WorkloadIterator {
    /// Fails with [`WorkloadError::EmptyPool`] when there is nothing to sample
    pub fn new(
        client: Arc<dyn HttpClient>,
        pool: Arc<TokenPool>,
        redirect_base_url: &str,
        checks: &CheckRecorder,
    ) -> Result<Self> {
        if pool.is_empty() {
            return Err(WorkloadError::EmptyPool);
        }

        Ok(Self {
            client,
            pool,
            redirect_base_url: redirect_base_url.trim_end_matches('/').to_string(),
            check: checks.check(STATUS_IS_307),
        })
    }

    pub fn pool(&self) -> &TokenPool {
        &self.pool
    }

    /// `{base}/{token}` with exactly one separator
    pub fn redirect_url(&self, token: &Token) -> String {
        format!("{}/{}", self.redirect_base_url, token)
    }

    /// Run one iteration and record its check
    pub async fn iterate(&self, rng: &mut fastrand::Rng) -> CheckOutcome {
        // `new` refuses empty pools, so this only guards a broken invariant
        let Some(token) = self.pool.sample(rng) else {
            return CheckOutcome {
                name: STATUS_IS_307,
                passed: false,
                status: None,
            };
        };
        let url = self.redirect_url(token);
        let request = HttpRequest::get(url.as_str()).without_redirects();

        let status = match self.client.send(request).await {
            Ok(response) => {
                trace!(
                    url = %url,
                    status = response.status,
                    location = response.header("location").unwrap_or_default(),
                    "Redirect response"
                );
                Some(response.status)
            }
            Err(e) => {
                debug!(url = %url, error = %e, "Redirect request failed");
                None
            }
        };

        let passed = status == Some(307);
        self.check.record(passed);

        CheckOutcome {
            name: STATUS_IS_307,
            passed,
            status,
        }
    }
}
