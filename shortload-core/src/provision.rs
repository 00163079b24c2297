//! Setup phase: build the token pool one provisioning call at a time

use crate::checks::{CheckRecorder, CheckStats, STATUS_IS_201};
use crate::error::{Result, WorkloadError};
use crate::token::{Token, TokenPool};
use serde_json::json;
use shortload_config::{SetupPolicy, TargetConfig, WorkloadConfig};
use shortload_http::{HttpClient, HttpRequest, HttpResponse};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of the setup phase
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub pool: TokenPool,
    /// Provisioning calls issued
    pub requested: usize,
    /// Responses whose status was not 201
    pub status_failures: usize,
    /// Responses without a usable `token` field
    pub extraction_failures: usize,
    /// Calls that got no response at all
    pub transport_failures: usize,
    pub elapsed: Duration,
}

impl ProvisionReport {
    /// Slots that did not make it into the pool
    pub fn skipped(&self) -> usize {
        self.requested - self.pool.len()
    }
}

/// Issues `count` sequential token-creation requests
pub struct Provisioner {
    client: Arc<dyn HttpClient>,
    admin_endpoint: String,
    target_url: String,
    count: usize,
    policy: SetupPolicy,
    check: Arc<CheckStats>,
}

impl Provisioner {
    pub fn new(
        client: Arc<dyn HttpClient>,
        admin_endpoint: impl Into<String>,
        target_url: impl Into<String>,
        count: usize,
        policy: SetupPolicy,
        checks: &CheckRecorder,
    ) -> Self {
        Self {
            client,
            admin_endpoint: admin_endpoint.into(),
            target_url: target_url.into(),
            count,
            policy,
            check: checks.check(STATUS_IS_201),
        }
    }

    pub fn from_config(
        client: Arc<dyn HttpClient>,
        target: &TargetConfig,
        workload: &WorkloadConfig,
        checks: &CheckRecorder,
    ) -> Self {
        Self::new(
            client,
            target.admin_endpoint.clone(),
            target.target_url.clone(),
            workload.pool_size,
            workload.setup_policy,
            checks,
        )
    }

    /// Run the setup phase
    ///
    /// Calls are strictly sequential and never retried. A failed check only
    /// aborts setup under [`SetupPolicy::FailFast`]; otherwise the slot is
    /// handled per policy and the loop moves on.
    pub async fn provision(&self) -> Result<ProvisionReport> {
        let started = Instant::now();
        let mut tokens = Vec::with_capacity(self.count);
        let mut report = ProvisionReport {
            pool: TokenPool::default(),
            requested: 0,
            status_failures: 0,
            extraction_failures: 0,
            transport_failures: 0,
            elapsed: Duration::ZERO,
        };

        info!(
            count = self.count,
            endpoint = %self.admin_endpoint,
            policy = %self.policy,
            "Provisioning token pool"
        );

        for index in 0..self.count {
            report.requested += 1;
            let request = HttpRequest::post_json(
                self.admin_endpoint.as_str(),
                json!({ "target": self.target_url }),
            );

            let response = match self.client.send(request).await {
                Ok(response) => response,
                Err(e) => {
                    self.check.record(false);
                    report.transport_failures += 1;
                    if self.policy == SetupPolicy::FailFast {
                        return Err(WorkloadError::Provisioning {
                            index,
                            reason: e.to_string(),
                        });
                    }
                    warn!(index, error = %e, "Provisioning request failed, skipping slot");
                    continue;
                }
            };

            let status_ok = response.status == 201;
            self.check.record(status_ok);
            if !status_ok {
                report.status_failures += 1;
            }

            let token = extract_token(&response);
            if token.is_none() {
                report.extraction_failures += 1;
            }

            match (self.policy, status_ok, token) {
                (_, true, Some(token)) | (SetupPolicy::Lenient, false, Some(token)) => {
                    if !status_ok {
                        debug!(index, status = response.status, "Keeping token despite failed check");
                    }
                    tokens.push(token);
                }
                (SetupPolicy::FailFast, _, token) => {
                    return Err(WorkloadError::Provisioning {
                        index,
                        reason: slot_failure(response.status, token.is_some()),
                    });
                }
                (_, _, token) => {
                    warn!(
                        index,
                        status = response.status,
                        "Skipping slot: {}",
                        slot_failure(response.status, token.is_some())
                    );
                }
            }
        }

        report.pool = TokenPool::from_tokens(tokens);
        report.elapsed = started.elapsed();

        info!(
            pool_size = report.pool.len(),
            requested = report.requested,
            skipped = report.skipped(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Token pool provisioned"
        );

        Ok(report)
    }
}

fn slot_failure(status: u16, has_token: bool) -> String {
    match (status == 201, has_token) {
        (false, true) => format!("expected status 201, got {}", status),
        (true, false) => "response carried no token".to_string(),
        _ => format!("expected status 201, got {} without a token", status),
    }
}

/// Pull the `token` string out of a provisioning response body
///
/// Missing, non-string and empty values all count as no token.
pub fn extract_token(response: &HttpResponse) -> Option<Token> {
    let body = response.json().ok()?;
    match body.get("token")?.as_str()? {
        "" => None,
        token => Some(Token::from(token)),
    }
}

/// Build a pool of `count` tokens with the default setup policy
pub async fn provision(
    client: Arc<dyn HttpClient>,
    count: usize,
    target_url: &str,
    admin_endpoint: &str,
) -> Result<TokenPool> {
    let checks = CheckRecorder::new();
    let provisioner = Provisioner::new(
        client,
        admin_endpoint,
        target_url,
        count,
        SetupPolicy::default(),
        &checks,
    );
    Ok(provisioner.provision().await?.pool)
}
