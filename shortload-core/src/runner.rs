//! Two-phase run: sequential setup, then concurrent virtual users

use crate::checks::CheckRecorder;
use crate::error::{Result, WorkloadError};
use crate::gate::{GateWaiter, PhaseGate};
use crate::iterate::WorkloadIterator;
use crate::provision::Provisioner;
use crate::summary::{RunSummary, SetupSummary};
use shortload_config::{ShortloadConfig, TargetConfig, WorkloadConfig};
use shortload_http::{HttpClient, HttpManager};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Iterations left to hand out; `None` means bounded by duration only
struct IterationBudget {
    remaining: Option<AtomicU64>,
}

impl IterationBudget {
    fn new(iterations: Option<u64>) -> Self {
        Self {
            remaining: iterations.map(AtomicU64::new),
        }
    }

    fn try_acquire(&self) -> bool {
        match &self.remaining {
            None => true,
            Some(remaining) => remaining
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .is_ok(),
        }
    }
}

/// Shared by every VU task
#[derive(Clone)]
struct VuContext {
    client: Arc<dyn HttpClient>,
    redirect_base_url: Arc<str>,
    checks: Arc<CheckRecorder>,
    budget: Arc<IterationBudget>,
    completed: Arc<AtomicU64>,
    seed: Option<u64>,
}

enum LoadEnd {
    Finished,
    Deadline,
    Shutdown,
}

/// Drives a whole run from configuration
pub struct LoadRunner {
    client: Arc<dyn HttpClient>,
    target: TargetConfig,
    workload: WorkloadConfig,
    checks: Arc<CheckRecorder>,
}

impl LoadRunner {
    pub fn new(client: Arc<dyn HttpClient>, target: TargetConfig, workload: WorkloadConfig) -> Self {
        Self {
            client,
            target,
            workload,
            checks: Arc::new(CheckRecorder::new()),
        }
    }

    /// Build a runner with a `reqwest` client configured from `config.http`
    pub fn from_config(config: &ShortloadConfig) -> Result<Self> {
        let client = HttpManager::with_config(config.http.clone().into())?;
        Ok(Self::new(
            Arc::new(client),
            config.target.clone(),
            config.workload.clone(),
        ))
    }

    pub fn checks(&self) -> &Arc<CheckRecorder> {
        &self.checks
    }

    /// Run to completion
    pub async fn run(&self) -> Result<RunSummary> {
        self.run_until(std::future::pending()).await
    }

    /// Run until done or until `shutdown` resolves
    ///
    /// VUs are spawned first and park on the phase gate; the gate opens only
    /// once setup has produced a non-empty pool. A setup failure closes the
    /// gate and the VUs exit without issuing a request.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let gate = PhaseGate::new();
        let context = VuContext {
            client: Arc::clone(&self.client),
            redirect_base_url: Arc::from(self.target.redirect_base_url.as_str()),
            checks: Arc::clone(&self.checks),
            budget: Arc::new(IterationBudget::new(self.workload.effective_iterations())),
            completed: Arc::new(AtomicU64::new(0)),
            seed: self.workload.seed,
        };

        let mut vus = JoinSet::new();
        for vu in 0..self.workload.vus {
            vus.spawn(run_vu(vu, gate.waiter(), context.clone()));
        }

        let provisioner = Provisioner::from_config(
            Arc::clone(&self.client),
            &self.target,
            &self.workload,
            &self.checks,
        );
        let setup = tokio::select! {
            biased;
            _ = &mut shutdown => Err(WorkloadError::Interrupted),
            result = provisioner.provision() => result,
        };

        let report = match setup {
            Ok(report) if report.pool.is_empty() => {
                warn!(requested = report.requested, "Setup produced no usable tokens");
                gate.close();
                drain(&mut vus).await;
                return Err(WorkloadError::EmptyPool);
            }
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Setup failed, cancelling load phase");
                gate.close();
                drain(&mut vus).await;
                return Err(e);
            }
        };

        let setup_summary = SetupSummary::from(&report);
        info!(
            vus = self.workload.vus,
            iterations = ?self.workload.effective_iterations(),
            duration = ?self.workload.duration,
            "Setup complete, starting load phase"
        );

        let load_started = Instant::now();
        gate.open(Arc::new(report.pool));

        let duration = self.workload.duration;
        let deadline = async move {
            match duration {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending().await,
            }
        };

        let end = tokio::select! {
            biased;
            _ = &mut shutdown => LoadEnd::Shutdown,
            _ = deadline => LoadEnd::Deadline,
            _ = drain(&mut vus) => LoadEnd::Finished,
        };

        if !matches!(end, LoadEnd::Finished) {
            // In-flight iterations are abandoned
            vus.abort_all();
            drain(&mut vus).await;
        }

        let summary = RunSummary::new(
            setup_summary,
            self.workload.vus,
            context.completed.load(Ordering::Relaxed),
            load_started.elapsed(),
            self.checks.snapshot(),
            matches!(end, LoadEnd::Shutdown),
        );

        info!(
            iterations = summary.iterations,
            failed_checks = summary.failed_checks(),
            elapsed_ms = summary.load_elapsed_ms,
            "Load phase finished"
        );

        Ok(summary)
    }
}

async fn drain(vus: &mut JoinSet<()>) {
    while let Some(result) = vus.join_next().await {
        if let Err(e) = result {
            if e.is_panic() {
                warn!(error = %e, "VU task panicked");
            }
        }
    }
}

async fn run_vu(vu: usize, mut waiter: GateWaiter, context: VuContext) {
    let Some(pool) = waiter.wait().await else {
        debug!(vu, "Gate closed before setup finished, VU exiting");
        return;
    };

    let iterator = match WorkloadIterator::new(
        context.client,
        pool,
        &context.redirect_base_url,
        &context.checks,
    ) {
        Ok(iterator) => iterator,
        Err(e) => {
            warn!(vu, error = %e, "VU cannot start");
            return;
        }
    };

    let mut rng = match context.seed {
        Some(seed) => fastrand::Rng::with_seed(seed.wrapping_add(vu as u64)),
        None => fastrand::Rng::new(),
    };

    let mut iterations = 0u64;
    while context.budget.try_acquire() {
        iterator.iterate(&mut rng).await;
        context.completed.fetch_add(1, Ordering::Relaxed);
        iterations += 1;
        // Offline clients complete without suspending
        tokio::task::yield_now().await;
    }

    debug!(vu, iterations, "VU finished");
}
