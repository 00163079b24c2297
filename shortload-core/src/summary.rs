//! End-of-run summary

use crate::checks::CheckSnapshot;
use crate::provision::ProvisionReport;
use serde::Serialize;
use std::fmt::Write;
use std::time::Duration;

/// Setup phase counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetupSummary {
    pub requested: usize,
    pub pool_size: usize,
    pub status_failures: usize,
    pub extraction_failures: usize,
    pub transport_failures: usize,
    pub elapsed_ms: u64,
}

impl From<&ProvisionReport> for SetupSummary {
    fn from(report: &ProvisionReport) -> Self {
        Self {
            requested: report.requested,
            pool_size: report.pool.len(),
            status_failures: report.status_failures,
            extraction_failures: report.extraction_failures,
            transport_failures: report.transport_failures,
            elapsed_ms: report.elapsed.as_millis() as u64,
        }
    }
}

/// Everything a run reports once it is over
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub setup: SetupSummary,
    pub vus: usize,
    /// Iterations that ran to completion
    pub iterations: u64,
    pub load_elapsed_ms: u64,
    pub iterations_per_second: f64,
    pub checks: Vec<CheckSnapshot>,
    /// Failed checks over all recorded checks, setup included
    pub check_failure_rate: f64,
    /// Load phase was cut short by a shutdown signal
    pub interrupted: bool,
}

impl RunSummary {
    pub fn new(
        setup: SetupSummary,
        vus: usize,
        iterations: u64,
        load_elapsed: Duration,
        checks: Vec<CheckSnapshot>,
        interrupted: bool,
    ) -> Self {
        let secs = load_elapsed.as_secs_f64();
        let iterations_per_second = if secs > 0.0 {
            iterations as f64 / secs
        } else {
            0.0
        };

        let total: u64 = checks.iter().map(CheckSnapshot::total).sum();
        let fails: u64 = checks.iter().map(|c| c.fails).sum();
        let check_failure_rate = if total > 0 {
            fails as f64 / total as f64
        } else {
            0.0
        };

        Self {
            setup,
            vus,
            iterations,
            load_elapsed_ms: load_elapsed.as_millis() as u64,
            iterations_per_second,
            checks,
            check_failure_rate,
            interrupted,
        }
    }

    pub fn failed_checks(&self) -> u64 {
        self.checks.iter().map(|c| c.fails).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_checks() > 0
    }

    /// Human-readable report, one check per line
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "setup: {}/{} tokens provisioned in {}ms ({} bad status, {} missing token, {} transport errors)",
            self.setup.pool_size,
            self.setup.requested,
            self.setup.elapsed_ms,
            self.setup.status_failures,
            self.setup.extraction_failures,
            self.setup.transport_failures,
        );
        let _ = writeln!(
            out,
            "load:  {} iterations across {} VUs in {}ms ({:.1} it/s){}",
            self.iterations,
            self.vus,
            self.load_elapsed_ms,
            self.iterations_per_second,
            if self.interrupted { ", interrupted" } else { "" },
        );
        for check in &self.checks {
            let mark = if check.fails == 0 { "ok  " } else { "FAIL" };
            let _ = writeln!(
                out,
                "  {} {:<16} {:>6.2}% ({} passed, {} failed)",
                mark,
                check.name,
                check.pass_rate() * 100.0,
                check.passes,
                check.fails,
            );
        }
        out
    }
}
