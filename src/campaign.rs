//! Check outcomes and campaign-level reporting.
//!
//! Every check in the correctness and UI campaigns resolves to one of
//! four tiers: a hard failure (assertion violated on a resource that is
//! guaranteed to exist), a warning (marker absent where layout varies by
//! firmware build), a skip (optional resource not present on this BMC),
//! or a pass. Transient faults during optional traversals are folded
//! into skips by the checks themselves and never propagate.

use std::time::{Duration, Instant};
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed,
    Warned(String),
    Skipped(String),
    Failed(String),
}

impl CheckOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped(reason.into())
    }

    pub fn warned(reason: impl Into<String>) -> Self {
        Self::Warned(reason.into())
    }
}

/// One executed check with its outcome and wall-clock duration.
#[derive(Debug, Clone)]
pub struct CheckRun {
    pub name: &'static str,
    pub outcome: CheckOutcome,
    pub elapsed: Duration,
}

/// Accumulates check results for one campaign run.
#[derive(Debug)]
pub struct CampaignReport {
    pub campaign: &'static str,
    pub runs: Vec<CheckRun>,
}

impl CampaignReport {
    pub fn new(campaign: &'static str) -> Self {
        Self {
            campaign,
            runs: Vec::new(),
        }
    }

    /// Runs a single named check, logs its outcome, and records it.
    pub async fn record<F>(&mut self, name: &'static str, check: F)
    where
        F: std::future::Future<Output = CheckOutcome>,
    {
        let started = Instant::now();
        let outcome = check.await;
        let elapsed = started.elapsed();
        match &outcome {
            CheckOutcome::Passed => info!(check = name, ?elapsed, "check passed"),
            CheckOutcome::Warned(reason) => warn!(check = name, %reason, "check warning"),
            CheckOutcome::Skipped(reason) => info!(check = name, %reason, "check skipped"),
            CheckOutcome::Failed(reason) => error!(check = name, %reason, "check FAILED"),
        }
        self.runs.push(CheckRun {
            name,
            outcome,
            elapsed,
        });
    }

    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Passed))
    }

    pub fn warned(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Warned(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, CheckOutcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&CheckOutcome) -> bool) -> usize {
        self.runs.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn log_summary(&self) {
        info!(
            campaign = self.campaign,
            total = self.runs.len(),
            passed = self.passed(),
            warned = self.warned(),
            skipped = self.skipped(),
            failed = self.failed(),
            "campaign finished"
        );
        for run in &self.runs {
            match &run.outcome {
                CheckOutcome::Failed(reason) => {
                    error!(check = run.name, %reason, "hard failure")
                }
                CheckOutcome::Warned(reason) => warn!(check = run.name, %reason, "warning"),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn report_counts_by_tier() {
        let mut report = CampaignReport::new("test");
        report.record("a", async { CheckOutcome::Passed }).await;
        report
            .record("b", async { CheckOutcome::skipped("absent") })
            .await;
        report
            .record("c", async { CheckOutcome::failed("bad value") })
            .await;
        report
            .record("d", async { CheckOutcome::warned("marker missing") })
            .await;

        assert_eq!(report.passed(), 1);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.warned(), 1);
        assert!(report.has_failures());
    }

    #[tokio::test]
    async fn warnings_and_skips_are_not_failures() {
        let mut report = CampaignReport::new("test");
        report
            .record("a", async { CheckOutcome::warned("w") })
            .await;
        report
            .record("b", async { CheckOutcome::skipped("s") })
            .await;
        assert!(!report.has_failures());
    }
}
