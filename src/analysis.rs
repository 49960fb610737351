//! Full analysis of one session dataset.

use std::fmt;

use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::sim::types::Session;
use crate::stats::summary::SUMMARY_HEADER;
use crate::stats::{
    BootstrapResult, GroupSummary, Metric, PercentileBootstrap, TestResult, TwoSample,
    proportion_ztest, summarize, welch_ttest,
};

/// Summary table plus every hypothesis test for one dataset.
///
/// Each test is computed independently; a test that cannot run on this
/// dataset stores its error and leaves the others untouched.
#[derive(Debug)]
pub struct AnalysisReport {
    pub n_sessions: usize,
    pub summary: Vec<GroupSummary>,
    /// z-test on `charged_in_low`.
    pub proportion_test: Result<TestResult>,
    /// Welch t-test on `energy_kwh`.
    pub energy_ttest: Result<TestResult>,
    pub bootstrap_metric: Metric,
    pub bootstrap: Result<BootstrapResult>,
}

impl AnalysisReport {
    /// Runs the summary, z-test, t-test, and bootstrap on `sessions`.
    pub fn run(sessions: &[Session], config: &AnalysisConfig) -> Self {
        let summary = summarize(sessions);

        let proportion_test =
            proportion_ztest(&TwoSample::from_sessions(sessions, Metric::ChargedInLow));
        log_outcome("proportion z-test", &proportion_test);

        let energy_ttest = welch_ttest(&TwoSample::from_sessions(sessions, Metric::EnergyKwh));
        log_outcome("welch t-test", &energy_ttest);

        let bootstrap = PercentileBootstrap::with_confidence(
            config.n_boot,
            config.bootstrap_seed,
            config.confidence,
        )
        .and_then(|b| b.run(&TwoSample::from_sessions(sessions, config.bootstrap_metric)));
        match &bootstrap {
            Ok(b) => info!(
                metric = %config.bootstrap_metric,
                ci_lower = b.ci_lower,
                ci_upper = b.ci_upper,
                "bootstrap computed"
            ),
            Err(e) => warn!(metric = %config.bootstrap_metric, error = %e, "bootstrap failed"),
        }

        Self {
            n_sessions: sessions.len(),
            summary,
            proportion_test,
            energy_ttest,
            bootstrap_metric: config.bootstrap_metric,
            bootstrap,
        }
    }
}

fn log_outcome(test: &str, outcome: &Result<TestResult>) {
    match outcome {
        Ok(r) => info!(test = test, statistic = r.statistic, pvalue = r.pvalue, "test computed"),
        Err(e) => warn!(test = test, error = %e, "test failed"),
    }
}

fn write_outcome<T: fmt::Display>(f: &mut fmt::Formatter<'_>, outcome: &Result<T>) -> fmt::Result {
    match outcome {
        Ok(r) => writeln!(f, "{r}"),
        Err(e) => writeln!(f, "not computed: {e}"),
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Loaded data: {} sessions", self.n_sessions)?;
        writeln!(f)?;
        writeln!(f, "KPI summary by group:")?;
        writeln!(f, "{SUMMARY_HEADER}")?;
        for row in &self.summary {
            writeln!(f, "{row}")?;
        }
        writeln!(f)?;
        writeln!(f, "Proportion test (charged_in_low):")?;
        write_outcome(f, &self.proportion_test)?;
        writeln!(f)?;
        writeln!(f, "T-test (energy_kwh):")?;
        write_outcome(f, &self.energy_ttest)?;
        writeln!(f)?;
        writeln!(f, "Bootstrap CI for difference in {}:", self.bootstrap_metric)?;
        match &self.bootstrap {
            Ok(b) => write!(f, "{b}"),
            Err(e) => write!(f, "not computed: {e}"),
        }
    }
}
