//! Reliability metrics derived from a history snapshot.
//!
//! Everything here is a pure function of the records passed in. Views are
//! recomputed on every render instead of being cached.

use crate::api::HealthCheckRecord;

/// Uptime percentage at or above which a service is [`Severity::Normal`].
pub const NORMAL_UPTIME_PCT: f64 = 99.0;
/// Uptime percentage at or above which a service is [`Severity::Warn`].
pub const WARN_UPTIME_PCT: f64 = 95.0;

/// Number of checks drawn in the uptime bar.
const UPTIME_BLOCKS: usize = 30;
/// Number of checks plotted in the latency chart.
const LATENCY_POINTS: usize = 40;

/// Qualitative uptime band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Normal,
    Warn,
    Critical,
}

impl Severity {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Normal => "OK",
            Severity::Warn => "WARN",
            Severity::Critical => "CRIT",
        }
    }
}

/// Metrics derived from one service's history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateView {
    pub uptime_pct: Option<f64>,
    pub avg_latency: Option<f64>,
    pub severity: Option<Severity>,
}

impl AggregateView {
    /// Compute the view for a history snapshot.
    pub fn from_history(history: &[HealthCheckRecord]) -> Self {
        let uptime_pct = uptime_pct(history);
        Self {
            uptime_pct,
            avg_latency: avg_latency(history),
            severity: severity(uptime_pct),
        }
    }
}

/// Percentage of UP checks, rounded to one decimal. `None` for no history.
pub fn uptime_pct(history: &[HealthCheckRecord]) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let up = history.iter().filter(|r| r.is_up()).count();
    let pct = up as f64 / history.len() as f64 * 100.0;
    Some((pct * 10.0).round() / 10.0)
}

/// Mean latency in seconds over UP checks. `None` if there are none.
pub fn avg_latency(history: &[HealthCheckRecord]) -> Option<f64> {
    let (sum, count) = history
        .iter()
        .filter(|r| r.is_up())
        .fold((0.0, 0usize), |(sum, count), r| (sum + r.latency, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Classify an uptime percentage. Each band includes its lower bound.
pub fn severity(uptime_pct: Option<f64>) -> Option<Severity> {
    uptime_pct.map(|pct| {
        if pct >= NORMAL_UPTIME_PCT {
            Severity::Normal
        } else if pct >= WARN_UPTIME_PCT {
            Severity::Warn
        } else {
            Severity::Critical
        }
    })
}

/// The most recent check.
pub fn latest(history: &[HealthCheckRecord]) -> Option<&HealthCheckRecord> {
    history.first()
}

/// The newest checks for the uptime bar, oldest first.
pub fn uptime_blocks(history: &[HealthCheckRecord]) -> Vec<&HealthCheckRecord> {
    let mut blocks: Vec<_> = history.iter().take(UPTIME_BLOCKS).collect();
    blocks.reverse();
    blocks
}

/// Latency points for the chart, oldest first.
///
/// UP checks map to milliseconds rounded to one decimal; DOWN checks leave a
/// gap (`None`).
pub fn latency_series(history: &[HealthCheckRecord]) -> Vec<Option<f64>> {
    let mut points: Vec<Option<f64>> = history
        .iter()
        .take(LATENCY_POINTS)
        .map(|r| r.is_up().then(|| (r.latency * 1000.0 * 10.0).round() / 10.0))
        .collect();
    points.reverse();
    points
}
