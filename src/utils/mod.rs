use std::time::{Duration, Instant};
use tracing::info;

use crate::models::{Metric, RatioKind};

/// A simple wall-clock timer for logging elapsed time.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("⏱  Starting: {}", label);
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(
            "⏱  Finished: {} (took {:.2?})",
            self.label,
            self.elapsed()
        );
    }
}

/// Format a large integer with thousands separators.
pub fn fmt_number(n: i64) -> String {
    group_thousands(&n.unsigned_abs().to_string(), n < 0)
}

/// Round a money amount to whole units and group thousands.
///
/// Works on the float's own digits, so amounts past `i64::MAX` are not clamped.
pub fn fmt_amount(v: f64) -> String {
    if !v.is_finite() {
        return "n/a".to_string();
    }
    let r = v.round();
    group_thousands(&format!("{:.0}", r.abs()), r < 0.0)
}

fn group_thousands(digits: &str, negative: bool) -> String {
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    if negative {
        result.push('-');
    }
    result.chars().rev().collect()
}

pub fn fmt_optional_amount(v: Option<f64>) -> String {
    v.map(fmt_amount).unwrap_or_else(|| "—".into())
}

/// `12.34x` for multiples, `12.34%` for margins.
pub fn fmt_ratio(kind: RatioKind, v: f64) -> String {
    if kind.is_multiple() {
        format!("{:.2}x", v)
    } else {
        format!("{:.2}%", v)
    }
}

/// Absent ratios print `n/a`, unbounded ones `∞`.
pub fn fmt_ratio_metric(kind: RatioKind, m: Option<Metric>) -> String {
    match m {
        Some(Metric::Value(v)) => fmt_ratio(kind, v),
        Some(Metric::Unbounded) => "∞".to_string(),
        Some(Metric::Unavailable) | None => "n/a".to_string(),
    }
}
