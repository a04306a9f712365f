//! Rendering of analysis results for the terminal or for other tools.

use crate::config::OutputFormat;
use crate::engine::ratios::record_ratios;
use crate::models::{FinancialRecord, Metric, RatioKind, ValuationReport};
use crate::utils::{fmt_amount, fmt_number, fmt_optional_amount, fmt_ratio, fmt_ratio_metric};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt::Write;

const RULE: &str = "──────────────────────────────────────────────────────────";

pub fn render(report: &ValuationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => render_json(report),
    }
}

pub fn render_json(report: &ValuationReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialise report")
}

fn fair_value_cell(m: Metric) -> String {
    match m {
        Metric::Value(v) => fmt_amount(v),
        Metric::Unbounded => "∞ (sector multiple is zero)".to_string(),
        Metric::Unavailable => "n/a".to_string(),
    }
}

// `write!` into a String cannot fail.
pub fn render_text(report: &ValuationReport) -> String {
    let mut out = String::new();
    let t = &report.target;

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "  {} — {}", t.ticker, t.name);
    let _ = writeln!(out, "  Sector : {}", t.sector);
    let _ = writeln!(out, "  Price  : {}", fmt_optional_amount(t.current_price));
    let _ = writeln!(out, "  Shares : {}", fmt_optional_amount(t.shares_outstanding));
    let _ = writeln!(out, "{RULE}");

    let _ = writeln!(out, "  {:<24}{:>14}{:>16}", "Ratio", "Target", "Sector avg");
    for kind in RatioKind::ALL {
        let sector = report
            .sector_averages
            .and_then(|a| a.get(kind))
            .map(|v| fmt_ratio(kind, v))
            .unwrap_or_else(|| "n/a".into());
        let _ = writeln!(
            out,
            "  {:<24}{:>14}{:>16}",
            kind.label(),
            fmt_ratio_metric(kind, report.target_ratios.get(kind)),
            sector
        );
    }
    let _ = writeln!(out, "{RULE}");

    if report.comparables.is_empty() {
        let _ = writeln!(out, "  No comparables found in sector {:?}", t.sector);
    } else {
        let _ = writeln!(out, "  Comparables ({}):", report.comparables.len());
        for c in &report.comparables {
            let _ = writeln!(
                out,
                "    {:<8}{:<40}{:>12}",
                c.ticker,
                c.name,
                fmt_optional_amount(c.current_price)
            );
        }
        if report.sector_averages.is_none() {
            let _ = writeln!(out, "  No comparable had enough data to average");
        }
    }
    let _ = writeln!(out, "{RULE}");

    for fv in &report.fair_values {
        let status = fv
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "not rated".into());
        let upside = fv
            .upside_pct
            .map(|u| format!(" ({:+.1}%)", u))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  Fair value ({}) : {}{}  → {}",
            fv.method,
            fair_value_cell(fv.fair_value),
            upside,
            status
        );
    }
    let _ = writeln!(out, "  Recommendation  : {}", report.recommendation);
    let _ = writeln!(out, "{RULE}");
    out
}

/// One line per record with its derived ratios.
pub fn render_ratio_table(records: &[FinancialRecord]) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<8}{:<16}", "Ticker", "Sector");
    for kind in RatioKind::ALL {
        let _ = write!(out, "{:>24}", kind.label());
    }
    let _ = writeln!(out);

    for r in records {
        let ratios = record_ratios(r);
        let _ = write!(out, "{:<8}{:<16}", r.ticker, r.sector);
        for kind in RatioKind::ALL {
            let _ = write!(out, "{:>24}", fmt_ratio_metric(kind, ratios.get(kind)));
        }
        let _ = writeln!(out);
    }
    out
}

/// Records per sector, grouped the way sector matching groups them.
pub fn sector_counts(records: &[FinancialRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for r in records {
        *counts.entry(r.sector.to_lowercase()).or_insert(0) += 1;
    }
    counts
}

pub fn render_sectors(records: &[FinancialRecord]) -> String {
    let counts = sector_counts(records);
    let mut out = String::new();
    let _ = writeln!(out, "{} sectors:", fmt_number(counts.len() as i64));
    for (sector, n) in &counts {
        let _ = writeln!(out, "  {:<32}{:>6}", format!("{:?}", sector), n);
    }
    out
}
