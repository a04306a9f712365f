//! Relative valuation engine.
//!
//! One analysis is a single synchronous pass:
//!   1. Derive the target's ratios (`ratios`)
//!   2. Keep peers in the target's sector and average their ratios (`sector`)
//!   3. Re-rate the target to the sector P/E and P/B (`fair_value`)
//!   4. Band each fair value against the current price and vote (`classifier`)
//!
//! Nothing here fails: missing or degenerate inputs surface as absent ratios
//! and [`Metric::Unavailable`] / [`Metric::Unbounded`] fair values.

pub mod classifier;
pub mod fair_value;
pub mod ratios;
pub mod sector;

use crate::config::ValuationConfig;
use crate::models::{
    FairValueResult, FinancialRecord, Metric, RatioSet, SectorAverages, ValuationMethod,
    ValuationReport,
};
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use self::classifier::{classify, recommend};
use self::fair_value::fair_value;
use self::ratios::record_ratios;
use self::sector::{average_ratios, filter_by_sector};

/// Run the full valuation of `target` against `peers`.
///
/// `now` only stamps the report; identical inputs give identical reports.
pub fn analyze(
    target: &FinancialRecord,
    peers: &[FinancialRecord],
    config: &ValuationConfig,
    now: NaiveDateTime,
) -> ValuationReport {
    let target_ratios = record_ratios(target);
    if target_ratios.is_empty() {
        warn!("{}: no ratio could be computed", target.ticker);
    }
    debug!("{}: ratios {:?}", target.ticker, target_ratios);

    let comparables = filter_by_sector(peers, &target.sector);
    let averages = average_ratios(comparables.iter().copied());
    let sector_averages = (!averages.is_empty()).then_some(averages);

    if comparables.is_empty() {
        info!("No comparables in sector {:?}", target.sector);
    } else if sector_averages.is_none() {
        info!(
            "{} comparables in sector {:?}, none with usable ratios",
            comparables.len(),
            target.sector
        );
    }

    let fair_values: Vec<FairValueResult> = ValuationMethod::ALL
        .iter()
        .map(|method| {
            evaluate(
                *method,
                &target_ratios,
                sector_averages.as_ref(),
                target.current_price,
                config.tolerance,
            )
        })
        .collect();

    let recommendation = recommend(fair_values.iter().filter_map(|fv| fv.status));
    info!("{}: recommendation {}", target.ticker, recommendation);

    ValuationReport {
        target: target.clone(),
        target_ratios,
        comparables: comparables.into_iter().cloned().collect(),
        sector_averages,
        fair_values,
        recommendation,
        generated_at: now,
    }
}

/// Fair value, status and upside for one method.
pub fn evaluate(
    method: ValuationMethod,
    target_ratios: &RatioSet,
    sector_averages: Option<&SectorAverages>,
    current_price: Option<f64>,
    tolerance: f64,
) -> FairValueResult {
    let fair = match sector_averages {
        Some(averages) => fair_value(target_ratios, averages, current_price, method),
        None => Metric::Unavailable,
    };

    let (status, upside_pct) = match (fair, current_price) {
        (Metric::Value(fv), Some(price)) if fv > 0.0 && price > 0.0 => (
            Some(classify(price, fv, tolerance)),
            Some((fv / price - 1.0) * 100.0),
        ),
        _ => (None, None),
    };

    debug!("{} fair value {:?}, status {:?}", method, fair, status);

    FairValueResult {
        method,
        fair_value: fair,
        status,
        upside_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Recommendation, ValuationStatus};
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 28)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap()
    }

    fn record(ticker: &str, sector: &str, price: f64, shares: f64, ni: f64, rev: f64, eq: f64) -> FinancialRecord {
        FinancialRecord {
            ticker: ticker.to_string(),
            name: format!("{ticker} Tbk"),
            sector: sector.to_string(),
            current_price: Some(price),
            shares_outstanding: Some(shares),
            net_income: Some(ni),
            revenue: Some(rev),
            total_equity: Some(eq),
        }
    }

    fn bbri() -> FinancialRecord {
        record("BBRI", "Perbankan", 4520.0, 125e9, 56e12, 150e12, 280e12)
    }

    /// Two banks trading at 9x and 10x earnings, so the sector P/E is 9.5.
    fn banking_peers() -> Vec<FinancialRecord> {
        vec![
            record("AAA", "perbankan", 900.0, 1e9, 1e11, 4e11, 1e12),
            record("BBB", "PERBANKAN", 1000.0, 1e9, 1e11, 4e11, 1e12),
            record("MIN", "Mining", 50.0, 1e9, 1e11, 4e11, 1e12),
        ]
    }

    #[test]
    fn test_target_overvalued_on_pe() {
        let report = analyze(&bbri(), &banking_peers(), &ValuationConfig::default(), now());

        assert_eq!(report.comparables.len(), 2);
        let averages = report.sector_averages.unwrap();
        assert!((averages.pe.unwrap() - 9.5).abs() < 1e-12);

        let pe = report.fair_values[0];
        assert_eq!(pe.method, ValuationMethod::PriceToEarnings);
        let fv = pe.fair_value.finite().unwrap();
        // 4520 * 9.5 / (4520 / 448)
        assert!((fv - 4256.0).abs() < 1e-6);
        assert_eq!(pe.status, Some(ValuationStatus::Overvalued));
        assert!(pe.upside_pct.unwrap() < 0.0);
    }

    #[test]
    fn test_pb_and_recommendation() {
        let report = analyze(&bbri(), &banking_peers(), &ValuationConfig::default(), now());

        // peers: book value/share 1000, P/B 0.9 and 1.0; target P/B 4520/2240
        let pb = report.fair_values[1];
        assert_eq!(pb.method, ValuationMethod::PriceToBook);
        let fv = pb.fair_value.finite().unwrap();
        assert!((fv - 0.95 * 2240.0).abs() < 1e-6);
        assert_eq!(pb.status, Some(ValuationStatus::Overvalued));
        assert_eq!(report.recommendation, Recommendation::HoldOrSell);
    }

    #[test]
    fn test_no_comparables_holds() {
        let peers = vec![record("MIN", "Mining", 50.0, 1e9, 1e11, 4e11, 1e12)];
        let report = analyze(&bbri(), &peers, &ValuationConfig::default(), now());

        assert!(report.comparables.is_empty());
        assert_eq!(report.sector_averages, None);
        for fv in &report.fair_values {
            assert_eq!(fv.fair_value, Metric::Unavailable);
            assert_eq!(fv.status, None);
        }
        assert_eq!(report.recommendation, Recommendation::Hold);
    }

    #[test]
    fn test_zero_earnings_target() {
        let target = record("LOSS", "Perbankan", 100.0, 1e9, 0.0, 4e11, 1e12);
        let report = analyze(&target, &banking_peers(), &ValuationConfig::default(), now());

        assert_eq!(report.target_ratios.pe, Some(Metric::Unbounded));
        assert_eq!(report.fair_values[0].fair_value, Metric::Unavailable);
        assert!(report.fair_values[1].status.is_some());
    }

    #[test]
    fn test_negative_fair_value_is_not_classified() {
        let target = record("NEG", "Perbankan", 100.0, 1e9, -1e10, 4e11, 1e12);
        let result = analyze(&target, &banking_peers(), &ValuationConfig::default(), now());

        let pe = result.fair_values[0];
        assert!(pe.fair_value.finite().unwrap() < 0.0);
        assert_eq!(pe.status, None);
        assert_eq!(pe.upside_pct, None);
    }

    #[test]
    fn test_analysis_is_repeatable() {
        let config = ValuationConfig::default();
        let a = analyze(&bbri(), &banking_peers(), &config, now());
        let b = analyze(&bbri(), &banking_peers(), &config, now());
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
