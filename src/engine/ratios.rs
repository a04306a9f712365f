use crate::models::{FinancialRecord, Metric, RatioSet};

/// Derive margin and multiple ratios from raw fundamentals.
///
/// Margins (net profit margin, ROE) are absent when their denominator is zero
/// or an input is missing. Multiples (P/E, P/B) need price and a non-zero
/// share count; beyond that a zero per-share figure makes them unbounded
/// rather than absent. NaN never reaches the returned set.
pub fn compute_ratios(
    net_income: Option<f64>,
    revenue: Option<f64>,
    total_equity: Option<f64>,
    current_price: Option<f64>,
    shares_outstanding: Option<f64>,
) -> RatioSet {
    let net_profit_margin = match (net_income, revenue) {
        (Some(ni), Some(rev)) if rev != 0.0 => finite_pct(ni / rev),
        _ => None,
    };

    let roe = match (net_income, total_equity) {
        (Some(ni), Some(eq)) if eq != 0.0 => finite_pct(ni / eq),
        _ => None,
    };

    let (pe, pb) = match (current_price, shares_outstanding) {
        (Some(price), Some(shares)) if shares != 0.0 => {
            let pe = match net_income {
                Some(ni) if ni != 0.0 => multiple(price, ni / shares),
                _ => Some(Metric::Unbounded),
            };
            let pb = match total_equity {
                Some(eq) if eq != 0.0 => multiple(price, eq / shares),
                _ => Some(Metric::Unbounded),
            };
            (pe, pb)
        }
        _ => (None, None),
    };

    RatioSet {
        net_profit_margin,
        roe,
        pe,
        pb,
    }
}

/// Convenience wrapper over [`compute_ratios`] for a whole record.
pub fn record_ratios(record: &FinancialRecord) -> RatioSet {
    compute_ratios(
        record.net_income,
        record.revenue,
        record.total_equity,
        record.current_price,
        record.shares_outstanding,
    )
}

fn finite_pct(fraction: f64) -> Option<Metric> {
    let pct = fraction * 100.0;
    pct.is_finite().then_some(Metric::Value(pct))
}

/// price / per-share figure; a zero (or underflowed) denominator is unbounded.
fn multiple(price: f64, per_share: f64) -> Option<Metric> {
    if per_share.is_nan() {
        return None;
    }
    if per_share == 0.0 {
        return Some(Metric::Unbounded);
    }
    let ratio = price / per_share;
    if ratio.is_nan() {
        None
    } else if ratio.is_infinite() {
        Some(Metric::Unbounded)
    } else {
        Some(Metric::Value(ratio))
    }
}
