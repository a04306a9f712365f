use crate::models::{Recommendation, ValuationStatus};

/// Default half-width of the FAIR band around the fair value.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// Place `current_price` relative to a finite positive `fair_value`.
///
/// Below `fair * (1 - tolerance)` is undervalued, above `fair * (1 + tolerance)`
/// is overvalued, anything in between (bounds included) is fair.
pub fn classify(current_price: f64, fair_value: f64, tolerance: f64) -> ValuationStatus {
    if current_price < fair_value * (1.0 - tolerance) {
        ValuationStatus::Undervalued
    } else if current_price > fair_value * (1.0 + tolerance) {
        ValuationStatus::Overvalued
    } else {
        ValuationStatus::Fair
    }
}

/// Majority vote over per-method statuses. FAIR casts no vote; ties,
/// including an empty vote, are HOLD.
pub fn recommend<I>(statuses: I) -> Recommendation
where
    I: IntoIterator<Item = ValuationStatus>,
{
    let (mut under, mut over) = (0usize, 0usize);
    for status in statuses {
        match status {
            ValuationStatus::Undervalued => under += 1,
            ValuationStatus::Overvalued => over += 1,
            ValuationStatus::Fair => {}
        }
    }

    match under.cmp(&over) {
        std::cmp::Ordering::Greater => Recommendation::Buy,
        std::cmp::Ordering::Less => Recommendation::HoldOrSell,
        std::cmp::Ordering::Equal => Recommendation::Hold,
    }
}
