use crate::models::{Metric, RatioSet, SectorAverages, ValuationMethod};

/// Price implied by re-rating the target to the sector's average multiple.
///
/// `fair = price * (sector_avg / target_ratio)`. Needs a price and a finite,
/// non-zero target multiple plus a sector average for the same ratio;
/// otherwise the result is [`Metric::Unavailable`]. A zero sector average
/// gives [`Metric::Unbounded`].
pub fn fair_value(
    target_ratios: &RatioSet,
    sector_averages: &SectorAverages,
    current_price: Option<f64>,
    method: ValuationMethod,
) -> Metric {
    let Some(price) = current_price else {
        return Metric::Unavailable;
    };
    let kind = method.ratio();

    let target = match target_ratios.get(kind).and_then(Metric::finite) {
        Some(t) if t != 0.0 => t,
        _ => return Metric::Unavailable,
    };
    let Some(sector) = sector_averages.get(kind).filter(|s| s.is_finite()) else {
        return Metric::Unavailable;
    };

    if sector == 0.0 {
        return Metric::Unbounded;
    }

    let multiplier = sector / target;
    let fair = price * multiplier;
    if fair.is_nan() {
        Metric::Unavailable
    } else if fair.is_infinite() {
        Metric::Unbounded
    } else {
        Metric::Value(fair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratios_with_pe(pe: Metric) -> RatioSet {
        RatioSet {
            pe: Some(pe),
            ..RatioSet::default()
        }
    }

    fn sector_with_pe(pe: f64) -> SectorAverages {
        SectorAverages {
            pe: Some(pe),
            ..SectorAverages::default()
        }
    }

    #[test]
    fn test_pe_rerating() {
        let fv = fair_value(
            &ratios_with_pe(Metric::Value(10.0)),
            &sector_with_pe(12.0),
            Some(100.0),
            ValuationMethod::PriceToEarnings,
        );
        assert_eq!(fv, Metric::Value(120.0));
    }

    #[test]
    fn test_pb_rerating() {
        let target = RatioSet {
            pb: Some(Metric::Value(2.0)),
            ..RatioSet::default()
        };
        let sector = SectorAverages {
            pb: Some(1.0),
            ..SectorAverages::default()
        };
        let fv = fair_value(&target, &sector, Some(50.0), ValuationMethod::PriceToBook);
        assert_eq!(fv, Metric::Value(25.0));
    }

    #[test]
    fn test_zero_sector_average_is_unbounded() {
        let fv = fair_value(
            &ratios_with_pe(Metric::Value(10.0)),
            &sector_with_pe(0.0),
            Some(100.0),
            ValuationMethod::PriceToEarnings,
        );
        assert_eq!(fv, Metric::Unbounded);
    }

    #[test]
    fn test_unbounded_or_zero_target_is_unavailable() {
        for target in [Metric::Unbounded, Metric::Value(0.0), Metric::Unavailable] {
            let fv = fair_value(
                &ratios_with_pe(target),
                &sector_with_pe(12.0),
                Some(100.0),
                ValuationMethod::PriceToEarnings,
            );
            assert_eq!(fv, Metric::Unavailable);
        }
    }

    #[test]
    fn test_missing_inputs_are_unavailable() {
        let target = ratios_with_pe(Metric::Value(10.0));
        let sector = sector_with_pe(12.0);

        assert_eq!(
            fair_value(&target, &sector, None, ValuationMethod::PriceToEarnings),
            Metric::Unavailable
        );
        assert_eq!(
            fair_value(&target, &SectorAverages::default(), Some(100.0), ValuationMethod::PriceToEarnings),
            Metric::Unavailable
        );
        // P/E present but P/B requested
        assert_eq!(
            fair_value(&target, &sector, Some(100.0), ValuationMethod::PriceToBook),
            Metric::Unavailable
        );
    }

    #[test]
    fn test_same_inputs_same_output() {
        let target = ratios_with_pe(Metric::Value(10.089_285_714_285_714));
        let sector = sector_with_pe(9.5);
        let a = fair_value(&target, &sector, Some(4520.0), ValuationMethod::PriceToEarnings);
        let b = fair_value(&target, &sector, Some(4520.0), ValuationMethod::PriceToEarnings);
        match (a, b) {
            (Metric::Value(x), Metric::Value(y)) => assert_eq!(x.to_bits(), y.to_bits()),
            other => panic!("unexpected {other:?}"),
        }
    }
}
