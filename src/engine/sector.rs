use crate::engine::ratios::record_ratios;
use crate::models::{FinancialRecord, RatioKind, SectorAverages};
use tracing::{debug, trace};

/// Peers whose sector equals `target_sector` ignoring case.
///
/// Whitespace is significant: `"Banking "` does not match `"Banking"`.
pub fn filter_by_sector<'a>(
    peers: &'a [FinancialRecord],
    target_sector: &str,
) -> Vec<&'a FinancialRecord> {
    let wanted = target_sector.to_lowercase();
    let matched: Vec<&FinancialRecord> = peers
        .iter()
        .filter(|p| p.sector.to_lowercase() == wanted)
        .collect();
    debug!(
        "{} of {} peers in sector {:?}",
        matched.len(),
        peers.len(),
        target_sector
    );
    matched
}

/// Mean of each ratio across complete peers.
///
/// Incomplete peers (any missing input, or zero shares) are skipped. Each
/// ratio averages only the peers where it came out finite, so one unbounded
/// P/E does not poison the sector mean. A ratio with no contributors is left
/// absent.
pub fn average_ratios<'a, I>(peers: I) -> SectorAverages
where
    I: IntoIterator<Item = &'a FinancialRecord>,
{
    // Running means: summing first would overflow to inf on huge multiples.
    let mut means = [0.0_f64; 4];
    let mut counts = [0usize; 4];

    for peer in peers {
        if !peer.is_complete() {
            trace!("{}: incomplete, skipped from sector average", peer.ticker);
            continue;
        }
        let ratios = record_ratios(peer);
        for (i, kind) in RatioKind::ALL.iter().enumerate() {
            if let Some(v) = ratios.get(*kind).and_then(|m| m.finite()) {
                counts[i] += 1;
                let n = counts[i] as f64;
                means[i] += v / n - means[i] / n;
            }
        }
    }

    let mut averages = SectorAverages::default();
    for (i, kind) in RatioKind::ALL.iter().enumerate() {
        if counts[i] > 0 && means[i].is_finite() {
            averages.set(*kind, Some(means[i]));
        }
    }
    averages
}
