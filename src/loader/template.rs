//! Starter `target.csv` / `peers.csv` files, either headers only or
//! pre-filled with a worked banking example.

use crate::loader::HEADERS;
use crate::models::FinancialRecord;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

pub const TARGET_FILE: &str = "target.csv";
pub const PEERS_FILE: &str = "peers.csv";

fn bank(ticker: &str, name: &str, price: f64, shares: f64, ni: f64, rev: f64, eq: f64) -> FinancialRecord {
    FinancialRecord {
        ticker: ticker.to_string(),
        name: name.to_string(),
        sector: "Perbankan".to_string(),
        current_price: Some(price),
        shares_outstanding: Some(shares),
        net_income: Some(ni),
        revenue: Some(rev),
        total_equity: Some(eq),
    }
}

pub fn sample_target() -> FinancialRecord {
    bank("BBRI", "Bank Rakyat Indonesia (Persero) Tbk", 4520.0, 125e9, 56e12, 150e12, 280e12)
}

pub fn sample_peers() -> Vec<FinancialRecord> {
    vec![
        bank("BBCA", "Bank Central Asia Tbk", 8750.0, 25e9, 32e12, 80e12, 180e12),
        bank("BMRI", "Bank Mandiri (Persero) Tbk", 6225.0, 23e9, 34e12, 95e12, 200e12),
        bank("BBNI", "Bank Negara Indonesia (Persero) Tbk", 4890.0, 19e9, 17e12, 65e12, 140e12),
    ]
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_table(path: &Path, records: &[FinancialRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create {:?}", path))?;
    writer.write_record(HEADERS)?;
    for r in records {
        writer.write_record([
            r.ticker.clone(),
            r.name.clone(),
            r.sector.clone(),
            cell(r.current_price),
            cell(r.shares_outstanding),
            cell(r.net_income),
            cell(r.revenue),
            cell(r.total_equity),
        ])?;
    }
    writer.flush().with_context(|| format!("Cannot write {:?}", path))?;
    Ok(())
}

/// Write both tables into `dir`, creating it if needed.
/// Returns the (target, peers) paths.
pub fn write_templates(dir: &Path, with_sample: bool) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir).with_context(|| format!("Could not create dir {:?}", dir))?;

    let target_path = dir.join(TARGET_FILE);
    let peers_path = dir.join(PEERS_FILE);

    if with_sample {
        write_table(&target_path, &[sample_target()])?;
        write_table(&peers_path, &sample_peers())?;
    } else {
        write_table(&target_path, &[])?;
        write_table(&peers_path, &[])?;
    }

    info!(
        "Wrote {} templates to {:?}",
        if with_sample { "sample" } else { "empty" },
        dir
    );
    Ok((target_path, peers_path))
}
