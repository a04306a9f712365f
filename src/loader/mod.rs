//! CSV loader for the target and peers tables.
//!
//! Columns are located by header name, so column order does not matter and
//! extra columns are ignored. Both the snake_case headers written by
//! `fair-value template` and the original spreadsheet headers are accepted.

pub mod cleaner;
pub mod template;

use crate::config::LoaderConfig;
use crate::models::{FinancialRecord, RawRecordRow};
use cleaner::raw_row_to_record;
use csv::StringRecord;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const TARGET_TABLE: &str = "target";
pub const PEERS_TABLE: &str = "peers";
/// Label for a table read outside the target/peers roles, e.g. for screening.
pub const INPUT_TABLE: &str = "input";

/// Header row written by the templates, in column order.
pub const HEADERS: [&str; 8] = [
    "ticker",
    "name",
    "sector",
    "current_price",
    "shares_outstanding",
    "net_income",
    "revenue",
    "total_equity",
];

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Cannot open {table} table at {path:?}: {source}")]
    Io {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed {table} table: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("The {table} table has no '{column}' column")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
    #[error("The {table} table has no data rows")]
    EmptyTable { table: &'static str },
    #[error("Target {ticker} is incomplete, missing: {}", .fields.join(", "))]
    IncompleteTarget {
        ticker: String,
        fields: Vec<&'static str>,
    },
}

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable record source. The engine only ever sees its output.
pub trait RecordSource {
    /// The single company being valued. Every field must be present.
    fn load_target(&self) -> Result<FinancialRecord, LoaderError>;
    /// Candidate comparables; may be empty.
    fn load_peers(&self) -> Result<Vec<FinancialRecord>, LoaderError>;
}

// ── CSV source ────────────────────────────────────────────────────────────────

pub struct CsvSource {
    target_path: PathBuf,
    peers_path: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    pub fn new(config: &LoaderConfig) -> Self {
        Self {
            target_path: config.target_path.clone(),
            peers_path: config.peers_path.clone(),
            delimiter: config.delimiter_byte(),
        }
    }

    pub fn with_paths(mut self, target: Option<PathBuf>, peers: Option<PathBuf>) -> Self {
        if let Some(t) = target {
            self.target_path = t;
        }
        if let Some(p) = peers {
            self.peers_path = p;
        }
        self
    }
}

impl RecordSource for CsvSource {
    fn load_target(&self) -> Result<FinancialRecord, LoaderError> {
        let records = load_file(&self.target_path, TARGET_TABLE, self.delimiter)?;
        if records.len() > 1 {
            warn!(
                "Target table has {} rows, using the first ({})",
                records.len(),
                records[0].ticker
            );
        }
        let target = records
            .into_iter()
            .next()
            .ok_or(LoaderError::EmptyTable { table: TARGET_TABLE })?;

        let missing = target.missing_fields();
        if !missing.is_empty() {
            return Err(LoaderError::IncompleteTarget {
                ticker: target.ticker,
                fields: missing,
            });
        }
        Ok(target)
    }

    fn load_peers(&self) -> Result<Vec<FinancialRecord>, LoaderError> {
        if !self.peers_path.exists() {
            warn!("No peers table at {:?}, continuing without comparables", self.peers_path);
            return Ok(vec![]);
        }
        let peers = load_file(&self.peers_path, PEERS_TABLE, self.delimiter)?;
        if peers.is_empty() {
            warn!("Peers table {:?} is empty", self.peers_path);
        }
        Ok(peers)
    }
}

// ── Table parsing ─────────────────────────────────────────────────────────────

/// Positions of the known columns within one table's header row.
#[derive(Debug, Default, PartialEq)]
struct ColumnMap {
    ticker: Option<usize>,
    name: Option<usize>,
    sector: Option<usize>,
    current_price: Option<usize>,
    shares_outstanding: Option<usize>,
    net_income: Option<usize>,
    revenue: Option<usize>,
    total_equity: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord, table: &'static str) -> Result<Self, LoaderError> {
        let mut map = ColumnMap::default();
        for (i, header) in headers.iter().enumerate() {
            let key = header.trim().trim_start_matches('\u{feff}').to_lowercase();
            let slot = match key.as_str() {
                "ticker" | "symbol" => &mut map.ticker,
                "name" | "company" | "nama_perusahaan" => &mut map.name,
                "sector" | "sektor" => &mut map.sector,
                "current_price" | "price" | "harga_saham_saat_ini" => &mut map.current_price,
                "shares_outstanding" | "shares" | "jumlah_saham_beredar" => {
                    &mut map.shares_outstanding
                }
                "net_income" | "net_income_terbaru" => &mut map.net_income,
                "revenue" | "total_pendapatan_terbaru" => &mut map.revenue,
                "total_equity" | "equity" | "total_ekuitas_terbaru" => &mut map.total_equity,
                _ => {
                    debug!("{}: ignoring column {:?}", table, header);
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(i);
            }
        }

        if map.ticker.is_none() {
            return Err(LoaderError::MissingColumn { table, column: "ticker" });
        }
        if map.sector.is_none() {
            return Err(LoaderError::MissingColumn { table, column: "sector" });
        }
        Ok(map)
    }

    fn raw_row(&self, record: &StringRecord) -> RawRecordRow {
        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).map(|s| s.to_string());
        RawRecordRow {
            ticker: cell(self.ticker),
            name: cell(self.name),
            sector: cell(self.sector),
            current_price: cell(self.current_price),
            shares_outstanding: cell(self.shares_outstanding),
            net_income: cell(self.net_income),
            revenue: cell(self.revenue),
            total_equity: cell(self.total_equity),
        }
    }
}

fn load_file(path: &Path, table: &'static str, delimiter: u8) -> Result<Vec<FinancialRecord>, LoaderError> {
    debug!("Loading {} table from {:?}", table, path);
    let file = File::open(path).map_err(|source| LoaderError::Io {
        table,
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_records(file, table, delimiter)?;
    info!("{}: {} records loaded from {:?}", table, records.len(), path);
    Ok(records)
}

/// Load any table in the record format, labelled [`INPUT_TABLE`].
pub fn load_table(path: &Path, delimiter: u8) -> Result<Vec<FinancialRecord>, LoaderError> {
    load_file(path, INPUT_TABLE, delimiter)
}

/// Parse one table from any reader.
pub fn read_records<R: io::Read>(
    reader: R,
    table: &'static str,
    delimiter: u8,
) -> Result<Vec<FinancialRecord>, LoaderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|source| LoaderError::Csv { table, source })?
        .clone();
    let columns = ColumnMap::from_headers(&headers, table)?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("{} row {}: {}", table, i + 1, e);
                continue;
            }
        };

        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        match raw_row_to_record(&columns.raw_row(&row)) {
            Some(record) => records.push(record),
            None => warn!("{} row {}: no ticker, skipped", table, i + 1),
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PEERS_CSV: &str = "\
ticker,name,sector,current_price,shares_outstanding,net_income,revenue,total_equity
BBCA,Bank Central Asia Tbk,Perbankan,8750,25000000000,32000000000000,80000000000000,180000000000000
BMRI,Bank Mandiri (Persero) Tbk,Perbankan,6225,23000000000,,95000000000000,200000000000000
,Nameless,Perbankan,1,1,1,1,1
";

    #[test]
    fn test_read_records() {
        let records = read_records(PEERS_CSV.as_bytes(), PEERS_TABLE, b',').unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ticker, "BBCA");
        assert_eq!(records[0].shares_outstanding, Some(25e9));
        assert!(records[0].is_complete());
        assert_eq!(records[1].net_income, None);
        assert!(!records[1].is_complete());
    }

    #[test]
    fn test_original_headers_and_column_order() {
        let csv = "\
Sektor;Ticker;Nama_Perusahaan;Harga_Saham_Saat_Ini;Jumlah_Saham_Beredar;Net_Income_Terbaru;Total_Pendapatan_Terbaru;Total_Ekuitas_Terbaru;Catatan
Perbankan;bbri;Bank Rakyat Indonesia;4520;125000000000;56000000000000;150000000000000;280000000000000;x
";
        let records = read_records(csv.as_bytes(), TARGET_TABLE, b';').unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.ticker, "BBRI");
        assert_eq!(r.sector, "Perbankan");
        assert_eq!(r.current_price, Some(4520.0));
        assert_eq!(r.total_equity, Some(280e12));
        assert!(r.missing_fields().is_empty());
    }

    #[test]
    fn test_missing_numeric_column_is_tolerated() {
        let csv = "ticker,sector,current_price\nAAA,Mining,10\n";
        let records = read_records(csv.as_bytes(), PEERS_TABLE, b',').unwrap();
        assert_eq!(records[0].current_price, Some(10.0));
        assert_eq!(records[0].revenue, None);
    }

    #[test]
    fn test_missing_sector_column() {
        let csv = "ticker,name\nAAA,Alpha\n";
        let err = read_records(csv.as_bytes(), PEERS_TABLE, b',').unwrap_err();
        assert!(matches!(
            err,
            LoaderError::MissingColumn { table: "peers", column: "sector" }
        ));
    }

    #[test]
    fn test_load_table_uses_neutral_label() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "ticker,name,current_price\nAAA,Alpha,100\n").unwrap();

        let err = load_table(file.path(), b',').unwrap_err();
        assert!(matches!(
            err,
            LoaderError::MissingColumn { table: INPUT_TABLE, column: "sector" }
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", PEERS_CSV).unwrap();
        assert_eq!(load_table(file.path(), b',').unwrap().len(), 2);
    }

    #[test]
    fn test_csv_source() {
        let dir = tempfile::tempdir().unwrap();
        let target_path = dir.path().join("target.csv");
        let mut f = File::create(&target_path).unwrap();
        writeln!(f, "{}", HEADERS.join(",")).unwrap();
        writeln!(f, "BBRI,Bank Rakyat Indonesia,Perbankan,4520,125B,56T,150T,280T").unwrap();

        let source = CsvSource::new(&LoaderConfig::default())
            .with_paths(Some(target_path), Some(dir.path().join("missing.csv")));

        let target = source.load_target().unwrap();
        assert_eq!(target.net_income, Some(56e12));
        assert!(source.load_peers().unwrap().is_empty());
    }

    #[test]
    fn test_incomplete_target() {
        let dir = tempfile::tempdir().unwrap();
        let target_path = dir.path().join("target.csv");
        std::fs::write(
            &target_path,
            "ticker,name,sector,current_price\nBBRI,Bank Rakyat Indonesia,Perbankan,4520\n",
        )
        .unwrap();

        let source = CsvSource::new(&LoaderConfig::default()).with_paths(Some(target_path), None);
        match source.load_target() {
            Err(LoaderError::IncompleteTarget { ticker, fields }) => {
                assert_eq!(ticker, "BBRI");
                assert_eq!(
                    fields,
                    vec!["shares_outstanding", "net_income", "revenue", "total_equity"]
                );
            }
            other => panic!("expected IncompleteTarget, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_target_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target_path = dir.path().join("target.csv");
        std::fs::write(&target_path, format!("{}\n", HEADERS.join(","))).unwrap();

        let source = CsvSource::new(&LoaderConfig::default()).with_paths(Some(target_path), None);
        assert!(matches!(
            source.load_target(),
            Err(LoaderError::EmptyTable { table: "target" })
        ));

        let absent = CsvSource::new(&LoaderConfig::default())
            .with_paths(Some(dir.path().join("nope.csv")), None);
        assert!(matches!(absent.load_target(), Err(LoaderError::Io { .. })));
    }
}
