use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ── Company record ────────────────────────────────────────────────────────────

/// One company's raw fundamentals, as read from the target or peers table.
/// Numeric fields are `None` when the cell was empty or not a number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialRecord {
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub current_price: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub net_income: Option<f64>,
    pub revenue: Option<f64>,
    pub total_equity: Option<f64>,
}

impl FinancialRecord {
    /// True when every numeric input is present and shares outstanding is
    /// non-zero, i.e. the record may contribute to sector averages.
    pub fn is_complete(&self) -> bool {
        self.current_price.is_some()
            && self.net_income.is_some()
            && self.revenue.is_some()
            && self.total_equity.is_some()
            && matches!(self.shares_outstanding, Some(s) if s != 0.0)
    }

    /// Names of the fields that are missing, in table column order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.ticker.is_empty() {
            missing.push("ticker");
        }
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.sector.is_empty() {
            missing.push("sector");
        }
        let numeric = [
            ("current_price", self.current_price),
            ("shares_outstanding", self.shares_outstanding),
            ("net_income", self.net_income),
            ("revenue", self.revenue),
            ("total_equity", self.total_equity),
        ];
        for (field, value) in numeric {
            if value.is_none() {
                missing.push(field);
            }
        }
        missing
    }
}

// ── Raw table rows ────────────────────────────────────────────────────────────

/// One row of a target/peers table before cleaning.
#[derive(Debug, Clone, Default)]
pub struct RawRecordRow {
    pub ticker: Option<String>,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub current_price: Option<String>,
    pub shares_outstanding: Option<String>,
    pub net_income: Option<String>,
    pub revenue: Option<String>,
    pub total_equity: Option<String>,
}

// ── Metric ────────────────────────────────────────────────────────────────────

/// A computed quantity that may be unbounded (a zero denominator on a
/// multiple) or not computable at all (missing inputs).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Value(f64),
    Unbounded,
    Unavailable,
}

impl Metric {
    /// The finite value, if any.
    pub fn finite(self) -> Option<f64> {
        match self {
            Metric::Value(v) if v.is_finite() => Some(v),
            _ => None,
        }
    }
}

// ── Ratios ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatioKind {
    NetProfitMargin,
    ReturnOnEquity,
    PriceToEarnings,
    PriceToBook,
}

impl RatioKind {
    pub const ALL: [RatioKind; 4] = [
        RatioKind::NetProfitMargin,
        RatioKind::ReturnOnEquity,
        RatioKind::PriceToEarnings,
        RatioKind::PriceToBook,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RatioKind::NetProfitMargin => "Net Profit Margin (%)",
            RatioKind::ReturnOnEquity => "ROE (%)",
            RatioKind::PriceToEarnings => "P/E Ratio",
            RatioKind::PriceToBook => "P/B Ratio",
        }
    }

    /// Multiples render with an `x` suffix, margins with `%`.
    pub fn is_multiple(self) -> bool {
        matches!(self, RatioKind::PriceToEarnings | RatioKind::PriceToBook)
    }
}

impl std::fmt::Display for RatioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Ratios derived from one record. `None` means the ratio was not computable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioSet {
    pub net_profit_margin: Option<Metric>,
    pub roe: Option<Metric>,
    pub pe: Option<Metric>,
    pub pb: Option<Metric>,
}

impl RatioSet {
    pub fn get(&self, kind: RatioKind) -> Option<Metric> {
        match kind {
            RatioKind::NetProfitMargin => self.net_profit_margin,
            RatioKind::ReturnOnEquity => self.roe,
            RatioKind::PriceToEarnings => self.pe,
            RatioKind::PriceToBook => self.pb,
        }
    }

    pub fn is_empty(&self) -> bool {
        RatioKind::ALL.iter().all(|k| self.get(*k).is_none())
    }
}

/// Arithmetic mean per ratio over the comparables that produced a finite value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorAverages {
    pub net_profit_margin: Option<f64>,
    pub roe: Option<f64>,
    pub pe: Option<f64>,
    pub pb: Option<f64>,
}

impl SectorAverages {
    pub fn get(&self, kind: RatioKind) -> Option<f64> {
        match kind {
            RatioKind::NetProfitMargin => self.net_profit_margin,
            RatioKind::ReturnOnEquity => self.roe,
            RatioKind::PriceToEarnings => self.pe,
            RatioKind::PriceToBook => self.pb,
        }
    }

    pub(crate) fn set(&mut self, kind: RatioKind, value: Option<f64>) {
        let slot = match kind {
            RatioKind::NetProfitMargin => &mut self.net_profit_margin,
            RatioKind::ReturnOnEquity => &mut self.roe,
            RatioKind::PriceToEarnings => &mut self.pe,
            RatioKind::PriceToBook => &mut self.pb,
        };
        *slot = value;
    }

    pub fn is_empty(&self) -> bool {
        RatioKind::ALL.iter().all(|k| self.get(*k).is_none())
    }
}

// ── Valuation ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValuationMethod {
    #[serde(rename = "P/E")]
    PriceToEarnings,
    #[serde(rename = "P/B")]
    PriceToBook,
}

impl ValuationMethod {
    pub const ALL: [ValuationMethod; 2] =
        [ValuationMethod::PriceToEarnings, ValuationMethod::PriceToBook];

    /// The ratio whose sector average drives this method.
    pub fn ratio(self) -> RatioKind {
        match self {
            ValuationMethod::PriceToEarnings => RatioKind::PriceToEarnings,
            ValuationMethod::PriceToBook => RatioKind::PriceToBook,
        }
    }
}

impl std::fmt::Display for ValuationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PriceToEarnings => write!(f, "P/E"),
            Self::PriceToBook => write!(f, "P/B"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValuationStatus {
    Undervalued,
    Overvalued,
    Fair,
}

impl std::fmt::Display for ValuationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undervalued => write!(f, "UNDERVALUED"),
            Self::Overvalued => write!(f, "OVERVALUED"),
            Self::Fair => write!(f, "FAIR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "HOLD/SELL")]
    HoldOrSell,
    #[serde(rename = "HOLD")]
    Hold,
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::HoldOrSell => write!(f, "HOLD/SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

/// Outcome of one multiplier method for the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairValueResult {
    pub method: ValuationMethod,
    pub fair_value: Metric,
    /// Only set when the fair value is a finite positive price.
    pub status: Option<ValuationStatus>,
    pub upside_pct: Option<f64>,
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Everything one analysis run produces, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationReport {
    pub target: FinancialRecord,
    pub target_ratios: RatioSet,
    pub comparables: Vec<FinancialRecord>,
    /// `None` when no comparable produced any ratio.
    pub sector_averages: Option<SectorAverages>,
    pub fair_values: Vec<FairValueResult>,
    pub recommendation: Recommendation,
    pub generated_at: NaiveDateTime,
}
