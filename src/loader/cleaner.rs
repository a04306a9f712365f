
use crate::models::{FinancialRecord, RawRecordRow};
use tracing::warn;

// ── Parsers ───────────────────────────────────────────────────────────────────

fn is_blank(s: &str) -> bool {
    s.is_empty() || s.eq_ignore_ascii_case("N/A") || s == "-" || s == "—"
}

/// Parse a spreadsheet amount.
/// "Rp 4,520" → 4520 | "(1,000)" → -1000 | "1.2T" → 1.2e12 | "56e12" → 5.6e13
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if is_blank(s) {
        return None;
    }

    let (body, negative) = match s.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        Some(inner) => (inner.trim(), true),
        None => (s, false),
    };

    let upper = body.to_uppercase().replace(',', "");
    let upper = upper
        .trim_start_matches("RP")
        .trim_start_matches('$')
        .trim();

    // Check for suffix
    let (num_str, multiplier) = if let Some(n) = upper.strip_suffix('T') {
        (n, 1e12)
    } else if let Some(n) = upper.strip_suffix('B') {
        (n, 1e9)
    } else if let Some(n) = upper.strip_suffix('M') {
        (n, 1e6)
    } else if let Some(n) = upper.strip_suffix('K') {
        (n, 1e3)
    } else {
        (upper, 1.0)
    };

    let cleaned: String = num_str
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();
    if cleaned.is_empty()
        || !cleaned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'E'))
    {
        return None;
    }

    let value: f64 = cleaned.parse().ok()?;
    let value = value * multiplier;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

pub fn normalise_ticker(s: &str) -> String {
    s.trim().to_uppercase()
}

fn text_cell(cell: Option<&String>) -> String {
    cell.map(|s| s.trim().to_string()).unwrap_or_default()
}

// ── Raw row → FinancialRecord ─────────────────────────────────────────────────

/// Clean one table row. Rows without a ticker are dropped; unparseable
/// numeric cells become `None`.
pub fn raw_row_to_record(row: &RawRecordRow) -> Option<FinancialRecord> {
    let ticker = row.ticker.as_deref().map(normalise_ticker)?;
    if ticker.is_empty() {
        return None;
    }

    let number = |field: &str, cell: &Option<String>| -> Option<f64> {
        let raw = cell.as_deref()?;
        let parsed = parse_number(raw);
        if parsed.is_none() && !is_blank(raw.trim()) {
            warn!("{}: unparseable {} {:?}", ticker, field, raw);
        }
        parsed
    };

    Some(FinancialRecord {
        ticker: ticker.clone(),
        name: text_cell(row.name.as_ref()),
        // Sector keeps its spacing; matching only folds case.
        sector: row.sector.clone().unwrap_or_default(),
        current_price: number("current_price", &row.current_price),
        shares_outstanding: number("shares_outstanding", &row.shares_outstanding),
        net_income: number("net_income", &row.net_income),
        revenue: number("revenue", &row.revenue),
        total_equity: number("total_equity", &row.total_equity),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
