//! Tariff table loader
//!
//! Parses the comma-delimited tariff text into a [`TariffIndex`] keyed by
//! service, then by upper-cased country. Each key holds its rules in file
//! order; the calculator relies on that order for first-match-wins.
//!
//! ## Tariff format
//!
//! ```text
//! Country,Service,Min,Max,Rate,Type
//! United Kingdom,EXPRESS,0,0.5,4500,DOC
//! United Kingdom,EXPRESS,0,1,6200,BASE
//! United Kingdom,EXPRESS,1,10,1850,ADDER
//! United Kingdom,EXPRESS,10,300,2100,FLAT_SLAB
//! "Korea, South",ECONOMY,0,5,2800,FLAT_SLAB
//! ```
//!
//! Rows that cannot be priced (too few fields, non-numeric bounds, an empty
//! range, unknown rule kind) are dropped and recorded in a [`LoadReport`].
//! Loading never fails.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Label of the first column when the table carries a header line
pub const COUNTRY_HEADER: &str = "Country";

/// Fields needed to build a row: country, service, min, max, rate, kind
pub const MIN_FIELDS: usize = 6;

/// How a rule's rate is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleKind {
    /// Flat price for the first kilogram
    Base,
    /// Per-kilogram price for weight above the first kilogram
    Adder,
    /// Per-kilogram price applied to the whole chargeable weight
    FlatSlab,
    /// Fixed price for document shipments
    Doc,
}

impl RuleKind {
    /// Parse a rule kind, ignoring case and surrounding whitespace
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "BASE" => Some(RuleKind::Base),
            "ADDER" => Some(RuleKind::Adder),
            "FLAT_SLAB" => Some(RuleKind::FlatSlab),
            "DOC" => Some(RuleKind::Doc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Base => "BASE",
            RuleKind::Adder => "ADDER",
            RuleKind::FlatSlab => "FLAT_SLAB",
            RuleKind::Doc => "DOC",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open weight interval `(min, max]` in kilograms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeightRange {
    pub min: f64,
    pub max: f64,
}

impl WeightRange {
    /// True when `min < weight <= max`
    pub fn contains(&self, weight: f64) -> bool {
        weight > self.min && weight <= self.max
    }
}

impl std::fmt::Display for WeightRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}]", self.min, self.max)
    }
}

/// One pricing rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TariffRow {
    /// Destination as written in the tariff
    pub country: String,

    /// Service level, upper-cased
    pub service: String,

    /// Weights this rule applies to
    pub range: WeightRange,

    /// Unit price; meaning depends on `kind`
    pub rate: f64,

    pub kind: RuleKind,
}

/// Numeric columns of a tariff row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    MinWeight,
    MaxWeight,
    Rate,
}

impl std::fmt::Display for NumericField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericField::MinWeight => write!(f, "min weight"),
            NumericField::MaxWeight => write!(f, "max weight"),
            NumericField::Rate => write!(f, "rate"),
        }
    }
}

/// Why a tariff line was dropped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    #[error("expected at least 6 fields, found {found}")]
    TooFewFields { found: usize },

    #[error("{field} is not a finite number: {value:?}")]
    InvalidNumber { field: NumericField, value: String },

    #[error("empty weight range: min {min} is not below max {max}")]
    EmptyRange { min: f64, max: f64 },

    #[error("negative rate: {rate}")]
    NegativeRate { rate: f64 },

    #[error("unknown rule kind: {value:?}")]
    UnknownKind { value: String },

    #[error("country and service must not be empty")]
    MissingKey,
}

/// A dropped line and the reason it was dropped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RejectedRow {
    /// 1-based line number in the source text
    pub line: usize,
    #[serde(flatten)]
    pub reason: RejectReason,
}

/// Summary of one tariff load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LoadReport {
    /// Whether the first line was recognised as a header and skipped
    pub header_skipped: bool,

    /// Rows that made it into the index
    pub accepted: usize,

    /// Rows that were dropped
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedRow>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Human-readable report
    pub fn to_report(&self) -> String {
        let mut out = format!(
            "{} row(s) accepted, {} rejected",
            self.accepted,
            self.rejected.len()
        );
        for row in &self.rejected {
            out.push_str(&format!("\n  line {}: {}", row.line, row.reason));
        }
        out
    }
}

/// Rules indexed by service, then by upper-cased country
///
/// Immutable once built. Rules under one key keep their file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct TariffIndex {
    services: BTreeMap<String, BTreeMap<String, Vec<TariffRow>>>,
    countries: Vec<String>,
}

impl TariffIndex {
    /// Parse tariff text, discarding the load report
    pub fn parse(text: &str) -> Self {
        parse_with_report(text).0
    }

    /// Rules for a (service, country) pair, in file order
    ///
    /// Both keys are matched case-insensitively.
    pub fn rules(&self, service: &str, country: &str) -> Option<&[TariffRow]> {
        self.services
            .get(&service.trim().to_uppercase())?
            .get(&country.trim().to_uppercase())
            .map(Vec::as_slice)
    }

    /// Distinct destinations, sorted, in first-seen casing
    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    /// Service levels present in the table, sorted
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Total number of rules in the index
    pub fn row_count(&self) -> usize {
        self.services
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Content hash for telling tariff revisions apart
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let content = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("sha256:{}", hex::encode(&hasher.finalize()[..8]))
    }

    fn insert(&mut self, row: TariffRow) {
        self.services
            .entry(row.service.clone())
            .or_default()
            .entry(row.country.to_uppercase())
            .or_default()
            .push(row);
    }
}

/// Parse tariff text into an index plus a report of dropped rows
///
/// Pure over its input: the same text always yields the same index.
pub fn parse_with_report(text: &str) -> (TariffIndex, LoadReport) {
    let mut index = TariffIndex::default();
    let mut report = LoadReport::default();
    // upper-cased key -> first-seen display name
    let mut countries: BTreeMap<String, String> = BTreeMap::new();
    let mut first_line = true;

    for (i, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let fields = split_fields(line);

        if std::mem::take(&mut first_line) && is_header(&fields) {
            report.header_skipped = true;
            continue;
        }

        match parse_row(&fields) {
            Ok(row) => {
                countries
                    .entry(row.country.to_uppercase())
                    .or_insert_with(|| row.country.clone());
                index.insert(row);
                report.accepted += 1;
            }
            Err(reason) => {
                let rejected = RejectedRow {
                    line: i + 1,
                    reason,
                };
                debug!(line = rejected.line, reason = %rejected.reason, "dropping tariff row");
                report.rejected.push(rejected);
            }
        }
    }

    index.countries = countries.into_values().collect();
    index.countries.sort();

    info!(
        accepted = report.accepted,
        rejected = report.rejected.len(),
        countries = index.countries.len(),
        "tariff index built"
    );

    (index, report)
}

/// Split one line on commas, honouring double-quoted fields
///
/// Quotes toggle quoting and are not kept. Escaped quotes are not supported.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

fn is_header(fields: &[String]) -> bool {
    fields
        .first()
        .is_some_and(|f| f.trim() == COUNTRY_HEADER)
}

fn parse_row(fields: &[String]) -> Result<TariffRow, RejectReason> {
    if fields.len() < MIN_FIELDS {
        return Err(RejectReason::TooFewFields {
            found: fields.len(),
        });
    }

    let country = fields[0].trim().to_string();
    let service = fields[1].trim().to_uppercase();
    let min = parse_number(&fields[2], NumericField::MinWeight)?;
    let max = parse_number(&fields[3], NumericField::MaxWeight)?;
    let rate = parse_number(&fields[4], NumericField::Rate)?;
    let kind = RuleKind::parse(&fields[5]).ok_or_else(|| RejectReason::UnknownKind {
        value: fields[5].trim().to_string(),
    })?;

    if country.is_empty() || service.is_empty() {
        return Err(RejectReason::MissingKey);
    }
    if min >= max {
        return Err(RejectReason::EmptyRange { min, max });
    }
    if rate < 0.0 {
        return Err(RejectReason::NegativeRate { rate });
    }

    Ok(TariffRow {
        country,
        service,
        range: WeightRange { min, max },
        rate,
        kind,
    })
}

fn parse_number(raw: &str, field: NumericField) -> Result<f64, RejectReason> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RejectReason::InvalidNumber {
            field,
            value: raw.trim().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Country,Service,Min,Max,Rate,Type
United Kingdom,EXPRESS,0,0.5,4500,DOC
United Kingdom,EXPRESS,0,1,6200,BASE
United Kingdom,EXPRESS,1,10,1850,ADDER
\"Korea, South\",economy,0,5,2800,flat_slab
";

    #[test]
    fn test_split_fields_quoted_comma() {
        let fields = split_fields("\"Korea, South\",EXPRESS,0,1,10,BASE");
        assert_eq!(fields[0], "Korea, South");
        assert_eq!(fields.len(), 6);
    }

    #[test]
    fn test_split_fields_trailing_empty() {
        assert_eq!(split_fields("a,b,"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_parse_sample() {
        let (index, report) = parse_with_report(SAMPLE);
        assert!(report.header_skipped);
        assert_eq!(report.accepted, 4);
        assert!(report.is_clean());
        assert_eq!(index.row_count(), 4);

        let uk = index.rules("express", "united kingdom").unwrap();
        assert_eq!(uk.len(), 3);
        assert_eq!(uk[0].kind, RuleKind::Doc);
        assert_eq!(uk[1].kind, RuleKind::Base);
        assert_eq!(uk[2].kind, RuleKind::Adder);

        let korea = index.rules("ECONOMY", "KOREA, SOUTH").unwrap();
        assert_eq!(korea[0].kind, RuleKind::FlatSlab);
        assert_eq!(korea[0].service, "ECONOMY");
    }

    #[test]
    fn test_no_header_means_all_data() {
        let (_, report) = parse_with_report("France,EXPRESS,0,1,100,BASE\n");
        assert!(!report.header_skipped);
        assert_eq!(report.accepted, 1);
    }

    #[test]
    fn test_header_must_match_first_field_exactly() {
        let (_, report) = parse_with_report("Countries,Service,Min,Max,Rate,Type\n");
        assert!(!report.header_skipped);
        assert_eq!(report.accepted, 0);
        assert_eq!(report.rejected.len(), 1);
    }

    #[test]
    fn test_rejections_are_recorded() {
        let text = "\
France,EXPRESS,0,1,100,BASE
France,EXPRESS,abc,1,100,BASE
France,EXPRESS,5,5,100,ADDER
France,EXPRESS,0,1
France,EXPRESS,0,1,-3,BASE
France,EXPRESS,0,1,100,SURCHARGE
,EXPRESS,0,1,100,BASE
";
        let (index, report) = parse_with_report(text);
        assert_eq!(report.accepted, 1);
        assert_eq!(index.row_count(), 1);
        let reasons: Vec<_> = report.rejected.iter().map(|r| r.line).collect();
        assert_eq!(reasons, vec![2, 3, 4, 5, 6, 7]);
        assert!(matches!(
            report.rejected[0].reason,
            RejectReason::InvalidNumber {
                field: NumericField::MinWeight,
                ..
            }
        ));
        assert!(matches!(
            report.rejected[1].reason,
            RejectReason::EmptyRange { .. }
        ));
        assert_eq!(
            report.rejected[2].reason,
            RejectReason::TooFewFields { found: 4 }
        );
        assert!(matches!(
            report.rejected[3].reason,
            RejectReason::NegativeRate { .. }
        ));
        assert!(matches!(
            report.rejected[4].reason,
            RejectReason::UnknownKind { .. }
        ));
        assert_eq!(report.rejected[5].reason, RejectReason::MissingKey);
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        let (_, report) = parse_with_report("France,EXPRESS,0,inf,100,BASE\nFrance,EXPRESS,0,1,NaN,BASE\n");
        assert_eq!(report.accepted, 0);
        assert_eq!(report.rejected.len(), 2);
    }

    #[test]
    fn test_countries_first_seen_casing_sorted() {
        let text = "\
germany,EXPRESS,0,1,100,BASE
France,EXPRESS,0,1,100,BASE
GERMANY,ECONOMY,0,1,100,BASE
Canada,EXPRESS,0,1,100,BASE
";
        let index = TariffIndex::parse(text);
        assert_eq!(index.countries(), &["Canada", "France", "germany"]);
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let text = "Country,Service,Min,Max,Rate,Type\r\n\r\nFrance,EXPRESS,0,1,100,BASE\r\n";
        let (index, report) = parse_with_report(text);
        assert!(report.header_skipped);
        assert_eq!(report.accepted, 1);
        assert!(index.rules("EXPRESS", "France").is_some());
    }

    #[test]
    fn test_fingerprint_stable() {
        let a = TariffIndex::parse(SAMPLE);
        let b = TariffIndex::parse(SAMPLE);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert!(a.fingerprint().starts_with("sha256:"));
        assert_ne!(a.fingerprint(), TariffIndex::default().fingerprint());
    }

    #[test]
    fn test_weight_range_is_half_open() {
        let range = WeightRange { min: 1.0, max: 10.0 };
        assert!(!range.contains(1.0));
        assert!(range.contains(1.5));
        assert!(range.contains(10.0));
        assert!(!range.contains(10.01));
    }

    #[test]
    fn test_services_sorted() {
        let index = TariffIndex::parse(SAMPLE);
        let services: Vec<_> = index.services().collect();
        assert_eq!(services, vec!["ECONOMY", "EXPRESS"]);
    }
}
