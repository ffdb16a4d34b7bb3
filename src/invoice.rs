//! Invoice assembly on top of a rate quote
//!
//! The freight price comes from [`RateResult::total`]; packing, insurance,
//! discount and payment are added here to get the payable amount.

use crate::error::{Error, Result};
use crate::quote::RateResult;
use chrono::NaiveDate;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Credit,
}

/// Extra charges and payment entered at the desk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Charges {
    /// Vacuum packing units
    #[serde(rename = "vacQty")]
    pub vacuum_qty: f64,
    #[serde(rename = "vacPrice")]
    pub vacuum_price: f64,
    pub box_qty: f64,
    pub box_price: f64,
    pub insurance: f64,
    pub discount: f64,
    pub amount_paid: f64,
    #[serde(rename = "payMethod")]
    pub payment_method: PaymentMethod,
}

/// Amounts printed at the foot of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub freight: f64,
    pub packing: f64,
    pub insurance: f64,
    pub discount: f64,
    pub grand_total: f64,
    /// Negative when the customer overpaid
    pub balance_due: f64,
}

impl Charges {
    pub fn packing(&self) -> f64 {
        self.vacuum_qty * self.vacuum_price + self.box_qty * self.box_price
    }

    /// Combine the freight quote with these charges
    pub fn totals(&self, rate: &RateResult) -> InvoiceTotals {
        let freight = rate.total;
        let packing = self.packing();
        let grand_total = freight + packing + self.insurance - self.discount;
        InvoiceTotals {
            freight,
            packing,
            insurance: self.insurance,
            discount: self.discount,
            grand_total,
            balance_due: grand_total - self.amount_paid,
        }
    }
}

const INVOICE_NUMBER_PATTERN: &str = r"^(\d{2})(\d{4})(\d{2})(\d{2})-(\d{3,})$";

/// Compiled once, shared by every parse
static INVOICE_NUMBER_RE: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

fn invoice_number_re() -> Result<&'static Regex> {
    INVOICE_NUMBER_RE
        .get_or_init(|| Regex::new(INVOICE_NUMBER_PATTERN))
        .as_ref()
        .map_err(|e| Error::Other(e.to_string()))
}

/// `{branch}{YYYYMMDD}-{seq}`, e.g. `1020260114-007`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvoiceNumber {
    branch_code: String,
    date: NaiveDate,
    sequence: u32,
}

impl InvoiceNumber {
    /// Build an invoice number; `sequence` counts from 1 each day
    pub fn new(branch_code: &str, date: NaiveDate, sequence: u32) -> Result<Self> {
        if branch_code.len() != 2 || !branch_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvoiceNumber(format!(
                "branch code must be two digits, got {:?}",
                branch_code
            )));
        }
        if sequence == 0 {
            return Err(Error::InvoiceNumber("sequence starts at 1".into()));
        }
        Ok(Self {
            branch_code: branch_code.to_string(),
            date,
            sequence,
        })
    }

    pub fn parse(s: &str) -> Result<Self> {
        let caps = invoice_number_re()?
            .captures(s.trim())
            .ok_or_else(|| Error::InvoiceNumber(s.to_string()))?;

        let num = |i: usize| -> Result<u32> {
            caps[i]
                .parse()
                .map_err(|_| Error::InvoiceNumber(s.to_string()))
        };
        let date = NaiveDate::from_ymd_opt(num(2)? as i32, num(3)?, num(4)?)
            .ok_or_else(|| Error::InvoiceNumber(format!("{} has an invalid date", s)))?;

        Self::new(&caps[1], date, num(5)?)
    }

    pub fn branch_code(&self) -> &str {
        &self.branch_code
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// The following number on the same day
    pub fn next(&self) -> Self {
        Self {
            branch_code: self.branch_code.clone(),
            date: self.date,
            sequence: self.sequence.saturating_add(1),
        }
    }
}

impl std::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}-{:03}",
            self.branch_code,
            self.date.format("%Y%m%d"),
            self.sequence
        )
    }
}

impl std::str::FromStr for InvoiceNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::PricingBasis;

    fn freight(total: f64) -> RateResult {
        RateResult {
            total,
            chargeable_weight: 4.0,
            rate_per_kg: total / 4.0,
            basis: PricingBasis::Slab,
        }
    }

    #[test]
    fn test_totals() {
        let charges = Charges {
            vacuum_qty: 2.0,
            vacuum_price: 150.0,
            box_qty: 1.0,
            box_price: 400.0,
            insurance: 250.0,
            discount: 100.0,
            amount_paid: 5000.0,
            payment_method: PaymentMethod::Card,
        };
        let totals = charges.totals(&freight(4800.0));
        assert_eq!(totals.packing, 700.0);
        assert_eq!(totals.grand_total, 4800.0 + 700.0 + 250.0 - 100.0);
        assert_eq!(totals.balance_due, 5650.0 - 5000.0);
    }

    #[test]
    fn test_overpayment_gives_negative_balance() {
        let charges = Charges {
            amount_paid: 1000.0,
            ..Default::default()
        };
        assert_eq!(charges.totals(&freight(800.0)).balance_due, -200.0);
    }

    #[test]
    fn test_charges_from_json() {
        let charges: Charges =
            serde_json::from_str(r#"{"vacQty":1,"vacPrice":200,"boxQty":2,"boxPrice":50,"payMethod":"Credit"}"#)
                .unwrap();
        assert_eq!(charges.packing(), 300.0);
        assert_eq!(charges.payment_method, PaymentMethod::Credit);
        assert_eq!(charges.insurance, 0.0);
    }

    #[test]
    fn test_invoice_number_format() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 14).unwrap();
        let no = InvoiceNumber::new("10", date, 7).unwrap();
        assert_eq!(no.to_string(), "1020260114-007");
        assert_eq!(no.next().to_string(), "1020260114-008");
    }

    #[test]
    fn test_invoice_number_parse() {
        let no: InvoiceNumber = "2020251231-1042".parse().unwrap();
        assert_eq!(no.branch_code(), "20");
        assert_eq!(no.date(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(no.sequence(), 1042);
    }

    #[test]
    fn test_invoice_number_rejects_bad_input() {
        assert!(InvoiceNumber::parse("10-20260114-007").is_err());
        assert!(InvoiceNumber::parse("1020261340-001").is_err());
        assert!(InvoiceNumber::parse("1020260114-000").is_err());
        let date = NaiveDate::from_ymd_opt(2026, 1, 14).unwrap();
        assert!(InvoiceNumber::new("1", date, 1).is_err());
    }

    #[test]
    fn test_pattern_compiles_once() {
        let first = invoice_number_re().unwrap();
        let second = invoice_number_re().unwrap();
        assert!(std::ptr::eq(first, second));
        let mut no: InvoiceNumber = "1020260114-001".parse().unwrap();
        for _ in 0..100 {
            no = InvoiceNumber::parse(&no.next().to_string()).unwrap();
        }
        assert_eq!(no.sequence(), 101);
    }
}
