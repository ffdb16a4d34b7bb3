// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # courier-rates
//!
//! Tariff loading and shipping rate calculation for a branch courier desk.
//!
//! ## Core Concept
//!
//! A **tariff** is a table of pricing rules, one per line:
//! destination, service level, weight range, rate and rule kind. The
//! tariff is parsed once into an immutable [`TariffIndex`]; every quote
//! is a pure function of that index and the shipment's weights.
//!
//! ## Quick Start
//!
//! ```rust
//! use courier_rates::RateEngine;
//!
//! let engine = RateEngine::new("\
//! Country,Service,Min,Max,Rate,Type
//! France,EXPRESS,0,0.5,500,DOC
//! France,EXPRESS,0,1,300,BASE
//! France,EXPRESS,1,10,50,ADDER
//! ");
//!
//! let rate = engine.quote("France", "EXPRESS", 3.2, 0.0);
//! assert_eq!(rate.chargeable_weight, 4.0);
//! assert_eq!(rate.total, 450.0);
//! assert_eq!(engine.list_countries(), &["France"]);
//! ```
//!
//! ## Rule Kinds
//!
//! | Kind | Price |
//! |------|-------|
//! | `DOC` | fixed price for shipments up to 0.5 kg, billed at 0.5 kg |
//! | `FLAT_SLAB` | `weight * rate` when the rounded weight is in range |
//! | `BASE` | price of the first kilogram |
//! | `ADDER` | per-kilogram price above the first, when in range |
//!
//! ## Architecture
//!
//! ```text
//! tariff text ──► tariff::parse_with_report ──► TariffIndex (+ LoadReport)
//!                                                   │
//!            RateQuery ──► quote::quote_query ◄─────┘
//!                                │
//!                                ▼
//!                           RateResult ──► invoice::Charges::totals
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod invoice;
pub mod quote;
pub mod tariff;

// Re-exports
pub use config::{Branch, RatesConfig};
pub use engine::RateEngine;
pub use error::{Error, Result};
pub use invoice::{Charges, InvoiceNumber, InvoiceTotals, PaymentMethod};
pub use quote::{quote, quote_query, PricingBasis, RateQuery, RateResult};
pub use tariff::{
    parse_with_report, LoadReport, RejectReason, RejectedRow, RuleKind, TariffIndex, TariffRow,
    WeightRange,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
