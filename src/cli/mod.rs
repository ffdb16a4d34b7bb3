//! CLI command implementations
//!
//! - `rates`: tariff commands (quote, countries, check)
//! - `invoice`: invoice numbering and totals
//! - `schema`: JSON schemas for output and config types
//! - `util`: shared argument helpers

pub mod invoice;
pub mod rates;
pub mod schema;
pub mod util;

pub use invoice::{cmd_invoice_no, cmd_totals};
pub use rates::{cmd_check, cmd_countries, cmd_quote};
pub use schema::cmd_schema;
