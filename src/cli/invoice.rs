//! Invoice commands: invoice-no, totals

use super::rates::parse_query;
use super::util::{flag_value, has_flag, positional, print_json, tariff_path};
use chrono::NaiveDate;
use courier_rates::*;

pub fn cmd_invoice_no(args: &[String], config: &RatesConfig) -> Result<()> {
    let pos = positional(args);
    if pos.len() < 3 {
        return Err("Usage: courier-rates invoice-no <branch> <YYYY-MM-DD> <sequence>".into());
    }

    let branch = config.branch(pos[0])?;
    let date = NaiveDate::parse_from_str(pos[1], "%Y-%m-%d")
        .map_err(|e| Error::Other(format!("invalid date {:?}: {}", pos[1], e)))?;
    let sequence: u32 = pos[2]
        .parse()
        .map_err(|_| Error::Other(format!("invalid sequence {:?}", pos[2])))?;

    println!("{}", InvoiceNumber::new(&branch.code, date, sequence)?);
    Ok(())
}

pub fn cmd_totals(args: &[String], config: &RatesConfig) -> Result<()> {
    let query = parse_query(args, config)?;
    let charges: Charges = match flag_value(args, &["--charges"]) {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => Charges::default(),
    };

    let engine = RateEngine::from_path(&tariff_path(args, config))?;
    let rate = engine.quote_query(&query);
    if !rate.is_quoted() {
        return Err(Error::Tariff(format!(
            "no quote available for {} {}",
            query.country, query.service
        )));
    }
    let totals = charges.totals(&rate);

    if has_flag(args, "--json") {
        return print_json(&serde_json::json!({
            "rate": rate,
            "charges": charges,
            "totals": totals,
        }));
    }

    let cur = &config.currency;
    println!("Freight ({} kg): {:>12.2} {}", rate.chargeable_weight, totals.freight, cur);
    println!("Packing:          {:>12.2} {}", totals.packing, cur);
    println!("Insurance:        {:>12.2} {}", totals.insurance, cur);
    if totals.discount > 0.0 {
        println!("Less discount:    {:>12.2} {}", -totals.discount, cur);
    }
    println!("Grand total:      {:>12.2} {}", totals.grand_total, cur);
    println!("Paid ({:?}):{:>12.2} {}", charges.payment_method, charges.amount_paid, cur);
    println!("Balance due:      {:>12.2} {}", totals.balance_due, cur);
    Ok(())
}
