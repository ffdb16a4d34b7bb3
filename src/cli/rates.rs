//! Tariff commands: quote, countries, check

use super::util::{has_flag, parse_weight, positional, print_json, tariff_path};
use courier_rates::*;
use tracing::info;

pub const QUOTE_USAGE: &str =
    "Usage: courier-rates quote <country> [service] <actual-kg> [volumetric-kg] [--tariff F] [--json]";

/// Country, service and weights from `quote`-style arguments
///
/// The service may be left out, in which case the config default is used:
/// `quote France 3.2` and `quote France EXPRESS 3.2 1.5` both work.
pub fn parse_query(args: &[String], config: &RatesConfig) -> Result<RateQuery> {
    let pos = positional(args);
    let (country, rest) = pos.split_first().ok_or(Error::Other(QUOTE_USAGE.into()))?;

    let (service, weights) = match rest.first() {
        Some(first) if first.parse::<f64>().is_err() => (first.to_string(), &rest[1..]),
        _ => (config.default_service.clone(), rest),
    };

    let actual = weights
        .first()
        .ok_or(Error::Other(QUOTE_USAGE.into()))
        .and_then(|w| parse_weight(w, "actual weight"))?;
    let volumetric = match weights.get(1) {
        Some(w) => parse_weight(w, "volumetric weight")?,
        None => 0.0,
    };

    Ok(RateQuery::new(*country, service, actual, volumetric))
}

pub fn cmd_quote(args: &[String], config: &RatesConfig) -> Result<()> {
    let query = parse_query(args, config)?;
    let engine = RateEngine::from_path(&tariff_path(args, config))?;
    let result = engine.quote_query(&query);

    info!(
        country = %query.country,
        service = %query.service,
        total = result.total,
        chargeable_weight = result.chargeable_weight,
        "quoted"
    );

    if has_flag(args, "--json") {
        return print_json(&result);
    }

    match result.basis {
        PricingBasis::NoTariff => {
            println!(
                "No {} tariff configured for {}",
                query.service.to_uppercase(),
                query.country
            );
        }
        PricingBasis::NoWeight => println!("No shipment weight given"),
        PricingBasis::NoBaseRule => {
            println!(
                "No rate applies to {} kg for {} {}",
                query.input_weight().ceil(),
                query.country,
                query.service.to_uppercase()
            );
        }
        PricingBasis::Overflow => {
            println!("Tariff rate for {} is too large to price this shipment", query.country);
        }
        _ => {
            println!("Chargeable weight: {} kg", result.chargeable_weight);
            println!("Rate per kg:       {:.2} {}", result.rate_per_kg, config.currency);
            println!("Freight:           {:.2} {}", result.total, config.currency);
            if result.is_adder_fallback() {
                println!("⚠ No adder rate covers this weight; extra kilograms priced at zero");
            }
        }
    }

    Ok(())
}

pub fn cmd_countries(args: &[String], config: &RatesConfig) -> Result<()> {
    let engine = RateEngine::from_path(&tariff_path(args, config))?;

    if has_flag(args, "--json") {
        return print_json(&engine.list_countries());
    }

    for country in engine.list_countries() {
        println!("{}", country);
    }
    Ok(())
}

pub fn cmd_check(args: &[String], config: &RatesConfig) -> Result<()> {
    let path = tariff_path(args, config);
    let engine = RateEngine::from_path(&path)?;
    let index = engine.index();
    let report = engine.load_report();

    if has_flag(args, "--json") {
        print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "fingerprint": index.fingerprint(),
            "services": engine.services(),
            "countries": index.countries().len(),
            "report": report,
        }))?;
    } else {
        println!("Tariff:      {}", path.display());
        println!("Fingerprint: {}", index.fingerprint());
        println!("Services:    {}", engine.services().join(", "));
        println!("Countries:   {}", index.countries().len());
        println!("{}", report.to_report());
    }

    if report.accepted == 0 {
        return Err(Error::Tariff(format!(
            "{} has no usable tariff rows",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_query_full() {
        let q = parse_query(&args(&["France", "economy", "3.2", "4"]), &RatesConfig::default())
            .unwrap();
        assert_eq!(q, RateQuery::new("France", "economy", 3.2, 4.0));
    }

    #[test]
    fn test_parse_query_default_service() {
        let q = parse_query(&args(&["France", "2", "--json"]), &RatesConfig::default()).unwrap();
        assert_eq!(q.service, "EXPRESS");
        assert_eq!(q.actual_weight, 2.0);
        assert_eq!(q.volumetric_weight, 0.0);
    }

    #[test]
    fn test_parse_query_missing_weight() {
        assert!(parse_query(&args(&["France", "EXPRESS"]), &RatesConfig::default()).is_err());
        assert!(parse_query(&args(&[]), &RatesConfig::default()).is_err());
    }
}
