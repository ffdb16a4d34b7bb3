//! JSON schema command

use courier_rates::*;

pub fn cmd_schema(args: &[String]) -> Result<()> {
    let name = args.first().map(String::as_str).unwrap_or("rate-result");

    let schema = match name {
        "rate-result" | "result" => schemars::schema_for!(RateResult),
        "rate-query" | "query" => schemars::schema_for!(RateQuery),
        "tariff-index" | "tariff" => schemars::schema_for!(TariffIndex),
        "load-report" | "report" => schemars::schema_for!(LoadReport),
        "charges" => schemars::schema_for!(Charges),
        "config" => schemars::schema_for!(RatesConfig),
        other => {
            return Err(Error::Other(format!(
                "Unknown schema: {} (expected rate-result, rate-query, tariff-index, load-report, charges, config)",
                other
            )))
        }
    };

    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
