//! CLI utility helpers

use courier_rates::{Error, RatesConfig, Result};
use std::path::PathBuf;

/// Flags that take a value; their values are not positional arguments
const VALUE_FLAGS: &[&str] = &["--tariff", "-t", "--charges"];

/// Value following a flag, e.g. `--tariff rates.csv`
pub fn flag_value<'a>(args: &'a [String], names: &[&str]) -> Option<&'a str> {
    for (i, arg) in args.iter().enumerate() {
        if names.contains(&arg.as_str()) {
            if let Some(value) = args.get(i + 1) {
                return Some(value.as_str());
            }
        }
    }
    None
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// Arguments that are neither flags nor flag values
pub fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if std::mem::take(&mut skip_next) {
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

/// Tariff file: `--tariff` flag, else the config's `tariff_path`
pub fn tariff_path(args: &[String], config: &RatesConfig) -> PathBuf {
    flag_value(args, &["--tariff", "-t"])
        .map(PathBuf::from)
        .unwrap_or_else(|| config.tariff_path.clone())
}

/// Parse a weight argument in kilograms
pub fn parse_weight(raw: &str, what: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| Error::Other(format!("{} must be a number of kg, got {:?}", what, raw)))
}

/// Print a serializable value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positional_skips_flag_values() {
        let a = args(&["France", "--tariff", "t.csv", "EXPRESS", "--json", "2.5"]);
        assert_eq!(positional(&a), vec!["France", "EXPRESS", "2.5"]);
        assert_eq!(flag_value(&a, &["--tariff"]), Some("t.csv"));
        assert!(has_flag(&a, "--json"));
    }

    #[test]
    fn test_unknown_flag_keeps_following_weight() {
        let a = args(&["France", "--output", "2.5"]);
        assert_eq!(positional(&a), vec!["France", "2.5"]);
        assert_eq!(flag_value(&a, &["--charges"]), None);
    }

    #[test]
    fn test_tariff_path_falls_back_to_config() {
        let config = RatesConfig::default();
        assert_eq!(tariff_path(&[], &config), PathBuf::from("tariff.csv"));
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight(" 3.2 ", "weight").unwrap(), 3.2);
        assert!(parse_weight("heavy", "weight").is_err());
    }
}
