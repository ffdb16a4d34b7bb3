//! Rate engine: a tariff plus the quoting operations over it
//!
//! The engine owns the raw tariff text and builds the [`TariffIndex`] the
//! first time it is needed. The build runs at most once per engine, even
//! when several threads ask for a quote at the same moment; after that the
//! index is read-only and shared freely.

use crate::error::{Error, Result};
use crate::quote::{quote_query, RateQuery, RateResult};
use crate::tariff::{parse_with_report, LoadReport, TariffIndex};
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

#[derive(Debug, Default)]
pub struct RateEngine {
    source: String,
    built: OnceLock<(TariffIndex, LoadReport)>,
}

impl RateEngine {
    /// Engine over tariff text; parsing is deferred to first use
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            built: OnceLock::new(),
        }
    }

    /// Engine over an index that is already built
    pub fn from_index(index: TariffIndex) -> Self {
        let report = LoadReport {
            header_skipped: false,
            accepted: index.row_count(),
            rejected: Vec::new(),
        };
        Self {
            source: String::new(),
            built: OnceLock::from((index, report)),
        }
    }

    /// Engine over a tariff file
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::Tariff(format!("cannot read {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), bytes = source.len(), "tariff source read");
        Ok(Self::new(source))
    }

    fn built(&self) -> &(TariffIndex, LoadReport) {
        self.built.get_or_init(|| parse_with_report(&self.source))
    }

    pub fn index(&self) -> &TariffIndex {
        &self.built().0
    }

    /// What the build kept and dropped
    pub fn load_report(&self) -> &LoadReport {
        &self.built().1
    }

    /// Quote a shipment; see [`crate::quote`] for the pricing steps
    pub fn quote(
        &self,
        country: &str,
        service: &str,
        actual_weight: f64,
        volumetric_weight: f64,
    ) -> RateResult {
        self.quote_query(&RateQuery::new(
            country,
            service,
            actual_weight,
            volumetric_weight,
        ))
    }

    pub fn quote_query(&self, query: &RateQuery) -> RateResult {
        quote_query(self.index(), query)
    }

    /// Selectable destinations, sorted
    pub fn list_countries(&self) -> &[String] {
        self.index().countries()
    }

    pub fn services(&self) -> Vec<&str> {
        self.index().services().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const TARIFF: &str = "\
Country,Service,Min,Max,Rate,Type
United Kingdom,EXPRESS,0,0.5,4500,DOC
United Kingdom,EXPRESS,0,1,6200,BASE
United Kingdom,EXPRESS,1,10,1850,ADDER
Canada,ECONOMY,0,300,2300,FLAT_SLAB
bad,row
";

    #[test]
    fn test_lazy_build() {
        let engine = RateEngine::new(TARIFF);
        assert!(engine.built.get().is_none());
        assert_eq!(engine.list_countries(), &["Canada", "United Kingdom"]);
        assert!(engine.built.get().is_some());
        assert_eq!(engine.load_report().accepted, 4);
        assert_eq!(engine.load_report().rejected.len(), 1);
    }

    #[test]
    fn test_quote_through_engine() {
        let engine = RateEngine::new(TARIFF);
        let result = engine.quote("United Kingdom", "EXPRESS", 2.5, 0.0);
        assert_eq!(result.chargeable_weight, 3.0);
        assert_eq!(result.total, 6200.0 + 2.0 * 1850.0);
    }

    #[test]
    fn test_from_index() {
        let engine = RateEngine::from_index(TariffIndex::parse(TARIFF));
        assert_eq!(engine.load_report().accepted, 4);
        assert_eq!(engine.services(), vec!["ECONOMY", "EXPRESS"]);
    }

    #[test]
    fn test_concurrent_first_access() {
        let engine = Arc::new(RateEngine::new(TARIFF));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.quote("Canada", "ECONOMY", 4.2, 0.0).total)
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 5.0 * 2300.0);
        }
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = RateEngine::from_path(Path::new("/nonexistent/tariff.csv")).unwrap_err();
        assert!(matches!(err, Error::Tariff(_)));
    }
}
