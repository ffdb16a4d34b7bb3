//! Rate calculator
//!
//! Turns a [`RateQuery`] into a [`RateResult`] against a [`TariffIndex`].
//! The steps run in a fixed order and the first one that applies decides
//! the price:
//!
//! 1. no rules for (service, country) → zero, [`PricingBasis::NoTariff`]
//! 2. `max(actual, volumetric) <= 0` → zero, [`PricingBasis::NoWeight`]
//! 3. weight `<= 0.5` and any `DOC` rule → document price at 0.5 kg
//! 4. chargeable weight = weight rounded up to the whole kilogram
//! 5. first `FLAT_SLAB` covering it → `weight * rate`
//! 6. first `BASE` → `base + (weight - 1) * adder`, adder from the first
//!    `ADDER` covering the weight (0 when none does)
//!
//! When several rules of one kind match, the one earliest in the tariff
//! file wins. Quoting never fails; the returned `total` and `chgWt` are
//! always finite and non-negative. A price that would not be finite is
//! reported as zero with [`PricingBasis::Overflow`].

use crate::tariff::{RuleKind, TariffIndex, TariffRow};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Shipments at or under this weight may take the document price
pub const DOC_WEIGHT_LIMIT: f64 = 0.5;

/// Chargeable weight reported for document shipments
pub const DOC_CHARGEABLE_WEIGHT: f64 = 0.5;

/// Weight covered by the base rate
pub const FIRST_KG: f64 = 1.0;

/// A rate request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateQuery {
    pub country: String,
    pub service: String,
    /// Scale weight in kg
    #[serde(rename = "actWt")]
    pub actual_weight: f64,
    /// Dimensional weight in kg
    #[serde(rename = "volWt", default)]
    pub volumetric_weight: f64,
}

impl RateQuery {
    pub fn new(
        country: impl Into<String>,
        service: impl Into<String>,
        actual_weight: f64,
        volumetric_weight: f64,
    ) -> Self {
        Self {
            country: country.into(),
            service: service.into(),
            actual_weight,
            volumetric_weight,
        }
    }

    /// The weight pricing starts from: the greater of actual and volumetric
    ///
    /// Non-finite inputs count as no weight.
    pub fn input_weight(&self) -> f64 {
        let weight = self.actual_weight.max(self.volumetric_weight);
        if weight.is_finite() {
            weight
        } else {
            0.0
        }
    }
}

/// Which pricing step produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PricingBasis {
    /// No rules configured for the service and country
    NoTariff,
    /// No positive weight given yet
    NoWeight,
    /// Rules exist but neither a slab nor a base rule applies
    NoBaseRule,
    /// The tariff's numbers are too large to give a finite price
    Overflow,
    /// Fixed document price
    Document,
    /// Flat per-kilogram slab over the whole weight
    Slab,
    /// First-kilogram base plus per-kilogram adder
    BaseAdder {
        /// False when no adder covered the weight and zero was used
        adder_found: bool,
    },
}

/// A computed rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RateResult {
    /// Freight price
    pub total: f64,

    /// Chargeable weight in kg
    #[serde(rename = "chgWt")]
    pub chargeable_weight: f64,

    /// `total / chgWt`, or 0 when nothing is chargeable
    #[serde(rename = "ratePerKg")]
    pub rate_per_kg: f64,

    pub basis: PricingBasis,
}

impl RateResult {
    /// The "no quote available" result
    pub fn zero(basis: PricingBasis) -> Self {
        Self {
            total: 0.0,
            chargeable_weight: 0.0,
            rate_per_kg: 0.0,
            basis,
        }
    }

    fn priced(total: f64, chargeable_weight: f64, basis: PricingBasis) -> Self {
        let rate_per_kg = if chargeable_weight > 0.0 {
            total / chargeable_weight
        } else {
            0.0
        };
        Self {
            total,
            chargeable_weight,
            rate_per_kg,
            basis,
        }
    }

    /// True when a tariff step actually priced the shipment
    pub fn is_quoted(&self) -> bool {
        matches!(
            self.basis,
            PricingBasis::Document | PricingBasis::Slab | PricingBasis::BaseAdder { .. }
        )
    }

    /// True when the price fell back to a zero adder rate
    pub fn is_adder_fallback(&self) -> bool {
        matches!(
            self.basis,
            PricingBasis::BaseAdder { adder_found: false }
        )
    }
}

/// Quote a shipment
pub fn quote(
    index: &TariffIndex,
    country: &str,
    service: &str,
    actual_weight: f64,
    volumetric_weight: f64,
) -> RateResult {
    quote_query(
        index,
        &RateQuery::new(country, service, actual_weight, volumetric_weight),
    )
}

/// Quote a shipment described by a [`RateQuery`]
pub fn quote_query(index: &TariffIndex, query: &RateQuery) -> RateResult {
    let Some(rules) = index.rules(&query.service, &query.country) else {
        return RateResult::zero(PricingBasis::NoTariff);
    };

    let result = price(rules, query);
    if result.total.is_finite() && result.rate_per_kg.is_finite() {
        return result;
    }

    warn!(
        country = %query.country,
        service = %query.service,
        chargeable_weight = result.chargeable_weight,
        "price is not finite, tariff rate or weight out of range"
    );
    RateResult::zero(PricingBasis::Overflow)
}

fn price(rules: &[TariffRow], query: &RateQuery) -> RateResult {
    let weight = query.input_weight();
    if weight <= 0.0 {
        return RateResult::zero(PricingBasis::NoWeight);
    }

    if weight <= DOC_WEIGHT_LIMIT {
        if let Some(doc) = first_of_kind(rules, RuleKind::Doc) {
            return RateResult::priced(doc.rate, DOC_CHARGEABLE_WEIGHT, PricingBasis::Document);
        }
    }

    let chargeable = weight.ceil();

    if let Some(slab) = first_covering(rules, RuleKind::FlatSlab, chargeable) {
        return RateResult {
            total: chargeable * slab.rate,
            chargeable_weight: chargeable,
            rate_per_kg: slab.rate,
            basis: PricingBasis::Slab,
        };
    }

    let Some(base) = first_of_kind(rules, RuleKind::Base) else {
        return RateResult::zero(PricingBasis::NoBaseRule);
    };

    if chargeable <= FIRST_KG {
        return RateResult::priced(
            base.rate,
            chargeable,
            PricingBasis::BaseAdder { adder_found: true },
        );
    }

    let adder = first_covering(rules, RuleKind::Adder, chargeable);
    if adder.is_none() {
        warn!(
            country = %query.country,
            service = %query.service,
            chargeable_weight = chargeable,
            "no adder rule covers weight, pricing extra kilograms at zero"
        );
    }
    let adder_rate = adder.map_or(0.0, |r| r.rate);

    RateResult::priced(
        base.rate + (chargeable - FIRST_KG) * adder_rate,
        chargeable,
        PricingBasis::BaseAdder {
            adder_found: adder.is_some(),
        },
    )
}

fn first_of_kind(rules: &[TariffRow], kind: RuleKind) -> Option<&TariffRow> {
    rules.iter().find(|r| r.kind == kind)
}

fn first_covering(rules: &[TariffRow], kind: RuleKind, weight: f64) -> Option<&TariffRow> {
    rules
        .iter()
        .find(|r| r.kind == kind && r.range.contains(weight))
}
