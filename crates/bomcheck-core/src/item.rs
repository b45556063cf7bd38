//! Typed item results, the nodes of the BoM result tree.
//!
//! Impacted-substances results carry their substances grouped by legislation.
//! Compliance results carry one [`IndicatorResult`] per indicator and, for
//! kinds that have children, the child results they own. No child refers back
//! to its parent.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
  indicator::IndicatorResult,
  reference::{
    CoatingReference, MaterialReference, PartReference, SpecificationReference,
    SubstanceReference,
  },
  substance::ImpactedSubstance,
};

/// Indicator name → result for one item, in the caller's indicator order.
pub type Indicators = IndexMap<String, IndicatorResult>;

/// Legislation name → substances impacted by it, in first-reported order.
pub type Legislations = IndexMap<String, Vec<ImpactedSubstance>>;

// ─── Traits ──────────────────────────────────────────────────────────────────

/// An item result that lists impacted substances per legislation.
pub trait WithImpactedSubstances {
  /// Name used when describing a collection of these results.
  const TYPE_NAME: &'static str;

  fn legislations(&self) -> &Legislations;
}

/// An item result that carries indicator results.
pub trait WithCompliance {
  const TYPE_NAME: &'static str;

  fn indicators(&self) -> &Indicators;
}

// ─── Impacted substances ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartWithImpactedSubstances {
  pub reference:    PartReference,
  pub legislations: Legislations,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialWithImpactedSubstances {
  pub reference:    MaterialReference,
  pub legislations: Legislations,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecificationWithImpactedSubstances {
  pub reference:    SpecificationReference,
  pub legislations: Legislations,
}

/// The single synthetic root of a BoM impacted-substances query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomWithImpactedSubstances {
  pub legislations: Legislations,
}

// ─── Compliance ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartWithCompliance {
  pub reference:      PartReference,
  pub indicators:     Indicators,
  pub parts:          Vec<PartWithCompliance>,
  pub materials:      Vec<MaterialWithCompliance>,
  pub specifications: Vec<SpecificationWithCompliance>,
  pub substances:     Vec<SubstanceWithCompliance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialWithCompliance {
  pub reference:  MaterialReference,
  pub indicators: Indicators,
  pub substances: Vec<SubstanceWithCompliance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecificationWithCompliance {
  pub reference:      SpecificationReference,
  pub indicators:     Indicators,
  pub materials:      Vec<MaterialWithCompliance>,
  pub specifications: Vec<SpecificationWithCompliance>,
  pub coatings:       Vec<CoatingWithCompliance>,
  pub substances:     Vec<SubstanceWithCompliance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoatingWithCompliance {
  pub reference:  CoatingReference,
  pub indicators: Indicators,
  pub substances: Vec<SubstanceWithCompliance>,
}

/// A leaf of the compliance tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstanceWithCompliance {
  pub reference:  SubstanceReference,
  pub indicators: Indicators,
}

// ─── Trait impls and Display ─────────────────────────────────────────────────

macro_rules! impacted_substances_item {
  ($ty:ident, $name:literal) => {
    impl WithImpactedSubstances for $ty {
      const TYPE_NAME: &'static str = $name;

      fn legislations(&self) -> &Legislations { &self.legislations }
    }
  };
}

macro_rules! compliance_item {
  ($ty:ident, $name:literal) => {
    impl WithCompliance for $ty {
      const TYPE_NAME: &'static str = $name;

      fn indicators(&self) -> &Indicators { &self.indicators }
    }

    impl fmt::Display for $ty {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
          f,
          "<{}Result({}), {} indicators>",
          $name,
          self.reference,
          self.indicators.len()
        )
      }
    }
  };
}

impacted_substances_item!(PartWithImpactedSubstances, "PartWithImpactedSubstances");
impacted_substances_item!(
  MaterialWithImpactedSubstances,
  "MaterialWithImpactedSubstances"
);
impacted_substances_item!(
  SpecificationWithImpactedSubstances,
  "SpecificationWithImpactedSubstances"
);
impacted_substances_item!(BomWithImpactedSubstances, "BomWithImpactedSubstances");

compliance_item!(PartWithCompliance, "PartWithCompliance");
compliance_item!(MaterialWithCompliance, "MaterialWithCompliance");
compliance_item!(SpecificationWithCompliance, "SpecificationWithCompliance");
compliance_item!(CoatingWithCompliance, "CoatingWithCompliance");
compliance_item!(SubstanceWithCompliance, "SubstanceWithCompliance");

impl fmt::Display for PartWithImpactedSubstances {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "<PartWithImpactedSubstancesResult({}), {} legislations>",
      self.reference,
      self.legislations.len()
    )
  }
}

impl fmt::Display for MaterialWithImpactedSubstances {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "<MaterialWithImpactedSubstancesResult({}), {} legislations>",
      self.reference,
      self.legislations.len()
    )
  }
}

impl fmt::Display for SpecificationWithImpactedSubstances {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "<SpecificationWithImpactedSubstancesResult({}), {} legislations>",
      self.reference,
      self.legislations.len()
    )
  }
}

impl fmt::Display for BomWithImpactedSubstances {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "<BomWithImpactedSubstancesResult, {} legislations>",
      self.legislations.len()
    )
  }
}
