//! Item result tree builder.
//!
//! Converts raw response nodes into typed item results. Identity fields are
//! copied verbatim. Impacted substances are grouped by legislation name
//! without merging; indicator flags are resolved against the caller's
//! indicator definitions, each result getting its own copy of the definition.

use bomcheck_core::{
  indicator::IndicatorSet,
  item::{
    BomWithImpactedSubstances, CoatingWithCompliance, Indicators, Legislations,
    MaterialWithCompliance, MaterialWithImpactedSubstances, PartWithCompliance,
    PartWithImpactedSubstances, SpecificationWithCompliance,
    SpecificationWithImpactedSubstances, SubstanceWithCompliance,
  },
  reference::{
    CoatingReference, MaterialReference, PartReference, SpecificationReference,
    SubstanceReference,
  },
  substance::ImpactedSubstance,
};
use tracing::debug;

use crate::{
  Error, Result,
  response::{
    RawBomWithImpactedSubstances, RawCoatingWithCompliance,
    RawImpactedSubstance, RawIndicatorFlag, RawLegislation,
    RawMaterialWithCompliance, RawMaterialWithImpactedSubstances,
    RawPartWithCompliance, RawPartWithImpactedSubstances,
    RawSpecificationWithCompliance, RawSpecificationWithImpactedSubstances,
    RawSubstanceWithCompliance,
  },
};

// ─── Impacted substances ─────────────────────────────────────────────────────

fn impacted_substance(raw: RawImpactedSubstance) -> Result<ImpactedSubstance> {
  let reference = SubstanceReference {
    cas_number:    raw.cas_number,
    ec_number:     raw.ec_number,
    chemical_name: raw.substance_name,
    record:        raw.record.into(),
  };
  Ok(ImpactedSubstance::new(
    reference,
    raw.max_percentage_amount_in_material,
    raw.legislation_threshold,
  )?)
}

/// Group substances by legislation name. A name reported twice gets the
/// substances of both entries appended in order.
pub fn legislations(raw: Vec<RawLegislation>) -> Result<Legislations> {
  let mut grouped = Legislations::new();
  for legislation in raw {
    let substances = legislation
      .impacted_substances
      .into_iter()
      .map(impacted_substance)
      .collect::<Result<Vec<_>>>()?;
    grouped
      .entry(legislation.legislation_name)
      .or_default()
      .extend(substances);
  }
  Ok(grouped)
}

pub fn part_with_impacted_substances(
  raw: RawPartWithImpactedSubstances,
) -> Result<PartWithImpactedSubstances> {
  Ok(PartWithImpactedSubstances {
    reference:    PartReference {
      part_number: raw.part_number,
      record:      raw.record.into(),
    },
    legislations: legislations(raw.legislations)?,
  })
}

pub fn material_with_impacted_substances(
  raw: RawMaterialWithImpactedSubstances,
) -> Result<MaterialWithImpactedSubstances> {
  Ok(MaterialWithImpactedSubstances {
    reference:    MaterialReference {
      material_id: raw.material_id,
      record:      raw.record.into(),
    },
    legislations: legislations(raw.legislations)?,
  })
}

pub fn specification_with_impacted_substances(
  raw: RawSpecificationWithImpactedSubstances,
) -> Result<SpecificationWithImpactedSubstances> {
  Ok(SpecificationWithImpactedSubstances {
    reference:    SpecificationReference {
      specification_id: raw.specification_id,
      record:           raw.record.into(),
    },
    legislations: legislations(raw.legislations)?,
  })
}

pub fn bom_with_impacted_substances(
  raw: RawBomWithImpactedSubstances,
) -> Result<BomWithImpactedSubstances> {
  Ok(BomWithImpactedSubstances {
    legislations: legislations(raw.legislations)?,
  })
}

// ─── Compliance ──────────────────────────────────────────────────────────────

/// Builds compliance trees against the indicators the query was made with.
#[derive(Debug, Clone, Copy)]
pub struct ComplianceBuilder<'a> {
  definitions: &'a IndicatorSet,
}

impl<'a> ComplianceBuilder<'a> {
  pub fn new(definitions: &'a IndicatorSet) -> Self { Self { definitions } }

  /// Resolve the flags reported for one item. The result lists indicators in
  /// definition order and only those the item reported. Each indicator may
  /// be reported at most once.
  fn indicators(&self, reported: &[RawIndicatorFlag]) -> Result<Indicators> {
    for (i, raw) in reported.iter().enumerate() {
      if !self.definitions.contains(&raw.name) {
        return Err(Error::UnknownIndicator(raw.name.clone()));
      }
      if reported[..i].iter().any(|r| r.name == raw.name) {
        return Err(Error::DuplicateIndicatorReport(raw.name.clone()));
      }
    }

    let mut indicators = Indicators::new();
    for definition in self.definitions.iter() {
      if let Some(raw) = reported.iter().find(|r| r.name == definition.name) {
        let result = definition.resolve(&raw.flag)?;
        indicators.insert(definition.name.clone(), result);
      }
    }
    Ok(indicators)
  }

  pub fn part(&self, raw: RawPartWithCompliance) -> Result<PartWithCompliance> {
    let mut part = PartWithCompliance {
      reference:      PartReference {
        part_number: raw.part_number,
        record:      raw.record.into(),
      },
      indicators:     self.indicators(&raw.indicators)?,
      parts:          Vec::new(),
      materials:      Vec::new(),
      specifications: Vec::new(),
      substances:     Vec::new(),
    };
    debug!(
      part = %part.reference,
      parts = raw.parts.len(),
      materials = raw.materials.len(),
      specifications = raw.specifications.len(),
      substances = raw.substances.len(),
      "building part"
    );
    part.parts = self.parts(raw.parts)?;
    part.materials = self.materials(raw.materials)?;
    part.specifications = self.specifications(raw.specifications)?;
    part.substances = self.substances(raw.substances)?;
    Ok(part)
  }

  pub fn material(
    &self,
    raw: RawMaterialWithCompliance,
  ) -> Result<MaterialWithCompliance> {
    let mut material = MaterialWithCompliance {
      reference:  MaterialReference {
        material_id: raw.material_id,
        record:      raw.record.into(),
      },
      indicators: self.indicators(&raw.indicators)?,
      substances: Vec::new(),
    };
    material.substances = self.substances(raw.substances)?;
    Ok(material)
  }

  pub fn specification(
    &self,
    raw: RawSpecificationWithCompliance,
  ) -> Result<SpecificationWithCompliance> {
    let mut specification = SpecificationWithCompliance {
      reference:      SpecificationReference {
        specification_id: raw.specification_id,
        record:           raw.record.into(),
      },
      indicators:     self.indicators(&raw.indicators)?,
      materials:      Vec::new(),
      specifications: Vec::new(),
      coatings:       Vec::new(),
      substances:     Vec::new(),
    };
    specification.materials = self.materials(raw.materials)?;
    specification.specifications = self.specifications(raw.specifications)?;
    specification.coatings = self.coatings(raw.coatings)?;
    specification.substances = self.substances(raw.substances)?;
    Ok(specification)
  }

  pub fn coating(
    &self,
    raw: RawCoatingWithCompliance,
  ) -> Result<CoatingWithCompliance> {
    let mut coating = CoatingWithCompliance {
      reference:  CoatingReference {
        record: raw.record.into(),
      },
      indicators: self.indicators(&raw.indicators)?,
      substances: Vec::new(),
    };
    coating.substances = self.substances(raw.substances)?;
    Ok(coating)
  }

  pub fn substance(
    &self,
    raw: RawSubstanceWithCompliance,
  ) -> Result<SubstanceWithCompliance> {
    Ok(SubstanceWithCompliance {
      reference:  SubstanceReference {
        cas_number:    raw.cas_number,
        ec_number:     raw.ec_number,
        chemical_name: raw.substance_name,
        record:        raw.record.into(),
      },
      indicators: self.indicators(&raw.indicators)?,
    })
  }

  pub fn parts(
    &self,
    raw: Vec<RawPartWithCompliance>,
  ) -> Result<Vec<PartWithCompliance>> {
    raw.into_iter().map(|r| self.part(r)).collect()
  }

  pub fn materials(
    &self,
    raw: Vec<RawMaterialWithCompliance>,
  ) -> Result<Vec<MaterialWithCompliance>> {
    raw.into_iter().map(|r| self.material(r)).collect()
  }

  pub fn specifications(
    &self,
    raw: Vec<RawSpecificationWithCompliance>,
  ) -> Result<Vec<SpecificationWithCompliance>> {
    raw.into_iter().map(|r| self.specification(r)).collect()
  }

  pub fn coatings(
    &self,
    raw: Vec<RawCoatingWithCompliance>,
  ) -> Result<Vec<CoatingWithCompliance>> {
    raw.into_iter().map(|r| self.coating(r)).collect()
  }

  pub fn substances(
    &self,
    raw: Vec<RawSubstanceWithCompliance>,
  ) -> Result<Vec<SubstanceWithCompliance>> {
    raw.into_iter().map(|r| self.substance(r)).collect()
  }
}

#[cfg(test)]
mod tests {
  use bomcheck_core::indicator::{IndicatorFlag, RohsFlag, WatchListFlag};

  use super::*;
  use crate::test_helpers::{indicator_set, raw_flag, raw_substance};

  #[test]
  fn repeated_legislation_is_grouped_not_merged() {
    let raw = vec![
      RawLegislation {
        legislation_name:    "SIN List".into(),
        impacted_substances: vec![raw_substance("50-00-0", Some(5.0), None)],
      },
      RawLegislation {
        legislation_name:    "REACH".into(),
        impacted_substances: vec![],
      },
      RawLegislation {
        legislation_name:    "SIN List".into(),
        impacted_substances: vec![raw_substance("50-00-0", Some(10.0), None)],
      },
    ];
    let grouped = legislations(raw).unwrap();
    let names: Vec<_> = grouped.keys().map(String::as_str).collect();
    assert_eq!(names, ["SIN List", "REACH"]);
    assert_eq!(grouped["SIN List"].len(), 2);
    assert!(grouped["REACH"].is_empty());
  }

  #[test]
  fn substance_without_identity_is_rejected() {
    let raw = vec![RawLegislation {
      legislation_name:    "SIN List".into(),
      impacted_substances: vec![RawImpactedSubstance::default()],
    }];
    assert!(matches!(
      legislations(raw),
      Err(Error::Core(bomcheck_core::Error::SubstanceWithoutIdentity))
    ));
  }

  #[test]
  fn identity_fields_are_copied_verbatim() {
    let raw = RawMaterialWithImpactedSubstances {
      material_id: Some(String::new()),
      ..Default::default()
    };
    let material = material_with_impacted_substances(raw).unwrap();
    assert_eq!(material.reference.material_id.as_deref(), Some(""));
    assert_eq!(material.reference.record.record_guid, None);
    assert!(material.legislations.is_empty());
  }

  #[test]
  fn indicators_follow_definition_order() {
    let set = indicator_set();
    let raw = RawSubstanceWithCompliance {
      cas_number: Some("7440-43-9".into()),
      indicators: vec![
        raw_flag("RoHS", "RohsNotCompliant"),
        raw_flag("SIN", "WatchListAboveThreshold"),
      ],
      ..Default::default()
    };
    let substance = ComplianceBuilder::new(&set).substance(raw).unwrap();
    let names: Vec<_> =
      substance.indicators.keys().map(String::as_str).collect();
    assert_eq!(names, ["SIN", "RoHS"]);
    assert_eq!(
      substance.indicators["RoHS"].flag(),
      IndicatorFlag::Rohs(RohsFlag::RohsNotCompliant)
    );
  }

  #[test]
  fn unreported_indicators_are_omitted() {
    let set = indicator_set();
    let raw = RawCoatingWithCompliance {
      indicators: vec![raw_flag("SIN", "WatchListCompliant")],
      ..Default::default()
    };
    let coating = ComplianceBuilder::new(&set).coating(raw).unwrap();
    assert_eq!(coating.indicators.len(), 1);
    assert_eq!(
      coating.indicators["SIN"].flag(),
      IndicatorFlag::WatchList(WatchListFlag::WatchListCompliant)
    );
  }

  #[test]
  fn unknown_indicator_name_fails() {
    let set = indicator_set();
    let raw = RawMaterialWithCompliance {
      indicators: vec![raw_flag("Prop 65", "WatchListCompliant")],
      ..Default::default()
    };
    let result = ComplianceBuilder::new(&set).material(raw);
    assert!(matches!(
      result,
      Err(Error::UnknownIndicator(name)) if name == "Prop 65"
    ));
  }

  #[test]
  fn repeated_indicator_report_fails() {
    let set = indicator_set();
    let raw = RawMaterialWithCompliance {
      material_id: Some("steel".into()),
      indicators: vec![
        raw_flag("SIN", "WatchListCompliant"),
        raw_flag("RoHS", "RohsCompliant"),
        raw_flag("SIN", "WatchListAboveThreshold"),
      ],
      ..Default::default()
    };
    let result = ComplianceBuilder::new(&set).material(raw);
    assert!(matches!(
      result,
      Err(Error::DuplicateIndicatorReport(name)) if name == "SIN"
    ));
  }

  #[test]
  fn flag_of_wrong_kind_fails() {
    let set = indicator_set();
    let raw = RawMaterialWithCompliance {
      indicators: vec![raw_flag("RoHS", "WatchListCompliant")],
      ..Default::default()
    };
    let result = ComplianceBuilder::new(&set).material(raw);
    assert!(matches!(
      result,
      Err(Error::Core(bomcheck_core::Error::UnknownFlag { .. }))
    ));
  }

  #[test]
  fn children_are_built_recursively() {
    let set = indicator_set();
    let raw = RawPartWithCompliance {
      part_number: Some("ASM-1".into()),
      indicators: vec![raw_flag("SIN", "WatchListNotImpacted")],
      parts: vec![RawPartWithCompliance {
        part_number: Some("SUB-1".into()),
        specifications: vec![RawSpecificationWithCompliance {
          specification_id: Some("MIL-A-8625".into()),
          coatings: vec![RawCoatingWithCompliance {
            indicators: vec![raw_flag("SIN", "WatchListAboveThreshold")],
            substances: vec![RawSubstanceWithCompliance {
              substance_name: Some("Chromium trioxide".into()),
              ..Default::default()
            }],
            ..Default::default()
          }],
          ..Default::default()
        }],
        ..Default::default()
      }],
      ..Default::default()
    };
    let part = ComplianceBuilder::new(&set).part(raw).unwrap();
    let child = &part.parts[0];
    assert_eq!(child.reference.part_number.as_deref(), Some("SUB-1"));
    let coating = &child.specifications[0].coatings[0];
    assert_eq!(
      coating.substances[0].reference.chemical_name.as_deref(),
      Some("Chromium trioxide")
    );
    assert_eq!(
      coating.indicators["SIN"].flag(),
      IndicatorFlag::WatchList(WatchListFlag::WatchListAboveThreshold)
    );
    assert!(child.indicators.is_empty());
  }

  #[test]
  fn each_result_owns_its_definition() {
    let set = indicator_set();
    let builder = ComplianceBuilder::new(&set);
    let raw = RawSubstanceWithCompliance {
      cas_number: Some("50-00-0".into()),
      indicators: vec![raw_flag("SIN", "WatchListCompliant")],
      ..Default::default()
    };
    let mut first = builder.substance(raw.clone()).unwrap();
    let second = builder.substance(raw).unwrap();
    first.indicators["SIN"] = set
      .get("SIN")
      .unwrap()
      .resolve("WatchListAboveThreshold")
      .unwrap();
    assert_eq!(
      second.indicators["SIN"].flag(),
      IndicatorFlag::WatchList(WatchListFlag::WatchListCompliant)
    );
  }
}
