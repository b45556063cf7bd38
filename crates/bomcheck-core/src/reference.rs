//! Identity fields of result items.
//!
//! Every field is optional: a result carries whichever identifiers the service
//! returned for it and leaves the rest as `None`. An empty string returned by
//! the service stays `Some("")`.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Database record identifiers shared by every item kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordReference {
  pub record_guid:             Option<Uuid>,
  pub record_history_guid:     Option<Uuid>,
  pub record_history_identity: Option<String>,
}

impl RecordReference {
  fn fields(&self) -> [(&'static str, Option<String>); 3] {
    [
      ("RecordHistoryIdentity", self.record_history_identity.clone()),
      ("RecordGuid", self.record_guid.map(|g| g.to_string())),
      ("RecordHistoryGuid", self.record_history_guid.map(|g| g.to_string())),
    ]
  }
}

/// Write `{Name: value, …}` for the populated fields only.
fn write_fields(
  f: &mut fmt::Formatter<'_>,
  fields: impl IntoIterator<Item = (&'static str, Option<String>)>,
) -> fmt::Result {
  let populated: Vec<String> = fields
    .into_iter()
    .filter_map(|(name, value)| value.map(|v| format!("{name}: {v}")))
    .collect();
  write!(f, "{{{}}}", populated.join(", "))
}

// ─── Per-kind references ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartReference {
  pub part_number: Option<String>,
  #[serde(flatten)]
  pub record:      RecordReference,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialReference {
  pub material_id: Option<String>,
  #[serde(flatten)]
  pub record:      RecordReference,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationReference {
  pub specification_id: Option<String>,
  #[serde(flatten)]
  pub record:           RecordReference,
}

/// Coatings are only identified by their record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoatingReference {
  #[serde(flatten)]
  pub record: RecordReference,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstanceReference {
  pub cas_number:    Option<String>,
  pub ec_number:     Option<String>,
  pub chemical_name: Option<String>,
  #[serde(flatten)]
  pub record:        RecordReference,
}

impl SubstanceReference {
  /// The identity used to decide whether two substance entries describe the
  /// same substance. `None` if no identifying field is populated.
  ///
  /// Record identifiers take precedence over natural keys.
  pub fn key(&self) -> Option<SubstanceKey> {
    let record = &self.record;
    record
      .record_history_identity
      .clone()
      .map(SubstanceKey::RecordHistoryIdentity)
      .or_else(|| record.record_guid.map(SubstanceKey::RecordGuid))
      .or_else(|| record.record_history_guid.map(SubstanceKey::RecordHistoryGuid))
      .or_else(|| self.cas_number.clone().map(SubstanceKey::CasNumber))
      .or_else(|| self.ec_number.clone().map(SubstanceKey::EcNumber))
      .or_else(|| self.chemical_name.clone().map(SubstanceKey::ChemicalName))
  }
}

/// A substance identity, tagged with the field it was taken from so that
/// e.g. a CAS number never collides with an EC number of the same spelling.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum SubstanceKey {
  RecordHistoryIdentity(String),
  RecordGuid(Uuid),
  RecordHistoryGuid(Uuid),
  CasNumber(String),
  EcNumber(String),
  ChemicalName(String),
}

impl fmt::Display for SubstanceKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::RecordHistoryIdentity(v) => write!(f, "RecordHistoryIdentity:{v}"),
      Self::RecordGuid(v) => write!(f, "RecordGuid:{v}"),
      Self::RecordHistoryGuid(v) => write!(f, "RecordHistoryGuid:{v}"),
      Self::CasNumber(v) => write!(f, "CAS:{v}"),
      Self::EcNumber(v) => write!(f, "EC:{v}"),
      Self::ChemicalName(v) => write!(f, "ChemicalName:{v}"),
    }
  }
}

// ─── Display ─────────────────────────────────────────────────────────────────

impl fmt::Display for RecordReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write_fields(f, self.fields())
  }
}

impl fmt::Display for PartReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let natural = [("PartNumber", self.part_number.clone())];
    write_fields(f, natural.into_iter().chain(self.record.fields()))
  }
}

impl fmt::Display for MaterialReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let natural = [("MaterialId", self.material_id.clone())];
    write_fields(f, natural.into_iter().chain(self.record.fields()))
  }
}

impl fmt::Display for SpecificationReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let natural = [("SpecificationId", self.specification_id.clone())];
    write_fields(f, natural.into_iter().chain(self.record.fields()))
  }
}

impl fmt::Display for CoatingReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.record.fmt(f)
  }
}

impl fmt::Display for SubstanceReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let natural = [
      ("CasNumber", self.cas_number.clone()),
      ("EcNumber", self.ec_number.clone()),
      ("ChemicalName", self.chemical_name.clone()),
    ];
    write_fields(f, natural.into_iter().chain(self.record.fields()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn key_prefers_record_identity() {
    let reference = SubstanceReference {
      cas_number: Some("50-00-0".into()),
      record: RecordReference {
        record_history_identity: Some("62345".into()),
        ..Default::default()
      },
      ..Default::default()
    };
    assert_eq!(
      reference.key(),
      Some(SubstanceKey::RecordHistoryIdentity("62345".into()))
    );
  }

  #[test]
  fn key_falls_back_to_natural_keys() {
    let by_ec = SubstanceReference {
      ec_number: Some("200-001-8".into()),
      chemical_name: Some("Formaldehyde".into()),
      ..Default::default()
    };
    assert_eq!(by_ec.key(), Some(SubstanceKey::EcNumber("200-001-8".into())));

    let by_name = SubstanceReference {
      chemical_name: Some("Formaldehyde".into()),
      ..Default::default()
    };
    assert_eq!(
      by_name.key(),
      Some(SubstanceKey::ChemicalName("Formaldehyde".into()))
    );
  }

  #[test]
  fn key_is_none_without_identity() {
    assert_eq!(SubstanceReference::default().key(), None);
  }

  #[test]
  fn keys_from_different_fields_never_collide() {
    assert_ne!(
      SubstanceKey::CasNumber("X".into()),
      SubstanceKey::EcNumber("X".into())
    );
  }

  #[test]
  fn display_lists_populated_fields_only() {
    let part = PartReference {
      part_number: Some("DRILL".into()),
      ..Default::default()
    };
    assert_eq!(part.to_string(), "{PartNumber: DRILL}");
    assert_eq!(CoatingReference::default().to_string(), "{}");
    assert_eq!(
      SubstanceKey::CasNumber("50-00-0".into()).to_string(),
      "CAS:50-00-0"
    );
  }

  #[test]
  fn empty_string_is_kept() {
    let material = MaterialReference {
      material_id: Some(String::new()),
      ..Default::default()
    };
    assert_eq!(material.material_id.as_deref(), Some(""));
    assert_eq!(material.to_string(), "{MaterialId: }");
  }
}
