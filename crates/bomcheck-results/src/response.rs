//! Raw service response models.
//!
//! These mirror the JSON the compliance service returns: PascalCase field
//! names, every identity field optional and child lists omitted when empty.
//! Nothing here is validated; [`crate::build`] turns these into typed item
//! results.

use bomcheck_core::{message::Severity, reference::RecordReference};
use serde::Deserialize;
use strum::IntoStaticStr;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawRecordReference {
  #[serde(default)]
  pub record_guid:             Option<Uuid>,
  #[serde(default)]
  pub record_history_guid:     Option<Uuid>,
  #[serde(default)]
  pub record_history_identity: Option<String>,
}

impl From<RawRecordReference> for RecordReference {
  fn from(raw: RawRecordReference) -> Self {
    Self {
      record_guid:             raw.record_guid,
      record_history_guid:     raw.record_history_guid,
      record_history_identity: raw.record_history_identity,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawLogEntry {
  pub severity: Severity,
  pub message:  String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawIndicatorFlag {
  pub name: String,
  pub flag: String,
}

// ─── Impacted substances ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawImpactedSubstance {
  #[serde(default)]
  pub substance_name:                    Option<String>,
  #[serde(default)]
  pub cas_number:                        Option<String>,
  #[serde(default)]
  pub ec_number:                         Option<String>,
  #[serde(default)]
  pub max_percentage_amount_in_material: Option<f64>,
  #[serde(default)]
  pub legislation_threshold:             Option<f64>,
  #[serde(flatten)]
  pub record:                            RawRecordReference,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawLegislation {
  pub legislation_name:    String,
  #[serde(default)]
  pub impacted_substances: Vec<RawImpactedSubstance>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawPartWithImpactedSubstances {
  #[serde(default)]
  pub part_number:  Option<String>,
  #[serde(flatten)]
  pub record:       RawRecordReference,
  #[serde(default)]
  pub legislations: Vec<RawLegislation>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawMaterialWithImpactedSubstances {
  #[serde(default)]
  pub material_id:  Option<String>,
  #[serde(flatten)]
  pub record:       RawRecordReference,
  #[serde(default)]
  pub legislations: Vec<RawLegislation>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSpecificationWithImpactedSubstances {
  #[serde(default)]
  pub specification_id: Option<String>,
  #[serde(flatten)]
  pub record:           RawRecordReference,
  #[serde(default)]
  pub legislations:     Vec<RawLegislation>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawBomWithImpactedSubstances {
  #[serde(default)]
  pub legislations: Vec<RawLegislation>,
}

// ─── Compliance ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawPartWithCompliance {
  #[serde(default)]
  pub part_number:    Option<String>,
  #[serde(flatten)]
  pub record:         RawRecordReference,
  #[serde(default)]
  pub indicators:     Vec<RawIndicatorFlag>,
  #[serde(default)]
  pub parts:          Vec<RawPartWithCompliance>,
  #[serde(default)]
  pub materials:      Vec<RawMaterialWithCompliance>,
  #[serde(default)]
  pub specifications: Vec<RawSpecificationWithCompliance>,
  #[serde(default)]
  pub substances:     Vec<RawSubstanceWithCompliance>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawMaterialWithCompliance {
  #[serde(default)]
  pub material_id: Option<String>,
  #[serde(flatten)]
  pub record:      RawRecordReference,
  #[serde(default)]
  pub indicators:  Vec<RawIndicatorFlag>,
  #[serde(default)]
  pub substances:  Vec<RawSubstanceWithCompliance>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSpecificationWithCompliance {
  #[serde(default)]
  pub specification_id: Option<String>,
  #[serde(flatten)]
  pub record:           RawRecordReference,
  #[serde(default)]
  pub indicators:       Vec<RawIndicatorFlag>,
  #[serde(default)]
  pub materials:        Vec<RawMaterialWithCompliance>,
  #[serde(default)]
  pub specifications:   Vec<RawSpecificationWithCompliance>,
  #[serde(default)]
  pub coatings:         Vec<RawCoatingWithCompliance>,
  #[serde(default)]
  pub substances:       Vec<RawSubstanceWithCompliance>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawCoatingWithCompliance {
  #[serde(flatten)]
  pub record:     RawRecordReference,
  #[serde(default)]
  pub indicators: Vec<RawIndicatorFlag>,
  #[serde(default)]
  pub substances: Vec<RawSubstanceWithCompliance>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawSubstanceWithCompliance {
  #[serde(default)]
  pub cas_number:     Option<String>,
  #[serde(default)]
  pub ec_number:      Option<String>,
  #[serde(default)]
  pub substance_name: Option<String>,
  #[serde(flatten)]
  pub record:         RawRecordReference,
  #[serde(default)]
  pub indicators:     Vec<RawIndicatorFlag>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawBomWithCompliance {
  #[serde(default)]
  pub parts: Vec<RawPartWithCompliance>,
}

// ─── Envelope ────────────────────────────────────────────────────────────────

/// One result node, tagged with its type name:
/// `{"PartWithCompliance": {...}}`.
#[derive(Debug, Clone, PartialEq, Deserialize, IntoStaticStr)]
pub enum RawNode {
  PartWithImpactedSubstances(RawPartWithImpactedSubstances),
  MaterialWithImpactedSubstances(RawMaterialWithImpactedSubstances),
  SpecificationWithImpactedSubstances(RawSpecificationWithImpactedSubstances),
  BomWithImpactedSubstances(RawBomWithImpactedSubstances),
  PartWithCompliance(RawPartWithCompliance),
  MaterialWithCompliance(RawMaterialWithCompliance),
  SpecificationWithCompliance(RawSpecificationWithCompliance),
  CoatingWithCompliance(RawCoatingWithCompliance),
  SubstanceWithCompliance(RawSubstanceWithCompliance),
  BomWithCompliance(RawBomWithCompliance),
}

impl RawNode {
  pub fn type_name(&self) -> &'static str { self.into() }
}

/// The result payload of a service response: either a single root node (BoM
/// queries) or a list of item nodes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawResponse {
  Single(RawNode),
  List(Vec<RawNode>),
}

impl RawResponse {
  /// Human-readable shape, used in errors and logs.
  pub fn shape(&self) -> String {
    match self {
      Self::Single(node) => format!("single {}", node.type_name()),
      Self::List(nodes) if nodes.is_empty() => "empty list".to_string(),
      Self::List(nodes) => {
        format!("list of {} {}", nodes.len(), nodes[0].type_name())
      }
    }
  }
}

/// A complete service response: the payload and the messages logged while
/// producing it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseDocument {
  #[serde(default)]
  pub log_messages: Vec<RawLogEntry>,
  pub response:     RawResponse,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn node_is_tagged_by_type_name() {
    let node: RawNode = serde_json::from_value(json!({
      "MaterialWithImpactedSubstances": {
        "MaterialId": "plastic-pa66",
        "Legislations": [{
          "LegislationName": "SIN List",
          "ImpactedSubstances": [{
            "CasNumber": "50-00-0",
            "MaxPercentageAmountInMaterial": 5.0
          }]
        }]
      }
    }))
    .unwrap();
    assert_eq!(node.type_name(), "MaterialWithImpactedSubstances");
    let RawNode::MaterialWithImpactedSubstances(material) = node else {
      panic!("wrong variant");
    };
    assert_eq!(material.material_id.as_deref(), Some("plastic-pa66"));
    let substance = &material.legislations[0].impacted_substances[0];
    assert_eq!(substance.cas_number.as_deref(), Some("50-00-0"));
    assert_eq!(substance.legislation_threshold, None);
  }

  #[test]
  fn record_fields_are_flattened() {
    let guid = Uuid::new_v4();
    let part: RawPartWithCompliance = serde_json::from_value(json!({
      "RecordGuid": guid,
      "RecordHistoryIdentity": "12345",
    }))
    .unwrap();
    assert_eq!(part.record.record_guid, Some(guid));
    assert_eq!(part.record.record_history_identity.as_deref(), Some("12345"));
    assert!(part.parts.is_empty());
    assert!(part.indicators.is_empty());
  }

  #[test]
  fn response_accepts_single_node_or_list() {
    let single: RawResponse =
      serde_json::from_value(json!({ "BomWithCompliance": { "Parts": [] } }))
        .unwrap();
    assert_eq!(single.shape(), "single BomWithCompliance");

    let list: RawResponse = serde_json::from_value(json!([
      { "SubstanceWithCompliance": { "CasNumber": "50-00-0" } },
      { "SubstanceWithCompliance": { "CasNumber": "7440-43-9" } },
    ]))
    .unwrap();
    assert_eq!(list.shape(), "list of 2 SubstanceWithCompliance");

    let empty: RawResponse = serde_json::from_value(json!([])).unwrap();
    assert_eq!(empty.shape(), "empty list");
  }

  #[test]
  fn unknown_node_type_is_rejected() {
    let result =
      serde_json::from_value::<RawResponse>(json!([{ "Widget": {} }]));
    assert!(result.is_err());
  }

  #[test]
  fn document_messages_default_to_empty() {
    let document: ResponseDocument = serde_json::from_value(json!({
      "Response": { "BomWithImpactedSubstances": {} }
    }))
    .unwrap();
    assert!(document.log_messages.is_empty());

    let document: ResponseDocument = serde_json::from_value(json!({
      "LogMessages": [{ "Severity": "warning", "Message": "slow" }],
      "Response": []
    }))
    .unwrap();
    assert_eq!(document.log_messages[0].severity, Severity::Warning);
  }
}
