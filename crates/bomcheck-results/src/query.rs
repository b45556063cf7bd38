//! Query results: the typed items of one query plus the service messages.
//!
//! Pivots are computed on demand from the items and never cached, so a
//! result can be inspected any number of times.

use std::fmt;

use bomcheck_core::{
  indicator::IndicatorResult,
  item::{
    BomWithImpactedSubstances, MaterialWithCompliance,
    MaterialWithImpactedSubstances, PartWithCompliance,
    PartWithImpactedSubstances, SpecificationWithCompliance,
    SpecificationWithImpactedSubstances, SubstanceWithCompliance,
    WithCompliance, WithImpactedSubstances,
  },
  message::{LogMessage, sort_by_severity},
  substance::ImpactedSubstance,
};
use indexmap::IndexMap;
use serde::Serialize;

use crate::{Error, Result, factory::ResponseKind, pivot};

/// Concatenate batches of items and messages, keeping batch order for items
/// and re-sorting the messages.
fn concat<T>(
  batches: impl IntoIterator<Item = (Vec<T>, Vec<LogMessage>)>,
) -> (Vec<T>, Vec<LogMessage>) {
  let mut items = Vec::new();
  let mut messages = Vec::new();
  for (batch_items, batch_messages) in batches {
    items.extend(batch_items);
    messages.extend(batch_messages);
  }
  sort_by_severity(&mut messages);
  (items, messages)
}

// ─── Impacted substances ─────────────────────────────────────────────────────

/// The result of an impacted-substances query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactedSubstancesQueryResult<T> {
  items:    Vec<T>,
  messages: Vec<LogMessage>,
}

impl<T> ImpactedSubstancesQueryResult<T> {
  /// Wrap built items. Messages are stored by decreasing severity.
  pub fn new(items: Vec<T>, mut messages: Vec<LogMessage>) -> Self {
    sort_by_severity(&mut messages);
    Self { items, messages }
  }

  pub fn items(&self) -> &[T] { &self.items }

  pub fn messages(&self) -> &[LogMessage] { &self.messages }

  pub fn len(&self) -> usize { self.items.len() }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  pub fn into_items(self) -> Vec<T> { self.items }

  /// Combine sub-batches of the same query into one result.
  pub fn combine(batches: impl IntoIterator<Item = Self>) -> Self {
    let (items, messages) =
      concat(batches.into_iter().map(|b| (b.items, b.messages)));
    Self { items, messages }
  }
}

impl<T: WithImpactedSubstances> ImpactedSubstancesQueryResult<T> {
  pub fn item_type(&self) -> &'static str { T::TYPE_NAME }

  /// Impacted substances per legislation, merged across all items.
  pub fn impacted_substances_by_legislation(
    &self,
  ) -> IndexMap<String, Vec<ImpactedSubstance>> {
    pivot::impacted_substances_by_legislation(&self.items)
  }

  /// Impacted substances merged across all items and legislations, with
  /// legislation thresholds cleared.
  pub fn impacted_substances(&self) -> Vec<ImpactedSubstance> {
    pivot::impacted_substances(&self.items)
  }
}

impl<T> fmt::Display for ImpactedSubstancesQueryResult<T>
where
  T: WithImpactedSubstances,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "<ImpactedSubstancesQueryResult: {} {} results>",
      self.len(),
      T::TYPE_NAME
    )
  }
}

pub type MaterialImpactedSubstancesQueryResult =
  ImpactedSubstancesQueryResult<MaterialWithImpactedSubstances>;
pub type PartImpactedSubstancesQueryResult =
  ImpactedSubstancesQueryResult<PartWithImpactedSubstances>;
pub type SpecificationImpactedSubstancesQueryResult =
  ImpactedSubstancesQueryResult<SpecificationWithImpactedSubstances>;
pub type BomImpactedSubstancesQueryResult =
  ImpactedSubstancesQueryResult<BomWithImpactedSubstances>;

impl MaterialImpactedSubstancesQueryResult {
  pub fn impacted_substances_by_material(
    &self,
  ) -> &[MaterialWithImpactedSubstances] {
    &self.items
  }
}

impl PartImpactedSubstancesQueryResult {
  pub fn impacted_substances_by_part(&self) -> &[PartWithImpactedSubstances] {
    &self.items
  }
}

impl SpecificationImpactedSubstancesQueryResult {
  pub fn impacted_substances_by_specification(
    &self,
  ) -> &[SpecificationWithImpactedSubstances] {
    &self.items
  }
}

impl BomImpactedSubstancesQueryResult {
  /// The BoM root. Built by the factory, this result holds exactly one.
  pub fn bom(&self) -> Option<&BomWithImpactedSubstances> {
    self.items.first()
  }
}

// ─── Compliance ──────────────────────────────────────────────────────────────

/// The result of a compliance query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceQueryResult<T> {
  items:    Vec<T>,
  messages: Vec<LogMessage>,
}

impl<T> ComplianceQueryResult<T> {
  /// Wrap built items. Messages are stored by decreasing severity.
  pub fn new(items: Vec<T>, mut messages: Vec<LogMessage>) -> Self {
    sort_by_severity(&mut messages);
    Self { items, messages }
  }

  pub fn items(&self) -> &[T] { &self.items }

  pub fn messages(&self) -> &[LogMessage] { &self.messages }

  pub fn len(&self) -> usize { self.items.len() }

  pub fn is_empty(&self) -> bool { self.items.is_empty() }

  pub fn into_items(self) -> Vec<T> { self.items }

  /// Combine sub-batches of the same query into one result.
  pub fn combine(batches: impl IntoIterator<Item = Self>) -> Self {
    let (items, messages) =
      concat(batches.into_iter().map(|b| (b.items, b.messages)));
    Self { items, messages }
  }
}

impl<T: WithCompliance> ComplianceQueryResult<T> {
  pub fn item_type(&self) -> &'static str { T::TYPE_NAME }

  /// The worst result per indicator across the top-level items.
  pub fn compliance_by_indicator(&self) -> IndexMap<String, IndicatorResult> {
    pivot::compliance_by_indicator(&self.items)
  }
}

impl<T: WithCompliance> fmt::Display for ComplianceQueryResult<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "<ComplianceQueryResult: {} {} results>",
      self.len(),
      T::TYPE_NAME
    )
  }
}

pub type MaterialComplianceQueryResult =
  ComplianceQueryResult<MaterialWithCompliance>;
pub type PartComplianceQueryResult = ComplianceQueryResult<PartWithCompliance>;
pub type SpecificationComplianceQueryResult =
  ComplianceQueryResult<SpecificationWithCompliance>;
pub type SubstanceComplianceQueryResult =
  ComplianceQueryResult<SubstanceWithCompliance>;
/// A BoM compliance result holds the root's top-level parts.
pub type BomComplianceQueryResult = ComplianceQueryResult<PartWithCompliance>;

impl MaterialComplianceQueryResult {
  pub fn compliance_by_material_and_indicator(
    &self,
  ) -> &[MaterialWithCompliance] {
    &self.items
  }
}

impl PartComplianceQueryResult {
  pub fn compliance_by_part_and_indicator(&self) -> &[PartWithCompliance] {
    &self.items
  }
}

impl SpecificationComplianceQueryResult {
  pub fn compliance_by_specification_and_indicator(
    &self,
  ) -> &[SpecificationWithCompliance] {
    &self.items
  }
}

impl SubstanceComplianceQueryResult {
  pub fn compliance_by_substance_and_indicator(
    &self,
  ) -> &[SubstanceWithCompliance] {
    &self.items
  }
}

// ─── QueryResult ─────────────────────────────────────────────────────────────

/// A query result of any registered kind, as returned by the factory.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum QueryResult {
  MaterialImpactedSubstances(MaterialImpactedSubstancesQueryResult),
  PartImpactedSubstances(PartImpactedSubstancesQueryResult),
  SpecificationImpactedSubstances(SpecificationImpactedSubstancesQueryResult),
  BomImpactedSubstances(BomImpactedSubstancesQueryResult),
  MaterialCompliance(MaterialComplianceQueryResult),
  PartCompliance(PartComplianceQueryResult),
  SpecificationCompliance(SpecificationComplianceQueryResult),
  SubstanceCompliance(SubstanceComplianceQueryResult),
  BomCompliance(BomComplianceQueryResult),
}

macro_rules! each_variant {
  ($value:expr, $result:ident => $body:expr) => {
    match $value {
      QueryResult::MaterialImpactedSubstances($result) => $body,
      QueryResult::PartImpactedSubstances($result) => $body,
      QueryResult::SpecificationImpactedSubstances($result) => $body,
      QueryResult::BomImpactedSubstances($result) => $body,
      QueryResult::MaterialCompliance($result) => $body,
      QueryResult::PartCompliance($result) => $body,
      QueryResult::SpecificationCompliance($result) => $body,
      QueryResult::SubstanceCompliance($result) => $body,
      QueryResult::BomCompliance($result) => $body,
    }
  };
}

impl QueryResult {
  pub fn kind(&self) -> ResponseKind {
    match self {
      Self::MaterialImpactedSubstances(_) => {
        ResponseKind::MaterialImpactedSubstances
      }
      Self::PartImpactedSubstances(_) => ResponseKind::PartImpactedSubstances,
      Self::SpecificationImpactedSubstances(_) => {
        ResponseKind::SpecificationImpactedSubstances
      }
      Self::BomImpactedSubstances(_) => ResponseKind::BomImpactedSubstances,
      Self::MaterialCompliance(_) => ResponseKind::MaterialCompliance,
      Self::PartCompliance(_) => ResponseKind::PartCompliance,
      Self::SpecificationCompliance(_) => ResponseKind::SpecificationCompliance,
      Self::SubstanceCompliance(_) => ResponseKind::SubstanceCompliance,
      Self::BomCompliance(_) => ResponseKind::BomCompliance,
    }
  }

  pub fn messages(&self) -> &[LogMessage] {
    each_variant!(self, result => result.messages())
  }

  pub fn len(&self) -> usize { each_variant!(self, result => result.len()) }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// Name of the item type held, e.g. `"PartWithCompliance"`.
  pub fn item_type(&self) -> &'static str {
    each_variant!(self, result => result.item_type())
  }

  /// `None` for compliance results.
  pub fn impacted_substances_by_legislation(
    &self,
  ) -> Option<IndexMap<String, Vec<ImpactedSubstance>>> {
    match self {
      Self::MaterialImpactedSubstances(r) => {
        Some(r.impacted_substances_by_legislation())
      }
      Self::PartImpactedSubstances(r) => {
        Some(r.impacted_substances_by_legislation())
      }
      Self::SpecificationImpactedSubstances(r) => {
        Some(r.impacted_substances_by_legislation())
      }
      Self::BomImpactedSubstances(r) => {
        Some(r.impacted_substances_by_legislation())
      }
      _ => None,
    }
  }

  /// `None` for compliance results.
  pub fn impacted_substances(&self) -> Option<Vec<ImpactedSubstance>> {
    match self {
      Self::MaterialImpactedSubstances(r) => Some(r.impacted_substances()),
      Self::PartImpactedSubstances(r) => Some(r.impacted_substances()),
      Self::SpecificationImpactedSubstances(r) => {
        Some(r.impacted_substances())
      }
      Self::BomImpactedSubstances(r) => Some(r.impacted_substances()),
      _ => None,
    }
  }

  /// `None` for impacted-substances results.
  pub fn compliance_by_indicator(
    &self,
  ) -> Option<IndexMap<String, IndicatorResult>> {
    match self {
      Self::MaterialCompliance(r) => Some(r.compliance_by_indicator()),
      Self::PartCompliance(r) => Some(r.compliance_by_indicator()),
      Self::SpecificationCompliance(r) => Some(r.compliance_by_indicator()),
      Self::SubstanceCompliance(r) => Some(r.compliance_by_indicator()),
      Self::BomCompliance(r) => Some(r.compliance_by_indicator()),
      _ => None,
    }
  }

  /// Combine results of the same kind. Fails if the kinds differ, or for
  /// BoM impacted-substances results, whose single root cannot be split
  /// across batches.
  pub fn combine(self, other: Self) -> Result<Self> {
    let pair = (self, other);
    if let (Self::BomImpactedSubstances(_), Self::BomImpactedSubstances(_)) =
      &pair
    {
      return Err(Error::NotCombinable(ResponseKind::BomImpactedSubstances));
    }
    macro_rules! combine_same {
      ($($variant:ident => $wrapper:ident),* $(,)?) => {
        match pair {
          $(
            (Self::$variant(a), Self::$variant(b)) => {
              Ok(Self::$variant($wrapper::combine([a, b])))
            }
          )*
          (a, b) => Err(Error::KindMismatch {
            expected: a.kind(),
            found:    b.kind(),
          }),
        }
      };
    }

    combine_same!(
      MaterialImpactedSubstances => ImpactedSubstancesQueryResult,
      PartImpactedSubstances => ImpactedSubstancesQueryResult,
      SpecificationImpactedSubstances => ImpactedSubstancesQueryResult,
      MaterialCompliance => ComplianceQueryResult,
      PartCompliance => ComplianceQueryResult,
      SpecificationCompliance => ComplianceQueryResult,
      SubstanceCompliance => ComplianceQueryResult,
      BomCompliance => ComplianceQueryResult,
    )
  }
}

impl fmt::Display for QueryResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "<{}QueryResult: {} {} results>",
      self.kind(),
      self.len(),
      self.item_type()
    )
  }
}

#[cfg(test)]
mod tests {
  use bomcheck_core::{item::Legislations, message::Severity};

  use super::*;
  use crate::test_helpers::{
    indicator_set, material_with_substances, message, part_with_flags,
    substance,
  };

  #[test]
  fn messages_are_sorted_on_construction() {
    let result = MaterialImpactedSubstancesQueryResult::new(vec![], vec![
      message(Severity::Information, "a"),
      message(Severity::Error, "b"),
      message(Severity::Warning, "c"),
    ]);
    let severities: Vec<_> =
      result.messages().iter().map(|m| m.severity).collect();
    assert_eq!(severities, [
      Severity::Error,
      Severity::Warning,
      Severity::Information
    ]);
  }

  #[test]
  fn empty_result_has_empty_pivots() {
    let impacted = PartImpactedSubstancesQueryResult::new(vec![], vec![]);
    assert!(impacted.impacted_substances_by_legislation().is_empty());
    assert!(impacted.impacted_substances().is_empty());
    assert!(impacted.impacted_substances_by_part().is_empty());

    let compliance = SubstanceComplianceQueryResult::new(vec![], vec![]);
    assert!(compliance.compliance_by_indicator().is_empty());
    assert!(compliance.compliance_by_substance_and_indicator().is_empty());
  }

  #[test]
  fn pivots_can_be_recomputed() {
    let result = MaterialImpactedSubstancesQueryResult::new(
      vec![material_with_substances("plastic", "SIN List", vec![
        substance("50-00-0", Some(5.0), Some(0.1)),
      ])],
      vec![],
    );
    let first = result.impacted_substances();
    let second = result.impacted_substances();
    assert_eq!(first, second);
    assert_eq!(
      result.impacted_substances_by_legislation()["SIN List"][0]
        .legislation_threshold(),
      Some(0.1)
    );
  }

  #[test]
  fn display_names_item_type() {
    let set = indicator_set();
    let result = PartComplianceQueryResult::new(
      vec![
        part_with_flags(&set, "A", &[]),
        part_with_flags(&set, "B", &[]),
      ],
      vec![],
    );
    assert_eq!(
      result.to_string(),
      "<ComplianceQueryResult: 2 PartWithCompliance results>"
    );
    assert_eq!(
      QueryResult::PartCompliance(result).to_string(),
      "<PartComplianceQueryResult: 2 PartWithCompliance results>"
    );
  }

  #[test]
  fn combined_pivots_match_pivots_over_union() {
    let a = material_with_substances("plastic", "SIN List", vec![substance(
      "50-00-0",
      Some(5.0),
      Some(0.1),
    )]);
    let b = material_with_substances("rubber", "SIN List", vec![substance(
      "50-00-0",
      Some(10.0),
      Some(0.05),
    )]);
    let combined = MaterialImpactedSubstancesQueryResult::combine([
      MaterialImpactedSubstancesQueryResult::new(vec![a.clone()], vec![
        message(Severity::Information, "first"),
      ]),
      MaterialImpactedSubstancesQueryResult::new(vec![b.clone()], vec![
        message(Severity::Error, "second"),
      ]),
    ]);
    let union = MaterialImpactedSubstancesQueryResult::new(vec![a, b], vec![]);

    assert_eq!(combined.len(), 2);
    assert_eq!(
      combined.impacted_substances_by_legislation(),
      union.impacted_substances_by_legislation()
    );
    assert_eq!(combined.messages()[0].message, "second");
  }

  #[test]
  fn combining_different_kinds_fails() {
    let impacted = QueryResult::MaterialImpactedSubstances(
      MaterialImpactedSubstancesQueryResult::new(vec![], vec![]),
    );
    let compliance = QueryResult::MaterialCompliance(
      MaterialComplianceQueryResult::new(vec![], vec![]),
    );
    assert!(matches!(
      impacted.combine(compliance),
      Err(Error::KindMismatch {
        expected: ResponseKind::MaterialImpactedSubstances,
        found:    ResponseKind::MaterialCompliance,
      })
    ));
  }

  #[test]
  fn bom_impacted_substances_are_not_combined() {
    let bom = |cas: &str| {
      QueryResult::BomImpactedSubstances(
        BomImpactedSubstancesQueryResult::new(
          vec![BomWithImpactedSubstances {
            legislations: Legislations::from([(
              "SIN List".to_string(),
              vec![substance(cas, Some(1.0), None)],
            )]),
          }],
          vec![],
        ),
      )
    };
    assert!(matches!(
      bom("50-00-0").combine(bom("7440-43-9")),
      Err(Error::NotCombinable(ResponseKind::BomImpactedSubstances))
    ));
  }

  #[test]
  fn pivots_of_the_wrong_family_are_none() {
    let compliance = QueryResult::BomCompliance(
      BomComplianceQueryResult::new(vec![], vec![]),
    );
    assert!(compliance.impacted_substances().is_none());
    assert!(compliance.impacted_substances_by_legislation().is_none());
    assert_eq!(compliance.compliance_by_indicator(), Some(IndexMap::new()));
  }
}
