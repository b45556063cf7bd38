//! Impacted substances and the substance merger.
//!
//! The same substance is usually reported many times: once per legislation
//! for each item that contains it. [`SubstanceMerger`] collapses entries that
//! share a [`SubstanceKey`] into one, keeping the largest amount and the
//! smallest legislation threshold. The merge is commutative, associative and
//! idempotent, so the merged set does not depend on arrival order.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
  Error, Result,
  reference::{SubstanceKey, SubstanceReference},
};

// ─── ImpactedSubstance ───────────────────────────────────────────────────────

/// A substance flagged by one legislation for one item.
///
/// Always has an identity; see [`ImpactedSubstance::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactedSubstance {
  #[serde(flatten)]
  reference:                         SubstanceReference,
  max_percentage_amount_in_material: Option<f64>,
  legislation_threshold:             Option<f64>,
  #[serde(skip)]
  key:                               SubstanceKey,
}

impl ImpactedSubstance {
  /// Returns [`Error::SubstanceWithoutIdentity`] if `reference` has no
  /// identifying field.
  pub fn new(
    reference: SubstanceReference,
    max_percentage_amount_in_material: Option<f64>,
    legislation_threshold: Option<f64>,
  ) -> Result<Self> {
    let key = reference.key().ok_or(Error::SubstanceWithoutIdentity)?;
    Ok(Self {
      reference,
      max_percentage_amount_in_material,
      legislation_threshold,
      key,
    })
  }

  pub fn reference(&self) -> &SubstanceReference { &self.reference }

  pub fn key(&self) -> &SubstanceKey { &self.key }

  pub fn cas_number(&self) -> Option<&str> {
    self.reference.cas_number.as_deref()
  }

  pub fn ec_number(&self) -> Option<&str> {
    self.reference.ec_number.as_deref()
  }

  pub fn chemical_name(&self) -> Option<&str> {
    self.reference.chemical_name.as_deref()
  }

  pub fn max_percentage_amount_in_material(&self) -> Option<f64> {
    self.max_percentage_amount_in_material
  }

  /// `None` once the substance has been merged across legislations.
  pub fn legislation_threshold(&self) -> Option<f64> {
    self.legislation_threshold
  }

  /// Fold `other` (same key) into `self`.
  fn merge(&mut self, other: &ImpactedSubstance) {
    debug_assert_eq!(self.key, other.key);
    self.max_percentage_amount_in_material = max_present(
      self.max_percentage_amount_in_material,
      other.max_percentage_amount_in_material,
    );
    self.legislation_threshold =
      min_present(self.legislation_threshold, other.legislation_threshold);

    let this = &mut self.reference;
    let that = &other.reference;
    merge_field(&mut this.cas_number, &that.cas_number);
    merge_field(&mut this.ec_number, &that.ec_number);
    merge_field(&mut this.chemical_name, &that.chemical_name);
    merge_field(&mut this.record.record_guid, &that.record.record_guid);
    merge_field(
      &mut this.record.record_history_guid,
      &that.record.record_history_guid,
    );
    merge_field(
      &mut this.record.record_history_identity,
      &that.record.record_history_identity,
    );
  }
}

/// Larger of two amounts; an absent amount ranks lowest.
fn max_present(a: Option<f64>, b: Option<f64>) -> Option<f64> {
  match (a, b) {
    (Some(a), Some(b)) => Some(a.max(b)),
    (a, b) => a.or(b),
  }
}

/// Smaller of two thresholds, ignoring absent ones.
fn min_present(a: Option<f64>, b: Option<f64>) -> Option<f64> {
  match (a, b) {
    (Some(a), Some(b)) => Some(a.min(b)),
    (a, b) => a.or(b),
  }
}

/// Keep the smaller of two present identity values, or whichever is present.
fn merge_field<T: Ord + Clone>(target: &mut Option<T>, other: &Option<T>) {
  match (target.as_mut(), other) {
    (Some(current), Some(candidate)) if candidate < current => {
      *current = candidate.clone();
    }
    (None, Some(candidate)) => *target = Some(candidate.clone()),
    _ => {}
  }
}

// ─── SubstanceMerger ─────────────────────────────────────────────────────────

/// Accumulates impacted substances, merging entries with the same identity.
///
/// Substances are kept in first-seen order of their keys.
#[derive(Debug, Clone, Default)]
pub struct SubstanceMerger {
  substances: IndexMap<SubstanceKey, ImpactedSubstance>,
}

impl SubstanceMerger {
  pub fn new() -> Self { Self::default() }

  /// Insert `substance`, or merge it into the entry with the same key.
  pub fn add(&mut self, substance: &ImpactedSubstance) {
    match self.substances.get_mut(substance.key()) {
      Some(existing) => existing.merge(substance),
      None => {
        self
          .substances
          .insert(substance.key().clone(), substance.clone());
      }
    }
  }

  /// Drop the threshold of every held substance. Used when the merged set
  /// spans several legislations and no single threshold applies.
  pub fn clear_legislation_threshold(&mut self) {
    for substance in self.substances.values_mut() {
      substance.legislation_threshold = None;
    }
  }

  /// The merged substances, in first-seen order.
  pub fn substances(&self) -> impl Iterator<Item = &ImpactedSubstance> {
    self.substances.values()
  }

  pub fn into_substances(self) -> Vec<ImpactedSubstance> {
    self.substances.into_values().collect()
  }

  pub fn len(&self) -> usize { self.substances.len() }

  pub fn is_empty(&self) -> bool { self.substances.is_empty() }
}

impl<'a> Extend<&'a ImpactedSubstance> for SubstanceMerger {
  fn extend<I: IntoIterator<Item = &'a ImpactedSubstance>>(&mut self, iter: I) {
    for substance in iter {
      self.add(substance);
    }
  }
}
