//! Aggregate views over a collection of item results.
//!
//! Every pivot takes item results by reference and returns fresh, owned
//! values; the items are never modified.

use std::cmp::Ordering;

use bomcheck_core::{
  indicator::IndicatorResult,
  item::{WithCompliance, WithImpactedSubstances},
  substance::{ImpactedSubstance, SubstanceMerger},
};
use indexmap::IndexMap;

/// Merged impacted substances per legislation, across all items.
///
/// Legislations appear in first-seen order and only if at least one item
/// reported a substance for them. Substances within a legislation are merged
/// by identity, keeping the largest amount and the smallest threshold.
pub fn impacted_substances_by_legislation<'a, T>(
  items: impl IntoIterator<Item = &'a T>,
) -> IndexMap<String, Vec<ImpactedSubstance>>
where
  T: WithImpactedSubstances + 'a,
{
  let mut mergers: IndexMap<&str, SubstanceMerger> = IndexMap::new();
  for item in items {
    for (legislation, substances) in item.legislations() {
      if substances.is_empty() {
        continue;
      }
      mergers
        .entry(legislation.as_str())
        .or_default()
        .extend(substances);
    }
  }
  mergers
    .into_iter()
    .map(|(legislation, merger)| {
      (legislation.to_string(), merger.into_substances())
    })
    .collect()
}

/// Merged impacted substances across all items and legislations.
///
/// A threshold is only meaningful for a single legislation, so every
/// substance returned here has its legislation threshold cleared.
pub fn impacted_substances<'a, T>(
  items: impl IntoIterator<Item = &'a T>,
) -> Vec<ImpactedSubstance>
where
  T: WithImpactedSubstances + 'a,
{
  let mut merger = SubstanceMerger::new();
  for item in items {
    for substances in item.legislations().values() {
      merger.extend(substances);
    }
  }
  merger.clear_legislation_threshold();
  merger.into_substances()
}

/// The worst result per indicator across the given items.
///
/// Only the items themselves are considered, not their children: each item's
/// indicators already summarize everything below it. When two results are
/// equally severe, the first one seen is kept.
pub fn compliance_by_indicator<'a, T>(
  items: impl IntoIterator<Item = &'a T>,
) -> IndexMap<String, IndicatorResult>
where
  T: WithCompliance + 'a,
{
  let mut worst: IndexMap<String, IndicatorResult> = IndexMap::new();
  for item in items {
    for (name, candidate) in item.indicators() {
      match worst.get_mut(name) {
        Some(current) => {
          if candidate.severity_cmp(current) == Some(Ordering::Greater) {
            *current = candidate.clone();
          }
        }
        None => {
          worst.insert(name.clone(), candidate.clone());
        }
      }
    }
  }
  worst
}
