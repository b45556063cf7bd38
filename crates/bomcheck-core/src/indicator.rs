//! Compliance indicators: definitions, severity flags and per-item results.
//!
//! An indicator is a named compliance rule evaluated per item. Each indicator
//! kind has its own closed flag enumeration, declared from least to most
//! severe. Flags of different kinds are separate types, so two watch-list
//! flags can be ordered but a watch-list flag cannot be ordered against a RoHS
//! flag.

use std::{cmp::Ordering, fmt};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{Error, Result};

// ─── Flags ───────────────────────────────────────────────────────────────────

/// Result flags of a watch-list indicator, least severe first.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum WatchListFlag {
  WatchListNotImpacted,
  WatchListCompliant,
  WatchListBelowThreshold,
  WatchListAllSubstancesBelowThreshold,
  WatchListAboveThreshold,
  WatchListHasSubstanceAboveThreshold,
  WatchListUnknown,
}

impl WatchListFlag {
  pub fn description(self) -> &'static str {
    match self {
      Self::WatchListNotImpacted => {
        "This substance is not impacted by the specified legislations."
      }
      Self::WatchListCompliant => {
        "This item does not contain any substances impacted by the specified \
         legislations."
      }
      Self::WatchListBelowThreshold => {
        "This substance is impacted by the specified legislations, but is \
         present in a quantity below the threshold."
      }
      Self::WatchListAllSubstancesBelowThreshold => {
        "This item contains substances impacted by the specified \
         legislations, but all of them below the threshold."
      }
      Self::WatchListAboveThreshold => {
        "This substance is impacted by the specified legislations and is \
         present in a quantity above the threshold."
      }
      Self::WatchListHasSubstanceAboveThreshold => {
        "This item contains one or more substances impacted by the specified \
         legislations in a quantity above the threshold."
      }
      Self::WatchListUnknown => {
        "There is not enough information to determine compliance."
      }
    }
  }
}

/// Result flags of a RoHS indicator, least severe first.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum RohsFlag {
  RohsNotImpacted,
  RohsBelowThreshold,
  RohsCompliant,
  RohsCompliantWithExemptions,
  RohsAboveThreshold,
  RohsNotCompliant,
  RohsUnknown,
}

impl RohsFlag {
  pub fn description(self) -> &'static str {
    match self {
      Self::RohsNotImpacted => {
        "This substance is not impacted by the specified legislations."
      }
      Self::RohsBelowThreshold => {
        "This substance is impacted by the specified legislations, but is \
         present in a quantity below the threshold."
      }
      Self::RohsCompliant => {
        "This item does not contain substances impacted by the specified \
         legislations above the threshold."
      }
      Self::RohsCompliantWithExemptions => {
        "This item contains impacted substances above the threshold, but an \
         exemption has been declared for each of them."
      }
      Self::RohsAboveThreshold => {
        "This substance is impacted by the specified legislations and is \
         present in a quantity above the threshold."
      }
      Self::RohsNotCompliant => {
        "This item contains one or more substances impacted by the specified \
         legislations above the threshold, with no exemption declared."
      }
      Self::RohsUnknown => {
        "There is not enough information to determine compliance."
      }
    }
  }
}

/// A flag of either indicator kind.
///
/// Only flags of the same kind are comparable: `partial_cmp` returns `None`
/// across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndicatorFlag {
  WatchList(WatchListFlag),
  Rohs(RohsFlag),
}

impl IndicatorFlag {
  /// The flag name as reported by the service, e.g. `"RohsCompliant"`.
  pub fn name(&self) -> &'static str {
    match self {
      Self::WatchList(f) => f.into(),
      Self::Rohs(f) => f.into(),
    }
  }

  pub fn description(&self) -> &'static str {
    match self {
      Self::WatchList(f) => f.description(),
      Self::Rohs(f) => f.description(),
    }
  }
}

impl PartialOrd for IndicatorFlag {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    match (self, other) {
      (Self::WatchList(a), Self::WatchList(b)) => Some(a.cmp(b)),
      (Self::Rohs(a), Self::Rohs(b)) => Some(a.cmp(b)),
      _ => None,
    }
  }
}

impl fmt::Display for IndicatorFlag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

// ─── Definitions ─────────────────────────────────────────────────────────────

/// The kind of an indicator, together with its kind-specific options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorKind {
  WatchList {
    #[serde(default)]
    ignore_exemptions:        bool,
    #[serde(default)]
    ignore_process_chemicals: bool,
  },
  Rohs {
    #[serde(default)]
    ignore_exemptions: bool,
  },
}

impl IndicatorKind {
  /// Parse a flag name belonging to this kind. Returns `None` for names of
  /// the other kind or unknown names.
  pub fn parse_flag(&self, name: &str) -> Option<IndicatorFlag> {
    match self {
      Self::WatchList { .. } => {
        name.parse().ok().map(IndicatorFlag::WatchList)
      }
      Self::Rohs { .. } => name.parse().ok().map(IndicatorFlag::Rohs),
    }
  }

  /// Every flag of this kind, least severe first.
  pub fn flags(&self) -> Vec<IndicatorFlag> {
    match self {
      Self::WatchList { .. } => {
        WatchListFlag::iter().map(IndicatorFlag::WatchList).collect()
      }
      Self::Rohs { .. } => RohsFlag::iter().map(IndicatorFlag::Rohs).collect(),
    }
  }

  pub fn label(&self) -> &'static str {
    match self {
      Self::WatchList { .. } => "WatchListIndicator",
      Self::Rohs { .. } => "RoHSIndicator",
    }
  }
}

/// A caller-supplied indicator, as included in the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDefinition {
  pub name:                         String,
  #[serde(flatten)]
  pub kind:                         IndicatorKind,
  #[serde(default)]
  pub legislation_names:            Vec<String>,
  #[serde(default)]
  pub default_threshold_percentage: Option<f64>,
}

impl IndicatorDefinition {
  /// A watch-list indicator with default options.
  pub fn watch_list(
    name: impl Into<String>,
    legislation_names: Vec<String>,
  ) -> Self {
    Self {
      name: name.into(),
      kind: IndicatorKind::WatchList {
        ignore_exemptions:        false,
        ignore_process_chemicals: false,
      },
      legislation_names,
      default_threshold_percentage: None,
    }
  }

  /// A RoHS indicator with default options.
  pub fn rohs(name: impl Into<String>, legislation_names: Vec<String>) -> Self {
    Self {
      name: name.into(),
      kind: IndicatorKind::Rohs {
        ignore_exemptions: false,
      },
      legislation_names,
      default_threshold_percentage: None,
    }
  }

  /// Pair a copy of this definition with the flag the service reported for
  /// one item.
  pub fn resolve(&self, flag: &str) -> Result<IndicatorResult> {
    let flag = self.kind.parse_flag(flag).ok_or_else(|| Error::UnknownFlag {
      indicator: self.name.clone(),
      flag:      flag.to_string(),
    })?;
    Ok(IndicatorResult {
      definition: self.clone(),
      flag,
    })
  }
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// An indicator definition paired with the flag resolved for one item.
///
/// The flag always belongs to the definition's kind; results can only be
/// created through [`IndicatorDefinition::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorResult {
  definition: IndicatorDefinition,
  flag:       IndicatorFlag,
}

impl IndicatorResult {
  pub fn name(&self) -> &str { &self.definition.name }

  pub fn definition(&self) -> &IndicatorDefinition { &self.definition }

  pub fn flag(&self) -> IndicatorFlag { self.flag }

  /// Order two results by severity. `None` unless both results belong to the
  /// same indicator.
  pub fn severity_cmp(&self, other: &Self) -> Option<Ordering> {
    if self.definition.name != other.definition.name {
      return None;
    }
    self.flag.partial_cmp(&other.flag)
  }
}

impl fmt::Display for IndicatorResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "<{}, name: {}, flag: {}>",
      self.definition.kind.label(),
      self.definition.name,
      self.flag
    )
  }
}

// ─── IndicatorSet ────────────────────────────────────────────────────────────

/// The ordered name → definition mapping supplied with a compliance query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorSet(IndexMap<String, IndicatorDefinition>);

impl IndicatorSet {
  /// Build a set from definitions, keeping their order. Names must be unique.
  pub fn new(
    definitions: impl IntoIterator<Item = IndicatorDefinition>,
  ) -> Result<Self> {
    let mut map = IndexMap::new();
    for definition in definitions {
      if map.contains_key(&definition.name) {
        return Err(Error::DuplicateIndicator(definition.name));
      }
      map.insert(definition.name.clone(), definition);
    }
    Ok(Self(map))
  }

  pub fn get(&self, name: &str) -> Option<&IndicatorDefinition> {
    self.0.get(name)
  }

  pub fn contains(&self, name: &str) -> bool { self.0.contains_key(name) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Definitions in the order they were supplied.
  pub fn iter(&self) -> impl Iterator<Item = &IndicatorDefinition> {
    self.0.values()
  }
}
