//! Settings: indicator definitions and the default output format.

use std::path::Path;

use anyhow::Context as _;
use bomcheck_core::indicator::{IndicatorDefinition, IndicatorSet};
use clap::ValueEnum;
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
  #[default]
  Json,
  Text,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
  /// The indicators the compliance query was made with, in query order.
  #[serde(default)]
  pub indicators: Vec<IndicatorDefinition>,
  #[serde(default)]
  pub format:     OutputFormat,
}

impl Settings {
  /// Read `path` if it exists, then `BOMCHECK_*` environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    Self::from_builder(
      Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(Environment::with_prefix("BOMCHECK")),
    )
  }

  fn from_builder(
    builder: ConfigBuilder<DefaultState>,
  ) -> anyhow::Result<Self> {
    builder
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise Settings")
  }

  pub fn indicator_set(&self) -> bomcheck_core::Result<IndicatorSet> {
    IndicatorSet::new(self.indicators.iter().cloned())
  }
}

#[cfg(test)]
mod tests {
  use bomcheck_core::indicator::IndicatorKind;
  use config::FileFormat;

  use super::*;

  fn parse(toml: &str) -> anyhow::Result<Settings> {
    Settings::from_builder(
      Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
    )
  }

  #[test]
  fn indicators_keep_file_order() {
    let settings = parse(
      r#"
        format = "text"

        [[indicators]]
        name = "RoHS"
        kind = "rohs"
        legislation_names = ["EU RoHS"]
        ignore_exemptions = true

        [[indicators]]
        name = "SIN"
        kind = "watch_list"
        legislation_names = ["SIN List"]
        default_threshold_percentage = 0.1
      "#,
    )
    .unwrap();

    assert_eq!(settings.format, OutputFormat::Text);
    let set = settings.indicator_set().unwrap();
    let names: Vec<_> = set.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["RoHS", "SIN"]);
    assert_eq!(set.get("RoHS").unwrap().kind, IndicatorKind::Rohs {
      ignore_exemptions: true,
    });
    let sin = set.get("SIN").unwrap();
    assert_eq!(sin.default_threshold_percentage, Some(0.1));
    assert_eq!(sin.legislation_names, ["SIN List"]);
  }

  #[test]
  fn empty_config_uses_defaults() {
    let settings = parse("").unwrap();
    assert_eq!(settings.format, OutputFormat::Json);
    assert!(settings.indicator_set().unwrap().is_empty());
  }

  #[test]
  fn duplicate_indicator_names_are_rejected() {
    let settings = parse(
      r#"
        [[indicators]]
        name = "SIN"
        kind = "watch_list"

        [[indicators]]
        name = "SIN"
        kind = "rohs"
      "#,
    )
    .unwrap();
    assert!(matches!(
      settings.indicator_set(),
      Err(bomcheck_core::Error::DuplicateIndicator(name)) if name == "SIN"
    ));
  }

  #[test]
  fn unknown_indicator_kind_is_rejected() {
    let result = parse(
      r#"
        [[indicators]]
        name = "SIN"
        kind = "prop65"
      "#,
    );
    assert!(result.is_err());
  }
}
