//! Rendering a query result as the requested pivot.

use std::fmt::{self, Write as _};

use anyhow::bail;
use bomcheck_core::{indicator::IndicatorResult, substance::ImpactedSubstance};
use bomcheck_results::QueryResult;
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::Serialize;

/// Which view of the result to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pivot {
  /// The item results as built from the response.
  Items,
  /// Impacted substances per legislation, merged across items.
  ByLegislation,
  /// Impacted substances merged across items and legislations.
  Flattened,
  /// The worst flag per indicator across the top-level items.
  ByIndicator,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report<'a> {
  Items(&'a QueryResult),
  ByLegislation(IndexMap<String, Vec<ImpactedSubstance>>),
  Flattened(Vec<ImpactedSubstance>),
  ByIndicator(IndexMap<String, IndicatorResult>),
}

impl<'a> Report<'a> {
  /// Compute `pivot` over `result`. Fails if the pivot does not apply to the
  /// result's kind.
  pub fn new(result: &'a QueryResult, pivot: Pivot) -> anyhow::Result<Self> {
    let report = match pivot {
      Pivot::Items => Some(Self::Items(result)),
      Pivot::ByLegislation => result
        .impacted_substances_by_legislation()
        .map(Self::ByLegislation),
      Pivot::Flattened => result.impacted_substances().map(Self::Flattened),
      Pivot::ByIndicator => {
        result.compliance_by_indicator().map(Self::ByIndicator)
      }
    };
    match report {
      Some(report) => Ok(report),
      None => bail!(
        "the {} pivot does not apply to a {} result",
        pivot_name(pivot),
        result.kind()
      ),
    }
  }

  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(self)
  }

  pub fn to_text(&self) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = self.write_text(&mut out);
    out
  }

  fn write_text(&self, out: &mut String) -> fmt::Result {
    match self {
      Self::Items(result) => {
        writeln!(out, "{result}")?;
        for message in result.messages() {
          writeln!(out, "  [{}] {}", message.severity, message.message)?;
        }
      }
      Self::ByLegislation(legislations) => {
        for (legislation, substances) in legislations {
          writeln!(out, "{legislation}")?;
          for substance in substances {
            writeln!(out, "  {}", substance_line(substance))?;
          }
        }
      }
      Self::Flattened(substances) => {
        for substance in substances {
          writeln!(out, "{}", substance_line(substance))?;
        }
      }
      Self::ByIndicator(indicators) => {
        for result in indicators.values() {
          writeln!(out, "{result}")?;
          writeln!(out, "  {}", result.flag().description())?;
        }
      }
    }
    Ok(())
  }
}

fn pivot_name(pivot: Pivot) -> String {
  pivot
    .to_possible_value()
    .map(|v| v.get_name().to_string())
    .unwrap_or_default()
}

fn percentage(value: Option<f64>) -> String {
  value.map_or_else(|| "-".to_string(), |v| format!("{v}%"))
}

fn substance_line(substance: &ImpactedSubstance) -> String {
  format!(
    "{} amount: {} threshold: {}",
    substance.reference(),
    percentage(substance.max_percentage_amount_in_material()),
    percentage(substance.legislation_threshold())
  )
}

#[cfg(test)]
mod tests {
  use bomcheck_core::{
    indicator::{IndicatorDefinition, IndicatorSet},
    message::Severity,
  };
  use bomcheck_results::{
    ResultFactory,
    response::{RawLogEntry, RawResponse},
  };
  use serde_json::json;

  use super::*;

  fn indicators() -> IndicatorSet {
    IndicatorSet::new([IndicatorDefinition::watch_list("SIN", vec![
      "SIN List".to_string(),
    ])])
    .unwrap()
  }

  fn impacted() -> QueryResult {
    let response: RawResponse = serde_json::from_value(json!([
      { "MaterialWithImpactedSubstances": {
        "MaterialId": "plastic-pa66",
        "Legislations": [{
          "LegislationName": "SIN List",
          "ImpactedSubstances": [{
            "CasNumber": "50-00-0",
            "MaxPercentageAmountInMaterial": 5.0,
            "LegislationThreshold": 0.1
          }]
        }]
      }}
    ]))
    .unwrap();
    ResultFactory::new(&indicators())
      .create(response, vec![RawLogEntry {
        severity: Severity::Warning,
        message:  "slow query".into(),
      }])
      .unwrap()
  }

  fn compliance() -> QueryResult {
    let response: RawResponse = serde_json::from_value(json!([
      { "PartWithCompliance": {
        "PartNumber": "DRILL",
        "Indicators": [{ "Name": "SIN", "Flag": "WatchListCompliant" }]
      }}
    ]))
    .unwrap();
    ResultFactory::new(&indicators())
      .create(response, vec![])
      .unwrap()
  }

  #[test]
  fn by_legislation_text_lists_substances() {
    let result = impacted();
    let text = Report::new(&result, Pivot::ByLegislation).unwrap().to_text();
    assert_eq!(
      text,
      "SIN List\n  {CasNumber: 50-00-0} amount: 5% threshold: 0.1%\n"
    );
  }

  #[test]
  fn flattened_text_has_no_threshold() {
    let result = impacted();
    let text = Report::new(&result, Pivot::Flattened).unwrap().to_text();
    assert_eq!(text, "{CasNumber: 50-00-0} amount: 5% threshold: -\n");
  }

  #[test]
  fn items_text_shows_summary_and_messages() {
    let result = impacted();
    let text = Report::new(&result, Pivot::Items).unwrap().to_text();
    assert_eq!(
      text,
      "<MaterialImpactedSubstancesQueryResult: 1 \
       MaterialWithImpactedSubstances results>\n  [warning] slow query\n"
    );
  }

  #[test]
  fn by_indicator_json_carries_flag() {
    let result = compliance();
    let json = Report::new(&result, Pivot::ByIndicator)
      .unwrap()
      .to_json()
      .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["SIN"]["flag"], "WatchListCompliant");
    assert_eq!(value["SIN"]["definition"]["kind"], "watch_list");
  }

  #[test]
  fn items_json_is_tagged_with_kind() {
    let result = compliance();
    let json = Report::new(&result, Pivot::Items).unwrap().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["kind"], "PartCompliance");
    assert_eq!(value["items"][0]["reference"]["part_number"], "DRILL");
  }

  #[test]
  fn mismatched_pivot_is_an_error() {
    let result = compliance();
    let error = Report::new(&result, Pivot::Flattened).unwrap_err();
    assert_eq!(
      error.to_string(),
      "the flattened pivot does not apply to a PartCompliance result"
    );
  }
}
