//! Log messages returned by the service alongside a query result.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Message severity, ordered `Information < Warning < Error`.
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
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
  Information,
  Warning,
  Error,
}

/// A message produced while the service ran the query. Messages with
/// [`Severity::Error`] mean the result is more likely to be incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
  pub severity: Severity,
  pub message:  String,
}

/// Stable sort by decreasing severity; messages of equal severity keep their
/// relative order.
pub fn sort_by_severity(messages: &mut [LogMessage]) {
  messages.sort_by(|a, b| b.severity.cmp(&a.severity));
}
