//! Result factory: routes a raw response to its builder and result type.
//!
//! The kind of a response is read from its structure: a single BoM root, or
//! a non-empty list of one node type. Each [`ResponseKind`] has exactly one
//! builder, selected by an exhaustive `match`, so adding a kind without a
//! builder does not compile.

use bomcheck_core::{
  indicator::IndicatorSet,
  message::{LogMessage, Severity, sort_by_severity},
};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::{debug, error, info, warn};

use crate::{
  Error, Result,
  build::{self, ComplianceBuilder},
  query::{ComplianceQueryResult, ImpactedSubstancesQueryResult, QueryResult},
  response::{RawLogEntry, RawNode, RawResponse, ResponseDocument},
};

/// Every response kind a builder is registered for.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
pub enum ResponseKind {
  MaterialImpactedSubstances,
  PartImpactedSubstances,
  SpecificationImpactedSubstances,
  BomImpactedSubstances,
  MaterialCompliance,
  PartCompliance,
  SpecificationCompliance,
  SubstanceCompliance,
  BomCompliance,
}

impl ResponseKind {
  /// Whether responses of this kind are a single root node rather than a
  /// list.
  pub fn is_bom(self) -> bool {
    matches!(self, Self::BomImpactedSubstances | Self::BomCompliance)
  }

  pub fn is_compliance(self) -> bool {
    matches!(
      self,
      Self::MaterialCompliance
        | Self::PartCompliance
        | Self::SpecificationCompliance
        | Self::SubstanceCompliance
        | Self::BomCompliance
    )
  }

  /// Determine the kind of a response from its structure.
  pub fn of(response: &RawResponse) -> Result<Self> {
    let unregistered = || Error::UnregisteredResponse(response.shape());
    match response {
      RawResponse::Single(RawNode::BomWithImpactedSubstances(_)) => {
        Ok(Self::BomImpactedSubstances)
      }
      RawResponse::Single(RawNode::BomWithCompliance(_)) => {
        Ok(Self::BomCompliance)
      }
      RawResponse::Single(_) => Err(unregistered()),
      RawResponse::List(nodes) => {
        let Some(first) = nodes.first() else {
          return Err(unregistered());
        };
        if let Some(other) =
          nodes.iter().find(|n| n.type_name() != first.type_name())
        {
          return Err(Error::UnregisteredResponse(format!(
            "list mixing {} and {}",
            first.type_name(),
            other.type_name()
          )));
        }
        match first {
          RawNode::MaterialWithImpactedSubstances(_) => {
            Ok(Self::MaterialImpactedSubstances)
          }
          RawNode::PartWithImpactedSubstances(_) => {
            Ok(Self::PartImpactedSubstances)
          }
          RawNode::SpecificationWithImpactedSubstances(_) => {
            Ok(Self::SpecificationImpactedSubstances)
          }
          RawNode::MaterialWithCompliance(_) => Ok(Self::MaterialCompliance),
          RawNode::PartWithCompliance(_) => Ok(Self::PartCompliance),
          RawNode::SpecificationWithCompliance(_) => {
            Ok(Self::SpecificationCompliance)
          }
          RawNode::SubstanceWithCompliance(_) => Ok(Self::SubstanceCompliance),
          RawNode::CoatingWithCompliance(_)
          | RawNode::BomWithImpactedSubstances(_)
          | RawNode::BomWithCompliance(_) => Err(unregistered()),
        }
      }
    }
  }
}

// ─── Node extraction ─────────────────────────────────────────────────────────

macro_rules! pick {
  ($variant:ident) => {
    |node| match node {
      RawNode::$variant(inner) => Some(inner),
      _ => None,
    }
  };
}

fn list_of<T>(
  response: RawResponse,
  pick: fn(RawNode) -> Option<T>,
) -> Result<Vec<T>> {
  let shape = response.shape();
  let RawResponse::List(nodes) = response else {
    return Err(Error::UnregisteredResponse(shape));
  };
  nodes
    .into_iter()
    .map(|node| {
      pick(node).ok_or_else(|| Error::UnregisteredResponse(shape.clone()))
    })
    .collect()
}

fn single_of<T>(
  response: RawResponse,
  pick: fn(RawNode) -> Option<T>,
) -> Result<T> {
  let shape = response.shape();
  match response {
    RawResponse::Single(node) => {
      pick(node).ok_or(Error::UnregisteredResponse(shape))
    }
    RawResponse::List(_) => Err(Error::UnregisteredResponse(shape)),
  }
}

// ─── Messages ────────────────────────────────────────────────────────────────

/// Copy the service's log entries, most severe first, and re-emit each one.
fn record_messages(entries: Vec<RawLogEntry>) -> Vec<LogMessage> {
  let mut messages: Vec<LogMessage> = entries
    .into_iter()
    .map(|entry| LogMessage {
      severity: entry.severity,
      message:  entry.message,
    })
    .collect();
  sort_by_severity(&mut messages);

  for message in &messages {
    let text = message.message.as_str();
    match message.severity {
      Severity::Error => error!(target: "bomcheck::messages", "{text}"),
      Severity::Warning => warn!(target: "bomcheck::messages", "{text}"),
      Severity::Information => info!(target: "bomcheck::messages", "{text}"),
    }
  }
  messages
}

// ─── Factory ─────────────────────────────────────────────────────────────────

/// Creates query results from raw responses. Compliance responses are
/// resolved against the indicators the query was made with.
#[derive(Debug, Clone, Copy)]
pub struct ResultFactory<'a> {
  indicators: &'a IndicatorSet,
}

impl<'a> ResultFactory<'a> {
  pub fn new(indicators: &'a IndicatorSet) -> Self { Self { indicators } }

  /// Build the query result for a response whose kind is read from its
  /// structure. Fails with [`Error::UnregisteredResponse`] for any shape no
  /// kind is registered for, including an empty list.
  pub fn create(
    &self,
    response: RawResponse,
    log_entries: Vec<RawLogEntry>,
  ) -> Result<QueryResult> {
    let kind = ResponseKind::of(&response)?;
    self.build(kind, response, log_entries)
  }

  /// Build the query result for a response of a known kind. An empty list
  /// is accepted for every list kind and yields an empty result.
  pub fn create_as(
    &self,
    expected: ResponseKind,
    response: RawResponse,
    log_entries: Vec<RawLogEntry>,
  ) -> Result<QueryResult> {
    match ResponseKind::of(&response) {
      Ok(found) if found != expected => {
        return Err(Error::KindMismatch { expected, found });
      }
      Err(_) if matches!(&response, RawResponse::List(n) if n.is_empty()) => {}
      Err(e) => return Err(e),
      Ok(_) => {}
    }
    self.build(expected, response, log_entries)
  }

  /// [`create`](Self::create) for a complete response document.
  pub fn create_from_document(
    &self,
    document: ResponseDocument,
  ) -> Result<QueryResult> {
    self.create(document.response, document.log_messages)
  }

  fn build(
    &self,
    kind: ResponseKind,
    response: RawResponse,
    log_entries: Vec<RawLogEntry>,
  ) -> Result<QueryResult> {
    debug!(%kind, shape = %response.shape(), "dispatching response");
    // Messages are recorded only once the items are built.
    let messages = || record_messages(log_entries);
    let compliance = ComplianceBuilder::new(self.indicators);

    let result = match kind {
      ResponseKind::MaterialImpactedSubstances => {
        let items = list_of(response, pick!(MaterialWithImpactedSubstances))?
          .into_iter()
          .map(build::material_with_impacted_substances)
          .collect::<Result<_>>()?;
        QueryResult::MaterialImpactedSubstances(
          ImpactedSubstancesQueryResult::new(items, messages()),
        )
      }
      ResponseKind::PartImpactedSubstances => {
        let items = list_of(response, pick!(PartWithImpactedSubstances))?
          .into_iter()
          .map(build::part_with_impacted_substances)
          .collect::<Result<_>>()?;
        QueryResult::PartImpactedSubstances(ImpactedSubstancesQueryResult::new(
          items,
          messages(),
        ))
      }
      ResponseKind::SpecificationImpactedSubstances => {
        let items =
          list_of(response, pick!(SpecificationWithImpactedSubstances))?
            .into_iter()
            .map(build::specification_with_impacted_substances)
            .collect::<Result<_>>()?;
        QueryResult::SpecificationImpactedSubstances(
          ImpactedSubstancesQueryResult::new(items, messages()),
        )
      }
      ResponseKind::BomImpactedSubstances => {
        let root = single_of(response, pick!(BomWithImpactedSubstances))?;
        let items = vec![build::bom_with_impacted_substances(root)?];
        QueryResult::BomImpactedSubstances(ImpactedSubstancesQueryResult::new(
          items,
          messages(),
        ))
      }
      ResponseKind::MaterialCompliance => {
        let raw = list_of(response, pick!(MaterialWithCompliance))?;
        QueryResult::MaterialCompliance(ComplianceQueryResult::new(
          compliance.materials(raw)?,
          messages(),
        ))
      }
      ResponseKind::PartCompliance => {
        let raw = list_of(response, pick!(PartWithCompliance))?;
        QueryResult::PartCompliance(ComplianceQueryResult::new(
          compliance.parts(raw)?,
          messages(),
        ))
      }
      ResponseKind::SpecificationCompliance => {
        let raw = list_of(response, pick!(SpecificationWithCompliance))?;
        QueryResult::SpecificationCompliance(ComplianceQueryResult::new(
          compliance.specifications(raw)?,
          messages(),
        ))
      }
      ResponseKind::SubstanceCompliance => {
        let raw = list_of(response, pick!(SubstanceWithCompliance))?;
        QueryResult::SubstanceCompliance(ComplianceQueryResult::new(
          compliance.substances(raw)?,
          messages(),
        ))
      }
      ResponseKind::BomCompliance => {
        let root = single_of(response, pick!(BomWithCompliance))?;
        QueryResult::BomCompliance(ComplianceQueryResult::new(
          compliance.parts(root.parts)?,
          messages(),
        ))
      }
    };

    debug!(%kind, items = result.len(), "built query result");
    Ok(result)
  }
}
