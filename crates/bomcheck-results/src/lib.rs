//! Query results for BoM compliance and impacted-substances responses.
//!
//! Turns raw service responses into typed item-result trees and exposes the
//! aggregate views (pivots) over them. Pure synchronous; the transport that
//! fetches responses lives elsewhere.
//!
//! # Quick start
//!
//! ```no_run
//! use bomcheck_core::indicator::{IndicatorDefinition, IndicatorSet};
//! use bomcheck_results::{ResultFactory, response::ResponseDocument};
//!
//! let indicators = IndicatorSet::new([IndicatorDefinition::watch_list(
//!   "SIN",
//!   vec!["SIN List".to_string()],
//! )])
//! .unwrap();
//! let json = std::fs::read_to_string("response.json").unwrap();
//! let document: ResponseDocument = serde_json::from_str(&json).unwrap();
//! let result = ResultFactory::new(&indicators)
//!   .create_from_document(document)
//!   .unwrap();
//! println!("{result}");
//! ```

pub mod build;
pub mod error;
pub mod factory;
pub mod pivot;
pub mod query;
pub mod response;

pub use error::{Error, Result};
pub use factory::{ResponseKind, ResultFactory};
pub use query::{
  BomComplianceQueryResult, BomImpactedSubstancesQueryResult,
  ComplianceQueryResult, ImpactedSubstancesQueryResult,
  MaterialComplianceQueryResult, MaterialImpactedSubstancesQueryResult,
  PartComplianceQueryResult, PartImpactedSubstancesQueryResult, QueryResult,
  SpecificationComplianceQueryResult,
  SpecificationImpactedSubstancesQueryResult, SubstanceComplianceQueryResult,
};


// ─── Shared test helpers ─────────────────────────────────────────────────────
