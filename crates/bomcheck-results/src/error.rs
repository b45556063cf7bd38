//! Error type for `bomcheck-results`.

use thiserror::Error;

use crate::factory::ResponseKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] bomcheck_core::Error),

  /// The response has a shape no result type is registered for. This is a
  /// client/service schema mismatch, not a data problem.
  #[error("unregistered response type: {0}")]
  UnregisteredResponse(String),

  /// A response or result of one kind was given where another was required.
  #[error("expected a {expected} result, found {found}")]
  KindMismatch {
    expected: ResponseKind,
    found:    ResponseKind,
  },

  /// The response reports an indicator that was not part of the query.
  #[error("response references unknown indicator {0:?}")]
  UnknownIndicator(String),

  /// One item reports the same indicator more than once.
  #[error("indicator {0:?} reported more than once for one item")]
  DuplicateIndicatorReport(String),

  /// Results holding a single BoM root cannot be concatenated.
  #[error("{0} results hold a single root and cannot be combined")]
  NotCombinable(ResponseKind),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
