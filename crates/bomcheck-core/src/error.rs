//! Error types for `bomcheck-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("indicator {0:?} is defined more than once")]
  DuplicateIndicator(String),

  #[error("{flag:?} is not a valid flag for indicator {indicator:?}")]
  UnknownFlag { indicator: String, flag: String },

  #[error("impacted substance has no identifying field")]
  SubstanceWithoutIdentity,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
