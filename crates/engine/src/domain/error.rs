// crates/engine/src/domain/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("configuration: {0}")]
  Config(String),

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// The certificate could not be decoded. Raised by the extension reader,
  /// never by the authorization predicate itself.
  #[error("certificate parse error: {0}")]
  CertificateParse(String),

  #[error("limit exceeded: {0}")]
  Limit(String),

  #[error("missing resource: {kind} {id}")]
  MissingResource { kind: &'static str, id: String },

  #[error("duplicate resource: {kind} {id}")]
  DuplicateResource { kind: &'static str, id: String },

  #[error("feature not enabled: {0}")]
  Feature(&'static str),
}

#[cfg(feature = "x509")]
impl From<x509_cert::der::Error> for EngineError {
  fn from(e: x509_cert::der::Error) -> Self {
    EngineError::CertificateParse(e.to_string())
  }
}

pub type EngineResult<T> = Result<T, EngineError>;
