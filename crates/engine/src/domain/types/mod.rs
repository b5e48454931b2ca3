// Re-export all types so callers can use `domain::types::*`

pub use self::core::*;
pub use certificate::*;
pub use oid::*;
pub use config::*;

// Module declarations
mod core;
mod certificate;
mod oid;
mod config;
