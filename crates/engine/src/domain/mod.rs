pub mod authorize;
pub mod types;
pub mod error;

#[cfg(feature = "profiles")]
pub mod profile;
