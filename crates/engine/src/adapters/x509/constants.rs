/// Opening of a PEM pre-encapsulation boundary; the label follows.
pub const PEM_BEGIN: &str = "-----BEGIN ";
/// Opening of a PEM post-encapsulation boundary.
pub const PEM_END: &str = "-----END ";
pub const PEM_DASHES: &str = "-----";
