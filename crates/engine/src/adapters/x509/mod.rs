// X.509 adapter - turns PEM client certificates into extension sets

mod constants;
mod reader;

pub use constants::*;
pub use reader::*;
