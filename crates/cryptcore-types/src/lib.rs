#![forbid(unsafe_code)]
#![doc = "Common types, error codes, and cipher mode identifiers for cryptcore."]

pub mod algorithm;
pub mod error;

pub use algorithm::*;
pub use error::*;
