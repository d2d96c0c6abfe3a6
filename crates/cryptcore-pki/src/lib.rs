#![forbid(unsafe_code)]
#![doc = "Key material encoding for cryptcore."]

#[cfg(feature = "rsa")]
pub mod rsa_key;
