#![forbid(unsafe_code)]
#![doc = "Utility functions for cryptcore: ASN.1 DER codec and OIDs."]

#[cfg(feature = "asn1")]
pub mod asn1;

#[cfg(feature = "oid")]
pub mod oid;
