//! ASN.1 DER encoding and decoding.
//!
//! [`Builder`] assembles a tree of typed nodes and serializes it in one
//! pass; [`Parser`] is a cursor over an immutable buffer that validates
//! one tag/length header at a time. Only single-byte (low-tag-number)
//! tags and definite, minimal lengths are supported.

mod decoder;
mod encoder;
mod tag;

pub use decoder::Parser;
pub use encoder::{Builder, MAX_LENGTH};

/// ASN.1 tag constants.
pub mod tags {
    pub const INTEGER: u8 = 0x02;
    pub const BIT_STRING: u8 = 0x03;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OID: u8 = 0x06;
    pub const SEQUENCE: u8 = 0x30;
    pub const SET: u8 = 0x31;
    pub const PRINTABLE_STRING: u8 = 0x13;
    pub const IA5_STRING: u8 = 0x16;
    pub const UTC_TIME: u8 = 0x17;
    pub const CONTEXT_SPECIFIC: u8 = 0x80;
    pub const CONSTRUCTED: u8 = 0x20;
}

/// A single-byte ASN.1 tag split into its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub class: TagClass,
    pub constructed: bool,
    pub number: u8,
}

/// ASN.1 tag class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}
